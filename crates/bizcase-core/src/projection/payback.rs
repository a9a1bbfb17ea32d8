use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::BizCaseError;
use crate::types::Money;
use crate::BizCaseResult;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaybackResult {
    /// Fractional months until the cumulative cash flow is recovered, or the
    /// full horizon when it never is
    pub months: Decimal,
    pub achieved: bool,
}

/// Months (fractional) until cumulative cash flow first reaches zero.
///
/// The walk starts at `-initial_investment`; inside the crossing month the
/// position is linearly interpolated. A case that never recovers saturates at
/// the horizon length.
pub fn payback_period(
    initial_investment: Money,
    monthly_cash_flow: &[Money],
) -> BizCaseResult<PaybackResult> {
    let mut cumulative = -initial_investment;
    if cumulative >= Decimal::ZERO {
        return Ok(PaybackResult {
            months: Decimal::ZERO,
            achieved: true,
        });
    }

    for (m, cf) in monthly_cash_flow.iter().enumerate() {
        let previous = cumulative;
        cumulative = cumulative
            .checked_add(*cf)
            .ok_or_else(|| BizCaseError::overflow(format!("payback in month {}", m + 1)))?;
        // previous < 0 <= cumulative, so cf > 0
        if cumulative >= Decimal::ZERO {
            let fraction = -previous / *cf;
            return Ok(PaybackResult {
                months: Decimal::from(m as u64) + fraction,
                achieved: true,
            });
        }
    }

    Ok(PaybackResult {
        months: Decimal::from(monthly_cash_flow.len() as u64),
        achieved: false,
    })
}
