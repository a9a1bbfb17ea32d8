use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use super::cash_flow::monthly_lines;
use crate::error::BizCaseError;
use crate::types::*;
use crate::BizCaseResult;

/// Month number reported when revenue never catches up with cost.
pub const BREAK_EVEN_NOT_ACHIEVED: i64 = -1;

/// Cumulative revenue against cumulative cost (investment included).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreakEvenResult {
    pub achieved: bool,
    /// 1-indexed month of the first crossing, `-1` when not achieved
    pub month: i64,
    /// Cumulative revenue at the crossing, zero when not achieved
    pub amount: Money,
    pub cumulative_revenue: Vec<Money>,
    pub cumulative_costs: Vec<Money>,
}

/// Walk the horizon with separate revenue and cost totals and record the
/// first month in which revenue covers cost.
pub fn break_even(input: &CalculationInput) -> BizCaseResult<BreakEvenResult> {
    input.validate()?;

    let lines = monthly_lines(input)?;
    let mut cumulative_revenue = Vec::with_capacity(lines.len());
    let mut cumulative_costs = Vec::with_capacity(lines.len());
    let mut total_revenue = Decimal::ZERO;
    let mut total_costs = input.initial_investment;
    let mut crossing: Option<(i64, Money)> = None;

    for (m, (revenue, costs)) in lines.into_iter().enumerate() {
        total_revenue = total_revenue
            .checked_add(revenue)
            .ok_or_else(|| BizCaseError::overflow("cumulative revenue"))?;
        total_costs = total_costs
            .checked_add(costs)
            .ok_or_else(|| BizCaseError::overflow("cumulative costs"))?;
        cumulative_revenue.push(total_revenue);
        cumulative_costs.push(total_costs);

        if crossing.is_none() && total_revenue >= total_costs {
            crossing = Some((m as i64 + 1, total_revenue));
        }
    }

    let (achieved, month, amount) = match crossing {
        Some((month, amount)) => (true, month, amount),
        None => (false, BREAK_EVEN_NOT_ACHIEVED, Decimal::ZERO),
    };

    Ok(BreakEvenResult {
        achieved,
        month,
        amount,
        cumulative_revenue,
        cumulative_costs,
    })
}

/// Break-even analysis wrapped in the standard output envelope.
pub fn analyze_break_even(
    input: &CalculationInput,
) -> BizCaseResult<ComputationOutput<BreakEvenResult>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let result = break_even(input)?;
    if !result.achieved {
        warnings.push(format!(
            "Cumulative revenue does not cover cumulative cost within {} months",
            input.project_duration_months
        ));
    }

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Break-Even (cumulative revenue vs cumulative cost incl. investment)",
        &serde_json::json!({
            "initial_investment": input.initial_investment.to_string(),
            "project_duration_months": input.project_duration_months,
            "multiplier": input.multiplier.to_string(),
        }),
        warnings,
        elapsed,
        result,
    ))
}
