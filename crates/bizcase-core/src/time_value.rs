use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::BizCaseError;
use crate::types::{Money, Percent, Rate, MONTHS_PER_YEAR};
use crate::BizCaseResult;

/// Newton-Raphson seed: 10% annual, expressed monthly.
const IRR_SEED: Decimal = dec!(0.0083333333333333333333333333);
const IRR_STEP_TOLERANCE: Decimal = dec!(0.0001);
const IRR_MIN_DERIVATIVE: Decimal = dec!(0.0000000001);
const IRR_RATE_FLOOR: Decimal = dec!(-0.99);
const IRR_RATE_CEILING: Decimal = dec!(10);
const MAX_IRR_ITERATIONS: u32 = 100;

/// Convert an annual percentage rate into the monthly rate used for
/// discounting: simple division by 12, not a compounded root.
pub fn monthly_discount_rate(annual: Percent) -> Rate {
    annual / dec!(100) / Decimal::from(MONTHS_PER_YEAR)
}

/// Annualize a monthly rate by compounding: `((1 + r)^12 - 1) * 100`.
pub fn annualize_monthly_rate(monthly: Rate) -> BizCaseResult<Percent> {
    let compounded = (Decimal::ONE + monthly)
        .checked_powi(MONTHS_PER_YEAR as i64)
        .ok_or_else(|| BizCaseError::overflow("IRR annualization"))?;
    Ok((compounded - Decimal::ONE) * dec!(100))
}

/// Prepend the upfront outlay to a monthly series: `[-investment, cf_1, ..., cf_n]`.
pub fn investment_series(initial_investment: Money, monthly_cash_flow: &[Money]) -> Vec<Money> {
    let mut series = Vec::with_capacity(monthly_cash_flow.len() + 1);
    series.push(-initial_investment);
    series.extend_from_slice(monthly_cash_flow);
    series
}

/// Net Present Value of a series of cash flows, period 0 undiscounted.
///
/// Once the discount factor grows past the decimal range the remaining
/// terms are below representable precision and are dropped.
pub fn npv(rate: Rate, cash_flows: &[Money]) -> BizCaseResult<Money> {
    if rate <= dec!(-1) {
        return Err(BizCaseError::InvalidInput {
            field: "rate".into(),
            reason: "Discount rate must be greater than -100%".into(),
        });
    }

    let mut result = Decimal::ZERO;
    let one_plus_r = Decimal::ONE + rate;
    let mut discount = Decimal::ONE;

    for (t, cf) in cash_flows.iter().enumerate() {
        if t > 0 {
            discount = match discount.checked_mul(one_plus_r) {
                Some(d) => d,
                None => break,
            };
        }
        if discount.is_zero() {
            return Err(BizCaseError::DivisionByZero {
                context: format!("NPV discount factor at period {t}"),
            });
        }
        let term = cf
            .checked_div(discount)
            .ok_or_else(|| BizCaseError::overflow(format!("NPV term at period {t}")))?;
        result = result
            .checked_add(term)
            .ok_or_else(|| BizCaseError::overflow("NPV accumulation"))?;
    }

    Ok(result)
}

/// NPV of a project: `-I + Σ cf[m-1] / (1 + annual/100/12)^m` for m = 1..=N.
pub fn project_npv(
    initial_investment: Money,
    annual_discount_rate: Percent,
    monthly_cash_flow: &[Money],
) -> BizCaseResult<Money> {
    let rate = monthly_discount_rate(annual_discount_rate);
    npv(rate, &investment_series(initial_investment, monthly_cash_flow))
}

/// Outcome of the IRR search. The solver never fails on non-convergence;
/// it reports the best estimate together with `converged = false`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IrrEstimate {
    /// Periodic (monthly) rate that zeroes NPV
    pub monthly_rate: Rate,
    /// `((1 + monthly)^12 - 1) * 100`
    pub annual_rate: Percent,
    pub iterations: u32,
    pub converged: bool,
}

/// NPV and its first derivative with respect to the rate.
/// `None` when a term leaves the decimal range.
fn npv_with_derivative(rate: Rate, cash_flows: &[Money]) -> Option<(Decimal, Decimal)> {
    let one_plus_r = Decimal::ONE + rate;
    let mut npv_val = Decimal::ZERO;
    let mut dnpv = Decimal::ZERO;
    let mut discount = Decimal::ONE;

    for (t, cf) in cash_flows.iter().enumerate() {
        if t > 0 {
            discount = match discount.checked_mul(one_plus_r) {
                Some(d) => d,
                // later terms vanish
                None => break,
            };
        }
        if discount.is_zero() {
            return None;
        }
        npv_val = npv_val.checked_add(cf.checked_div(discount)?)?;

        let next = discount.checked_mul(one_plus_r)?;
        if next.is_zero() {
            return None;
        }
        let t_dec = Decimal::from(t as i64);
        dnpv = dnpv.checked_sub(t_dec.checked_mul(*cf)?.checked_div(next)?)?;
    }

    Some((npv_val, dnpv))
}

/// Internal Rate of Return using Newton-Raphson on the monthly rate.
///
/// `cash_flows` starts with the period-0 outlay. The search starts at 10%
/// annual (monthly equivalent) and stops once a step moves the rate by less
/// than 1e-4. A vanishing derivative ends the search early; a step outside
/// `[-0.99, 10]` resets the rate to the seed and ends it. Series with no sign
/// change have no root, so callers must tolerate the approximate answer.
pub fn irr(cash_flows: &[Money]) -> BizCaseResult<IrrEstimate> {
    if cash_flows.len() < 2 {
        return Err(BizCaseError::InsufficientData(
            "IRR requires at least 2 cash flows".into(),
        ));
    }

    let mut rate = IRR_SEED;
    let mut converged = false;
    let mut iterations = 0;

    while iterations < MAX_IRR_ITERATIONS {
        iterations += 1;

        let Some((npv_val, dnpv)) = npv_with_derivative(rate, cash_flows) else {
            debug!(%rate, "IRR evaluation left decimal range, resetting to seed");
            rate = IRR_SEED;
            break;
        };

        if dnpv.abs() < IRR_MIN_DERIVATIVE {
            debug!(%rate, "IRR derivative vanished");
            break;
        }

        let next = match npv_val.checked_div(dnpv) {
            Some(step) => rate - step,
            None => {
                rate = IRR_SEED;
                break;
            }
        };

        if next < IRR_RATE_FLOOR || next > IRR_RATE_CEILING {
            debug!(%next, "IRR step diverged, resetting to seed");
            rate = IRR_SEED;
            break;
        }

        let delta = (next - rate).abs();
        rate = next;
        if delta < IRR_STEP_TOLERANCE {
            converged = true;
            break;
        }
    }

    debug!(%rate, iterations, converged, "IRR search finished");

    Ok(IrrEstimate {
        monthly_rate: rate,
        annual_rate: annualize_monthly_rate(rate)?,
        iterations,
        converged,
    })
}
