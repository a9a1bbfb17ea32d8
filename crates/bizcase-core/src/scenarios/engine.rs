use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::BizCaseError;
use crate::projection::cash_flow::{checked_total, project_cash_flows, MonthlyCashFlow};
use crate::projection::payback::payback_period;
use crate::time_value::{investment_series, irr, project_npv};
use crate::types::*;
use crate::BizCaseResult;

/// Headline metrics and cash-flow series for one case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculationResult {
    /// Simple total return over the horizon, in percent
    pub roi: Percent,
    pub npv: Money,
    pub payback_period_months: Decimal,
    pub payback_achieved: bool,
    /// Annualized IRR in percent
    pub irr: Percent,
    pub irr_monthly: Rate,
    pub irr_converged: bool,
    pub total_revenue: Money,
    pub total_costs: Money,
    pub monthly_cash_flow: Vec<Money>,
    pub cumulative_cash_flow: Vec<Money>,
    pub schedule: Vec<MonthlyCashFlow>,
}

/// ROI as `(Σ monthly - I) / I * 100`. No discounting is applied.
pub fn calculate_roi(
    initial_investment: Money,
    monthly_cash_flow: &[Money],
) -> BizCaseResult<Percent> {
    if initial_investment.is_zero() {
        return Err(BizCaseError::DivisionByZero {
            context: "ROI with zero initial investment".into(),
        });
    }
    let total = checked_total(monthly_cash_flow, "ROI cash-flow total")?;
    let gain = total
        .checked_sub(initial_investment)
        .ok_or_else(|| BizCaseError::overflow("ROI gain"))?;
    gain.checked_div(initial_investment)
        .and_then(|ratio| ratio.checked_mul(dec!(100)))
        .ok_or_else(|| BizCaseError::overflow("ROI"))
}

/// Run projection, NPV, payback, IRR and ROI for a single input.
pub fn evaluate(input: &CalculationInput) -> BizCaseResult<CalculationResult> {
    let projection = project_cash_flows(input)?;
    let flows = &projection.monthly_cash_flow;

    let roi = calculate_roi(input.initial_investment, flows)?;
    let npv = project_npv(input.initial_investment, input.discount_rate, flows)?;
    let payback = payback_period(input.initial_investment, flows)?;
    let irr_estimate = irr(&investment_series(input.initial_investment, flows))?;

    Ok(CalculationResult {
        roi,
        npv,
        payback_period_months: payback.months,
        payback_achieved: payback.achieved,
        irr: irr_estimate.annual_rate,
        irr_monthly: irr_estimate.monthly_rate,
        irr_converged: irr_estimate.converged,
        total_revenue: projection.total_revenue,
        total_costs: projection.total_costs,
        monthly_cash_flow: projection.monthly_cash_flow,
        cumulative_cash_flow: projection.cumulative_cash_flow,
        schedule: projection.schedule,
    })
}

/// Non-fatal conditions worth surfacing next to a result.
pub(crate) fn result_warnings(
    label: &str,
    input: &CalculationInput,
    result: &CalculationResult,
) -> Vec<String> {
    let mut warnings = Vec::new();
    if !result.payback_achieved {
        warnings.push(format!(
            "{label}: investment not recovered within {} months",
            input.project_duration_months
        ));
    }
    if !result.irr_converged {
        warnings.push(format!(
            "{label}: IRR did not converge; reported value is an approximation"
        ));
    }
    if result.npv < Decimal::ZERO {
        warnings.push(format!("{label}: NPV is negative at the given discount rate"));
    }
    warnings
}

/// Evaluate one case and wrap it in the standard output envelope.
pub fn calculate_case(
    input: &CalculationInput,
) -> BizCaseResult<ComputationOutput<CalculationResult>> {
    let start = Instant::now();

    let result = evaluate(input)?;
    let warnings = result_warnings("case", input, &result);

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Monthly cash-flow projection with NPV (annual/12 discounting), Newton-Raphson IRR, payback and simple ROI",
        input,
        warnings,
        elapsed,
        result,
    ))
}
