use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::debug;

use super::engine::{evaluate, CalculationResult};
use super::scenario::scale;
use crate::error::BizCaseError;
use crate::types::*;
use crate::BizCaseResult;

/// Default one-way perturbation grid, in percent.
pub const DEFAULT_VARIATIONS: [i32; 7] = [-30, -20, -10, 0, 10, 20, 30];

/// Low and high swings used for the tornado chart.
pub const TORNADO_SWING: i32 = 30;

/// Inputs that can be perturbed one at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensitivityVariable {
    Investment,
    Revenue,
    OperatingCosts,
    MaintenanceCosts,
}

impl SensitivityVariable {
    /// Evaluation order; also the tie-break order of the tornado ranking.
    pub const ALL: [SensitivityVariable; 4] = [
        SensitivityVariable::Investment,
        SensitivityVariable::Revenue,
        SensitivityVariable::OperatingCosts,
        SensitivityVariable::MaintenanceCosts,
    ];

    pub fn field_name(&self) -> &'static str {
        match self {
            SensitivityVariable::Investment => "initial_investment",
            SensitivityVariable::Revenue => "yearly_revenue",
            SensitivityVariable::OperatingCosts => "operating_costs_yearly",
            SensitivityVariable::MaintenanceCosts => "maintenance_costs_yearly",
        }
    }
}

/// Scale a single variable of `base` by `1 + variation / 100`.
pub fn perturb(
    base: &CalculationInput,
    variable: SensitivityVariable,
    variation_percent: i32,
) -> BizCaseResult<CalculationInput> {
    let factor = Decimal::ONE + Decimal::from(variation_percent) / dec!(100);
    let field = variable.field_name();
    let mut input = base.clone();
    match variable {
        SensitivityVariable::Investment => {
            input.initial_investment = scale(base.initial_investment, factor, field)?
        }
        SensitivityVariable::Revenue => {
            input.yearly_revenue = scale(base.yearly_revenue, factor, field)?
        }
        SensitivityVariable::OperatingCosts => {
            input.operating_costs_yearly = scale(base.operating_costs_yearly, factor, field)?
        }
        SensitivityVariable::MaintenanceCosts => {
            input.maintenance_costs_yearly = scale(base.maintenance_costs_yearly, factor, field)?
        }
    }
    Ok(input)
}

fn default_variations() -> Vec<i32> {
    DEFAULT_VARIATIONS.to_vec()
}

/// Input for one-way sensitivity analysis
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensitivityInput {
    pub base: CalculationInput,
    /// Percent variations applied to each variable in turn
    #[serde(default = "default_variations")]
    pub variations: Vec<i32>,
}

/// Outcome of one variable at one variation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensitivityResult {
    pub variable: SensitivityVariable,
    pub variation_percent: i32,
    pub npv: Money,
    pub roi: Percent,
    pub npv_change: Money,
    pub roi_change: Percent,
}

/// Output of one-way sensitivity analysis
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensitivityOutput {
    pub base_npv: Money,
    pub base_roi: Percent,
    /// Grouped by variable, in grid order within each group
    pub results: Vec<SensitivityResult>,
}

/// Perturb each variable across `variations`, re-running the full case
/// evaluation at every point. Points that cannot be evaluated (for example a
/// variation that zeroes the investment) are skipped with a warning.
pub fn analyze_sensitivity(
    input: &SensitivityInput,
) -> BizCaseResult<ComputationOutput<SensitivityOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    if input.variations.is_empty() {
        return Err(BizCaseError::InsufficientData(
            "At least one variation required".into(),
        ));
    }

    let base = evaluate(&input.base)?;
    let mut results = Vec::with_capacity(SensitivityVariable::ALL.len() * input.variations.len());

    for variable in SensitivityVariable::ALL {
        for &variation in &input.variations {
            match perturb(&input.base, variable, variation).and_then(|i| evaluate(&i)) {
                Ok(r) => results.push(SensitivityResult {
                    variable,
                    variation_percent: variation,
                    npv: r.npv,
                    roi: r.roi,
                    npv_change: r.npv - base.npv,
                    roi_change: r.roi - base.roi,
                }),
                Err(e) => warnings.push(format!(
                    "Evaluation failed for {} at {variation}%: {e}",
                    variable.field_name()
                )),
            }
        }
    }

    debug!(points = results.len(), skipped = warnings.len(), "sensitivity grid evaluated");

    let output = SensitivityOutput {
        base_npv: base.npv,
        base_roi: base.roi,
        results,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "One-way sensitivity (NPV/ROI per variable and variation)",
        &serde_json::json!({
            "variables": SensitivityVariable::ALL,
            "variations": input.variations,
        }),
        warnings,
        elapsed,
        output,
    ))
}

/// Metric ranked by the tornado chart.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TornadoMetric {
    #[default]
    Npv,
    Roi,
}

impl TornadoMetric {
    fn pick(&self, result: &CalculationResult) -> Decimal {
        match self {
            TornadoMetric::Npv => result.npv,
            TornadoMetric::Roi => result.roi,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TornadoInput {
    pub base: CalculationInput,
    #[serde(default)]
    pub metric: TornadoMetric,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TornadoEntry {
    pub variable: SensitivityVariable,
    /// metric(-30%) - metric(0%)
    pub negative_impact: Decimal,
    /// metric(+30%) - metric(0%)
    pub positive_impact: Decimal,
    /// |negative_impact| + |positive_impact|
    pub range: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TornadoOutput {
    pub metric: TornadoMetric,
    pub base_value: Decimal,
    /// Sorted by `range`, largest first
    pub entries: Vec<TornadoEntry>,
}

/// Rank the variables by the swing a ±30% change causes in the chosen metric.
/// Equal ranges keep their evaluation order.
pub fn tornado_analysis(input: &TornadoInput) -> BizCaseResult<ComputationOutput<TornadoOutput>> {
    let start = Instant::now();
    let warnings: Vec<String> = Vec::new();

    let base_value = input.metric.pick(&evaluate(&input.base)?);

    let mut entries = Vec::with_capacity(SensitivityVariable::ALL.len());
    for variable in SensitivityVariable::ALL {
        let low = evaluate(&perturb(&input.base, variable, -TORNADO_SWING)?)?;
        let high = evaluate(&perturb(&input.base, variable, TORNADO_SWING)?)?;

        let negative_impact = input.metric.pick(&low) - base_value;
        let positive_impact = input.metric.pick(&high) - base_value;
        entries.push(TornadoEntry {
            variable,
            negative_impact,
            positive_impact,
            range: negative_impact.abs() + positive_impact.abs(),
        });
    }

    // stable: ties keep evaluation order
    entries.sort_by(|a, b| b.range.cmp(&a.range));

    let output = TornadoOutput {
        metric: input.metric,
        base_value,
        entries,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Tornado analysis (±30% one-way swings, ranked by range)",
        &serde_json::json!({
            "metric": input.metric,
            "swing_percent": TORNADO_SWING,
        }),
        warnings,
        elapsed,
        output,
    ))
}
