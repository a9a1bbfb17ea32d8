use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::debug;

use super::engine::{evaluate, result_warnings, CalculationResult};
use crate::error::BizCaseError;
use crate::types::*;
use crate::BizCaseResult;

/// The three revenue cases presented side by side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseKind {
    Expected,
    Best,
    Worst,
}

impl CaseKind {
    pub const ALL: [CaseKind; 3] = [CaseKind::Expected, CaseKind::Best, CaseKind::Worst];

    pub fn label(&self) -> &'static str {
        match self {
            CaseKind::Expected => "expected",
            CaseKind::Best => "best",
            CaseKind::Worst => "worst",
        }
    }
}

/// Revenue multipliers applied per case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseMultipliers {
    pub expected: Decimal,
    pub best: Decimal,
    pub worst: Decimal,
}

impl Default for CaseMultipliers {
    fn default() -> Self {
        CaseMultipliers {
            expected: dec!(1.0),
            best: dec!(1.2),
            worst: dec!(0.8),
        }
    }
}

impl CaseMultipliers {
    pub fn for_case(&self, kind: CaseKind) -> Decimal {
        match kind {
            CaseKind::Expected => self.expected,
            CaseKind::Best => self.best,
            CaseKind::Worst => self.worst,
        }
    }
}

/// Optional weights for a probability-weighted view of the three cases.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseProbabilities {
    pub expected: Rate,
    pub best: Rate,
    pub worst: Rate,
}

impl CaseProbabilities {
    fn for_case(&self, kind: CaseKind) -> Rate {
        match kind {
            CaseKind::Expected => self.expected,
            CaseKind::Best => self.best,
            CaseKind::Worst => self.worst,
        }
    }
}

/// Input for expected/best/worst analysis
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioSetInput {
    /// Base case; its own multiplier is replaced per case
    pub base: CalculationInput,
    #[serde(default)]
    pub multipliers: CaseMultipliers,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub probabilities: Option<CaseProbabilities>,
}

/// Result for a single case
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseOutcome {
    pub case: CaseKind,
    pub multiplier: Decimal,
    pub result: CalculationResult,
    /// NPV minus the expected-case NPV
    pub npv_deviation: Money,
    /// `npv_deviation / |expected NPV|`, zero when the expected NPV is zero
    pub npv_deviation_pct: Rate,
}

/// Output of expected/best/worst analysis
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioSetOutput {
    pub cases: Vec<CaseOutcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub probability_weighted_npv: Option<Money>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub probability_weighted_roi: Option<Percent>,
}

fn validate_probabilities(p: &CaseProbabilities) -> BizCaseResult<()> {
    for kind in CaseKind::ALL {
        let prob = p.for_case(kind);
        if prob < Decimal::ZERO || prob > Decimal::ONE {
            return Err(BizCaseError::InvalidInput {
                field: format!("probabilities.{}", kind.label()),
                reason: "Probability must be between 0 and 1".into(),
            });
        }
    }

    let total = p.expected + p.best + p.worst;
    if (total - Decimal::ONE).abs() > dec!(0.001) {
        return Err(BizCaseError::InvalidInput {
            field: "probabilities".into(),
            reason: format!("Probabilities must sum to 1.0 (got {total})"),
        });
    }
    Ok(())
}

/// Evaluate the base case under the expected, best and worst revenue
/// multipliers.
pub fn run_scenarios(
    input: &ScenarioSetInput,
) -> BizCaseResult<ComputationOutput<ScenarioSetOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    if let Some(ref probabilities) = input.probabilities {
        validate_probabilities(probabilities)?;
    }

    let mut evaluated = Vec::with_capacity(CaseKind::ALL.len());
    for kind in CaseKind::ALL {
        let multiplier = input.multipliers.for_case(kind);
        let case_input = input.base.with_multiplier(multiplier);
        let result = evaluate(&case_input)?;
        warnings.extend(result_warnings(kind.label(), &case_input, &result));
        debug!(case = kind.label(), %multiplier, npv = %result.npv, "scenario evaluated");
        evaluated.push((kind, multiplier, result));
    }

    let expected_npv = evaluated
        .iter()
        .find(|(kind, _, _)| *kind == CaseKind::Expected)
        .map(|(_, _, r)| r.npv)
        .unwrap_or_default();

    let mut probability_weighted_npv = input.probabilities.as_ref().map(|_| Decimal::ZERO);
    let mut probability_weighted_roi = input.probabilities.as_ref().map(|_| Decimal::ZERO);

    let mut cases = Vec::with_capacity(evaluated.len());
    for (kind, multiplier, result) in evaluated {
        let npv_deviation = result.npv - expected_npv;
        let npv_deviation_pct = if expected_npv.is_zero() {
            Decimal::ZERO
        } else {
            npv_deviation / expected_npv.abs()
        };

        if let Some(ref p) = input.probabilities {
            let weight = p.for_case(kind);
            if let Some(ref mut pw) = probability_weighted_npv {
                *pw += weight * result.npv;
            }
            if let Some(ref mut pw) = probability_weighted_roi {
                *pw += weight * result.roi;
            }
        }

        cases.push(CaseOutcome {
            case: kind,
            multiplier,
            result,
            npv_deviation,
            npv_deviation_pct,
        });
    }

    if input.multipliers.best < input.multipliers.worst {
        warnings.push("Best-case multiplier is below the worst-case multiplier".into());
    }

    let output = ScenarioSetOutput {
        cases,
        probability_weighted_npv,
        probability_weighted_roi,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Expected/Best/Worst revenue-multiplier scenarios",
        &serde_json::json!({
            "multipliers": input.multipliers,
            "probabilities": input.probabilities,
        }),
        warnings,
        elapsed,
        output,
    ))
}

/// What-if adjustment applied to a base case.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScenarioAdjustment {
    /// Percent change applied to revenue
    #[serde(default)]
    pub sales_adjustment_percent: Percent,
    /// Percent change applied to both operating and maintenance costs
    #[serde(default)]
    pub costs_adjustment_percent: Percent,
    /// Percentage points added to the annual discount rate
    #[serde(default)]
    pub discount_adjustment_absolute: Percent,
}

impl ScenarioAdjustment {
    /// Derive the adjusted input; the base is left untouched.
    pub fn apply(&self, base: &CalculationInput) -> BizCaseResult<CalculationInput> {
        let sales_factor = Decimal::ONE + self.sales_adjustment_percent / dec!(100);
        let cost_factor = Decimal::ONE + self.costs_adjustment_percent / dec!(100);

        let adjusted = CalculationInput {
            yearly_revenue: scale(base.yearly_revenue, sales_factor, "yearly_revenue")?,
            operating_costs_yearly: scale(
                base.operating_costs_yearly,
                cost_factor,
                "operating_costs_yearly",
            )?,
            maintenance_costs_yearly: scale(
                base.maintenance_costs_yearly,
                cost_factor,
                "maintenance_costs_yearly",
            )?,
            discount_rate: base.discount_rate + self.discount_adjustment_absolute,
            ..base.clone()
        };
        adjusted.validate()?;
        Ok(adjusted)
    }
}

pub(crate) fn scale(value: Money, factor: Decimal, field: &str) -> BizCaseResult<Money> {
    value
        .checked_mul(factor)
        .ok_or_else(|| BizCaseError::overflow(field))
}

/// Evaluate a base case after applying a what-if adjustment.
pub fn run_adjusted(
    base: &CalculationInput,
    adjustment: &ScenarioAdjustment,
) -> BizCaseResult<CalculationResult> {
    evaluate(&adjustment.apply(base)?)
}

/// Difference `right - left` for each headline metric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricDelta {
    pub roi: Percent,
    pub npv: Money,
    pub payback_period_months: Decimal,
    pub irr: Percent,
}

pub fn metric_delta(left: &CalculationResult, right: &CalculationResult) -> MetricDelta {
    MetricDelta {
        roi: right.roi - left.roi,
        npv: right.npv - left.npv,
        payback_period_months: right.payback_period_months - left.payback_period_months,
        irr: right.irr - left.irr,
    }
}

/// Two what-if adjustments of one base case
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonInput {
    pub base: CalculationInput,
    #[serde(default)]
    pub left: ScenarioAdjustment,
    #[serde(default)]
    pub right: ScenarioAdjustment,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonOutput {
    pub left: CalculationResult,
    pub right: CalculationResult,
    pub delta: MetricDelta,
}

/// Evaluate both sides of a comparison and report their deltas.
pub fn compare_scenarios(
    input: &ComparisonInput,
) -> BizCaseResult<ComputationOutput<ComparisonOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let left_input = input.left.apply(&input.base)?;
    let right_input = input.right.apply(&input.base)?;
    let left = evaluate(&left_input)?;
    let right = evaluate(&right_input)?;
    warnings.extend(result_warnings("left", &left_input, &left));
    warnings.extend(result_warnings("right", &right_input, &right));

    let delta = metric_delta(&left, &right);
    let output = ComparisonOutput { left, right, delta };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Scenario comparison (right minus left)",
        &serde_json::json!({
            "left": input.left,
            "right": input.right,
        }),
        warnings,
        elapsed,
        output,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn base_input() -> CalculationInput {
        CalculationInput {
            initial_investment: dec!(100000),
            discount_rate: dec!(10),
            project_duration_months: 24,
            yearly_revenue: dec!(120000),
            revenue_growth_percent: dec!(0),
            operating_costs_yearly: dec!(60000),
            maintenance_costs_yearly: dec!(0),
            multiplier: dec!(1),
            start_date: None,
        }
    }

    fn set_input() -> ScenarioSetInput {
        ScenarioSetInput {
            base: base_input(),
            multipliers: CaseMultipliers::default(),
            probabilities: None,
        }
    }

    #[test]
    fn test_three_cases_in_order() {
        let out = run_scenarios(&set_input()).unwrap().result;
        let kinds: Vec<CaseKind> = out.cases.iter().map(|c| c.case).collect();
        assert_eq!(kinds, CaseKind::ALL.to_vec());
        assert!(out.probability_weighted_npv.is_none());
    }

    #[test]
    fn test_best_beats_expected_beats_worst() {
        let out = run_scenarios(&set_input()).unwrap().result;
        let npv = |k: CaseKind| out.cases.iter().find(|c| c.case == k).unwrap().result.npv;
        assert!(npv(CaseKind::Best) > npv(CaseKind::Expected));
        assert!(npv(CaseKind::Expected) > npv(CaseKind::Worst));
        assert_eq!(out.cases[0].npv_deviation, Decimal::ZERO);
    }

    #[test]
    fn test_worst_case_cash_flow() {
        let out = run_scenarios(&set_input()).unwrap().result;
        let worst = &out.cases[2];
        // 120000 * 0.8 / 12 - 5000 = 3000
        assert_eq!(worst.result.monthly_cash_flow[0], dec!(3000));
    }

    #[test]
    fn test_probability_weighted_npv() {
        let input = ScenarioSetInput {
            probabilities: Some(CaseProbabilities {
                expected: dec!(0.5),
                best: dec!(0.25),
                worst: dec!(0.25),
            }),
            ..set_input()
        };
        let out = run_scenarios(&input).unwrap().result;
        // NPV is linear in the multiplier, so symmetric weights land on the expected NPV
        let expected = out.cases[0].result.npv;
        let pw = out.probability_weighted_npv.unwrap();
        assert!((pw - expected).abs() < dec!(0.0001));
    }

    #[test]
    fn test_probabilities_must_sum_to_one() {
        let input = ScenarioSetInput {
            probabilities: Some(CaseProbabilities {
                expected: dec!(0.3),
                best: dec!(0.3),
                worst: dec!(0.3),
            }),
            ..set_input()
        };
        assert!(run_scenarios(&input).is_err());
    }

    #[test]
    fn test_adjustment_applies_all_three_levers() {
        let adj = ScenarioAdjustment {
            sales_adjustment_percent: dec!(10),
            costs_adjustment_percent: dec!(-20),
            discount_adjustment_absolute: dec!(2),
        };
        let base = CalculationInput {
            maintenance_costs_yearly: dec!(10000),
            ..base_input()
        };
        let adjusted = adj.apply(&base).unwrap();
        assert_eq!(adjusted.yearly_revenue, dec!(132000));
        assert_eq!(adjusted.operating_costs_yearly, dec!(48000));
        assert_eq!(adjusted.maintenance_costs_yearly, dec!(8000));
        assert_eq!(adjusted.discount_rate, dec!(12));
        // base untouched
        assert_eq!(base.yearly_revenue, dec!(120000));
    }

    #[test]
    fn test_adjustment_below_minus_100_rejected() {
        let adj = ScenarioAdjustment {
            sales_adjustment_percent: dec!(-150),
            ..Default::default()
        };
        assert!(adj.apply(&base_input()).is_err());
    }

    #[test]
    fn test_comparison_delta_is_right_minus_left() {
        let input = ComparisonInput {
            base: base_input(),
            left: ScenarioAdjustment::default(),
            right: ScenarioAdjustment {
                discount_adjustment_absolute: dec!(5),
                ..Default::default()
            },
        };
        let out = compare_scenarios(&input).unwrap().result;
        // discount rate affects NPV only
        assert_eq!(out.delta.roi, Decimal::ZERO);
        assert_eq!(out.delta.payback_period_months, Decimal::ZERO);
        assert_eq!(out.delta.irr, Decimal::ZERO);
        assert!(out.delta.npv < Decimal::ZERO);
        assert_eq!(out.delta.npv, out.right.npv - out.left.npv);
    }
}
