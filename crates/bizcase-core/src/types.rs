use chrono::NaiveDate;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::BizCaseError;
use crate::BizCaseResult;

/// All monetary values. Wraps Decimal to prevent accidental f64 usage.
pub type Money = Decimal;

/// Rates expressed as decimals (0.05 = 5%). Used for solver-internal periodic rates.
pub type Rate = Decimal;

/// Rates and returns expressed as percentages (10 = 10%), the unit of every
/// user-facing input and headline metric.
pub type Percent = Decimal;

/// Months in a year; the projection works on a monthly grid.
pub const MONTHS_PER_YEAR: u32 = 12;

fn default_multiplier() -> Decimal {
    Decimal::ONE
}

/// Project economics for a single investment case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculationInput {
    /// Upfront outlay at month 0
    pub initial_investment: Money,
    /// Annual discount rate in percent
    pub discount_rate: Percent,
    pub project_duration_months: u32,
    /// First-year revenue
    pub yearly_revenue: Money,
    /// Annual revenue growth in percent, compounded once per completed year
    pub revenue_growth_percent: Percent,
    pub operating_costs_yearly: Money,
    pub maintenance_costs_yearly: Money,
    /// Revenue-only scaling factor (1 = expected case)
    #[serde(default = "default_multiplier")]
    pub multiplier: Decimal,
    /// Calendar date of the first projected month, used only for labelling
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
}

impl CalculationInput {
    /// Check the numeric domain constraints every engine relies on.
    pub fn validate(&self) -> BizCaseResult<()> {
        if self.project_duration_months < 1 {
            return Err(BizCaseError::invalid(
                "project_duration_months",
                "Project duration must be at least one month",
            ));
        }

        let non_negative = [
            ("initial_investment", self.initial_investment),
            ("yearly_revenue", self.yearly_revenue),
            ("operating_costs_yearly", self.operating_costs_yearly),
            ("maintenance_costs_yearly", self.maintenance_costs_yearly),
            ("multiplier", self.multiplier),
        ];
        for (field, value) in non_negative {
            if value < Decimal::ZERO {
                return Err(BizCaseError::invalid(field, "Must be non-negative"));
            }
        }

        // monthly rate = discount_rate / 1200 must stay above -100%
        if self.discount_rate <= dec!(-1200) {
            return Err(BizCaseError::invalid(
                "discount_rate",
                "Monthly discount rate must be greater than -100%",
            ));
        }

        Ok(())
    }

    /// Same case with a different revenue multiplier.
    pub fn with_multiplier(&self, multiplier: Decimal) -> Self {
        CalculationInput {
            multiplier,
            ..self.clone()
        }
    }
}

/// Float-typed mirror of [`CalculationInput`] for callers that hold IEEE doubles
/// (JavaScript front ends, spreadsheets). Converting rejects NaN and infinities.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FloatCalculationInput {
    pub initial_investment: f64,
    pub discount_rate: f64,
    pub project_duration_months: u32,
    pub yearly_revenue: f64,
    pub revenue_growth_percent: f64,
    pub operating_costs_yearly: f64,
    pub maintenance_costs_yearly: f64,
    #[serde(default = "default_float_multiplier")]
    pub multiplier: f64,
}

fn default_float_multiplier() -> f64 {
    1.0
}

fn finite_decimal(field: &str, value: f64) -> BizCaseResult<Decimal> {
    if !value.is_finite() {
        return Err(BizCaseError::invalid(field, "Must be a finite number"));
    }
    Decimal::from_f64(value)
        .ok_or_else(|| BizCaseError::invalid(field, "Value is outside the decimal range"))
}

impl TryFrom<FloatCalculationInput> for CalculationInput {
    type Error = BizCaseError;

    fn try_from(raw: FloatCalculationInput) -> BizCaseResult<Self> {
        let input = CalculationInput {
            initial_investment: finite_decimal("initial_investment", raw.initial_investment)?,
            discount_rate: finite_decimal("discount_rate", raw.discount_rate)?,
            project_duration_months: raw.project_duration_months,
            yearly_revenue: finite_decimal("yearly_revenue", raw.yearly_revenue)?,
            revenue_growth_percent: finite_decimal(
                "revenue_growth_percent",
                raw.revenue_growth_percent,
            )?,
            operating_costs_yearly: finite_decimal(
                "operating_costs_yearly",
                raw.operating_costs_yearly,
            )?,
            maintenance_costs_yearly: finite_decimal(
                "maintenance_costs_yearly",
                raw.maintenance_costs_yearly,
            )?,
            multiplier: finite_decimal("multiplier", raw.multiplier)?,
            start_date: None,
        };
        input.validate()?;
        Ok(input)
    }
}

/// Standard computation output envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationOutput<T: Serialize> {
    pub result: T,
    pub methodology: String,
    pub assumptions: serde_json::Value,
    pub warnings: Vec<String>,
    pub metadata: ComputationMetadata,
}

/// Metadata for every computation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationMetadata {
    pub version: String,
    pub computation_time_us: u64,
    pub precision: String,
}

/// Helper to wrap computation results with metadata
pub fn with_metadata<T: Serialize>(
    methodology: &str,
    assumptions: &impl Serialize,
    warnings: Vec<String>,
    elapsed_us: u64,
    result: T,
) -> ComputationOutput<T> {
    ComputationOutput {
        result,
        methodology: methodology.to_string(),
        assumptions: serde_json::to_value(assumptions).unwrap_or_default(),
        warnings,
        metadata: ComputationMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            computation_time_us: elapsed_us,
            precision: "rust_decimal_128bit".to_string(),
        },
    }
}
