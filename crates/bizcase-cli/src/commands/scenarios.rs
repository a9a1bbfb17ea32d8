use clap::{Args, ValueEnum};
use rust_decimal::Decimal;
use serde_json::Value;

use bizcase_core::scenarios::scenario::{
    self, CaseMultipliers, CaseProbabilities, ComparisonInput, ScenarioAdjustment,
    ScenarioSetInput,
};
use bizcase_core::scenarios::sensitivity::{
    self, SensitivityInput, TornadoInput, TornadoMetric, DEFAULT_VARIATIONS,
};

use super::case::CaseFlags;

/// Arguments for expected/best/worst analysis
#[derive(Args)]
pub struct ScenariosArgs {
    #[command(flatten)]
    pub case: CaseFlags,

    /// Revenue multiplier for the best case
    #[arg(long, default_value = "1.2")]
    pub best_multiplier: Decimal,

    /// Revenue multiplier for the worst case
    #[arg(long, default_value = "0.8")]
    pub worst_multiplier: Decimal,

    /// Case probabilities as expected,best,worst (e.g. "0.5,0.25,0.25")
    #[arg(long, value_delimiter = ',')]
    pub probabilities: Option<Vec<Decimal>>,
}

pub fn run_scenarios(args: ScenariosArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let base = args.case.resolve()?;

    let probabilities = match args.probabilities.as_deref() {
        None => None,
        Some([expected, best, worst]) => Some(CaseProbabilities {
            expected: *expected,
            best: *best,
            worst: *worst,
        }),
        Some(other) => {
            return Err(format!(
                "--probabilities needs exactly 3 values (expected,best,worst), got {}",
                other.len()
            )
            .into())
        }
    };

    let input = ScenarioSetInput {
        multipliers: CaseMultipliers {
            expected: base.multiplier,
            best: args.best_multiplier,
            worst: args.worst_multiplier,
        },
        base,
        probabilities,
    };
    let result = scenario::run_scenarios(&input)?;
    Ok(serde_json::to_value(result)?)
}

/// Arguments for a two-sided what-if comparison
#[derive(Args)]
pub struct CompareArgs {
    #[command(flatten)]
    pub case: CaseFlags,

    /// Revenue change in percent for the left side
    #[arg(long, default_value = "0", allow_hyphen_values = true)]
    pub left_sales: Decimal,

    /// Cost change in percent for the left side
    #[arg(long, default_value = "0", allow_hyphen_values = true)]
    pub left_costs: Decimal,

    /// Discount-rate change in percentage points for the left side
    #[arg(long, default_value = "0", allow_hyphen_values = true)]
    pub left_discount: Decimal,

    /// Revenue change in percent for the right side
    #[arg(long, default_value = "0", allow_hyphen_values = true)]
    pub right_sales: Decimal,

    /// Cost change in percent for the right side
    #[arg(long, default_value = "0", allow_hyphen_values = true)]
    pub right_costs: Decimal,

    /// Discount-rate change in percentage points for the right side
    #[arg(long, default_value = "0", allow_hyphen_values = true)]
    pub right_discount: Decimal,
}

pub fn run_compare(args: CompareArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let input = ComparisonInput {
        base: args.case.resolve()?,
        left: ScenarioAdjustment {
            sales_adjustment_percent: args.left_sales,
            costs_adjustment_percent: args.left_costs,
            discount_adjustment_absolute: args.left_discount,
        },
        right: ScenarioAdjustment {
            sales_adjustment_percent: args.right_sales,
            costs_adjustment_percent: args.right_costs,
            discount_adjustment_absolute: args.right_discount,
        },
    };
    let result = scenario::compare_scenarios(&input)?;
    Ok(serde_json::to_value(result)?)
}

/// Arguments for one-way sensitivity analysis
#[derive(Args)]
pub struct SensitivityArgs {
    #[command(flatten)]
    pub case: CaseFlags,

    /// Percent variations applied to each variable (e.g. "-30,-20,-10,0,10,20,30")
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
    pub variations: Option<Vec<i32>>,
}

pub fn run_sensitivity(args: SensitivityArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let input = SensitivityInput {
        base: args.case.resolve()?,
        variations: args
            .variations
            .unwrap_or_else(|| DEFAULT_VARIATIONS.to_vec()),
    };
    let result = sensitivity::analyze_sensitivity(&input)?;
    Ok(serde_json::to_value(result)?)
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum MetricArg {
    Npv,
    Roi,
}

impl From<MetricArg> for TornadoMetric {
    fn from(m: MetricArg) -> Self {
        match m {
            MetricArg::Npv => TornadoMetric::Npv,
            MetricArg::Roi => TornadoMetric::Roi,
        }
    }
}

/// Arguments for tornado analysis
#[derive(Args)]
pub struct TornadoArgs {
    #[command(flatten)]
    pub case: CaseFlags,

    /// Metric to rank variables by
    #[arg(long, value_enum, default_value = "npv")]
    pub metric: MetricArg,
}

pub fn run_tornado(args: TornadoArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let input = TornadoInput {
        base: args.case.resolve()?,
        metric: args.metric.into(),
    };
    let result = sensitivity::tornado_analysis(&input)?;
    Ok(serde_json::to_value(result)?)
}
