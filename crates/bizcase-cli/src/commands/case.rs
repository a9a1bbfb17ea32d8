use chrono::NaiveDate;
use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use bizcase_core::projection::break_even;
use bizcase_core::scenarios::engine;
use bizcase_core::CalculationInput;

use crate::input;

/// Case economics given directly on the command line
#[derive(Args, Debug, Clone)]
pub struct CaseFlags {
    /// Path to JSON/YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Upfront investment
    #[arg(long)]
    pub initial_investment: Option<Decimal>,

    /// Annual discount rate in percent (10 = 10%)
    #[arg(long, allow_hyphen_values = true)]
    pub discount_rate: Option<Decimal>,

    /// Project duration in months
    #[arg(long)]
    pub duration_months: Option<u32>,

    /// First-year revenue
    #[arg(long)]
    pub yearly_revenue: Option<Decimal>,

    /// Annual revenue growth in percent
    #[arg(long, default_value = "0", allow_hyphen_values = true)]
    pub revenue_growth: Decimal,

    /// Yearly operating costs
    #[arg(long, default_value = "0")]
    pub operating_costs: Decimal,

    /// Yearly maintenance costs
    #[arg(long, default_value = "0")]
    pub maintenance_costs: Decimal,

    /// Revenue multiplier (1 = expected case)
    #[arg(long, default_value = "1")]
    pub multiplier: Decimal,

    /// First projected month as YYYY-MM-DD
    #[arg(long)]
    pub start_date: Option<NaiveDate>,
}

impl CaseFlags {
    /// Resolve the case from `--input`, stdin, or the individual flags.
    pub fn resolve(&self) -> Result<CalculationInput, Box<dyn std::error::Error>> {
        if let Some(case) = input::load::<CalculationInput>(self.input.as_deref())? {
            return Ok(case);
        }

        let initial_investment = self
            .initial_investment
            .ok_or("--initial-investment is required (or provide --input)")?;
        let discount_rate = self
            .discount_rate
            .ok_or("--discount-rate is required (or provide --input)")?;
        let project_duration_months = self
            .duration_months
            .ok_or("--duration-months is required (or provide --input)")?;
        let yearly_revenue = self
            .yearly_revenue
            .ok_or("--yearly-revenue is required (or provide --input)")?;

        Ok(CalculationInput {
            initial_investment,
            discount_rate,
            project_duration_months,
            yearly_revenue,
            revenue_growth_percent: self.revenue_growth,
            operating_costs_yearly: self.operating_costs,
            maintenance_costs_yearly: self.maintenance_costs,
            multiplier: self.multiplier,
            start_date: self.start_date,
        })
    }
}

/// Arguments for a single case calculation
#[derive(Args)]
pub struct CalculateArgs {
    #[command(flatten)]
    pub case: CaseFlags,

    /// Emit only the month-by-month schedule (for CSV export)
    #[arg(long)]
    pub schedule: bool,
}

pub fn run_calculate(args: CalculateArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let case = args.case.resolve()?;
    let result = engine::calculate_case(&case)?;
    if args.schedule {
        return Ok(serde_json::to_value(&result.result.schedule)?);
    }
    Ok(serde_json::to_value(result)?)
}

/// Arguments for break-even analysis
#[derive(Args)]
pub struct BreakEvenArgs {
    #[command(flatten)]
    pub case: CaseFlags,
}

pub fn run_break_even(args: BreakEvenArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let case = args.case.resolve()?;
    let result = break_even::analyze_break_even(&case)?;
    Ok(serde_json::to_value(result)?)
}
