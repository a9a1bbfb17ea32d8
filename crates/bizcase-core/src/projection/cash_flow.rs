use chrono::{Months, NaiveDate};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::BizCaseError;
use crate::types::{CalculationInput, Money, MONTHS_PER_YEAR};
use crate::BizCaseResult;

/// One projected month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyCashFlow {
    /// 1-indexed month number
    pub month: u32,
    /// Completed years before this month (drives revenue growth)
    pub year_index: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    pub revenue: Money,
    pub costs: Money,
    pub net_cash_flow: Money,
    pub cumulative_cash_flow: Money,
}

/// Month-by-month projection of a case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CashFlowProjection {
    pub monthly_cash_flow: Vec<Money>,
    /// Running total starting from `-initial_investment`
    pub cumulative_cash_flow: Vec<Money>,
    pub schedule: Vec<MonthlyCashFlow>,
    pub total_revenue: Money,
    pub total_costs: Money,
}

impl CashFlowProjection {
    pub fn total_net_cash_flow(&self) -> BizCaseResult<Money> {
        checked_total(&self.monthly_cash_flow, "total net cash flow")
    }
}

/// Sum a series, reporting overflow instead of panicking.
pub(crate) fn checked_total(values: &[Money], context: &str) -> BizCaseResult<Money> {
    values.iter().try_fold(Decimal::ZERO, |acc, v| {
        acc.checked_add(*v)
            .ok_or_else(|| BizCaseError::overflow(context))
    })
}

/// Revenue and cost for each month, before any accumulation.
///
/// Growth compounds once per completed year, so all months of a year share
/// the same factor; the final partial year still uses `floor(m / 12)`.
pub(crate) fn monthly_lines(input: &CalculationInput) -> BizCaseResult<Vec<(Money, Money)>> {
    let months = Decimal::from(MONTHS_PER_YEAR);
    let growth_step = Decimal::ONE + input.revenue_growth_percent / dec!(100);
    let base_revenue = input
        .yearly_revenue
        .checked_mul(input.multiplier)
        .ok_or_else(|| BizCaseError::overflow("revenue multiplier"))?;
    let monthly_costs = input
        .operating_costs_yearly
        .checked_add(input.maintenance_costs_yearly)
        .ok_or_else(|| BizCaseError::overflow("yearly costs"))?
        / months;

    let mut lines = Vec::with_capacity(input.project_duration_months as usize);
    let mut growth_factor = Decimal::ONE;
    let mut current_year = 0;

    for m in 0..input.project_duration_months {
        let year = m / MONTHS_PER_YEAR;
        while current_year < year {
            growth_factor = growth_factor
                .checked_mul(growth_step)
                .ok_or_else(|| BizCaseError::overflow(format!("revenue growth in year {year}")))?;
            current_year += 1;
        }

        let revenue = base_revenue
            .checked_mul(growth_factor)
            .ok_or_else(|| BizCaseError::overflow(format!("revenue in month {}", m + 1)))?
            / months;
        lines.push((revenue, monthly_costs));
    }

    Ok(lines)
}

/// Project monthly net cash flow and its cumulative total.
pub fn project_cash_flows(input: &CalculationInput) -> BizCaseResult<CashFlowProjection> {
    input.validate()?;

    let lines = monthly_lines(input)?;
    let n = lines.len();

    let mut monthly_cash_flow = Vec::with_capacity(n);
    let mut cumulative_cash_flow = Vec::with_capacity(n);
    let mut schedule = Vec::with_capacity(n);
    let mut cumulative = -input.initial_investment;
    let mut total_revenue = Decimal::ZERO;
    let mut total_costs = Decimal::ZERO;

    for (m, (revenue, costs)) in lines.into_iter().enumerate() {
        let month = m as u32;
        let net = revenue
            .checked_sub(costs)
            .ok_or_else(|| BizCaseError::overflow(format!("net cash flow in month {}", month + 1)))?;
        cumulative = cumulative
            .checked_add(net)
            .ok_or_else(|| BizCaseError::overflow("cumulative cash flow"))?;
        total_revenue = total_revenue
            .checked_add(revenue)
            .ok_or_else(|| BizCaseError::overflow("total revenue"))?;
        total_costs = total_costs
            .checked_add(costs)
            .ok_or_else(|| BizCaseError::overflow("total costs"))?;

        let date = match input.start_date {
            Some(start) => Some(start.checked_add_months(Months::new(month)).ok_or_else(|| {
                BizCaseError::invalid("start_date", "Projection runs past the supported calendar")
            })?),
            None => None,
        };

        monthly_cash_flow.push(net);
        cumulative_cash_flow.push(cumulative);
        schedule.push(MonthlyCashFlow {
            month: month + 1,
            year_index: month / MONTHS_PER_YEAR,
            date,
            revenue,
            costs,
            net_cash_flow: net,
            cumulative_cash_flow: cumulative,
        });
    }

    Ok(CashFlowProjection {
        monthly_cash_flow,
        cumulative_cash_flow,
        schedule,
        total_revenue,
        total_costs,
    })
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

    #[test]
    fn test_flat_case_monthly_and_cumulative() {
        let p = project_cash_flows(&base_input()).unwrap();
        assert_eq!(p.monthly_cash_flow.len(), 24);
        assert!(p.monthly_cash_flow.iter().all(|cf| *cf == dec!(5000)));
        assert_eq!(p.cumulative_cash_flow[0], dec!(-95000));
        assert_eq!(p.cumulative_cash_flow[23], dec!(20000));
        assert_eq!(p.total_revenue, dec!(240000));
        assert_eq!(p.total_costs, dec!(120000));
        assert_eq!(p.total_net_cash_flow().unwrap(), dec!(120000));
    }

    #[test]
    fn test_growth_steps_once_per_year() {
        let input = CalculationInput {
            revenue_growth_percent: dec!(10),
            project_duration_months: 30,
            ..base_input()
        };
        let p = project_cash_flows(&input).unwrap();
        // year 0: 10000/month, year 1: 11000, partial year 2: 12100
        assert_eq!(p.schedule[0].revenue, dec!(10000));
        assert_eq!(p.schedule[11].revenue, dec!(10000));
        assert_eq!(p.schedule[12].revenue, dec!(11000));
        assert_eq!(p.schedule[23].revenue, dec!(11000));
        assert_eq!(p.schedule[24].revenue, dec!(12100));
        assert_eq!(p.schedule[29].revenue, dec!(12100));
        assert_eq!(p.schedule[29].year_index, 2);
    }

    #[test]
    fn test_multiplier_scales_revenue_only() {
        let input = base_input().with_multiplier(dec!(0.5));
        let p = project_cash_flows(&input).unwrap();
        assert_eq!(p.schedule[0].revenue, dec!(5000));
        assert_eq!(p.schedule[0].costs, dec!(5000));
        assert_eq!(p.monthly_cash_flow[0], Decimal::ZERO);
    }

    #[test]
    fn test_dates_follow_start_date() {
        let input = CalculationInput {
            start_date: NaiveDate::from_ymd_opt(2024, 1, 31),
            project_duration_months: 3,
            ..base_input()
        };
        let p = project_cash_flows(&input).unwrap();
        assert_eq!(p.schedule[0].date, NaiveDate::from_ymd_opt(2024, 1, 31));
        // month-end clamps to the shorter month
        assert_eq!(p.schedule[1].date, NaiveDate::from_ymd_opt(2024, 2, 29));
        assert_eq!(p.schedule[2].date, NaiveDate::from_ymd_opt(2024, 3, 31));
    }

    #[test]
    fn test_zero_investment_allowed() {
        let input = CalculationInput {
            initial_investment: Decimal::ZERO,
            ..base_input()
        };
        let p = project_cash_flows(&input).unwrap();
        assert_eq!(p.cumulative_cash_flow[0], dec!(5000));
    }

    #[test]
    fn test_invalid_duration_rejected() {
        let input = CalculationInput {
            project_duration_months: 0,
            ..base_input()
        };
        assert!(project_cash_flows(&input).is_err());
    }

    #[test]
    fn test_minus_hundred_growth_zeroes_later_revenue() {
        let input = CalculationInput {
            revenue_growth_percent: dec!(-100),
            project_duration_months: 30,
            ..base_input()
        };
        let p = project_cash_flows(&input).unwrap();
        assert_eq!(p.schedule[11].revenue, dec!(10000));
        assert!(p.schedule[12..].iter().all(|m| m.revenue.is_zero()));
        assert_eq!(p.monthly_cash_flow[12], dec!(-5000));
        assert_eq!(p.total_revenue, dec!(120000));
    }

    #[test]
    fn test_huge_totals_overflow_into_error() {
        let input = CalculationInput {
            yearly_revenue: dec!(70000000000000000000000000000),
            operating_costs_yearly: dec!(70000000000000000000000000000),
            ..base_input()
        };
        let err = project_cash_flows(&input).unwrap_err();
        assert!(matches!(err, BizCaseError::FinancialImpossibility(_)));

        let input = CalculationInput {
            maintenance_costs_yearly: dec!(70000000000000000000000000000),
            ..input
        };
        let err = project_cash_flows(&input).unwrap_err();
        assert!(matches!(err, BizCaseError::FinancialImpossibility(_)));
    }
}
