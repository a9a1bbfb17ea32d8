use bizcase_core::scenarios::engine;
use bizcase_core::scenarios::scenario::{self, CaseKind, CaseMultipliers, ScenarioAdjustment};
use bizcase_core::scenarios::sensitivity::{self, SensitivityVariable, TornadoMetric};
use bizcase_core::types::{CalculationInput, FloatCalculationInput};
use bizcase_core::BizCaseError;
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn expected_case() -> CalculationInput {
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

// ===========================================================================
// Scenario engine
// ===========================================================================

#[test]
fn test_expected_case_headline_metrics() {
    let out = engine::calculate_case(&expected_case()).unwrap();
    let r = &out.result;
    assert_eq!(r.roi, dec!(20));
    assert_eq!(r.payback_period_months, dec!(20));
    assert_eq!(r.cumulative_cash_flow[23], dec!(20000));
    assert!(r.npv > Decimal::ZERO);
    assert!(r.irr > dec!(10), "IRR should beat the 10% hurdle, got {}", r.irr);
}

#[test]
fn test_zero_investment_roi_is_an_error_not_nan() {
    let input = CalculationInput {
        initial_investment: Decimal::ZERO,
        ..expected_case()
    };
    let err = engine::evaluate(&input).unwrap_err();
    assert!(matches!(err, BizCaseError::DivisionByZero { .. }));
}

#[test]
fn test_float_amounts_near_decimal_limit_error_instead_of_panicking() {
    let raw = FloatCalculationInput {
        initial_investment: 100000.0,
        discount_rate: 10.0,
        project_duration_months: 24,
        yearly_revenue: 7e28,
        revenue_growth_percent: 0.0,
        operating_costs_yearly: 7e28,
        maintenance_costs_yearly: 7e28,
        multiplier: 1.0,
    };
    let input = CalculationInput::try_from(raw).unwrap();
    let err = engine::evaluate(&input).unwrap_err();
    assert!(matches!(err, BizCaseError::FinancialImpossibility(_)));

    let no_maintenance = CalculationInput {
        maintenance_costs_yearly: Decimal::ZERO,
        ..input
    };
    let err = engine::evaluate(&no_maintenance).unwrap_err();
    assert!(matches!(err, BizCaseError::FinancialImpossibility(_)));
}

#[test]
fn test_minus_hundred_growth_is_a_valid_case() {
    let input = CalculationInput {
        revenue_growth_percent: dec!(-100),
        ..expected_case()
    };
    let r = engine::evaluate(&input).unwrap();
    assert_eq!(r.total_revenue, dec!(120000));
    assert!(r.schedule[12..].iter().all(|m| m.revenue.is_zero()));
    // revenue 120000 against costs 120000 leaves the investment unrecovered
    assert_eq!(r.roi, dec!(-100));
    assert!(!r.payback_achieved);
}

#[test]
fn test_float_input_pipeline() {
    let raw = FloatCalculationInput {
        initial_investment: 100000.0,
        discount_rate: 10.0,
        project_duration_months: 24,
        yearly_revenue: 120000.0,
        revenue_growth_percent: 0.0,
        operating_costs_yearly: 60000.0,
        maintenance_costs_yearly: 0.0,
        multiplier: 1.0,
    };
    let input = CalculationInput::try_from(raw).unwrap();
    let r = engine::evaluate(&input).unwrap();
    assert_eq!(r.payback_period_months, dec!(20));
}

#[test]
fn test_default_multipliers() {
    let m = CaseMultipliers::default();
    assert_eq!(m.for_case(CaseKind::Expected), dec!(1));
    assert_eq!(m.for_case(CaseKind::Best), dec!(1.2));
    assert_eq!(m.for_case(CaseKind::Worst), dec!(0.8));
}

#[test]
fn test_adjusted_run_matches_manual_input() {
    let adj = ScenarioAdjustment {
        sales_adjustment_percent: dec!(-10),
        costs_adjustment_percent: dec!(5),
        discount_adjustment_absolute: dec!(-2),
    };
    let via_adjustment = scenario::run_adjusted(&expected_case(), &adj).unwrap();
    let manual = engine::evaluate(&CalculationInput {
        yearly_revenue: dec!(108000),
        operating_costs_yearly: dec!(63000),
        discount_rate: dec!(8),
        ..expected_case()
    })
    .unwrap();
    // 108000/12 - 63000/12 = 3750
    assert_eq!(via_adjustment.monthly_cash_flow, vec![dec!(3750); 24]);
    assert_eq!(via_adjustment.monthly_cash_flow, manual.monthly_cash_flow);
    assert_eq!(via_adjustment.roi, manual.roi);
    assert!((via_adjustment.npv - manual.npv).abs() < dec!(0.000001));
    assert!((via_adjustment.irr - manual.irr).abs() < dec!(0.000001));
}

#[test]
fn test_cases_can_be_evaluated_concurrently() {
    let base = expected_case();
    let multipliers = [dec!(1.0), dec!(1.2), dec!(0.8)];

    let sequential: Vec<_> = multipliers
        .iter()
        .map(|m| engine::evaluate(&base.with_multiplier(*m)).unwrap())
        .collect();

    let parallel: Vec<_> = std::thread::scope(|s| {
        let handles: Vec<_> = multipliers
            .iter()
            .map(|m| {
                let input = base.with_multiplier(*m);
                s.spawn(move || engine::evaluate(&input).unwrap())
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert_eq!(sequential, parallel);
}

// ===========================================================================
// Tornado
// ===========================================================================

fn growth_case() -> CalculationInput {
    CalculationInput {
        revenue_growth_percent: dec!(15),
        project_duration_months: 36,
        maintenance_costs_yearly: dec!(12000),
        ..expected_case()
    }
}

#[test]
fn test_tornado_ordering_contract() {
    let input = sensitivity::TornadoInput {
        base: growth_case(),
        metric: TornadoMetric::Npv,
    };
    let out = sensitivity::tornado_analysis(&input).unwrap().result;
    for pair in out.entries.windows(2) {
        assert!(pair[0].range >= pair[1].range);
    }
    for e in &out.entries {
        assert_eq!(e.range, e.negative_impact.abs() + e.positive_impact.abs());
    }
}

#[test]
fn test_npv_tornado_symmetry_is_measured_with_growth() {
    // NPV is linear in each perturbed input, so compounding growth does not
    // bend the swings: each entry's low and high impacts mirror each other.
    let input = sensitivity::TornadoInput {
        base: growth_case(),
        metric: TornadoMetric::Npv,
    };
    let out = sensitivity::tornado_analysis(&input).unwrap().result;
    for e in &out.entries {
        assert!(
            (e.negative_impact + e.positive_impact).abs() < dec!(0.0001),
            "{:?} swings: {} / {}",
            e.variable,
            e.negative_impact,
            e.positive_impact
        );
    }
}

#[test]
fn test_roi_tornado_investment_swing_is_asymmetric() {
    let input = sensitivity::TornadoInput {
        base: growth_case(),
        metric: TornadoMetric::Roi,
    };
    let out = sensitivity::tornado_analysis(&input).unwrap().result;
    let inv = out
        .entries
        .iter()
        .find(|e| e.variable == SensitivityVariable::Investment)
        .unwrap();
    // ROI divides by investment: a 30% cut lifts ROI more than a 30% rise lowers it
    assert!(inv.negative_impact > Decimal::ZERO);
    assert!(inv.positive_impact < Decimal::ZERO);
    assert!(inv.negative_impact.abs() - inv.positive_impact.abs() > dec!(1));
}
