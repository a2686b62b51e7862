//! Property tests for the valuation engine.
//!
//! Inputs are drawn from the operating range the coefficients were tuned
//! for: multiples 3–12x, growth up to 25%, dependency and governance over
//! their full scales, and net debt of either sign.

use proptest::prelude::*;

use axioma::types::ValuationInputs;
use axioma::valuation::compute;

fn any_inputs() -> impl Strategy<Value = ValuationInputs> {
    (
        -50_000.0..500_000.0f64,
        3.0..12.0f64,
        -20.0..25.0f64,
        0.0..=100.0f64,
        0.0..=10.0f64,
        -5e6..5e6f64,
    )
        .prop_map(
            |(monthly_ebitda, sector_multiple, annual_growth, owner_dependency, governance_score, net_debt)| {
                ValuationInputs {
                    monthly_ebitda,
                    sector_multiple,
                    annual_growth,
                    owner_dependency,
                    governance_score,
                    net_debt,
                }
            },
        )
}

fn profitable_inputs() -> impl Strategy<Value = ValuationInputs> {
    any_inputs().prop_map(|i| ValuationInputs {
        monthly_ebitda: i.monthly_ebitda.abs(),
        ..i
    })
}

fn baseline(monthly_ebitda: f64) -> ValuationInputs {
    ValuationInputs {
        monthly_ebitda,
        sector_multiple: 4.0,
        annual_growth: 10.0,
        owner_dependency: 0.0,
        governance_score: 5.0,
        net_debt: 0.0,
    }
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        .. ProptestConfig::default()
    })]

    /// PROPERTY: enterprise value and value gap are never negative.
    #[test]
    fn property_clamped_outputs(inputs in any_inputs()) {
        let r = compute(&inputs);
        prop_assert!(r.enterprise_value >= 0.0);
        prop_assert!(r.value_gap >= 0.0);
    }

    /// PROPERTY: annual EBITDA is exactly twelve months, base value exactly times the multiple.
    #[test]
    fn property_base_value_exact(inputs in any_inputs()) {
        let r = compute(&inputs);
        prop_assert_eq!(r.annual_ebitda, inputs.monthly_ebitda * 12.0);
        prop_assert_eq!(r.base_value, r.annual_ebitda * inputs.sector_multiple);
    }

    /// PROPERTY: equity is enterprise value minus net debt, net cash included.
    #[test]
    fn property_equity_subtracts_debt(inputs in any_inputs()) {
        let r = compute(&inputs);
        prop_assert_eq!(r.equity_value, r.enterprise_value - inputs.net_debt);
    }

    /// PROPERTY: the final multiple divides by positive EBITDA and is 0 otherwise.
    #[test]
    fn property_final_multiple(inputs in any_inputs()) {
        let r = compute(&inputs);
        if r.annual_ebitda > 0.0 {
            prop_assert_eq!(r.final_multiple, r.enterprise_value / r.annual_ebitda);
        } else {
            prop_assert_eq!(r.final_multiple, 0.0);
            prop_assert_eq!(r.potential_multiple, 0.0);
        }
    }

    /// PROPERTY: the dependency penalty never shrinks as dependency rises above 20%.
    #[test]
    fn property_penalty_monotone(
        inputs in profitable_inputs(),
        low in 20.0..100.0f64,
        step in 0.0..30.0f64,
    ) {
        let a = compute(&ValuationInputs { owner_dependency: low, ..inputs });
        let b = compute(&ValuationInputs { owner_dependency: low + step, ..inputs });
        let slack = 1e-9 * a.dependency_penalty.abs().max(1.0);
        prop_assert!(b.dependency_penalty >= a.dependency_penalty - slack);
    }

    /// PROPERTY: the governance premium never shrinks as the score rises above 5.
    #[test]
    fn property_governance_monotone(
        inputs in profitable_inputs(),
        low in 5.0..10.0f64,
        step in 0.0..5.0f64,
    ) {
        let a = compute(&ValuationInputs { governance_score: low, ..inputs });
        let b = compute(&ValuationInputs { governance_score: low + step, ..inputs });
        prop_assert!(b.governance_premium >= a.governance_premium);
    }

    /// PROPERTY: at 80% owner dependency growth is worth nothing.
    #[test]
    fn property_growth_killed_at_80(inputs in any_inputs()) {
        let r = compute(&ValuationInputs { owner_dependency: 80.0, ..inputs });
        prop_assert_eq!(r.growth_premium, 0.0);
    }

    /// PROPERTY: with no adjustment triggered the enterprise value is the base value.
    #[test]
    fn property_no_adjustment_boundary(
        inputs in profitable_inputs(),
        governance in 0.0..=5.0f64,
        dependency in 0.0..=20.0f64,
        growth in -20.0..=5.0f64,
    ) {
        let r = compute(&ValuationInputs {
            governance_score: governance,
            owner_dependency: dependency,
            annual_growth: growth,
            ..inputs
        });
        prop_assert_eq!(r.enterprise_value, r.base_value);
        prop_assert_eq!(r.dependency_penalty, 0.0);
        prop_assert_eq!(r.governance_premium, 0.0);
    }
}

// ---------------------------------------------------------------------------
// Concrete scenarios
// ---------------------------------------------------------------------------

#[test]
fn test_scenario_base_value() {
    let r = compute(&baseline(10_000.0));
    assert_eq!(r.annual_ebitda, 120_000.0);
    assert_eq!(r.base_value, 480_000.0);
}

#[test]
fn test_scenario_dependency_below_threshold() {
    let r = compute(&ValuationInputs {
        owner_dependency: 10.0,
        ..baseline(10_000.0)
    });
    assert_eq!(r.dependency_penalty, 0.0);
}

#[test]
fn test_scenario_high_dependency_penalty() {
    let r = compute(&ValuationInputs {
        owner_dependency: 90.0,
        annual_growth: 5.0,
        ..baseline(10_000.0)
    });
    assert!(r.dependency_penalty > 100_000.0);
}

#[test]
fn test_scenario_top_governance_premium() {
    let r = compute(&ValuationInputs {
        governance_score: 10.0,
        ..baseline(10_000.0)
    });
    assert!(r.governance_premium > 50_000.0);
}

#[test]
fn test_scenario_dependency_dampens_growth() {
    let run = |owner_dependency| {
        compute(&ValuationInputs {
            owner_dependency,
            annual_growth: 20.0,
            governance_score: 8.0,
            ..baseline(10_000.0)
        })
    };
    assert!(run(10.0).growth_premium > run(80.0).growth_premium);
}

#[test]
fn test_zero_and_negative_ebitda() {
    let zero = compute(&baseline(0.0));
    assert_eq!(zero.annual_ebitda, 0.0);
    assert_eq!(zero.final_multiple, 0.0);
    assert_eq!(zero.enterprise_value, 0.0);

    let loss = compute(&baseline(-1_000.0));
    assert_eq!(loss.annual_ebitda, -12_000.0);
    assert_eq!(loss.enterprise_value, 0.0);
    assert_eq!(loss.final_multiple, 0.0);
}
