//! Closed-form valuation engine.
//!
//! Maps a `ValuationInputs` to a `ValuationResult` through a fixed chain of
//! adjustments: base value → dependency penalty → growth premium →
//! governance premium → enterprise/equity value → potential value and
//! multiples. Pure arithmetic: no I/O, no shared state, no failure modes.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::types::{AxiomaError, ValuationInputs, ValuationResult};

// ---------------------------------------------------------------------------
// Configuration (defaults, overridden by the [engine] table of config.toml)
// ---------------------------------------------------------------------------

/// Coefficients of the adjustment model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Owner dependency (%) at or below which no penalty applies.
    pub dependency_threshold: f64,
    /// Width of the dependency range the penalty ratio is normalized over.
    pub dependency_span: f64,
    /// Exponent of the penalty curve (> 1 makes the penalty accelerate).
    pub penalty_exponent: f64,
    /// Haircut rate reached at ratio 1.
    pub max_penalty_rate: f64,
    /// Growth (%) assumed already priced into the sector multiple.
    pub baseline_growth: f64,
    /// Premium per point of growth above the baseline, as a share of annual EBITDA.
    pub growth_factor: f64,
    /// Owner dependency (%) at which growth stops being worth anything.
    pub dependency_kill_point: f64,
    /// Growth realization left when governance is 0.
    pub governance_dampener_floor: f64,
    /// `floor + score / divisor` gives the governance dampener.
    pub governance_dampener_divisor: f64,
    /// Governance score above which a premium is earned.
    pub governance_neutral: f64,
    /// Points between neutral and a perfect score.
    pub governance_span: f64,
    /// Premium rate reached at a perfect governance score.
    pub max_governance_premium: f64,
    /// Governance score assumed by the potential-value benchmark.
    pub benchmark_governance: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            dependency_threshold: 20.0,
            dependency_span: 80.0,
            penalty_exponent: 1.5,
            max_penalty_rate: 0.50,     // Max 50% haircut
            baseline_growth: 5.0,
            growth_factor: 0.10,
            dependency_kill_point: 80.0,
            governance_dampener_floor: 0.5,
            governance_dampener_divisor: 20.0, // 0.5 at score 0, 1.0 at score 10
            governance_neutral: 5.0,
            governance_span: 5.0,
            max_governance_premium: 0.15, // Max 15% premium
            benchmark_governance: 9.0,
        }
    }
}

impl EngineConfig {
    /// Reject coefficients that would make `compute` divide by zero or go
    /// non-finite. Every value must be finite and every divisor positive.
    pub fn validate(&self) -> Result<(), AxiomaError> {
        let values = [
            ("dependency_threshold", self.dependency_threshold),
            ("dependency_span", self.dependency_span),
            ("penalty_exponent", self.penalty_exponent),
            ("max_penalty_rate", self.max_penalty_rate),
            ("baseline_growth", self.baseline_growth),
            ("growth_factor", self.growth_factor),
            ("dependency_kill_point", self.dependency_kill_point),
            ("governance_dampener_floor", self.governance_dampener_floor),
            ("governance_dampener_divisor", self.governance_dampener_divisor),
            ("governance_neutral", self.governance_neutral),
            ("governance_span", self.governance_span),
            ("max_governance_premium", self.max_governance_premium),
            ("benchmark_governance", self.benchmark_governance),
        ];
        if let Some((name, _)) = values.iter().find(|(_, v)| !v.is_finite()) {
            return Err(AxiomaError::Config(format!("engine.{name} is not a finite number")));
        }

        let divisors = [
            ("dependency_span", self.dependency_span),
            ("dependency_kill_point", self.dependency_kill_point),
            ("governance_dampener_divisor", self.governance_dampener_divisor),
            ("governance_span", self.governance_span),
        ];
        if let Some((name, v)) = divisors.iter().find(|(_, v)| *v <= 0.0) {
            return Err(AxiomaError::Config(format!("engine.{name} must be positive, got {v}")));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct ValuationEngine {
    config: EngineConfig,
}

impl ValuationEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Access the engine configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Dependency haircut rate for a given owner dependency.
    ///
    /// Zero in the safe zone; above the threshold the normalized ratio is
    /// raised to `penalty_exponent`. Dependencies above 100% push the ratio
    /// past 1 and extrapolate the curve.
    pub fn penalty_factor(&self, owner_dependency: f64) -> f64 {
        let c = &self.config;
        if owner_dependency <= c.dependency_threshold {
            return 0.0;
        }
        let ratio = (owner_dependency - c.dependency_threshold) / c.dependency_span;
        ratio.powf(c.penalty_exponent) * c.max_penalty_rate
    }

    /// Growth points above the baseline, never negative.
    pub fn growth_diff(&self, annual_growth: f64) -> f64 {
        (annual_growth - self.config.baseline_growth).max(0.0)
    }

    /// Share of nominal growth value that is actually realized.
    ///
    /// Product of the dependency dampener (0 at the kill point and beyond)
    /// and the governance dampener (floor at score 0, 1.0 at score 10).
    pub fn growth_realization(&self, owner_dependency: f64, governance_score: f64) -> f64 {
        let c = &self.config;
        let dependency_dampener = (1.0 - owner_dependency / c.dependency_kill_point).max(0.0);
        let governance_dampener =
            c.governance_dampener_floor + governance_score / c.governance_dampener_divisor;
        dependency_dampener * governance_dampener
    }

    /// Governance premium rate; exactly zero at or below the neutral score.
    pub fn governance_premium_factor(&self, governance_score: f64) -> f64 {
        let c = &self.config;
        if governance_score <= c.governance_neutral {
            return 0.0;
        }
        (governance_score - c.governance_neutral) / c.governance_span * c.max_governance_premium
    }

    /// Run the full adjustment chain.
    pub fn compute(&self, inputs: &ValuationInputs) -> ValuationResult {
        let c = &self.config;

        // 1. Base value
        let annual_ebitda = inputs.monthly_ebitda * 12.0;
        let base_value = annual_ebitda * inputs.sector_multiple;

        // 2. Dependency haircut rate (applied in step 5)
        let penalty_factor = self.penalty_factor(inputs.owner_dependency);

        // 3. Growth premium, dampened by dependency and governance
        let growth_diff = self.growth_diff(inputs.annual_growth);
        let raw_growth_factor = growth_diff * c.growth_factor;
        let realization = self.growth_realization(inputs.owner_dependency, inputs.governance_score);
        let growth_premium = annual_ebitda * raw_growth_factor * realization;

        // 4. Governance premium on the base value only
        let governance_premium = base_value * self.governance_premium_factor(inputs.governance_score);

        // 5. Penalty applies to the total pre-penalty potential
        let dependency_penalty = (base_value + growth_premium) * penalty_factor;

        // 6–7. Final values
        let enterprise_value =
            (base_value + growth_premium - dependency_penalty + governance_premium).max(0.0);
        let equity_value = enterprise_value - inputs.net_debt;

        // 8. Benchmark: governance at the benchmark score, full growth
        //    realization, no dependency penalty.
        let potential_governance_factor = self.governance_premium_factor(c.benchmark_governance);
        let potential_value = base_value
            + annual_ebitda * raw_growth_factor
            + base_value * potential_governance_factor;

        // 9. Value gap
        let value_gap = (potential_value - enterprise_value).max(0.0);

        // 10. Multiples
        let final_multiple = multiple_of(enterprise_value, annual_ebitda);
        let potential_multiple = multiple_of(potential_value, annual_ebitda);

        debug!(
            base_value,
            growth_premium,
            governance_premium,
            dependency_penalty,
            enterprise_value,
            final_multiple = format!("{:.2}x", final_multiple),
            "Valuation computed"
        );

        ValuationResult {
            annual_ebitda,
            base_value,
            dependency_penalty,
            growth_premium,
            governance_premium,
            enterprise_value,
            equity_value,
            final_multiple,
            potential_multiple,
            value_gap,
        }
    }
}

/// `value / annual_ebitda`, or 0 when there is no positive EBITDA to divide by.
pub fn multiple_of(value: f64, annual_ebitda: f64) -> f64 {
    if annual_ebitda > 0.0 {
        value / annual_ebitda
    } else {
        0.0
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
