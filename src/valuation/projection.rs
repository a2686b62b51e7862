//! Forward-looking scenarios.
//!
//! Two kinds live here:
//!
//! - `FutureProjector`: the "what it could be" projection. It derives an
//!   improved input record and applies a *reduced* version of the engine's
//!   formula (penalty on the base value only, fixed 80% growth realization).
//!   The result is an approximation: running `ValuationEngine::compute` on
//!   the same improved inputs will generally give a different number. The
//!   improved inputs are returned so callers can make that comparison.
//! - `WhatIf`: one-click input transformations the caller recomputes
//!   through the engine.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

use super::engine::{multiple_of, ValuationEngine};
use crate::types::{ValuationInputs, ValuationResult};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// How far the projection moves each qualitative input.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectionConfig {
    pub dependency_reduction: f64,
    /// Dependency never projected below this.
    pub dependency_floor: f64,
    pub governance_increase: f64,
    pub governance_cap: f64,
    pub growth_increase: f64,
    pub growth_cap: f64,
    /// Fixed share of nominal growth value assumed realized.
    pub growth_realization: f64,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            dependency_reduction: 30.0,
            dependency_floor: 20.0,
            governance_increase: 3.0,
            governance_cap: 10.0,
            growth_increase: 5.0,
            growth_cap: 25.0,
            growth_realization: 0.8,
        }
    }
}

// ---------------------------------------------------------------------------
// Future scenario
// ---------------------------------------------------------------------------

/// Projected valuation after the improvement plan.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FutureScenario {
    /// The input record the projection assumed.
    pub improved_inputs: ValuationInputs,
    /// Floored at 0 like the enterprise value; the unfloored projection can go negative.
    #[serde(rename = "futureEV")]
    pub future_ev: f64,
    pub future_multiple: f64,
    /// `future_ev - enterprise_value`.
    pub improvement: f64,
    /// Improvement relative to the current enterprise value, in percent.
    pub improvement_percent: f64,
}

pub struct FutureProjector {
    engine: ValuationEngine,
    config: ProjectionConfig,
}

impl FutureProjector {
    pub fn new(engine: ValuationEngine, config: ProjectionConfig) -> Self {
        Self { engine, config }
    }

    /// Access the projection configuration.
    pub fn config(&self) -> &ProjectionConfig {
        &self.config
    }

    /// Input record after the improvement plan.
    pub fn improved_inputs(&self, inputs: &ValuationInputs) -> ValuationInputs {
        let c = &self.config;
        ValuationInputs {
            owner_dependency: (inputs.owner_dependency - c.dependency_reduction)
                .max(c.dependency_floor),
            governance_score: (inputs.governance_score + c.governance_increase)
                .min(c.governance_cap),
            annual_growth: (inputs.annual_growth + c.growth_increase).min(c.growth_cap),
            ..*inputs
        }
    }

    /// Project the valuation under the improved inputs.
    pub fn project(&self, inputs: &ValuationInputs, result: &ValuationResult) -> FutureScenario {
        let improved = self.improved_inputs(inputs);
        let engine = &self.engine;
        let growth_factor = engine.config().growth_factor;

        let base_value = result.annual_ebitda * inputs.sector_multiple;

        // Reduced penalty: same curve, base value only
        let penalty = base_value * engine.penalty_factor(improved.owner_dependency);
        let governance_premium =
            base_value * engine.governance_premium_factor(improved.governance_score);
        let growth_premium = result.annual_ebitda
            * engine.growth_diff(improved.annual_growth)
            * growth_factor
            * self.config.growth_realization;

        let future_ev = (base_value + growth_premium - penalty + governance_premium).max(0.0);
        let future_multiple = multiple_of(future_ev, result.annual_ebitda);
        let improvement = future_ev - result.enterprise_value;
        let improvement_percent = if result.enterprise_value > 0.0 {
            improvement / result.enterprise_value * 100.0
        } else {
            0.0
        };

        debug!(
            future_ev,
            improvement,
            improvement_pct = format!("{:.1}%", improvement_percent),
            "Future scenario projected"
        );

        FutureScenario {
            improved_inputs: improved,
            future_ev,
            future_multiple,
            improvement,
            improvement_percent,
        }
    }
}

impl Default for FutureProjector {
    fn default() -> Self {
        Self::new(ValuationEngine::default(), ProjectionConfig::default())
    }
}

// ---------------------------------------------------------------------------
// What-if scenarios
// ---------------------------------------------------------------------------

/// Monthly EBITDA gained by the efficiency scenario.
pub const EFFICIENCY_MONTHLY_GAIN: f64 = 5_000.0;
/// Owner dependency assumed by the decentralization scenario.
pub const DECENTRALIZED_DEPENDENCY: f64 = 40.0;

/// One-click input transformations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WhatIf {
    /// Cut costs: monthly EBITDA up by a fixed amount.
    Efficiency,
    /// Delegate operations: owner dependency down to a fixed level.
    Decentralization,
}

impl WhatIf {
    pub const ALL: &'static [WhatIf] = &[WhatIf::Efficiency, WhatIf::Decentralization];

    pub fn apply(&self, inputs: &ValuationInputs) -> ValuationInputs {
        match self {
            WhatIf::Efficiency => ValuationInputs {
                monthly_ebitda: inputs.monthly_ebitda + EFFICIENCY_MONTHLY_GAIN,
                ..*inputs
            },
            WhatIf::Decentralization => ValuationInputs {
                owner_dependency: DECENTRALIZED_DEPENDENCY,
                ..*inputs
            },
        }
    }
}

impl fmt::Display for WhatIf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WhatIf::Efficiency => write!(f, "efficiency"),
            WhatIf::Decentralization => write!(f, "decentralization"),
        }
    }
}

impl std::str::FromStr for WhatIf {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "efficiency" => Ok(WhatIf::Efficiency),
            "decentralization" | "decentralisation" => Ok(WhatIf::Decentralization),
            _ => Err(anyhow::anyhow!("Unknown scenario: {s}")),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
