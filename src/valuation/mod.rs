//! Valuation engine: base value, adjustments, projections and advice.

pub mod cache;
pub mod engine;
pub mod projection;
pub mod recommend;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::types::{ValuationInputs, ValuationResult};
use cache::{CacheStats, ValuationCache};
use engine::ValuationEngine;
use projection::{FutureProjector, FutureScenario, ProjectionConfig};
use recommend::{Issue, Recommendation};

/// Compute a valuation with the default coefficients.
pub fn compute(inputs: &ValuationInputs) -> ValuationResult {
    ValuationEngine::default().compute(inputs)
}

// ---------------------------------------------------------------------------
// Analysis record
// ---------------------------------------------------------------------------

/// Everything derived from one input record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValuationAnalysis {
    pub inputs: ValuationInputs,
    pub result: ValuationResult,
    pub future: FutureScenario,
    pub recommendations: Vec<Recommendation>,
    pub diagnosis: Vec<Issue>,
}

// ---------------------------------------------------------------------------
// Orchestrator
// ---------------------------------------------------------------------------

/// Pipelines engine (memoized) → future projection → recommendations →
/// diagnosis.
pub struct Valuator {
    cache: ValuationCache,
    projector: FutureProjector,
}

impl Valuator {
    pub fn new(engine: ValuationEngine) -> Self {
        Self {
            projector: FutureProjector::new(engine.clone(), ProjectionConfig::default()),
            cache: ValuationCache::new(engine),
        }
    }

    /// The engine this valuator computes with.
    pub fn engine(&self) -> &ValuationEngine {
        self.cache.engine()
    }

    /// Engine result only (memoized).
    pub fn compute(&mut self, inputs: &ValuationInputs) -> ValuationResult {
        self.cache.get_or_compute(inputs)
    }

    /// Run the full pipeline for one input record.
    pub fn analyze(&mut self, inputs: &ValuationInputs) -> ValuationAnalysis {
        let result = self.compute(inputs);
        let future = self.projector.project(inputs, &result);
        let recommendations = recommend::rank_recommendations(inputs, &result);
        let diagnosis = recommend::diagnose(inputs, &result);

        info!(
            enterprise_value = format!("{:.2}", result.enterprise_value),
            final_multiple = format!("{:.2}x", result.final_multiple),
            value_gap = format!("{:.2}", result.value_gap),
            future_ev = format!("{:.2}", future.future_ev),
            recommendations = recommendations.len(),
            issues = diagnosis.len(),
            "Valuation analysis complete"
        );

        ValuationAnalysis {
            inputs: *inputs,
            result,
            future,
            recommendations,
            diagnosis,
        }
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }
}

impl Default for Valuator {
    fn default() -> Self {
        Self::new(ValuationEngine::default())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
