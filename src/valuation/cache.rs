//! Memoization of engine results.
//!
//! The engine is a pure function of its six inputs, so a result can be
//! reused whenever an identical input record comes back (the UI recomputes
//! on every keystroke). Records are keyed by the bit patterns of their
//! fields.

use serde::Serialize;
use std::collections::HashMap;
use tracing::debug;

use super::engine::ValuationEngine;
use crate::types::{ValuationInputs, ValuationResult};

/// Default number of distinct input records kept before the cache is reset.
pub const DEFAULT_CAPACITY: usize = 1024;

/// Structural key of an input record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct InputKey([u64; 6]);

impl InputKey {
    fn of(inputs: &ValuationInputs) -> Self {
        Self([
            bits(inputs.monthly_ebitda),
            bits(inputs.sector_multiple),
            bits(inputs.annual_growth),
            bits(inputs.owner_dependency),
            bits(inputs.governance_score),
            bits(inputs.net_debt),
        ])
    }
}

/// `-0.0` and `0.0` compare equal, so they must share a key.
fn bits(v: f64) -> u64 {
    if v == 0.0 {
        0.0_f64.to_bits()
    } else {
        v.to_bits()
    }
}

/// Hit/miss counters for monitoring.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
}

/// Bounded memo table in front of a `ValuationEngine`.
pub struct ValuationCache {
    engine: ValuationEngine,
    entries: HashMap<InputKey, ValuationResult>,
    capacity: usize,
    hits: u64,
    misses: u64,
}

impl ValuationCache {
    pub fn new(engine: ValuationEngine) -> Self {
        Self::with_capacity(engine, DEFAULT_CAPACITY)
    }

    pub fn with_capacity(engine: ValuationEngine, capacity: usize) -> Self {
        Self {
            engine,
            entries: HashMap::new(),
            capacity: capacity.max(1),
            hits: 0,
            misses: 0,
        }
    }

    /// The engine results are computed with.
    pub fn engine(&self) -> &ValuationEngine {
        &self.engine
    }

    /// Return the memoized result for `inputs`, computing it on a miss.
    pub fn get_or_compute(&mut self, inputs: &ValuationInputs) -> ValuationResult {
        let key = InputKey::of(inputs);
        if let Some(result) = self.entries.get(&key) {
            self.hits += 1;
            return *result;
        }

        self.misses += 1;
        let result = self.engine.compute(inputs);

        if self.entries.len() >= self.capacity {
            debug!(capacity = self.capacity, "Valuation cache full, clearing");
            self.entries.clear();
        }
        self.entries.insert(key, result);
        result
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits,
            misses: self.misses,
            entries: self.entries.len(),
        }
    }

    /// Drop all memoized results (counters are kept).
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
