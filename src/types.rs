//! Shared types for the AXIOMA valuation service.
//!
//! These types form the data model used across all modules. The engine,
//! the satellites, storage and the HTTP layer all speak in terms of
//! `ValuationInputs` and `ValuationResult`, so they are kept free of any
//! behaviour beyond small derived helpers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Valuation inputs
// ---------------------------------------------------------------------------

/// The six numbers a valuation is computed from.
///
/// Field names are camelCase on the wire so stored records and API payloads
/// stay compatible with existing clients.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValuationInputs {
    /// Average monthly EBITDA.
    pub monthly_ebitda: f64,
    /// Market multiple of annual EBITDA for comparable businesses.
    pub sector_multiple: f64,
    /// Annual growth in percentage points (10 = 10%).
    pub annual_growth: f64,
    /// Share of daily operation relying on the owner, 0–100.
    pub owner_dependency: f64,
    /// Process formalization / financial controls, 0–10.
    pub governance_score: f64,
    /// Net debt; negative means net cash.
    pub net_debt: f64,
}

impl Default for ValuationInputs {
    /// Starting point of a fresh valuation form: high dependency and weak
    /// governance so the adjustments are visible immediately.
    fn default() -> Self {
        Self {
            monthly_ebitda: 0.0,
            sector_multiple: 4.0,
            annual_growth: 10.0,
            owner_dependency: 90.0,
            governance_score: 4.0,
            net_debt: 0.0,
        }
    }
}

impl ValuationInputs {
    /// Whether every field is a finite number.
    pub fn is_finite(&self) -> bool {
        [
            self.monthly_ebitda,
            self.sector_multiple,
            self.annual_growth,
            self.owner_dependency,
            self.governance_score,
            self.net_debt,
        ]
        .iter()
        .all(|v| v.is_finite())
    }

    /// Annual EBITDA implied by the monthly figure.
    pub fn annual_ebitda(&self) -> f64 {
        self.monthly_ebitda * 12.0
    }
}

impl fmt::Display for ValuationInputs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ebitda/mo={:.2} multiple={:.2}x growth={:.1}% dependency={:.0}% governance={:.1}/10 net_debt={:.2}",
            self.monthly_ebitda,
            self.sector_multiple,
            self.annual_growth,
            self.owner_dependency,
            self.governance_score,
            self.net_debt,
        )
    }
}

// ---------------------------------------------------------------------------
// Valuation result
// ---------------------------------------------------------------------------

/// Everything the engine derives from a `ValuationInputs`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValuationResult {
    pub annual_ebitda: f64,
    /// Annual EBITDA × sector multiple, before any adjustment.
    pub base_value: f64,
    pub dependency_penalty: f64,
    pub growth_premium: f64,
    pub governance_premium: f64,
    /// Never negative.
    pub enterprise_value: f64,
    /// Enterprise value minus net debt; may be negative.
    pub equity_value: f64,
    pub final_multiple: f64,
    pub potential_multiple: f64,
    /// Never negative.
    pub value_gap: f64,
}

impl ValuationResult {
    /// Whether every field is a finite number. Finite inputs can still
    /// overflow, e.g. a huge EBITDA times the multiple.
    pub fn is_finite(&self) -> bool {
        [
            self.annual_ebitda,
            self.base_value,
            self.dependency_penalty,
            self.growth_premium,
            self.governance_premium,
            self.enterprise_value,
            self.equity_value,
            self.final_multiple,
            self.potential_multiple,
            self.value_gap,
        ]
        .iter()
        .all(|v| v.is_finite())
    }

    /// Benchmark value the company could reach (`enterprise_value + value_gap`).
    pub fn potential_value(&self) -> f64 {
        self.enterprise_value + self.value_gap
    }

    /// Value gap as a percentage of the enterprise value (0 when EV is 0).
    pub fn value_gap_pct(&self) -> f64 {
        if self.enterprise_value > 0.0 {
            self.value_gap / self.enterprise_value * 100.0
        } else {
            0.0
        }
    }
}

impl fmt::Display for ValuationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "EV={:.2} ({:.2}x) equity={:.2} | base={:.2} growth=+{:.2} governance=+{:.2} dependency=-{:.2} | gap={:.2} ({:.2}x)",
            self.enterprise_value,
            self.final_multiple,
            self.equity_value,
            self.base_value,
            self.growth_premium,
            self.governance_premium,
            self.dependency_penalty,
            self.value_gap,
            self.potential_multiple,
        )
    }
}

// ---------------------------------------------------------------------------
// Persisted records
// ---------------------------------------------------------------------------

/// A company whose valuations are tracked over time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Company {
    pub id: Uuid,
    pub name: String,
    pub sector: Option<String>,
    /// Brazilian registry number, stored verbatim.
    pub cnpj: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// One saved valuation: the inputs, the results computed from them, and a
/// per-company version counter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValuationRecord {
    pub id: Uuid,
    pub company_id: Uuid,
    pub inputs: ValuationInputs,
    pub results: ValuationResult,
    pub version: u32,
    pub created_at: DateTime<Utc>,
}

impl fmt::Display for ValuationRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "v{} {} EV={:.2} ({:.2}x) [{}]",
            self.version,
            self.created_at.format("%Y-%m-%d %H:%M"),
            self.results.enterprise_value,
            self.results.final_multiple,
            self.id,
        )
    }
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Domain-specific error types for AXIOMA.
#[derive(Debug, thiserror::Error)]
pub enum AxiomaError {
    #[error("Company not found: {0}")]
    CompanyNotFound(Uuid),

    #[error("Valuation not found: {0}")]
    ValuationNotFound(Uuid),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
