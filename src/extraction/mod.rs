//! Field extraction from uploaded financial statements.
//!
//! Defines the `FieldExtractor` trait and the workbook shape extractors
//! read. The engine never depends on this module: extracted values are
//! merged into a `ValuationInputs` by the caller and computed like any
//! other input record.

pub mod keyword;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use tracing::info;

use crate::types::ValuationInputs;

// ---------------------------------------------------------------------------
// Workbook
// ---------------------------------------------------------------------------

/// A spreadsheet as rows of JSON cells (strings, numbers, nulls).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Workbook {
    pub sheets: Vec<Sheet>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sheet {
    pub name: String,
    #[serde(default)]
    pub rows: Vec<Vec<Value>>,
}

impl Workbook {
    /// Total number of rows across all sheets.
    pub fn row_count(&self) -> usize {
        self.sheets.iter().map(|s| s.rows.len()).sum()
    }
}

// ---------------------------------------------------------------------------
// Extracted fields
// ---------------------------------------------------------------------------

/// How sure an extractor is about what it found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    High,
    Medium,
    Low,
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Confidence::High => write!(f, "high"),
            Confidence::Medium => write!(f, "medium"),
            Confidence::Low => write!(f, "low"),
        }
    }
}

/// Partial financial data found in a document. Amounts are annual.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedFields {
    pub ebitda: Option<f64>,
    pub revenue: Option<f64>,
    pub operating_costs: Option<f64>,
    pub net_debt: Option<f64>,
    pub growth_rate: Option<f64>,
    pub confidence: Confidence,
    pub fields_found: Vec<String>,
    /// Free-form explanation of where values were found.
    pub notes: Option<String>,
}

impl ExtractedFields {
    /// Nothing found yet.
    pub fn empty() -> Self {
        Self {
            ebitda: None,
            revenue: None,
            operating_costs: None,
            net_debt: None,
            growth_rate: None,
            confidence: Confidence::Low,
            fields_found: Vec::new(),
            notes: None,
        }
    }

    /// Overlay the extracted values on an input record.
    ///
    /// Annual EBITDA becomes monthly; net debt and growth replace the
    /// current values. Fields the valuation does not use (revenue,
    /// operating costs) are ignored. No cross-validation is applied.
    pub fn merge_into(&self, inputs: &ValuationInputs) -> ValuationInputs {
        let mut merged = *inputs;
        if let Some(ebitda) = self.ebitda {
            merged.monthly_ebitda = ebitda / 12.0;
        }
        if let Some(net_debt) = self.net_debt {
            merged.net_debt = net_debt;
        }
        if let Some(growth) = self.growth_rate {
            merged.annual_growth = growth;
        }
        merged
    }
}

// ---------------------------------------------------------------------------
// Extractor trait
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum ExtractionError {
    #[error("No financial fields found in document")]
    NothingFound,

    #[error("Malformed document: {0}")]
    Malformed(String),

    #[error("Extraction service error ({service}): {message}")]
    Service { service: String, message: String },
}

/// Abstraction over document field extractors.
///
/// Implementations may be deterministic (keyword scanning) or call an
/// external service; callers must not assume either.
#[async_trait]
pub trait FieldExtractor: Send + Sync {
    async fn extract(&self, workbook: &Workbook) -> Result<ExtractedFields, ExtractionError>;
}

/// Run an extractor and merge its findings into `inputs`.
pub async fn extract_into(
    extractor: &dyn FieldExtractor,
    workbook: &Workbook,
    inputs: &ValuationInputs,
) -> Result<(ExtractedFields, ValuationInputs), ExtractionError> {
    let fields = extractor.extract(workbook).await?;
    let merged = fields.merge_into(inputs);
    info!(
        fields = ?fields.fields_found,
        confidence = %fields.confidence,
        monthly_ebitda = merged.monthly_ebitda,
        "Extracted fields merged into inputs"
    );
    Ok((fields, merged))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
