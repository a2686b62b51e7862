//! Keyword-based extractor.
//!
//! Scans every row of every sheet. A row whose upper-cased text contains a
//! known label yields the first numeric cell in that row. Deterministic and
//! offline, so it is the default extractor.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use super::{Confidence, ExtractedFields, ExtractionError, FieldExtractor, Workbook};

/// Row labels recognised by the extractor (matched upper-cased).
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct KeywordConfig {
    pub ebitda_keywords: Vec<String>,
    pub net_debt_keywords: Vec<String>,
}

impl Default for KeywordConfig {
    fn default() -> Self {
        Self {
            ebitda_keywords: vec![
                "EBITDA".to_string(),
                "LAJIDA".to_string(),
                "RESULTADO OPERACIONAL".to_string(),
                "LUCRO OPERACIONAL".to_string(),
            ],
            net_debt_keywords: vec![
                "DÍVIDA LÍQUIDA".to_string(),
                "DIVIDA LIQUIDA".to_string(),
                "NET DEBT".to_string(),
            ],
        }
    }
}

pub struct KeywordExtractor {
    config: KeywordConfig,
}

impl KeywordExtractor {
    pub fn new(config: KeywordConfig) -> Self {
        let config = KeywordConfig {
            ebitda_keywords: config.ebitda_keywords.iter().map(|k| k.to_uppercase()).collect(),
            net_debt_keywords: config.net_debt_keywords.iter().map(|k| k.to_uppercase()).collect(),
        };
        Self { config }
    }

    /// First numeric cell of the first row matching any keyword.
    fn find_labelled(&self, workbook: &Workbook, keywords: &[String]) -> Option<(String, f64)> {
        for sheet in &workbook.sheets {
            for row in &sheet.rows {
                let text = row_text(row).to_uppercase();
                if !keywords.iter().any(|k| text.contains(k.as_str())) {
                    continue;
                }
                if let Some(value) = row.iter().find_map(numeric_cell) {
                    return Some((sheet.name.clone(), value));
                }
            }
        }
        None
    }
}

impl Default for KeywordExtractor {
    fn default() -> Self {
        Self::new(KeywordConfig::default())
    }
}

#[async_trait]
impl FieldExtractor for KeywordExtractor {
    async fn extract(&self, workbook: &Workbook) -> Result<ExtractedFields, ExtractionError> {
        let mut fields = ExtractedFields::empty();
        let mut notes = Vec::new();

        if let Some((sheet, value)) = self.find_labelled(workbook, &self.config.ebitda_keywords) {
            fields.ebitda = Some(value);
            fields.fields_found.push("ebitda".to_string());
            notes.push(format!("EBITDA found in sheet '{sheet}'"));
        }
        if let Some((sheet, value)) = self.find_labelled(workbook, &self.config.net_debt_keywords)
        {
            fields.net_debt = Some(value);
            fields.fields_found.push("netDebt".to_string());
            notes.push(format!("Net debt found in sheet '{sheet}'"));
        }

        if fields.fields_found.is_empty() {
            debug!(rows = workbook.row_count(), "No labelled rows found");
            return Err(ExtractionError::NothingFound);
        }

        fields.confidence = if fields.ebitda.is_some() {
            Confidence::Medium
        } else {
            Confidence::Low
        };
        fields.notes = Some(notes.join("; "));

        debug!(
            fields = ?fields.fields_found,
            confidence = %fields.confidence,
            "Keyword extraction complete"
        );
        Ok(fields)
    }
}

fn row_text(row: &[Value]) -> String {
    row.iter()
        .map(|cell| match cell {
            Value::String(s) => s.clone(),
            Value::Null => String::new(),
            other => other.to_string(),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// A cell's numeric value: JSON numbers, or strings that read as amounts.
fn numeric_cell(cell: &Value) -> Option<f64> {
    match cell {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => parse_amount(s),
        _ => None,
    }
}

/// Parse `1.234,56`, `1234.56`, `R$ -1.000` and similar. Text with letters
/// other than a currency prefix is rejected.
pub fn parse_amount(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    let trimmed = trimmed
        .strip_prefix("R$")
        .or_else(|| trimmed.strip_prefix('$'))
        .unwrap_or(trimmed)
        .trim();
    let (negative, body) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest.trim_start_matches(|c: char| c == ' ' || c == 'R' || c == '$')),
        None => (false, trimmed),
    };

    if body.is_empty() || !body.chars().all(|c| c.is_ascii_digit() || c == '.' || c == ',') {
        return None;
    }
    if !body.chars().any(|c| c.is_ascii_digit()) {
        return None;
    }

    let normalized = if body.contains(',') {
        // pt-BR: dots group thousands, comma is the decimal separator
        body.replace('.', "").replace(',', ".")
    } else if body.matches('.').count() > 1 {
        body.replace('.', "")
    } else {
        body.to_string()
    };

    let value: f64 = normalized.parse().ok()?;
    Some(if negative { -value } else { value })
}
