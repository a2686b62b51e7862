//! Persistence layer.
//!
//! Saves companies and their valuation history to a single JSON file.
//! Every mutation rewrites the file, which is plenty for the volume a
//! valuation desk produces.

use anyhow::{Context, Result};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use uuid::Uuid;

use crate::types::{AxiomaError, Company, ValuationInputs, ValuationRecord, ValuationResult};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct StoreData {
    companies: Vec<Company>,
    valuations: Vec<ValuationRecord>,
}

/// JSON-file store of companies and their saved valuations.
pub struct ValuationStore {
    path: PathBuf,
    data: StoreData,
}

impl ValuationStore {
    /// Open the store at `path`. A missing file is an empty store.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if path.is_dir() {
            return Err(AxiomaError::Storage(format!("{} is a directory", path.display())).into());
        }

        if !path.exists() {
            info!(path = %path.display(), "No store file found, starting empty");
            return Ok(Self {
                path,
                data: StoreData::default(),
            });
        }

        let json = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read store from {}", path.display()))?;
        let data: StoreData = serde_json::from_str(&json)
            .with_context(|| format!("Failed to parse store from {}", path.display()))?;

        info!(
            path = %path.display(),
            companies = data.companies.len(),
            valuations = data.valuations.len(),
            "Store loaded from disk"
        );

        Ok(Self { path, data })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write `next` to disk, then make it the current state. On failure the
    /// in-memory state is left untouched.
    fn commit(&mut self, next: StoreData) -> Result<()> {
        let json = serde_json::to_string_pretty(&next).context("Failed to serialise store")?;
        std::fs::write(&self.path, json)
            .with_context(|| format!("Failed to write store to {}", self.path.display()))?;
        self.data = next;
        debug!(path = %self.path.display(), "Store flushed");
        Ok(())
    }

    // -- Companies -----------------------------------------------------------

    /// All companies, ordered by name.
    pub fn list_companies(&self) -> Vec<Company> {
        let mut companies = self.data.companies.clone();
        companies.sort_by(|a, b| a.name.cmp(&b.name));
        companies
    }

    pub fn company(&self, id: Uuid) -> Option<&Company> {
        self.data.companies.iter().find(|c| c.id == id)
    }

    pub fn create_company(
        &mut self,
        name: &str,
        sector: Option<&str>,
        cnpj: Option<&str>,
    ) -> Result<Company> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AxiomaError::InvalidInput("company name is empty".into()).into());
        }

        let company = Company {
            id: Uuid::new_v4(),
            name: name.to_string(),
            sector: sector.map(str::to_string),
            cnpj: cnpj.map(str::to_string),
            created_at: Utc::now(),
        };
        let mut next = self.data.clone();
        next.companies.push(company.clone());
        self.commit(next)?;

        info!(company_id = %company.id, name = %company.name, "Company created");
        Ok(company)
    }

    /// Delete a company together with all of its valuations.
    pub fn delete_company(&mut self, id: Uuid) -> Result<()> {
        if self.company(id).is_none() {
            return Err(AxiomaError::CompanyNotFound(id).into());
        }

        let mut next = self.data.clone();
        next.valuations.retain(|v| v.company_id != id);
        next.companies.retain(|c| c.id != id);
        let removed = self.data.valuations.len() - next.valuations.len();
        self.commit(next)?;

        info!(company_id = %id, valuations_removed = removed, "Company deleted");
        Ok(())
    }

    // -- Valuations ----------------------------------------------------------

    /// Store a computed valuation under a company. Versions count up per company.
    pub fn save_valuation(
        &mut self,
        company_id: Uuid,
        inputs: ValuationInputs,
        results: ValuationResult,
    ) -> Result<ValuationRecord> {
        if self.company(company_id).is_none() {
            return Err(AxiomaError::CompanyNotFound(company_id).into());
        }
        // serde_json writes NaN and infinities as null, which would make the
        // whole file unreadable on the next open.
        if !inputs.is_finite() || !results.is_finite() {
            return Err(AxiomaError::InvalidInput(
                "valuation contains non-finite numbers".into(),
            )
            .into());
        }

        let version = self
            .data
            .valuations
            .iter()
            .filter(|v| v.company_id == company_id)
            .map(|v| v.version)
            .max()
            .unwrap_or(0)
            + 1;

        let record = ValuationRecord {
            id: Uuid::new_v4(),
            company_id,
            inputs,
            results,
            version,
            created_at: Utc::now(),
        };
        let mut next = self.data.clone();
        next.valuations.push(record.clone());
        self.commit(next)?;

        info!(
            company_id = %company_id,
            valuation_id = %record.id,
            version,
            enterprise_value = format!("{:.2}", results.enterprise_value),
            "Valuation saved"
        );
        Ok(record)
    }

    /// A company's valuations, newest first.
    pub fn list_valuations(&self, company_id: Uuid) -> Result<Vec<ValuationRecord>> {
        if self.company(company_id).is_none() {
            return Err(AxiomaError::CompanyNotFound(company_id).into());
        }

        let mut records: Vec<ValuationRecord> = self
            .data
            .valuations
            .iter()
            .filter(|v| v.company_id == company_id)
            .cloned()
            .collect();
        records.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.version.cmp(&a.version))
        });
        Ok(records)
    }

    pub fn delete_valuation(&mut self, id: Uuid) -> Result<()> {
        let mut next = self.data.clone();
        next.valuations.retain(|v| v.id != id);
        if next.valuations.len() == self.data.valuations.len() {
            return Err(AxiomaError::ValuationNotFound(id).into());
        }
        self.commit(next)?;

        info!(valuation_id = %id, "Valuation deleted");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
