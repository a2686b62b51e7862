//! Narrative valuation reports.
//!
//! Defines the `ReportWriter` trait and a deterministic Markdown writer.
//! Writers only read the input and result records; report generation backed
//! by an external service belongs behind the same trait.

use async_trait::async_trait;
use anyhow::Context;
use std::fmt::{self, Write as _};

use crate::format::{format_number, format_percentage, Money};
use crate::types::{ValuationInputs, ValuationResult};
use crate::valuation::engine::ValuationEngine;
use crate::valuation::projection::{FutureProjector, ProjectionConfig};
use crate::valuation::recommend::{self, IssueImpact};

/// Owner dependency above which the report flags a critical risk.
const CRITICAL_DEPENDENCY: f64 = 50.0;
/// Governance score below which the report raises an alert.
const LOW_GOVERNANCE: f64 = 5.0;

/// Abstraction over report writers.
#[async_trait]
pub trait ReportWriter: Send + Sync {
    async fn write_report(
        &self,
        inputs: &ValuationInputs,
        result: &ValuationResult,
    ) -> anyhow::Result<String>;
}

/// Template-driven Markdown report.
pub struct NarrativeReport {
    money: Money,
    projector: FutureProjector,
}

impl NarrativeReport {
    pub fn new(currency: &str, engine: ValuationEngine) -> Self {
        Self {
            money: Money::for_currency(currency),
            projector: FutureProjector::new(engine, ProjectionConfig::default()),
        }
    }

    /// Render the report synchronously.
    pub fn render(
        &self,
        inputs: &ValuationInputs,
        result: &ValuationResult,
    ) -> Result<String, fmt::Error> {
        let m = &self.money;
        let mut out = String::new();

        writeln!(out, "# Valuation Report\n")?;

        writeln!(out, "## Value Analysis\n")?;
        writeln!(
            out,
            "The business is worth **{}** (enterprise value), or **{}** to the owner after net debt of {}.",
            m.format(result.enterprise_value),
            m.format(result.equity_value),
            m.format(inputs.net_debt),
        )?;
        writeln!(
            out,
            "Annual EBITDA of **{}** at the sector multiple of **{}x** gives a base value of {}; \
             after adjustments the effective multiple is **{:.2}x**.\n",
            m.format(result.annual_ebitda),
            format_number(inputs.sector_multiple),
            m.format(result.base_value),
            result.final_multiple,
        )?;
        writeln!(out, "| Adjustment | Amount |")?;
        writeln!(out, "|---|---|")?;
        writeln!(out, "| Growth premium | +{} |", m.format(result.growth_premium))?;
        writeln!(out, "| Governance premium | +{} |", m.format(result.governance_premium))?;
        writeln!(out, "| Owner dependency penalty | -{} |\n", m.format(result.dependency_penalty))?;

        writeln!(out, "## Owner Dependency\n")?;
        if inputs.owner_dependency > CRITICAL_DEPENDENCY {
            writeln!(
                out,
                "**CRITICAL:** {} of the operation relies on the owner. This costs **{}** of value \
                 and erases the growth premium a buyer would pay for. Delegating day-to-day decisions \
                 to a management layer is the single largest lever.\n",
                format_percentage(inputs.owner_dependency),
                m.format(result.dependency_penalty),
            )?;
        } else {
            writeln!(
                out,
                "Owner dependency of {} is under control; the business can run without the owner.\n",
                format_percentage(inputs.owner_dependency),
            )?;
        }

        writeln!(out, "## Governance\n")?;
        if inputs.governance_score < LOW_GOVERNANCE {
            writeln!(
                out,
                "**ALERT:** governance scores {}/10. Start with monthly bank reconciliation and an \
                 external audit of the financial statements.\n",
                format_number(inputs.governance_score),
            )?;
        } else {
            writeln!(
                out,
                "Governance scores {}/10 and contributes a premium of {}.\n",
                format_number(inputs.governance_score),
                m.format(result.governance_premium),
            )?;
        }

        writeln!(out, "## Growth\n")?;
        writeln!(
            out,
            "The company grows {} per year; the valuation captures {} of growth premium.\n",
            format_percentage(inputs.annual_growth),
            m.format(result.growth_premium),
        )?;

        let future = self.projector.project(inputs, result);
        writeln!(out, "## Value Gap\n")?;
        writeln!(
            out,
            "Under benchmark conditions the business would be worth **{}** ({:.1}x EBITDA), \
             a gap of **{}** ({}).",
            m.format(result.potential_value()),
            result.potential_multiple,
            m.format(result.value_gap),
            format_percentage(result.value_gap_pct()),
        )?;
        writeln!(
            out,
            "Executing the improvement plan projects an enterprise value of **{}** ({:.1}x), \
             {} on today.\n",
            m.format(future.future_ev),
            future.future_multiple,
            format_percentage(future.improvement_percent),
        )?;

        let issues = recommend::diagnose(inputs, result);
        writeln!(out, "## Diagnosis\n")?;
        if issues.is_empty() {
            writeln!(out, "Company in great shape: few improvement points identified.\n")?;
        } else {
            for issue in &issues {
                let impact = match &issue.impact {
                    IssueImpact::Amount(v) => m.format(*v),
                    IssueImpact::Note(note) => note.clone(),
                };
                writeln!(
                    out,
                    "- **[{}] {}**: {} ({})",
                    issue.severity, issue.title, issue.description, impact
                )?;
            }
            writeln!(out)?;
        }

        let recs = recommend::rank_recommendations(inputs, result);
        if !recs.is_empty() {
            writeln!(out, "## Recommendations\n")?;
            for (i, rec) in recs.iter().enumerate() {
                writeln!(out, "{}. **{}**: {}", i + 1, rec.title, rec.impact)?;
            }
            writeln!(out)?;
        }

        writeln!(out, "## Next Step\n")?;
        if result.value_gap > 0.0 {
            writeln!(
                out,
                "There are **{}** on the table. The adjustments above typically take 6–12 months.",
                m.format(result.value_gap),
            )?;
        } else {
            writeln!(
                out,
                "The business already trades at its benchmark; protect it by keeping governance high."
            )?;
        }

        Ok(out)
    }
}

impl Default for NarrativeReport {
    fn default() -> Self {
        Self::new("BRL", ValuationEngine::default())
    }
}

#[async_trait]
impl ReportWriter for NarrativeReport {
    async fn write_report(
        &self,
        inputs: &ValuationInputs,
        result: &ValuationResult,
    ) -> anyhow::Result<String> {
        self.render(inputs, result).context("Failed to render report")
    }
}
