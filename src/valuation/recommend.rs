//! Improvement recommendations and diagnosis.
//!
//! Both read the same triggers off the inputs: high owner dependency, weak
//! governance, slow growth and (for recommendations) heavy debt. The ranker
//! turns them into at most three prioritized actions; the diagnosis turns
//! them into issues with a severity.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

use crate::types::{ValuationInputs, ValuationResult};

/// Maximum number of recommendations returned.
pub const MAX_RECOMMENDATIONS: usize = 3;

const DEPENDENCY_TRIGGER: f64 = 50.0;
const GOVERNANCE_TRIGGER: f64 = 6.0;
const GROWTH_TRIGGER: f64 = 10.0;
/// Net debt above this many years of EBITDA triggers the debt action.
const DEBT_EBITDA_TRIGGER: f64 = 2.0;

// ---------------------------------------------------------------------------
// Recommendations
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    ReduceOwnerDependency,
    ImproveGovernance,
    AccelerateGrowth,
    OptimizeCapitalStructure,
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionKind::ReduceOwnerDependency => write!(f, "Reduce Owner Dependency"),
            ActionKind::ImproveGovernance => write!(f, "Improve Corporate Governance"),
            ActionKind::AccelerateGrowth => write!(f, "Accelerate Growth"),
            ActionKind::OptimizeCapitalStructure => write!(f, "Optimize Capital Structure"),
        }
    }
}

/// One improvement action. Lower priority numbers come first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub kind: ActionKind,
    pub title: String,
    pub impact: String,
    pub priority: u8,
}

impl Recommendation {
    fn new(kind: ActionKind, impact: String, priority: u8) -> Self {
        Self {
            kind,
            title: kind.to_string(),
            impact,
            priority,
        }
    }
}

/// `part / whole` in percent, 0 when there is no positive whole.
fn share_pct(part: f64, whole: f64) -> f64 {
    if whole > 0.0 {
        part / whole * 100.0
    } else {
        0.0
    }
}

/// Whole percent, halves rounded away from zero (`12.5` → `13`).
fn whole_pct(value: f64) -> String {
    format!("{:.0}", value.round())
}

/// Rank improvement actions for a valuation.
///
/// Sorting is stable, so actions with equal priority keep trigger order
/// (dependency, governance, growth, debt).
pub fn rank_recommendations(
    inputs: &ValuationInputs,
    result: &ValuationResult,
) -> Vec<Recommendation> {
    let mut recs = Vec::new();
    let high_dependency = inputs.owner_dependency > DEPENDENCY_TRIGGER;

    if high_dependency {
        recs.push(Recommendation::new(
            ActionKind::ReduceOwnerDependency,
            format!(
                "+{}% on valuation",
                whole_pct(share_pct(result.dependency_penalty, result.enterprise_value))
            ),
            1,
        ));
    }

    if inputs.governance_score < GOVERNANCE_TRIGGER {
        recs.push(Recommendation::new(
            ActionKind::ImproveGovernance,
            "Up to +15% valuation premium".to_string(),
            if high_dependency { 2 } else { 1 },
        ));
    }

    if inputs.annual_growth < GROWTH_TRIGGER {
        recs.push(Recommendation::new(
            ActionKind::AccelerateGrowth,
            "Each 5% of growth adds ~10% to value".to_string(),
            3,
        ));
    }

    if inputs.net_debt > result.annual_ebitda * DEBT_EBITDA_TRIGGER {
        recs.push(Recommendation::new(
            ActionKind::OptimizeCapitalStructure,
            format!(
                "Reducing debt raises equity value by {}%",
                whole_pct(share_pct(inputs.net_debt, result.enterprise_value))
            ),
            2,
        ));
    }

    recs.sort_by_key(|r| r.priority);
    recs.truncate(MAX_RECOMMENDATIONS);

    debug!(count = recs.len(), "Recommendations ranked");
    recs
}

// ---------------------------------------------------------------------------
// Diagnosis
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    Warning,
    Info,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Critical => write!(f, "CRITICAL"),
            Severity::Warning => write!(f, "WARNING"),
            Severity::Info => write!(f, "INFO"),
        }
    }
}

/// What an issue costs: a currency amount, or a qualitative note.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum IssueImpact {
    Amount(f64),
    Note(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    pub severity: Severity,
    pub title: String,
    pub description: String,
    pub impact: IssueImpact,
}

/// Issues found in the current profile; empty means the company is in good shape.
pub fn diagnose(inputs: &ValuationInputs, result: &ValuationResult) -> Vec<Issue> {
    let mut issues = Vec::new();

    if inputs.owner_dependency > DEPENDENCY_TRIGGER {
        issues.push(Issue {
            severity: Severity::Critical,
            title: "High Owner Dependency".to_string(),
            description: format!(
                "{}% of the operation depends on the owner",
                inputs.owner_dependency
            ),
            impact: IssueImpact::Amount(result.dependency_penalty),
        });
    }

    if inputs.governance_score < GOVERNANCE_TRIGGER {
        issues.push(Issue {
            severity: Severity::Warning,
            title: "Governance Below Target".to_string(),
            description: format!("Current score: {}/10", inputs.governance_score),
            impact: IssueImpact::Note("Up to +15% with improvements".to_string()),
        });
    }

    if inputs.annual_growth < GROWTH_TRIGGER {
        issues.push(Issue {
            severity: Severity::Info,
            title: "Limited Growth".to_string(),
            description: format!("Current rate: {}% per year", inputs.annual_growth),
            impact: IssueImpact::Note("Room to accelerate".to_string()),
        });
    }

    issues
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
