//! AnalysisReport: aggregated output of every analysis that ran.
//!
//! The report keeps each analysis result and extracts the notable
//! findings for summary display.

use serde::Serialize;

use crate::fact_order::FactOrderResult;
use crate::inert::{InertKind, InertResult};
use crate::references::ReferenceResult;

/// Severity level for an analysis finding.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, PartialOrd, Ord)]
pub enum FindingSeverity {
    Info,
    Warning,
    Error,
}

/// A notable finding from analysis.
#[derive(Debug, Clone, Serialize)]
pub struct Finding {
    pub analysis: String,
    pub severity: FindingSeverity,
    pub message: String,
    pub location: Option<String>,
    pub details: Option<serde_json::Value>,
}

/// Aggregated analysis report.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
    pub fact_order: Option<FactOrderResult>,
    pub references: Option<ReferenceResult>,
    pub inert: Option<InertResult>,
    pub analyses_run: Vec<String>,
    pub findings: Vec<Finding>,
}

impl AnalysisReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// True when any finding is an error.
    pub fn has_errors(&self) -> bool {
        self.findings
            .iter()
            .any(|f| f.severity == FindingSeverity::Error)
    }

    pub fn count(&self, severity: FindingSeverity) -> usize {
        self.findings.iter().filter(|f| f.severity == severity).count()
    }

    /// Extract findings from populated analysis results.
    pub fn extract_findings(&mut self) {
        self.findings.clear();

        if let Some(ref fact_order) = self.fact_order {
            for fwd in &fact_order.forward_references {
                self.findings.push(Finding {
                    analysis: "fact_order".to_string(),
                    severity: FindingSeverity::Warning,
                    message: format!(
                        "Fact rule '{}' reads fact '{}' which is only set by later rule(s): {}",
                        fwd.rule,
                        fwd.fact,
                        fwd.set_by.join(", ")
                    ),
                    location: Some(format!("routing.factRules[{}].when", fwd.rule_index)),
                    details: Some(serde_json::json!({
                        "fact": fwd.fact,
                        "set_by": fwd.set_by,
                        "has_default": fwd.has_default,
                    })),
                });
            }
        }

        if let Some(ref references) = self.references {
            for dangling in &references.dangling {
                self.findings.push(Finding {
                    analysis: "references".to_string(),
                    severity: dangling.kind.severity(),
                    message: format!(
                        "{} '{}' is not declared",
                        dangling.kind.describe(),
                        dangling.target
                    ),
                    location: Some(dangling.location.clone()),
                    details: None,
                });
            }
        }

        if let Some(ref inert) = self.inert {
            for cond in &inert.inert {
                let message = match cond.kind {
                    InertKind::Malformed => "Condition has no recognized key and never matches",
                    InertKind::EmptyCombinator => "Empty all/any never matches",
                    InertKind::UnknownOperator => "Predicate has no recognized operator and never matches",
                };
                self.findings.push(Finding {
                    analysis: "inert".to_string(),
                    severity: FindingSeverity::Warning,
                    message: message.to_string(),
                    location: Some(cond.location.clone()),
                    details: None,
                });
            }
        }

        // Deterministic output.
        self.findings.sort_by(|a, b| {
            a.analysis
                .cmp(&b.analysis)
                .then_with(|| b.severity.cmp(&a.severity))
                .then_with(|| a.location.cmp(&b.location))
                .then_with(|| a.message.cmp(&b.message))
        });
    }
}
