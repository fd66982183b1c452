//! Static analysis of a loaded risk map configuration.
//!
//! Each analysis is a separate module producing a serializable result.
//! `analyze()` runs them all and aggregates the results into an
//! [`AnalysisReport`] whose findings the CLI prints.

use std::fmt;

use riskmap_interchange::RiskMapConfig;
use tracing::debug;

pub mod conditions;
pub mod fact_order;
pub mod inert;
pub mod references;
pub mod report;

pub use conditions::{ConditionIndex, LocatedCondition};
pub use fact_order::{FactOrderResult, ForwardReference};
pub use inert::{InertCondition, InertKind, InertResult};
pub use references::{DanglingReference, ReferenceKind, ReferenceResult};
pub use report::{AnalysisReport, Finding, FindingSeverity};

/// Names accepted by [`analyze_selected`], in run order.
pub const ANALYSES: &[&str] = &["fact_order", "references", "inert"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalysisError {
    UnknownAnalysis(String),
}

impl fmt::Display for AnalysisError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnalysisError::UnknownAnalysis(name) => write!(
                f,
                "unknown analysis '{}' (expected one of: {})",
                name,
                ANALYSES.join(", ")
            ),
        }
    }
}

impl std::error::Error for AnalysisError {}

/// Run every analysis.
pub fn analyze(config: &RiskMapConfig) -> AnalysisReport {
    let mut report = AnalysisReport::new();
    report.fact_order = Some(fact_order::analyze_fact_order(config));
    report.references = Some(references::analyze_references(config));
    report.inert = Some(inert::analyze_inert(config));
    report.analyses_run = ANALYSES.iter().map(|a| a.to_string()).collect();
    report.extract_findings();
    debug!(findings = report.findings.len(), "analysis complete");
    report
}

/// Run only the named analyses.
pub fn analyze_selected(
    config: &RiskMapConfig,
    analyses: &[&str],
) -> Result<AnalysisReport, AnalysisError> {
    if let Some(unknown) = analyses.iter().find(|a| !ANALYSES.contains(*a)) {
        return Err(AnalysisError::UnknownAnalysis(unknown.to_string()));
    }

    let mut report = AnalysisReport::new();
    for name in ANALYSES.iter().filter(|a| analyses.contains(*a)) {
        match *name {
            "fact_order" => report.fact_order = Some(fact_order::analyze_fact_order(config)),
            "references" => report.references = Some(references::analyze_references(config)),
            _ => report.inert = Some(inert::analyze_inert(config)),
        }
        report.analyses_run.push(name.to_string());
    }
    report.extract_findings();
    Ok(report)
}
