use std::path::Path;
use std::process;

use riskmap_analyze::{FindingSeverity, ANALYSES};

use crate::commands::{load_config, print_json};
use crate::{fail, OutputFormat};

pub(crate) fn cmd_check(
    config_dir: &Path,
    analysis: Option<&str>,
    strict: bool,
    output: OutputFormat,
    quiet: bool,
) {
    let config = load_config(config_dir, output, quiet);

    let selected: Option<Vec<&str>> = analysis.map(|a| {
        let selected: Vec<&str> = a.split(',').map(|s| s.trim()).collect();
        for s in &selected {
            if !ANALYSES.contains(s) {
                let msg = format!("invalid analysis '{}'. Valid: {}", s, ANALYSES.join(", "));
                fail(&msg, output, quiet);
            }
        }
        selected
    });

    let report = match &selected {
        None => riskmap_analyze::analyze(&config),
        Some(analyses) => riskmap_analyze::analyze_selected(&config, analyses)
            .unwrap_or_else(|e| fail(&format!("analysis error: {}", e), output, quiet)),
    };

    if !quiet {
        match output {
            OutputFormat::Json => print_json(&report, output, quiet),
            OutputFormat::Text => {
                println!("Static Analysis Report");
                println!("======================");
                println!();

                if let Some(ref fact_order) = report.fact_order {
                    println!(
                        "  Fact order: {} rules, {} forward reference(s)",
                        fact_order.rules_checked,
                        fact_order.forward_references.len()
                    );
                }
                if let Some(ref references) = report.references {
                    println!(
                        "  References: {} dangling reference(s)",
                        references.dangling.len()
                    );
                }
                if let Some(ref inert) = report.inert {
                    println!(
                        "  Conditions: {} checked, {} never match",
                        inert.conditions_checked,
                        inert.inert.len()
                    );
                }

                println!();
                println!("Findings:");
                if report.findings.is_empty() {
                    println!("  No findings.");
                }
                for finding in &report.findings {
                    let severity = match finding.severity {
                        FindingSeverity::Error => "ERROR",
                        FindingSeverity::Warning => "WARNING",
                        FindingSeverity::Info => "INFO",
                    };
                    let context = finding
                        .location
                        .as_ref()
                        .map(|l| format!(" [{}]", l))
                        .unwrap_or_default();
                    println!(
                        "  [{}/{}]{}: {}",
                        finding.analysis, severity, context, finding.message
                    );
                }
            }
        }
    }

    if report.has_errors() || (strict && report.count(FindingSeverity::Warning) > 0) {
        process::exit(1);
    }
}
