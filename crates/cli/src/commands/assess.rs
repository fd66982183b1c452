use std::path::Path;

use riskmap_eval::{assess, TierMethod};

use crate::commands::{list, load_inputs, print_json};
use crate::OutputFormat;

pub(crate) fn cmd_assess(config: &Path, session: &Path, output: OutputFormat, quiet: bool) {
    let (config, session) = load_inputs(config, session, output, quiet);
    let result = assess(&config, &session);

    if quiet {
        return;
    }
    match output {
        OutputFormat::Json => print_json(&result, output, quiet),
        OutputFormat::Text => {
            println!("Assessment");
            println!("==========");
            println!();

            let tier = &result.tier;
            match tier.method {
                TierMethod::NotConfigured => println!("  Tier: not configured"),
                method => {
                    let how = match method {
                        TierMethod::Escalated => "escalated",
                        TierMethod::Baseline => "baseline",
                        _ => "default",
                    };
                    println!(
                        "  Tier: {} ({}), baseline {}, {}",
                        tier.label, tier.tier, tier.baseline_tier, how
                    );
                }
            }
            for rule in &tier.escalated_rules {
                println!("    escalated by: {}", rule);
            }

            println!("  Personas: {}", list(&result.state.selected_personas));
            println!("  Use cases: {}", list(&result.state.selected_use_cases));
            println!("  Answers: {}", result.state.answers.0.len());

            println!();
            println!("Risks ({}):", result.risks.len());
            for id in &result.risks {
                let title = config.catalog.risk(id).and_then(|r| r.title.as_deref());
                println!("  {}  {}", id, title.unwrap_or(""));
            }

            println!();
            println!("Controls ({}):", result.controls.len());
            for id in &result.controls {
                let title = config.catalog.control(id).and_then(|c| c.title.as_deref());
                println!("  {}  {}", id, title.unwrap_or(""));
            }
        }
    }
}
