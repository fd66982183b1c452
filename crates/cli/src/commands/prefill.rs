use std::path::Path;

use riskmap_eval::{compute_flags, resolve_prefill_with_flags, AssessmentState, PrefillKind};
use serde_json::json;

use crate::commands::{list, load_inputs, print_json};
use crate::OutputFormat;

pub(crate) fn cmd_prefill(config: &Path, session: &Path, output: OutputFormat, quiet: bool) {
    let (config, session) = load_inputs(config, session, output, quiet);
    let flags = compute_flags(&config.inventory, &session.inventory, &session.repeat_blocks);
    let bundle = resolve_prefill_with_flags(
        &config.routing,
        &session.inventory,
        &session.repeat_blocks,
        &flags,
    );
    let state = AssessmentState::from_session(&session).apply_prefill(&bundle);

    if quiet {
        return;
    }
    match output {
        OutputFormat::Json => print_json(&json!({ "prefill": bundle, "state": state }), output, quiet),
        OutputFormat::Text => {
            println!("Prefill");
            println!("=======");
            println!();

            let facts: Vec<String> = bundle
                .facts
                .0
                .iter()
                .map(|(name, value)| format!("{} = {}", name, value))
                .collect();
            println!("  Facts: {}", list(&facts));

            let reason = |kind: PrefillKind, target: &str| {
                bundle
                    .reason_for(kind, target)
                    .map(|r| format!("  ({})", r))
                    .unwrap_or_default()
            };

            println!("  Use cases:");
            for uc in &bundle.use_cases {
                println!("    {}{}", uc, reason(PrefillKind::UseCase, uc));
            }
            println!("  Personas:");
            for p in &bundle.personas {
                println!("    {}{}", p, reason(PrefillKind::Persona, p));
            }
            println!("  Answers:");
            for (question, label) in &bundle.answers {
                println!(
                    "    {} = {}{}",
                    question,
                    label,
                    reason(PrefillKind::Answer, question)
                );
            }
            println!("  Hidden questions: {}", list(&bundle.hidden_questions));

            println!();
            println!("Resulting state:");
            println!("  Personas: {}", list(&state.selected_personas));
            println!("  Use cases: {}", list(&state.selected_use_cases));
            for (question, label) in &state.answers.0 {
                println!("  {} = {}", question, label);
            }
        }
    }
}
