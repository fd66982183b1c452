use std::path::Path;

use riskmap_eval::resolve_form;

use crate::commands::{load_inputs, print_json};
use crate::OutputFormat;

pub(crate) fn cmd_form(config: &Path, session: &Path, output: OutputFormat, quiet: bool) {
    let (config, session) = load_inputs(config, session, output, quiet);
    let form = resolve_form(&config.inventory, &session.inventory, &session.repeat_blocks);

    if quiet {
        return;
    }
    match output {
        OutputFormat::Json => print_json(&form, output, quiet),
        OutputFormat::Text => {
            println!("Intake Form");
            println!("===========");
            println!();

            let flags: Vec<String> = form
                .flags
                .0
                .iter()
                .map(|(name, value)| format!("{} = {}", name, value))
                .collect();
            println!("  Flags: {}", flags.join(", "));
            println!();

            for step in &form.steps {
                let mut state = vec![if step.visible { "visible" } else { "hidden" }];
                state.push(if step.optional { "optional" } else { "required" });
                if step.collapsed_by_default {
                    state.push("collapsed");
                }
                println!(
                    "  {} {}  [{}]",
                    step.id,
                    step.title.as_deref().unwrap_or(""),
                    state.join(", ")
                );
                for field in step.fields.iter().filter(|f| !f.visible) {
                    println!("    {} (hidden)", field.key);
                }
            }

            println!();
            println!("  {} / {} fields completed", form.filled, form.total);
            if !form.missing_fields.is_empty() {
                println!("  Missing: {}", form.missing_fields.join(", "));
            }
        }
    }
}
