pub(crate) mod assess;
pub(crate) mod check;
pub(crate) mod form;
pub(crate) mod prefill;

use std::path::Path;

use riskmap_interchange::{load_config_dir, load_session, AssessmentSession, RiskMapConfig};
use serde::Serialize;

use crate::{fail, OutputFormat};

pub(crate) fn load_config(dir: &Path, output: OutputFormat, quiet: bool) -> RiskMapConfig {
    load_config_dir(dir).unwrap_or_else(|e| fail(&format!("config error: {}", e), output, quiet))
}

pub(crate) fn load_inputs(
    config: &Path,
    session: &Path,
    output: OutputFormat,
    quiet: bool,
) -> (RiskMapConfig, AssessmentSession) {
    let config = load_config(config, output, quiet);
    let session = load_session(session)
        .unwrap_or_else(|e| fail(&format!("session error: {}", e), output, quiet));
    (config, session)
}

pub(crate) fn print_json<T: Serialize>(value: &T, output: OutputFormat, quiet: bool) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => fail(&format!("serialization error: {}", e), output, quiet),
    }
}

/// `a, b, c`, or `(none)`.
pub(crate) fn list(items: &[String]) -> String {
    if items.is_empty() {
        "(none)".to_string()
    } else {
        items.join(", ")
    }
}
