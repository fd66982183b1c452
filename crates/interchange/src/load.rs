//! Reading configuration documents from disk.

use std::path::{Path, PathBuf};

use serde_json::Value as Json;
use tracing::{debug, info};

use crate::assessment::SelfAssessment;
use crate::catalog::Catalog;
use crate::error::ConfigError;
use crate::inventory::InventorySchema;
use crate::normalize::normalize_keys;
use crate::routing::RoutingConfig;
use crate::session::AssessmentSession;

/// Document stems read by [`load_config_dir`].
pub const INVENTORY_DOC: &str = "ai-inventory";
pub const ROUTING_DOC: &str = "assessment-routing";
pub const SELF_ASSESSMENT_DOC: &str = "self-assessment";
pub const RISKS_DOC: &str = "risks";
pub const CONTROLS_DOC: &str = "controls";
pub const PERSONAS_DOC: &str = "personas";

const EXTENSIONS: &[&str] = &["yaml", "yml", "json"];

/// Every configuration section, parsed and normalized.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RiskMapConfig {
    pub inventory: InventorySchema,
    pub routing: RoutingConfig,
    pub self_assessment: SelfAssessment,
    pub catalog: Catalog,
}

impl RiskMapConfig {
    /// Build from already-read raw documents. Each tree is normalized here.
    pub fn from_documents(
        inventory: Json,
        routing: Json,
        self_assessment: Json,
        risks: Json,
        controls: Json,
        personas: Json,
    ) -> Result<Self, ConfigError> {
        Ok(RiskMapConfig {
            inventory: InventorySchema::from_json(&normalize_keys(inventory))?,
            routing: RoutingConfig::from_json(&normalize_keys(routing))?,
            self_assessment: SelfAssessment::from_json(&normalize_keys(self_assessment))?,
            catalog: Catalog::from_json(
                &normalize_keys(risks),
                &normalize_keys(controls),
                &normalize_keys(personas),
            )?,
        })
    }
}

/// Load every section from `dir`. Missing documents are empty sections.
pub fn load_config_dir(dir: &Path) -> Result<RiskMapConfig, ConfigError> {
    if !dir.is_dir() {
        return Err(ConfigError::Io {
            path: dir.to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "not a directory"),
        });
    }

    let config = RiskMapConfig::from_documents(
        read_section(dir, INVENTORY_DOC)?,
        read_section(dir, ROUTING_DOC)?,
        read_section(dir, SELF_ASSESSMENT_DOC)?,
        read_section(dir, RISKS_DOC)?,
        read_section(dir, CONTROLS_DOC)?,
        read_section(dir, PERSONAS_DOC)?,
    )?;

    info!(
        dir = %dir.display(),
        steps = config.inventory.steps.len(),
        flag_rules = config.inventory.rules.len(),
        fact_rules = config.routing.fact_rules.len(),
        questions = config.self_assessment.questions.len(),
        risks = config.catalog.risks.len(),
        "loaded configuration"
    );
    Ok(config)
}

/// Read a session document (JSON or YAML, chosen by extension).
pub fn load_session(path: &Path) -> Result<AssessmentSession, ConfigError> {
    AssessmentSession::from_json(&read_document(path)?)
}

/// First existing `{stem}.{ext}` in `dir`.
fn find_document(dir: &Path, stem: &str) -> Option<PathBuf> {
    EXTENSIONS
        .iter()
        .map(|ext| dir.join(format!("{}.{}", stem, ext)))
        .find(|p| p.is_file())
}

fn read_section(dir: &Path, stem: &str) -> Result<Json, ConfigError> {
    match find_document(dir, stem) {
        Some(path) => read_document(&path),
        None => {
            debug!(dir = %dir.display(), document = stem, "document not found, using empty section");
            Ok(Json::Null)
        }
    }
}

/// Parse a file into a raw JSON tree. `.json` files use serde_json, anything
/// else is read as YAML.
pub fn read_document(path: &Path) -> Result<Json, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let is_json = path.extension().and_then(|e| e.to_str()) == Some("json");
    if is_json {
        serde_json::from_str(&text).map_err(|source| ConfigError::Json {
            path: path.to_path_buf(),
            source,
        })
    } else {
        serde_yaml::from_str(&text).map_err(|source| ConfigError::Yaml {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn loads_yaml_and_json_sections() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("ai-inventory.yaml"),
            "flags:\n  defaults:\n    usesModels: false\nrules:\n  - when:\n      field: modelUsage\n      exists: true\n    set_flags:\n      usesModels: true\n",
        )
        .unwrap();
        fs::write(
            dir.path().join("risks.json"),
            r#"{ "risks": [{ "id": "DP", "controls": ["c1"] }] }"#,
        )
        .unwrap();

        let config = load_config_dir(dir.path()).unwrap();
        assert_eq!(config.inventory.rules.len(), 1);
        // snake_case alias was normalized before parsing
        assert!(config.inventory.rules[0].set_flags.is_some());
        assert_eq!(config.catalog.risks[0].controls, vec!["c1"]);
        assert!(config.routing.fact_rules.is_empty());
        assert!(!config.self_assessment.tier.is_configured());
    }

    #[test]
    fn invalid_yaml_names_the_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("assessment-routing.yml"), "factRules: [unclosed").unwrap();
        let err = load_config_dir(dir.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Yaml { .. }));
        assert!(err.to_string().contains("assessment-routing.yml"));
    }

    #[test]
    fn missing_directory_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_config_dir(&dir.path().join("nope")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn loads_session_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        fs::write(&path, r#"{ "answers": { "q1": false } }"#).unwrap();
        let session = load_session(&path).unwrap();
        assert_eq!(session.answers.get("q1"), Some("No"));
    }
}
