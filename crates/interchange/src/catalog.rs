//! Risk, control and persona catalogs.

use serde::Serialize;
use serde_json::Value as Json;

use crate::error::ConfigError;
use crate::inventory::{array, opt_str, required_str, string_list};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskEntry {
    pub id: String,
    pub title: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub controls: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ControlEntry {
    pub id: String,
    pub title: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub risks: Vec<String>,
    pub personas: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PersonaEntry {
    pub id: String,
    pub title: Option<String>,
    pub description: Option<String>,
}

/// Risks, controls and personas, each in declared order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    pub risks: Vec<RiskEntry>,
    pub controls: Vec<ControlEntry>,
    pub personas: Vec<PersonaEntry>,
}

impl Catalog {
    pub fn risk(&self, id: &str) -> Option<&RiskEntry> {
        self.risks.iter().find(|r| r.id == id)
    }

    pub fn control(&self, id: &str) -> Option<&ControlEntry> {
        self.controls.iter().find(|c| c.id == id)
    }

    pub fn persona(&self, id: &str) -> Option<&PersonaEntry> {
        self.personas.iter().find(|p| p.id == id)
    }

    /// Build from the three raw documents. A null document is an empty list.
    pub fn from_json(risks: &Json, controls: &Json, personas: &Json) -> Result<Self, ConfigError> {
        let risks = array(risks, "risks", "risks")?
            .iter()
            .enumerate()
            .map(|(i, r)| {
                Ok(RiskEntry {
                    id: required_str(r, "id", &format!("risks[{}]", i))?,
                    title: opt_str(r, "title"),
                    category: opt_str(r, "category"),
                    description: text_block(r, "shortDescription")
                        .or_else(|| text_block(r, "description")),
                    controls: string_list(r, "controls"),
                })
            })
            .collect::<Result<Vec<_>, ConfigError>>()?;

        let controls = array(controls, "controls", "controls")?
            .iter()
            .enumerate()
            .map(|(i, c)| {
                Ok(ControlEntry {
                    id: required_str(c, "id", &format!("controls[{}]", i))?,
                    title: opt_str(c, "title"),
                    category: opt_str(c, "category"),
                    description: text_block(c, "description"),
                    risks: string_list(c, "risks"),
                    personas: string_list(c, "personas"),
                })
            })
            .collect::<Result<Vec<_>, ConfigError>>()?;

        let personas = array(personas, "personas", "personas")?
            .iter()
            .enumerate()
            .map(|(i, p)| {
                Ok(PersonaEntry {
                    id: required_str(p, "id", &format!("personas[{}]", i))?,
                    title: opt_str(p, "title"),
                    description: text_block(p, "description"),
                })
            })
            .collect::<Result<Vec<_>, ConfigError>>()?;

        Ok(Catalog {
            risks,
            controls,
            personas,
        })
    }
}

/// Descriptions are a string or a list of paragraphs joined with spaces.
fn text_block(v: &Json, key: &str) -> Option<String> {
    match v.get(key)? {
        Json::String(s) => Some(s.clone()),
        Json::Array(parts) => {
            let joined: Vec<&str> = parts.iter().filter_map(Json::as_str).collect();
            if joined.is_empty() {
                None
            } else {
                Some(joined.join(" "))
            }
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_catalog_documents() {
        let catalog = Catalog::from_json(
            &json!({ "risks": [{
                "id": "DP", "title": "Data Poisoning", "category": "risksSupplyChainAndDevelopment",
                "shortDescription": ["Altering training data", "to change behavior."],
                "controls": ["controlTrainingDataSanitization", "controlModelAndDataIntegrityManagement"]
            }]}),
            &json!({ "controls": [{
                "id": "controlTrainingDataSanitization", "title": "Training Data Sanitization",
                "risks": ["DP"], "personas": ["personaModelCreator"]
            }]}),
            &json!({ "personas": [{ "id": "personaModelCreator", "title": "Model Creator" }] }),
        )
        .unwrap();

        let risk = catalog.risk("DP").unwrap();
        assert_eq!(
            risk.description.as_deref(),
            Some("Altering training data to change behavior.")
        );
        assert_eq!(risk.controls.len(), 2);
        assert_eq!(
            catalog.control("controlTrainingDataSanitization").unwrap().risks,
            vec!["DP"]
        );
        assert_eq!(
            catalog.persona("personaModelCreator").unwrap().title.as_deref(),
            Some("Model Creator")
        );
    }

    #[test]
    fn null_documents_are_empty() {
        let catalog = Catalog::from_json(&Json::Null, &Json::Null, &Json::Null).unwrap();
        assert!(catalog.risks.is_empty());
        assert!(catalog.control("x").is_none());
    }

    #[test]
    fn risk_without_id_is_an_error() {
        let err = Catalog::from_json(&json!({ "risks": [{ "title": "x" }] }), &Json::Null, &Json::Null)
            .unwrap_err();
        assert!(err.to_string().contains("risks[0]"));
    }
}
