//! Per-session input: inventory data, repeating blocks, answers and
//! selections supplied by the host on every recomputation.

use serde_json::Value as Json;

use crate::error::ConfigError;
use crate::inventory::string_list;
use crate::normalize::normalize_top_level;
use crate::values::{record_from_json, Answers, Record, RepeatingBlockSet};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssessmentSession {
    pub inventory: Record,
    pub repeat_blocks: RepeatingBlockSet,
    pub answers: Answers,
    pub selected_personas: Vec<String>,
    pub selected_use_cases: Vec<String>,
}

impl AssessmentSession {
    /// Parse `{inventory, repeatBlocks, answers, selectedPersonas, selectedUseCases}`.
    /// Every key is optional. Top-level key aliases are accepted
    /// (`repeat_blocks` and friends); inventory fields, repeat rows and
    /// answer ids are host data and keep their spelling.
    pub fn from_json(v: &Json) -> Result<Self, ConfigError> {
        let v = normalize_top_level(v.clone());
        if !(v.is_object() || v.is_null()) {
            return Err(ConfigError::shape("session", "expected an object"));
        }
        Ok(AssessmentSession {
            inventory: record_from_json("inventory", v.get("inventory").unwrap_or(&Json::Null))?,
            repeat_blocks: RepeatingBlockSet::from_json(
                v.get("repeatBlocks").unwrap_or(&Json::Null),
            )?,
            answers: Answers::from_json(v.get("answers").unwrap_or(&Json::Null))?,
            selected_personas: string_list(&v, "selectedPersonas"),
            selected_use_cases: string_list(&v, "selectedUseCases"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::values::Value;
    use serde_json::json;

    #[test]
    fn parses_full_session() {
        let session = AssessmentSession::from_json(&json!({
            "inventory": { "modelCreator": "Acme Corp", "tags": ["a", "b"] },
            "repeat_blocks": { "dataSources": [{ "usesPII": true }] },
            "answers": { "q1": true },
            "selectedPersonas": ["personaModelCreator"],
            "selected_use_cases": ["automatedDecisioning"]
        }))
        .unwrap();
        assert_eq!(
            session.inventory.get("modelCreator"),
            Some(&Value::from("Acme Corp"))
        );
        assert_eq!(session.repeat_blocks.rows("dataSources").len(), 1);
        assert_eq!(session.answers.get("q1"), Some("Yes"));
        assert_eq!(session.selected_personas, vec!["personaModelCreator"]);
        assert_eq!(session.selected_use_cases, vec!["automatedDecisioning"]);
    }

    #[test]
    fn host_keys_are_not_aliased() {
        let session = AssessmentSession::from_json(&json!({
            "inventory": { "use_cases": "Credit scoring" },
            "repeat_blocks": { "models": [{ "block_id": "m1" }] },
            "answers": { "question_id": "Yes" }
        }))
        .unwrap();
        assert_eq!(
            session.inventory.keys().collect::<Vec<_>>(),
            vec!["use_cases"]
        );
        assert_eq!(
            session.repeat_blocks.rows("models")[0].get("block_id"),
            Some(&Value::from("m1"))
        );
        assert_eq!(session.answers.get("question_id"), Some("Yes"));
    }

    #[test]
    fn empty_session_is_default() {
        let session = AssessmentSession::from_json(&json!({})).unwrap();
        assert_eq!(session, AssessmentSession::default());
    }

    #[test]
    fn non_object_session_is_an_error() {
        assert!(AssessmentSession::from_json(&json!([1, 2])).is_err());
    }
}
