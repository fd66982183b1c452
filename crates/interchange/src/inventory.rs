//! AI inventory intake schema: steps, fields, flag defaults and the ordered
//! rule list that computes flags and step states.

use serde_json::Value as Json;

use crate::condition::{parse_condition, parse_optional_condition, Condition};
use crate::error::ConfigError;
use crate::values::{FlagMap, ValueMap};

/// How conflicting `stepState.required` values are resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RequirednessPolicy {
    /// Any rule asserting `required: true` wins.
    RequiredWins,
    /// The last rule to set `required` wins.
    #[default]
    LastWins,
}

/// Relevance track a field belongs to when none is declared.
pub const DEFAULT_RELEVANCE: &str = "neither";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDecl {
    pub key: String,
    pub label: Option<String>,
    /// Declared widget type (`text`, `textOptional`, `autoId`, ...).
    pub field_type: Option<String>,
    /// Relevance track, camelCase: `neither`, `modelCreator`, `modelUsage`
    /// or `both`.
    pub relevance: String,
    pub visible_when: Option<Condition>,
}

impl FieldDecl {
    /// Generated identifiers are never counted towards completion.
    pub fn is_auto_id(&self) -> bool {
        matches!(self.field_type.as_deref(), Some("autoId" | "auto_id"))
    }

    /// Types the user may leave empty without the field being reported
    /// missing.
    pub fn is_optional_type(&self) -> bool {
        self.is_auto_id()
            || matches!(
                self.field_type.as_deref(),
                Some("textOptional" | "text_optional" | "numberOptional" | "number_optional")
            )
    }

    /// Label if declared, else the key.
    pub fn display_name(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.key)
    }
}

fn relevance_track(raw: Option<String>) -> String {
    match raw.as_deref() {
        None => DEFAULT_RELEVANCE.to_string(),
        Some("model_creator") => "modelCreator".to_string(),
        Some("model_usage") => "modelUsage".to_string(),
        Some(_) => raw.unwrap_or_default(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepeatingBlockDecl {
    pub id: String,
    pub fields: Vec<FieldDecl>,
}

/// `displayRules` entry: hide the listed steps when `when` holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayRule {
    pub when: Condition,
    pub hide_steps: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepDecl {
    pub id: String,
    pub title: Option<String>,
    pub fields: Vec<FieldDecl>,
    pub repeating_blocks: Vec<RepeatingBlockDecl>,
    pub display_rules: Vec<DisplayRule>,
    pub shown_when: Option<Condition>,
    pub optional_when: Option<Condition>,
}

/// `stepState` payload of a rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepStateDecl {
    pub step_id: String,
    pub required: Option<bool>,
    pub collapsed_by_default: Option<bool>,
}

/// One ordered inventory rule. A rule may set flags, a step state, or both.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlagRule {
    pub id: Option<String>,
    pub text: Option<String>,
    pub when: Option<Condition>,
    pub set_flags: Option<ValueMap>,
    pub step_state: Option<StepStateDecl>,
}

impl FlagRule {
    /// Label used in logs and analysis findings.
    pub fn label(&self, index: usize) -> String {
        self.id
            .clone()
            .unwrap_or_else(|| format!("rules[{}]", index))
    }
}

/// The parsed `ai-inventory` schema.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InventorySchema {
    pub steps: Vec<StepDecl>,
    pub flag_defaults: FlagMap,
    pub rules: Vec<FlagRule>,
    pub requiredness: RequirednessPolicy,
}

impl InventorySchema {
    pub fn from_json(v: &Json) -> Result<Self, ConfigError> {
        if v.is_null() {
            return Ok(InventorySchema::default());
        }

        let steps = array(v, "steps", "inventory")?
            .iter()
            .enumerate()
            .map(|(i, s)| parse_step(&format!("steps[{}]", i), s))
            .collect::<Result<Vec<_>, _>>()?;

        let flag_defaults = match v.get("flags").and_then(|f| f.get("defaults")) {
            Some(d) => ValueMap::from_json("flags.defaults", d)?,
            None => ValueMap::new(),
        };

        let rules = array(v, "rules", "inventory")?
            .iter()
            .enumerate()
            .map(|(i, r)| parse_rule(&format!("rules[{}]", i), r))
            .collect::<Result<Vec<_>, _>>()?;

        let requiredness = match v
            .get("ruleEvaluation")
            .and_then(|r| r.get("conflictResolution"))
            .and_then(|c| c.get("requiredness"))
            .and_then(Json::as_str)
        {
            Some("requiredWins") => RequirednessPolicy::RequiredWins,
            _ => RequirednessPolicy::LastWins,
        };

        Ok(InventorySchema {
            steps,
            flag_defaults,
            rules,
            requiredness,
        })
    }

    pub fn step(&self, id: &str) -> Option<&StepDecl> {
        self.steps.iter().find(|s| s.id == id)
    }

    /// Every repeating-block id declared by any step.
    pub fn block_ids(&self) -> Vec<&str> {
        self.steps
            .iter()
            .flat_map(|s| s.repeating_blocks.iter().map(|b| b.id.as_str()))
            .collect()
    }
}

// ──────────────────────────────────────────────
// Parsing helpers
// ──────────────────────────────────────────────

/// `v[key]` as an array; absent means empty.
pub(crate) fn array<'a>(v: &'a Json, key: &str, section: &str) -> Result<&'a [Json], ConfigError> {
    match v.get(key) {
        None | Some(Json::Null) => Ok(&[][..]),
        Some(Json::Array(items)) => Ok(items),
        Some(_) => Err(ConfigError::shape(
            section,
            format!("'{}' must be an array", key),
        )),
    }
}

/// `v[key]` as a list of strings; absent means empty, non-strings are skipped.
pub(crate) fn string_list(v: &Json, key: &str) -> Vec<String> {
    v.get(key)
        .and_then(Json::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|s| s.as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}

pub(crate) fn opt_str(v: &Json, key: &str) -> Option<String> {
    v.get(key).and_then(Json::as_str).map(str::to_string)
}

pub(crate) fn required_str(v: &Json, key: &str, section: &str) -> Result<String, ConfigError> {
    opt_str(v, key).ok_or_else(|| ConfigError::shape(section, format!("missing '{}'", key)))
}

fn parse_field(section: &str, v: &Json) -> Result<FieldDecl, ConfigError> {
    Ok(FieldDecl {
        key: required_str(v, "key", section)?,
        label: opt_str(v, "label"),
        field_type: opt_str(v, "type"),
        relevance: relevance_track(opt_str(v, "relevance")),
        visible_when: parse_optional_condition(section, v, "visibleWhen")?,
    })
}

fn parse_fields(section: &str, v: &Json) -> Result<Vec<FieldDecl>, ConfigError> {
    array(v, "fields", section)?
        .iter()
        .enumerate()
        .map(|(i, f)| parse_field(&format!("{}.fields[{}]", section, i), f))
        .collect()
}

fn parse_step(section: &str, v: &Json) -> Result<StepDecl, ConfigError> {
    let id = required_str(v, "id", section)?;

    // Section fields are flattened into the step.
    let mut fields = parse_fields(section, v)?;
    for (i, s) in array(v, "sections", section)?.iter().enumerate() {
        fields.extend(parse_fields(&format!("{}.sections[{}]", section, i), s)?);
    }

    let repeating_blocks = array(v, "repeatingBlocks", section)?
        .iter()
        .enumerate()
        .map(|(i, b)| {
            let block_section = format!("{}.repeatingBlocks[{}]", section, i);
            Ok(RepeatingBlockDecl {
                id: required_str(b, "id", &block_section)?,
                fields: parse_fields(&block_section, b)?,
            })
        })
        .collect::<Result<Vec<_>, ConfigError>>()?;

    let display_rules = array(v, "displayRules", section)?
        .iter()
        .enumerate()
        .map(|(i, r)| {
            let rule_section = format!("{}.displayRules[{}]", section, i);
            Ok(DisplayRule {
                when: parse_optional_condition(&rule_section, r, "when")?
                    .unwrap_or(Condition::Inert),
                hide_steps: string_list(r, "hideSteps"),
            })
        })
        .collect::<Result<Vec<_>, ConfigError>>()?;

    let visibility = v.get("visibilityLogic").cloned().unwrap_or(Json::Null);
    let vis_section = format!("{}.visibilityLogic", section);

    Ok(StepDecl {
        id,
        title: opt_str(v, "title"),
        fields,
        repeating_blocks,
        display_rules,
        shown_when: parse_optional_condition(&vis_section, &visibility, "shownWhen")?,
        optional_when: parse_optional_condition(&vis_section, &visibility, "optionalWhen")?,
    })
}

fn parse_rule(section: &str, v: &Json) -> Result<FlagRule, ConfigError> {
    let when = match v.get("when") {
        None | Some(Json::Null) => None,
        Some(w) => Some(parse_condition(&format!("{}.when", section), w)?),
    };

    let set_flags = match v.get("setFlags") {
        None | Some(Json::Null) => None,
        Some(f) => Some(ValueMap::from_json(&format!("{}.setFlags", section), f)?),
    };

    let step_state = match v.get("stepState") {
        None | Some(Json::Null) => None,
        Some(s) => Some(StepStateDecl {
            step_id: required_str(s, "stepId", &format!("{}.stepState", section))?,
            required: s.get("required").and_then(Json::as_bool),
            collapsed_by_default: s.get("collapsedByDefault").and_then(Json::as_bool),
        }),
    };

    Ok(FlagRule {
        id: opt_str(v, "id"),
        text: opt_str(v, "text"),
        when,
        set_flags,
        step_state,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::values::Value;
    use serde_json::json;

    #[test]
    fn parses_steps_rules_and_policy() {
        let schema = InventorySchema::from_json(&json!({
            "steps": [
                {
                    "id": "step1",
                    "title": "Routing",
                    "fields": [{ "key": "modelCreator" }],
                    "sections": [{ "fields": [{ "key": "useCaseName" }] }],
                    "displayRules": [
                        { "when": { "any": [{ "field": "modelCreator", "equals": "No" }] },
                          "hideSteps": ["step3"] }
                    ]
                },
                {
                    "id": "step4",
                    "repeatingBlocks": [{ "id": "block4Models", "fields": [{ "key": "modelName" }] }],
                    "visibilityLogic": { "shownWhen": { "any": [{ "flag": "usesModels", "equals": true }] } }
                }
            ],
            "flags": { "defaults": { "usesModels": false } },
            "rules": [
                { "id": "r1",
                  "when": { "any": [{ "field": "modelUsage", "exists": true }] },
                  "setFlags": { "usesModels": true },
                  "stepState": { "stepId": "step4", "required": true } }
            ],
            "ruleEvaluation": { "conflictResolution": { "requiredness": "requiredWins" } }
        }))
        .unwrap();

        assert_eq!(schema.steps.len(), 2);
        assert_eq!(schema.steps[0].fields.len(), 2);
        assert_eq!(schema.steps[0].display_rules[0].hide_steps, vec!["step3"]);
        assert!(schema.steps[1].shown_when.is_some());
        assert_eq!(schema.block_ids(), vec!["block4Models"]);
        assert_eq!(schema.flag_defaults.get("usesModels"), Some(&Value::Bool(false)));
        assert_eq!(schema.rules[0].step_state.as_ref().unwrap().required, Some(true));
        assert_eq!(schema.requiredness, RequirednessPolicy::RequiredWins);
    }

    #[test]
    fn null_schema_is_empty() {
        let schema = InventorySchema::from_json(&Json::Null).unwrap();
        assert!(schema.steps.is_empty());
        assert!(schema.rules.is_empty());
        assert_eq!(schema.requiredness, RequirednessPolicy::LastWins);
    }

    #[test]
    fn step_without_id_is_an_error() {
        let err = InventorySchema::from_json(&json!({ "steps": [{ "title": "x" }] })).unwrap_err();
        assert!(err.to_string().contains("steps[0]"));
    }

    #[test]
    fn field_type_and_relevance() {
        let schema = InventorySchema::from_json(&json!({
            "steps": [{
                "id": "step1",
                "fields": [
                    { "key": "recordId", "type": "auto_id" },
                    { "key": "notes", "type": "textOptional", "relevance": "model_usage" },
                    { "key": "owner", "label": "Owner", "relevance": "both" }
                ]
            }]
        }))
        .unwrap();
        let fields = &schema.steps[0].fields;
        assert!(fields[0].is_auto_id());
        assert_eq!(fields[0].relevance, DEFAULT_RELEVANCE);
        assert!(fields[1].is_optional_type());
        assert!(!fields[1].is_auto_id());
        assert_eq!(fields[1].relevance, "modelUsage");
        assert!(!fields[2].is_optional_type());
        assert_eq!(fields[2].display_name(), "Owner");
        assert_eq!(fields[1].display_name(), "notes");
    }
}
