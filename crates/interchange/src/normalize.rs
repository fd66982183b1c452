//! Load-time canonicalization of configuration key aliases.
//!
//! Configuration files written by different authors mix camelCase and
//! snake_case spellings of the same key. Every raw tree passes through
//! [`normalize_keys`] exactly once before it is parsed, so the parsers and
//! the engine only ever see the canonical spelling.

use serde_json::{Map, Value};

/// Alias -> canonical key.
///
/// Condition, routing and inventory keys are canonically camelCase. Tier
/// scoring keys are canonically snake_case, so their camelCase spelling is
/// the alias.
const KEY_ALIASES: &[(&str, &str)] = &[
    // conditions
    ("not_equals", "notEquals"),
    ("includes_any", "includesAny"),
    ("repeat_any", "repeatAny"),
    ("repeat_all_if_present", "repeatAllIfPresent"),
    ("block_id", "blockId"),
    ("all_must_satisfy", "allMustSatisfy"),
    // inventory schema
    ("repeating_blocks", "repeatingBlocks"),
    ("visible_when", "visibleWhen"),
    ("display_rules", "displayRules"),
    ("hide_steps", "hideSteps"),
    ("visibility_logic", "visibilityLogic"),
    ("shown_when", "shownWhen"),
    ("optional_when", "optionalWhen"),
    ("set_flags", "setFlags"),
    ("step_state", "stepState"),
    ("step_id", "stepId"),
    ("collapsed_by_default", "collapsedByDefault"),
    ("rule_evaluation", "ruleEvaluation"),
    ("conflict_resolution", "conflictResolution"),
    // routing
    ("set_facts", "setFacts"),
    ("fact_rules", "factRules"),
    ("fact_defaults", "factDefaults"),
    ("assessment_routing", "assessmentRouting"),
    ("question_rules", "questionRules"),
    ("question_id", "questionId"),
    ("default_answer_from_facts", "defaultAnswerFromFacts"),
    ("use_cases", "useCases"),
    ("source_field", "sourceField"),
    // session
    ("repeat_blocks", "repeatBlocks"),
    ("selected_personas", "selectedPersonas"),
    ("selected_use_cases", "selectedUseCases"),
    // self-assessment / tier config
    ("self_assessment", "selfAssessment"),
    ("default_tier", "defaultTier"),
    ("gate_order", "gateOrder"),
    ("baseline_tier", "baselineTier"),
    ("escalation_rules", "escalationRules"),
    ("ifAnswerIn", "if_answer_in"),
    ("thenTier", "then_tier"),
    ("setMinimumTier", "set_minimum_tier"),
    ("inAnswers", "in_answers"),
];

/// Objects whose keys are user data (flag, fact, persona, gate and use-case
/// names). Their keys are kept verbatim; their values are still normalized.
const DATA_KEYED: &[&str] = &[
    "setFacts",
    "setFlags",
    "defaults",
    "factDefaults",
    "map",
    "personas",
    "gates",
];

/// Return the canonical spelling of a configuration key.
pub fn canonical_key(key: &str) -> &str {
    KEY_ALIASES
        .iter()
        .find(|(alias, _)| *alias == key)
        .map(|(_, canonical)| *canonical)
        .unwrap_or(key)
}

/// Recursively rewrite aliased object keys to their canonical spelling.
///
/// When both spellings are present in the same object the canonical one
/// wins and the alias is dropped. Keys of the objects named in `DATA_KEYED`
/// are never rewritten.
pub fn normalize_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(canonicalize_map(map, true)),
        Value::Array(items) => Value::Array(items.into_iter().map(normalize_keys).collect()),
        other => other,
    }
}

/// Rewrite only the keys of the top-level object. Nested values are left
/// as they are.
pub fn normalize_top_level(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(canonicalize_map(map, false)),
        other => other,
    }
}

fn canonicalize_map(map: Map<String, Value>, recurse: bool) -> Map<String, Value> {
    let mut out = Map::with_capacity(map.len());
    let mut aliased = Vec::new();
    for (key, child) in map {
        let canonical = canonical_key(&key).to_string();
        let child = match child {
            _ if !recurse => child,
            Value::Object(m) if DATA_KEYED.contains(&canonical.as_str()) => Value::Object(
                m.into_iter()
                    .map(|(name, v)| (name, normalize_keys(v)))
                    .collect(),
            ),
            other => normalize_keys(other),
        };
        if canonical == key {
            out.insert(key, child);
        } else {
            aliased.push((canonical, child));
        }
    }
    for (key, child) in aliased {
        if !out.contains_key(&key) {
            out.insert(key, child);
        }
    }
    out
}
