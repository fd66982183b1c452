//! Assessment routing configuration: fact rules and the routing entries that
//! turn facts into prefilled use cases, personas and question answers.

use serde_json::Value as Json;

use crate::condition::{parse_condition, parse_optional_condition, Condition};
use crate::error::ConfigError;
use crate::inventory::{array, opt_str, required_str};
use crate::values::{FactMap, Value, ValueMap};

/// One ordered `when -> setFacts` rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FactRule {
    pub id: Option<String>,
    pub text: Option<String>,
    pub when: Option<Condition>,
    pub set_facts: ValueMap,
}

impl FactRule {
    pub fn label(&self, index: usize) -> String {
        self.id
            .clone()
            .unwrap_or_else(|| format!("factRules[{}]", index))
    }
}

/// Map an inventory field's value to assessment use-case labels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UseCasePrefill {
    pub source_field: String,
    /// Inventory value -> use-case label, in declared order.
    pub map: Vec<(String, String)>,
}

impl UseCasePrefill {
    pub fn lookup(&self, inventory_value: &str) -> Option<&str> {
        self.map
            .iter()
            .find(|(from, _)| from == inventory_value)
            .map(|(_, to)| to.as_str())
    }
}

/// `defaultAnswerFromFacts` entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerDefault {
    pub when: Condition,
    pub answer: Value,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionRule {
    pub question_id: String,
    pub visible_when: Option<Condition>,
    pub default_answer_from_facts: Vec<AnswerDefault>,
}

/// One `assessmentRouting` entry.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RoutingEntry {
    pub id: Option<String>,
    pub use_cases: Vec<UseCasePrefill>,
    /// Persona id -> condition over facts, in declared order.
    pub personas: Vec<(String, Condition)>,
    pub question_rules: Vec<QuestionRule>,
}

/// The parsed `assessment-routing` configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoutingConfig {
    pub fact_defaults: FactMap,
    pub fact_rules: Vec<FactRule>,
    pub entries: Vec<RoutingEntry>,
}

impl RoutingConfig {
    pub fn from_json(v: &Json) -> Result<Self, ConfigError> {
        if v.is_null() {
            return Ok(RoutingConfig::default());
        }

        let defaults = v
            .get("factDefaults")
            .or_else(|| v.get("facts").and_then(|f| f.get("defaults")));
        let fact_defaults = match defaults {
            Some(d) => ValueMap::from_json("factDefaults", d)?,
            None => ValueMap::new(),
        };

        let fact_rules = array(v, "factRules", "routing")?
            .iter()
            .enumerate()
            .map(|(i, r)| parse_fact_rule(&format!("factRules[{}]", i), r))
            .collect::<Result<Vec<_>, _>>()?;

        let entries = array(v, "assessmentRouting", "routing")?
            .iter()
            .enumerate()
            .map(|(i, e)| parse_entry(&format!("assessmentRouting[{}]", i), e))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(RoutingConfig {
            fact_defaults,
            fact_rules,
            entries,
        })
    }
}

fn parse_fact_rule(section: &str, v: &Json) -> Result<FactRule, ConfigError> {
    let when = match v.get("when") {
        None | Some(Json::Null) => None,
        Some(w) => Some(parse_condition(&format!("{}.when", section), w)?),
    };
    let set_facts = match v.get("setFacts") {
        None | Some(Json::Null) => ValueMap::new(),
        Some(f) => ValueMap::from_json(&format!("{}.setFacts", section), f)?,
    };
    Ok(FactRule {
        id: opt_str(v, "id"),
        text: opt_str(v, "text"),
        when,
        set_facts,
    })
}

fn parse_use_case_prefill(section: &str, v: &Json) -> Result<UseCasePrefill, ConfigError> {
    let source_field = required_str(v, "sourceField", section)?;
    let map = match v.get("map") {
        None | Some(Json::Null) => Vec::new(),
        Some(Json::Object(m)) => m
            .iter()
            .filter_map(|(from, to)| to.as_str().map(|t| (from.clone(), t.to_string())))
            .collect(),
        Some(_) => return Err(ConfigError::shape(section, "'map' must be an object")),
    };
    Ok(UseCasePrefill { source_field, map })
}

fn parse_entry(section: &str, v: &Json) -> Result<RoutingEntry, ConfigError> {
    let use_cases = match v.get("prefill").and_then(|p| p.get("useCases")) {
        None | Some(Json::Null) => Vec::new(),
        Some(Json::Array(items)) => items
            .iter()
            .enumerate()
            .map(|(i, u)| parse_use_case_prefill(&format!("{}.prefill.useCases[{}]", section, i), u))
            .collect::<Result<Vec<_>, _>>()?,
        Some(single) => vec![parse_use_case_prefill(
            &format!("{}.prefill.useCases", section),
            single,
        )?],
    };

    let personas = match v.get("personas") {
        None | Some(Json::Null) => Vec::new(),
        Some(Json::Object(m)) => m
            .iter()
            .map(|(persona, cond)| {
                parse_condition(&format!("{}.personas.{}", section, persona), cond)
                    .map(|c| (persona.clone(), c))
            })
            .collect::<Result<Vec<_>, _>>()?,
        Some(_) => return Err(ConfigError::shape(section, "'personas' must be an object")),
    };

    let question_rules = array(v, "questionRules", section)?
        .iter()
        .enumerate()
        .map(|(i, q)| parse_question_rule(&format!("{}.questionRules[{}]", section, i), q))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(RoutingEntry {
        id: opt_str(v, "id"),
        use_cases,
        personas,
        question_rules,
    })
}

fn parse_question_rule(section: &str, v: &Json) -> Result<QuestionRule, ConfigError> {
    let question_id = required_str(v, "questionId", section)?;
    let default_answer_from_facts = array(v, "defaultAnswerFromFacts", section)?
        .iter()
        .enumerate()
        .map(|(i, d)| {
            let entry_section = format!("{}.defaultAnswerFromFacts[{}]", section, i);
            let answer = d.get("answer").unwrap_or(&Json::Null);
            Ok(AnswerDefault {
                when: parse_optional_condition(&entry_section, d, "when")?
                    .unwrap_or(Condition::Inert),
                answer: Value::from_json(&question_id, answer)?,
            })
        })
        .collect::<Result<Vec<_>, ConfigError>>()?;

    Ok(QuestionRule {
        visible_when: parse_optional_condition(section, v, "visibleWhen")?,
        question_id,
        default_answer_from_facts,
    })
}
