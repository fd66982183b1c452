//! Condition trees: the declarative `when` / `visibleWhen` / `shownWhen`
//! language shared by flag rules, fact rules, routing and form steps.
//!
//! Raw JSON nodes are parsed once into the closed [`Condition`] enum. A node
//! without exactly one recognized top-level key becomes [`Condition::Inert`]
//! and never matches. A recognized key carrying the wrong JSON type is a
//! load error.

use serde_json::Value as Json;

use crate::error::ConfigError;
use crate::values::Value;

/// Atomic comparison applied to one looked-up value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operator {
    /// `(value is present) == expected`.
    Exists(bool),
    Equals(Value),
    NotEquals(Value),
    In(Vec<Value>),
    /// List element test, scalar equality fallback.
    Includes(Value),
    /// List overlap, scalar membership fallback.
    IncludesAny(Vec<Value>),
    /// No recognized operator key. Never matches.
    Unknown,
}

/// A key plus the operator to apply to its value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Predicate {
    pub key: String,
    pub op: Operator,
}

/// A condition node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Condition {
    All(Vec<Condition>),
    Any(Vec<Condition>),
    /// Inventory field, with repeating-block fallback when absent.
    Field(Predicate),
    /// Computed flag (only `equals` / `in` are honored).
    Flag(Predicate),
    /// Computed fact (only `equals` / `in` are honored).
    Fact(Predicate),
    /// True iff some row of the block matches `predicate`.
    RepeatAny {
        block_id: String,
        predicate: Box<Condition>,
    },
    /// Rows matching `predicate` must all satisfy `all_must_satisfy`;
    /// vacuously true when no row matches.
    RepeatAllIfPresent {
        block_id: String,
        predicate: Box<Condition>,
        all_must_satisfy: Box<Condition>,
    },
    /// Malformed or empty node. Always false.
    Inert,
}

const NODE_KEYS: &[&str] = &[
    "all",
    "any",
    "field",
    "flag",
    "fact",
    "repeatAny",
    "repeatAllIfPresent",
];

impl Condition {
    pub fn is_inert(&self) -> bool {
        matches!(self, Condition::Inert)
    }

    /// Visit this node and every descendant, parents first.
    pub fn walk<'a>(&'a self, f: &mut impl FnMut(&'a Condition)) {
        f(self);
        match self {
            Condition::All(children) | Condition::Any(children) => {
                for child in children {
                    child.walk(f);
                }
            }
            Condition::RepeatAny { predicate, .. } => predicate.walk(f),
            Condition::RepeatAllIfPresent {
                predicate,
                all_must_satisfy,
                ..
            } => {
                predicate.walk(f);
                all_must_satisfy.walk(f);
            }
            _ => {}
        }
    }

    /// Fact names referenced anywhere in the tree, in first-seen order.
    pub fn referenced_facts(&self) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::new();
        self.walk(&mut |node| {
            if let Condition::Fact(p) = node {
                if !out.contains(&p.key.as_str()) {
                    out.push(&p.key);
                }
            }
        });
        out
    }

    /// Repeating-block ids named by repeat nodes.
    pub fn referenced_blocks(&self) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::new();
        self.walk(&mut |node| match node {
            Condition::RepeatAny { block_id, .. }
            | Condition::RepeatAllIfPresent { block_id, .. } => {
                if !out.contains(&block_id.as_str()) {
                    out.push(block_id);
                }
            }
            _ => {}
        });
        out
    }
}

// ──────────────────────────────────────────────
// Parsing
// ──────────────────────────────────────────────

/// Parse a condition node. `section` names the location for error messages.
pub fn parse_condition(section: &str, v: &Json) -> Result<Condition, ConfigError> {
    let obj = match v.as_object() {
        Some(obj) => obj,
        None => return Ok(Condition::Inert),
    };

    let present: Vec<&str> = NODE_KEYS
        .iter()
        .copied()
        .filter(|k| obj.contains_key(*k))
        .collect();
    if present.len() != 1 {
        return Ok(Condition::Inert);
    }

    match present[0] {
        "all" => parse_children(section, "all", &obj["all"]).map(Condition::All),
        "any" => parse_children(section, "any", &obj["any"]).map(Condition::Any),
        "field" => parse_predicate(section, "field", v).map(Condition::Field),
        "flag" => parse_predicate(section, "flag", v).map(Condition::Flag),
        "fact" => parse_predicate(section, "fact", v).map(Condition::Fact),
        "repeatAny" => {
            let node = &obj["repeatAny"];
            let block_id = block_id(section, node)?;
            Ok(Condition::RepeatAny {
                block_id,
                predicate: Box::new(optional_condition(section, node, "predicate")?),
            })
        }
        "repeatAllIfPresent" => {
            let node = &obj["repeatAllIfPresent"];
            let block_id = block_id(section, node)?;
            Ok(Condition::RepeatAllIfPresent {
                block_id,
                predicate: Box::new(optional_condition(section, node, "predicate")?),
                all_must_satisfy: Box::new(optional_condition(section, node, "allMustSatisfy")?),
            })
        }
        _ => Ok(Condition::Inert),
    }
}

/// Parse `obj[key]` as a condition when present.
pub fn parse_optional_condition(
    section: &str,
    obj: &Json,
    key: &str,
) -> Result<Option<Condition>, ConfigError> {
    match obj.get(key) {
        None | Some(Json::Null) => Ok(None),
        Some(v) => parse_condition(&format!("{}.{}", section, key), v).map(Some),
    }
}

fn optional_condition(section: &str, node: &Json, key: &str) -> Result<Condition, ConfigError> {
    Ok(parse_optional_condition(section, node, key)?.unwrap_or(Condition::Inert))
}

fn parse_children(section: &str, key: &str, v: &Json) -> Result<Vec<Condition>, ConfigError> {
    let items = v
        .as_array()
        .ok_or_else(|| ConfigError::shape(section, format!("'{}' must be an array", key)))?;
    items
        .iter()
        .enumerate()
        .map(|(i, item)| parse_condition(&format!("{}.{}[{}]", section, key, i), item))
        .collect()
}

fn block_id(section: &str, node: &Json) -> Result<String, ConfigError> {
    node.get("blockId")
        .and_then(Json::as_str)
        .map(str::to_string)
        .ok_or_else(|| ConfigError::shape(section, "repeat condition missing 'blockId'"))
}

fn parse_predicate(section: &str, target: &str, v: &Json) -> Result<Predicate, ConfigError> {
    let key = v[target]
        .as_str()
        .ok_or_else(|| ConfigError::shape(section, format!("'{}' must be a string", target)))?
        .to_string();

    let op = if let Some(e) = v.get("exists") {
        let expected = e
            .as_bool()
            .ok_or_else(|| ConfigError::shape(section, "'exists' must be a boolean"))?;
        Operator::Exists(expected)
    } else if let Some(e) = v.get("equals") {
        Operator::Equals(Value::from_json(&key, e)?)
    } else if let Some(e) = v.get("notEquals") {
        Operator::NotEquals(Value::from_json(&key, e)?)
    } else if let Some(e) = v.get("in") {
        Operator::In(value_list(section, "in", &key, e)?)
    } else if let Some(e) = v.get("includes") {
        Operator::Includes(Value::from_json(&key, e)?)
    } else if let Some(e) = v.get("includesAny") {
        Operator::IncludesAny(value_list(section, "includesAny", &key, e)?)
    } else {
        Operator::Unknown
    };

    Ok(Predicate { key, op })
}

fn value_list(section: &str, op: &str, key: &str, v: &Json) -> Result<Vec<Value>, ConfigError> {
    let items = v
        .as_array()
        .ok_or_else(|| ConfigError::shape(section, format!("'{}' must be an array", op)))?;
    items.iter().map(|item| Value::from_json(key, item)).collect()
}
