//! Plain data values flowing through the engine: record fields, flags,
//! facts and answers.

use std::collections::BTreeMap;
use std::fmt;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Serialize, Serializer};

use crate::error::ConfigError;

// ──────────────────────────────────────────────
// Values
// ──────────────────────────────────────────────

/// A scalar, a list of scalars, or nothing.
///
/// Numbers are held as `Decimal` so structural equality is exact and
/// `1 == 1.0` holds the way configuration authors expect.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Number(Decimal),
    Text(String),
    List(Vec<Value>),
}

impl Value {
    /// Convert a JSON value. Objects are rejected: records are flat.
    pub fn from_json(key: &str, v: &serde_json::Value) -> Result<Value, ConfigError> {
        match v {
            serde_json::Value::Null => Ok(Value::Null),
            serde_json::Value::Bool(b) => Ok(Value::Bool(*b)),
            serde_json::Value::Number(n) => parse_number(key, n).map(Value::Number),
            serde_json::Value::String(s) => Ok(Value::Text(s.clone())),
            serde_json::Value::Array(items) => items
                .iter()
                .map(|item| Value::from_json(key, item))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::List),
            serde_json::Value::Object(_) => Err(ConfigError::InvalidValue {
                key: key.to_string(),
                message: "nested objects are not supported in flat records".to_string(),
            }),
        }
    }

    /// True when the value counts as "present" for `exists` checks:
    /// not null, not an empty string and not an empty list.
    pub fn is_present(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Text(s) => !s.is_empty(),
            Value::List(items) => !items.is_empty(),
            _ => true,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// Render as an answer label. Booleans become `"Yes"`/`"No"`.
    pub fn to_answer_label(&self) -> String {
        match self {
            Value::Bool(true) => "Yes".to_string(),
            Value::Bool(false) => "No".to_string(),
            other => other.to_string(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Number(d) => write!(f, "{}", d.normalize()),
            Value::Text(s) => write!(f, "{}", s),
            Value::List(items) => {
                let parts: Vec<String> = items.iter().map(|v| v.to_string()).collect();
                write!(f, "{}", parts.join(", "))
            }
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_none(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Number(d) => {
                if d.fract().is_zero() {
                    if let Some(i) = d.to_i64() {
                        return serializer.serialize_i64(i);
                    }
                }
                match d.to_f64() {
                    Some(f) => serializer.serialize_f64(f),
                    None => serializer.serialize_str(&d.to_string()),
                }
            }
            Value::Text(s) => serializer.serialize_str(s),
            Value::List(items) => items.serialize(serializer),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Number(Decimal::from(i))
    }
}

fn parse_number(key: &str, n: &serde_json::Number) -> Result<Decimal, ConfigError> {
    if let Some(i) = n.as_i64() {
        return Ok(Decimal::from(i));
    }
    if let Some(u) = n.as_u64() {
        return Ok(Decimal::from(u));
    }
    let text = n.to_string();
    text.parse::<Decimal>()
        .or_else(|_| Decimal::from_scientific(&text))
        .map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: format!("unrepresentable number {}: {}", text, e),
        })
}

/// Boolean-aware answer matching.
///
/// Answers are stored as labels, while configuration may list `true` or
/// `false` where the form shows "Yes" / "No". Every site that compares an
/// answer label against configured values goes through this function.
pub fn answer_matches(label: &str, candidate: &Value) -> bool {
    match candidate {
        Value::Bool(true) => label == "Yes",
        Value::Bool(false) => label == "No",
        Value::Text(s) => s == label,
        Value::Number(_) => candidate.to_string() == label,
        Value::Null | Value::List(_) => false,
    }
}

/// True when `label` matches any of `candidates` under [`answer_matches`].
pub fn answer_in(label: &str, candidates: &[Value]) -> bool {
    candidates.iter().any(|c| answer_matches(label, c))
}

// ──────────────────────────────────────────────
// Records and maps
// ──────────────────────────────────────────────

/// A flat field map: an inventory record or one repeating-block row.
pub type Record = BTreeMap<String, Value>;

/// Parse a JSON object into a flat record.
pub fn record_from_json(section: &str, v: &serde_json::Value) -> Result<Record, ConfigError> {
    match v {
        serde_json::Value::Null => Ok(Record::new()),
        serde_json::Value::Object(map) => map
            .iter()
            .map(|(k, v)| Value::from_json(k, v).map(|val| (k.clone(), val)))
            .collect(),
        _ => Err(ConfigError::shape(section, "expected an object")),
    }
}

/// Rows of each repeating block, keyed by block id.
///
/// Rows have no identity beyond their position.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RepeatingBlockSet(pub BTreeMap<String, Vec<Record>>);

impl RepeatingBlockSet {
    pub fn new() -> Self {
        RepeatingBlockSet(BTreeMap::new())
    }

    /// Rows of a block. Unknown block ids yield no rows.
    pub fn rows(&self, block_id: &str) -> &[Record] {
        self.0.get(block_id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn insert(&mut self, block_id: impl Into<String>, rows: Vec<Record>) {
        self.0.insert(block_id.into(), rows);
    }

    /// Every row of every block, blocks in id order.
    pub fn all_rows(&self) -> impl Iterator<Item = &Record> {
        self.0.values().flatten()
    }

    pub fn has_rows(&self) -> bool {
        self.0.values().any(|rows| !rows.is_empty())
    }

    /// True when no block is present at all, not even an empty one.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn from_json(v: &serde_json::Value) -> Result<Self, ConfigError> {
        let mut blocks = RepeatingBlockSet::new();
        let map = match v {
            serde_json::Value::Null => return Ok(blocks),
            serde_json::Value::Object(map) => map,
            _ => return Err(ConfigError::shape("repeatBlocks", "expected an object")),
        };
        for (block_id, rows) in map {
            let rows = rows.as_array().ok_or_else(|| {
                ConfigError::shape(
                    format!("repeatBlocks.{}", block_id),
                    "expected an array of rows",
                )
            })?;
            let parsed = rows
                .iter()
                .map(|row| record_from_json(&format!("repeatBlocks.{}", block_id), row))
                .collect::<Result<Vec<_>, _>>()?;
            blocks.insert(block_id.clone(), parsed);
        }
        Ok(blocks)
    }
}

/// Derived name -> value map. Used for both flags and facts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValueMap(pub BTreeMap<String, Value>);

/// Flags computed from inventory data alone.
pub type FlagMap = ValueMap;
/// Facts computed from inventory data and flags.
pub type FactMap = ValueMap;

impl ValueMap {
    pub fn new() -> Self {
        ValueMap(BTreeMap::new())
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    pub fn insert(&mut self, name: impl Into<String>, value: Value) {
        self.0.insert(name.into(), value);
    }

    /// Overwrite entries with those of `other` (last write wins).
    pub fn merge(&mut self, other: &ValueMap) {
        for (k, v) in &other.0 {
            self.0.insert(k.clone(), v.clone());
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn from_json(section: &str, v: &serde_json::Value) -> Result<Self, ConfigError> {
        record_from_json(section, v).map(ValueMap)
    }
}

/// Question id -> answer label.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Answers(pub BTreeMap<String, String>);

impl Answers {
    pub fn new() -> Self {
        Answers(BTreeMap::new())
    }

    pub fn get(&self, question_id: &str) -> Option<&str> {
        self.0.get(question_id).map(String::as_str)
    }

    /// An answer counts only when it is a non-empty label.
    pub fn is_answered(&self, question_id: &str) -> bool {
        self.get(question_id).is_some_and(|a| !a.is_empty())
    }

    pub fn insert(&mut self, question_id: impl Into<String>, label: impl Into<String>) {
        self.0.insert(question_id.into(), label.into());
    }

    /// Parse answers, normalizing booleans to `"Yes"`/`"No"` and dropping nulls.
    pub fn from_json(v: &serde_json::Value) -> Result<Self, ConfigError> {
        let record = record_from_json("answers", v)?;
        Ok(Answers(
            record
                .into_iter()
                .filter(|(_, v)| !v.is_null())
                .map(|(k, v)| (k, v.to_answer_label()))
                .collect(),
        ))
    }
}
