//! Provenance for computed facts.
//!
//! While a fact rule's `when` is evaluated, a [`ProvenanceCollector`] records
//! which inventory fields, flags and facts made it true. When the rule fires the
//! collector is stored in the [`FactTrace`] against every fact the rule set,
//! so prefill reasons can point back at the inventory data that caused them.

use std::collections::{BTreeMap, BTreeSet};

use riskmap_interchange::{Record, Value, ValueMap};
use serde::Serialize;

/// Tracks references made during one condition evaluation.
#[derive(Debug, Clone, Default)]
pub struct ProvenanceCollector {
    pub fields_used: Vec<String>,
    pub flags_used: Vec<String>,
    pub facts_used: Vec<String>,
}

impl ProvenanceCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_field(&mut self, key: &str) {
        push_unique(&mut self.fields_used, key);
    }

    pub fn record_flag(&mut self, name: &str) {
        push_unique(&mut self.flags_used, name);
    }

    pub fn record_fact(&mut self, name: &str) {
        push_unique(&mut self.facts_used, name);
    }

    /// Append everything `other` recorded.
    pub fn merge(&mut self, other: ProvenanceCollector) {
        for f in &other.fields_used {
            push_unique(&mut self.fields_used, f);
        }
        for f in &other.flags_used {
            push_unique(&mut self.flags_used, f);
        }
        for f in &other.facts_used {
            push_unique(&mut self.facts_used, f);
        }
    }

    /// Finalize into the provenance of a fired rule.
    pub fn into_provenance(self, rule_id: String) -> FactProvenance {
        FactProvenance {
            rule_id,
            fields_used: self.fields_used,
            flags_used: self.flags_used,
            facts_used: self.facts_used,
        }
    }
}

fn push_unique(list: &mut Vec<String>, item: &str) {
    if !list.iter().any(|s| s == item) {
        list.push(item.to_string());
    }
}

/// The rule that last set a fact, and what that rule read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FactProvenance {
    pub rule_id: String,
    pub fields_used: Vec<String>,
    pub flags_used: Vec<String>,
    pub facts_used: Vec<String>,
}

/// Fact name -> provenance of the rule that last wrote it.
///
/// Facts still holding their default value have no entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FactTrace(pub BTreeMap<String, FactProvenance>);

impl FactTrace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, fact: &str) -> Option<&FactProvenance> {
        self.0.get(fact)
    }

    /// Record that `provenance`'s rule set every fact in `set_facts`.
    pub fn record(&mut self, set_facts: &ValueMap, provenance: &FactProvenance) {
        for name in set_facts.0.keys() {
            self.0.insert(name.clone(), provenance.clone());
        }
    }

    /// Inventory fields a fact ultimately derives from, following facts that
    /// were themselves computed from other facts. First-seen order.
    pub fn originating_fields(&self, fact: &str) -> Vec<String> {
        let mut fields = Vec::new();
        let mut visited = BTreeSet::new();
        self.collect_fields(fact, &mut fields, &mut visited);
        fields
    }

    fn collect_fields(&self, fact: &str, out: &mut Vec<String>, visited: &mut BTreeSet<String>) {
        if !visited.insert(fact.to_string()) {
            return;
        }
        if let Some(p) = self.get(fact) {
            for field in &p.fields_used {
                push_unique(out, field);
            }
            for upstream in &p.facts_used {
                self.collect_fields(upstream, out, visited);
            }
        }
    }

    /// Human-readable reason for a fact's value.
    ///
    /// Prefers `field = "value"` pairs for the inventory fields behind the
    /// fact; falls back to `fact = value` when none can be found.
    pub fn describe(&self, fact: &str, facts: &ValueMap, inventory: &Record) -> String {
        let parts: Vec<String> = self
            .originating_fields(fact)
            .iter()
            .filter_map(|field| {
                inventory
                    .get(field)
                    .filter(|v| v.is_present())
                    .map(|v| field_reason(field, v))
            })
            .collect();
        if !parts.is_empty() {
            return parts.join("; ");
        }
        let value = facts.get(fact).cloned().unwrap_or(Value::Null);
        format!("{} = {}", fact, value)
    }
}

/// `field = "value"`.
pub fn field_reason(field: &str, value: &Value) -> String {
    format!("{} = \"{}\"", field, value)
}
