//! Fact rule ordering.
//!
//! Fact rules run in one forward pass. A rule that reads a fact first set
//! by a later rule sees only the default (or nothing), so it silently
//! under-computes. Those reads are reported here.

use riskmap_interchange::RiskMapConfig;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ForwardReference {
    /// Label of the reading rule.
    pub rule: String,
    pub rule_index: usize,
    pub fact: String,
    /// Labels of the later rules that set the fact.
    pub set_by: Vec<String>,
    pub has_default: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FactOrderResult {
    pub rules_checked: usize,
    pub forward_references: Vec<ForwardReference>,
}

pub fn analyze_fact_order(config: &RiskMapConfig) -> FactOrderResult {
    let rules = &config.routing.fact_rules;
    let mut forward_references = Vec::new();

    for (i, rule) in rules.iter().enumerate() {
        let Some(when) = &rule.when else {
            continue;
        };
        for fact in when.referenced_facts() {
            let sets = |r: &riskmap_interchange::FactRule| r.set_facts.get(fact).is_some();
            if rules[..i].iter().any(sets) {
                continue;
            }
            let set_by: Vec<String> = rules
                .iter()
                .enumerate()
                .skip(i + 1)
                .filter(|(_, r)| sets(r))
                .map(|(j, r)| r.label(j))
                .collect();
            if set_by.is_empty() {
                continue;
            }
            forward_references.push(ForwardReference {
                rule: rule.label(i),
                rule_index: i,
                fact: fact.to_string(),
                set_by,
                has_default: config.routing.fact_defaults.get(fact).is_some(),
            });
        }
    }

    FactOrderResult {
        rules_checked: rules.len(),
        forward_references,
    }
}
