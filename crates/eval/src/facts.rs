//! Fact engine: one forward sweep of ordered fact rules.
//!
//! Each rule sees the flags plus the facts accumulated so far, so a rule may
//! depend on an earlier rule's output but never on a later one's.

use riskmap_interchange::{FactMap, FlagMap, Record, RepeatingBlockSet, RoutingConfig};
use tracing::debug;

use crate::condition::{eval_when_traced, ConditionContext};
use crate::provenance::{FactTrace, ProvenanceCollector};

pub fn compute_facts(
    routing: &RoutingConfig,
    inventory: &Record,
    blocks: &RepeatingBlockSet,
    flags: &FlagMap,
) -> FactMap {
    compute_facts_traced(routing, inventory, blocks, flags).0
}

/// Compute facts along with the rule provenance of every fact a rule set.
pub fn compute_facts_traced(
    routing: &RoutingConfig,
    inventory: &Record,
    blocks: &RepeatingBlockSet,
    flags: &FlagMap,
) -> (FactMap, FactTrace) {
    let mut facts = routing.fact_defaults.clone();
    let mut trace = FactTrace::new();

    for (index, rule) in routing.fact_rules.iter().enumerate() {
        let Some(when) = &rule.when else {
            continue;
        };
        let mut collector = ProvenanceCollector::new();
        let fired = {
            let ctx = ConditionContext::new(inventory, blocks)
                .with_flags(flags)
                .with_facts(&facts);
            eval_when_traced(when, &ctx, &mut collector)
        };
        if fired {
            let label = rule.label(index);
            debug!(rule = %label, facts = ?rule.set_facts.0.keys().collect::<Vec<_>>(), "fact rule fired");
            facts.merge(&rule.set_facts);
            trace.record(&rule.set_facts, &collector.into_provenance(label));
        }
    }

    (facts, trace)
}

#[cfg(test)]
mod tests {
    use super::*;
    use riskmap_interchange::{record_from_json, Value, ValueMap};
    use serde_json::json;

    fn routing(v: serde_json::Value) -> RoutingConfig {
        RoutingConfig::from_json(&v).unwrap()
    }

    #[test]
    fn field_rule_sets_fact() {
        let r = routing(json!({
            "factRules": [{
                "id": "thirdParty",
                "when": { "field": "modelCreator", "equals": "Acme Corp" },
                "setFacts": { "thirdPartyModel": true }
            }]
        }));
        let inv = record_from_json("inv", &json!({ "modelCreator": "Acme Corp" })).unwrap();
        let (facts, trace) =
            compute_facts_traced(&r, &inv, &RepeatingBlockSet::new(), &ValueMap::new());
        assert_eq!(facts.get("thirdPartyModel"), Some(&Value::Bool(true)));
        let p = trace.get("thirdPartyModel").unwrap();
        assert_eq!(p.rule_id, "thirdParty");
        assert_eq!(p.fields_used, vec!["modelCreator"]);
    }

    #[test]
    fn fact_rules_see_flags_and_earlier_facts() {
        let r = routing(json!({
            "factRules": [
                { "when": { "flag": "usesGenAI", "equals": true }, "setFacts": { "genAI": true } },
                { "when": { "fact": "genAI", "equals": true }, "setFacts": { "needsRedTeam": true } }
            ]
        }));
        let mut flags = ValueMap::new();
        flags.insert("usesGenAI", Value::Bool(true));
        let facts = compute_facts(&r, &Record::new(), &RepeatingBlockSet::new(), &flags);
        assert_eq!(facts.get("needsRedTeam"), Some(&Value::Bool(true)));
    }

    #[test]
    fn forward_reference_sees_default() {
        let r = routing(json!({
            "factDefaults": { "late": false },
            "factRules": [
                { "when": { "fact": "late", "equals": true }, "setFacts": { "early": true } },
                { "when": { "field": "x", "exists": false }, "setFacts": { "late": true } }
            ]
        }));
        let facts = compute_facts(&r, &Record::new(), &RepeatingBlockSet::new(), &ValueMap::new());
        assert_eq!(facts.get("late"), Some(&Value::Bool(true)));
        assert_eq!(facts.get("early"), None);
    }
}
