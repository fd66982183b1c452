//! Prefill/routing resolver.
//!
//! Turns inventory data and computed facts into candidate use cases,
//! personas and question answers, each with a human-readable reason. The
//! resolver only proposes values; [`crate::state::AssessmentState::apply_prefill`]
//! decides which empty slots they fill.

use std::collections::BTreeMap;

use riskmap_interchange::{
    FactMap, FlagMap, Record, RepeatingBlockSet, RoutingConfig, RoutingEntry, Value, ValueMap,
};
use serde::Serialize;
use tracing::debug;

use crate::condition::{eval_when, eval_when_traced, ConditionContext};
use crate::facts::compute_facts_traced;
use crate::provenance::{field_reason, FactTrace, ProvenanceCollector};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum PrefillKind {
    UseCase,
    Persona,
    Answer,
}

/// Why a value was prefilled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PrefillReason {
    pub kind: PrefillKind,
    /// Use-case label, persona id or question id.
    pub target: String,
    pub reason: String,
}

/// Everything the resolver proposes for one session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PrefillBundle {
    pub facts: FactMap,
    pub fact_sources: FactTrace,
    /// Question id -> answer label.
    pub answers: BTreeMap<String, String>,
    pub use_cases: Vec<String>,
    pub personas: Vec<String>,
    pub hidden_questions: Vec<String>,
    pub reasons: Vec<PrefillReason>,
}

impl PrefillBundle {
    pub fn is_hidden(&self, question_id: &str) -> bool {
        self.hidden_questions.iter().any(|q| q == question_id)
    }

    pub fn reason_for(&self, kind: PrefillKind, target: &str) -> Option<&str> {
        self.reasons
            .iter()
            .find(|r| r.kind == kind && r.target == target)
            .map(|r| r.reason.as_str())
    }

    fn push_unique(list: &mut Vec<String>, item: &str) -> bool {
        if list.iter().any(|s| s == item) {
            false
        } else {
            list.push(item.to_string());
            true
        }
    }

    fn add_reason(&mut self, kind: PrefillKind, target: &str, reason: String) {
        self.reasons.push(PrefillReason {
            kind,
            target: target.to_string(),
            reason,
        });
    }
}

/// Resolve prefill with no flags in scope.
pub fn resolve_prefill(
    routing: &RoutingConfig,
    inventory: &Record,
    blocks: &RepeatingBlockSet,
) -> PrefillBundle {
    resolve_prefill_with_flags(routing, inventory, blocks, &ValueMap::new())
}

/// Compute facts (with provenance) from `flags`, then resolve prefill.
pub fn resolve_prefill_with_flags(
    routing: &RoutingConfig,
    inventory: &Record,
    blocks: &RepeatingBlockSet,
    flags: &FlagMap,
) -> PrefillBundle {
    let (facts, trace) = compute_facts_traced(routing, inventory, blocks, flags);
    let mut bundle = PrefillBundle::default();

    {
        let ctx = ConditionContext::new(inventory, blocks)
            .with_flags(flags)
            .with_facts(&facts);
        for entry in &routing.entries {
            resolve_entry(entry, &ctx, &facts, &trace, &mut bundle);
        }
    }

    // Hidden in any entry means hidden, even if another entry prefilled it.
    let hidden = bundle.hidden_questions.clone();
    bundle.answers.retain(|q, _| !hidden.contains(q));
    bundle
        .reasons
        .retain(|r| r.kind != PrefillKind::Answer || !hidden.contains(&r.target));

    bundle.facts = facts;
    bundle.fact_sources = trace;
    bundle
}

fn resolve_entry(
    entry: &RoutingEntry,
    ctx: &ConditionContext<'_>,
    facts: &FactMap,
    trace: &FactTrace,
    bundle: &mut PrefillBundle,
) {
    // 1. use cases from an inventory field
    for prefill in &entry.use_cases {
        let Some(value) = ctx.inventory.get(&prefill.source_field) else {
            continue;
        };
        let candidates: Vec<&Value> = match value {
            Value::List(items) => items.iter().collect(),
            scalar => vec![scalar],
        };
        for candidate in candidates {
            let Some(label) = prefill.lookup(&candidate.to_string()) else {
                continue;
            };
            if PrefillBundle::push_unique(&mut bundle.use_cases, label) {
                bundle.add_reason(
                    PrefillKind::UseCase,
                    label,
                    field_reason(&prefill.source_field, candidate),
                );
            }
        }
    }

    // 2. personas from facts
    for (persona, cond) in &entry.personas {
        let mut collector = ProvenanceCollector::new();
        if eval_when_traced(cond, ctx, &mut collector)
            && PrefillBundle::push_unique(&mut bundle.personas, persona)
        {
            let reason = explain(&collector, ctx.inventory, facts, trace);
            bundle.add_reason(PrefillKind::Persona, persona, reason);
        }
    }

    // 3. question visibility and default answers
    for rule in &entry.question_rules {
        let visible = rule.visible_when.as_ref().map_or(true, |c| eval_when(c, ctx));
        if !visible {
            debug!(question = %rule.question_id, "question hidden by routing");
            PrefillBundle::push_unique(&mut bundle.hidden_questions, &rule.question_id);
            continue;
        }
        if bundle.answers.contains_key(&rule.question_id) {
            continue;
        }
        let mut collector = ProvenanceCollector::new();
        if let Some(default) = rule.default_answer_from_facts.iter().find(|d| {
            collector = ProvenanceCollector::new();
            eval_when_traced(&d.when, ctx, &mut collector)
        }) {
            let label = default.answer.to_answer_label();
            debug!(question = %rule.question_id, answer = %label, "answer prefilled");
            bundle.answers.insert(rule.question_id.clone(), label);
            let reason = explain(&collector, ctx.inventory, facts, trace);
            bundle.add_reason(PrefillKind::Answer, &rule.question_id, reason);
        }
    }
}

/// Reason text for a matched condition: the traced origin of every fact
/// that made it true, else the inventory fields that did, else a generic note.
fn explain(
    matched: &ProvenanceCollector,
    inventory: &Record,
    facts: &FactMap,
    trace: &FactTrace,
) -> String {
    let mut parts: Vec<String> = Vec::new();
    for fact in &matched.facts_used {
        let part = trace.describe(fact, facts, inventory);
        if !parts.contains(&part) {
            parts.push(part);
        }
    }
    if parts.is_empty() {
        parts = matched
            .fields_used
            .iter()
            .filter_map(|f| {
                inventory
                    .get(f)
                    .filter(|v| v.is_present())
                    .map(|v| field_reason(f, v))
            })
            .collect();
    }
    if parts.is_empty() {
        "matched routing rule".to_string()
    } else {
        parts.join("; ")
    }
}
