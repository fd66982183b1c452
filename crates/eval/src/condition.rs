//! Condition evaluation: `all`/`any` combinators over the field, flag/fact
//! and repeating-block dialects.
//!
//! Evaluation is pure. Empty `all`/`any` lists and inert nodes are false.
//! Unknown block ids have no rows, so `repeatAny` is false and
//! `repeatAllIfPresent` is vacuously true.

use riskmap_interchange::{Condition, Predicate, Record, RepeatingBlockSet, Value, ValueMap};

use crate::predicate::{eval_operator, eval_predicate, eval_scalar_operator};
use crate::provenance::ProvenanceCollector;

/// Everything a condition may read.
///
/// `flags` and `facts` are `None` when the dialect must not see them (flag
/// rules see no flags). Flag and fact nodes read the merged view, facts
/// shadowing flags.
#[derive(Debug, Clone, Copy)]
pub struct ConditionContext<'a> {
    pub inventory: &'a Record,
    pub blocks: &'a RepeatingBlockSet,
    pub flags: Option<&'a ValueMap>,
    pub facts: Option<&'a ValueMap>,
}

impl<'a> ConditionContext<'a> {
    /// Inventory data and repeating blocks only.
    pub fn new(inventory: &'a Record, blocks: &'a RepeatingBlockSet) -> Self {
        ConditionContext {
            inventory,
            blocks,
            flags: None,
            facts: None,
        }
    }

    pub fn with_flags(mut self, flags: &'a ValueMap) -> Self {
        self.flags = Some(flags);
        self
    }

    pub fn with_facts(mut self, facts: &'a ValueMap) -> Self {
        self.facts = Some(facts);
        self
    }

    /// Look up a derived value: facts first, then flags.
    fn derived(&self, name: &str) -> Option<&'a Value> {
        self.facts
            .and_then(|f| f.get(name))
            .or_else(|| self.flags.and_then(|f| f.get(name)))
    }
}

/// Evaluate a condition.
pub fn eval_when(cond: &Condition, ctx: &ConditionContext<'_>) -> bool {
    eval_when_traced(cond, ctx, &mut ProvenanceCollector::new())
}

/// Evaluate a condition, recording the fields, flags and facts behind a
/// true result. Reads made by children that did not hold, or by an `all`
/// that failed, are discarded.
pub fn eval_when_traced(
    cond: &Condition,
    ctx: &ConditionContext<'_>,
    collector: &mut ProvenanceCollector,
) -> bool {
    match cond {
        Condition::All(children) => {
            let mut scratch = ProvenanceCollector::new();
            let held = !children.is_empty()
                && children.iter().all(|c| eval_when_traced(c, ctx, &mut scratch));
            if held {
                collector.merge(scratch);
            }
            held
        }
        Condition::Any(children) => children.iter().any(|c| eval_when_traced(c, ctx, collector)),
        Condition::Field(pred) => {
            let held = eval_field(pred, ctx);
            if held {
                collector.record_field(&pred.key);
            }
            held
        }
        Condition::Flag(pred) => {
            let held = eval_scalar_operator(&pred.op, ctx.derived(&pred.key));
            if held {
                collector.record_flag(&pred.key);
            }
            held
        }
        Condition::Fact(pred) => {
            let held = eval_scalar_operator(&pred.op, ctx.derived(&pred.key));
            if held {
                collector.record_fact(&pred.key);
            }
            held
        }
        Condition::RepeatAny {
            block_id,
            predicate,
        } => ctx
            .blocks
            .rows(block_id)
            .iter()
            .any(|row| eval_row(predicate, row)),
        Condition::RepeatAllIfPresent {
            block_id,
            predicate,
            all_must_satisfy,
        } => ctx
            .blocks
            .rows(block_id)
            .iter()
            .filter(|row| eval_row(predicate, row))
            .all(|row| eval_row(all_must_satisfy, row)),
        Condition::Inert => false,
    }
}

/// Evaluate a condition against one repeating-block row in isolation.
pub fn eval_row(cond: &Condition, row: &Record) -> bool {
    let no_blocks = RepeatingBlockSet::new();
    eval_when(cond, &ConditionContext::new(row, &no_blocks))
}

/// Field dialect. A field absent from the top-level record is looked up in
/// every repeating-block row; any row holding the field and matching wins.
fn eval_field(pred: &Predicate, ctx: &ConditionContext<'_>) -> bool {
    match ctx.inventory.get(&pred.key) {
        Some(v) if !v.is_null() => eval_operator(&pred.op, Some(v)),
        _ if !ctx.blocks.is_empty() => ctx.blocks.all_rows().any(|row| match row.get(&pred.key) {
            Some(v) if !v.is_null() => eval_predicate(pred, row),
            _ => false,
        }),
        _ => eval_operator(&pred.op, None),
    }
}
