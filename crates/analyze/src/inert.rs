//! Conditions that can never match.

use riskmap_interchange::{Condition, Operator, RiskMapConfig};
use serde::Serialize;

use crate::conditions::ConditionIndex;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum InertKind {
    /// No recognized key, or a repeat node missing its predicate.
    Malformed,
    /// `all: []` or `any: []`.
    EmptyCombinator,
    /// A predicate with none of the known operator keys.
    UnknownOperator,
}

#[derive(Debug, Clone, Serialize)]
pub struct InertCondition {
    pub location: String,
    pub kind: InertKind,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InertResult {
    pub conditions_checked: usize,
    pub inert: Vec<InertCondition>,
}

pub fn analyze_inert(config: &RiskMapConfig) -> InertResult {
    let index = ConditionIndex::new(config);
    let mut inert: Vec<InertCondition> = Vec::new();

    for located in index.iter() {
        let mut kinds: Vec<InertKind> = Vec::new();
        located.condition.walk(&mut |node| {
            let kind = match node {
                Condition::Inert => Some(InertKind::Malformed),
                Condition::All(c) | Condition::Any(c) if c.is_empty() => {
                    Some(InertKind::EmptyCombinator)
                }
                Condition::Field(p) | Condition::Flag(p) | Condition::Fact(p)
                    if p.op == Operator::Unknown =>
                {
                    Some(InertKind::UnknownOperator)
                }
                _ => None,
            };
            if let Some(kind) = kind {
                if !kinds.contains(&kind) {
                    kinds.push(kind);
                }
            }
        });
        inert.extend(kinds.into_iter().map(|kind| InertCondition {
            location: located.location.to_string(),
            kind,
        }));
    }

    InertResult {
        conditions_checked: index.len(),
        inert,
    }
}
