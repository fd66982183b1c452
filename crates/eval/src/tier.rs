//! Tier scoring.
//!
//! Three monotonic stages, each taking the ordinal max:
//!
//! 1. baseline from the default tier and selected use cases
//! 2. baseline gates, in `gateOrder`
//! 3. escalation rules over driver/control-mapped answers
//!
//! The tier never decreases across stages. Unknown tier labels and unmapped
//! drivers or controls are skipped with a warning; scoring always completes.

use riskmap_interchange::{
    answer_in, Answers, Combinator, EscalationRule, TierCondition, TierConfig, TierQuestionIndex,
};
use serde::Serialize;
use tracing::{debug, warn};

/// How the final tier was reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum TierMethod {
    /// No tiers declared; the result is a placeholder.
    NotConfigured,
    /// Nothing raised the default tier.
    Default,
    /// A use case or gate raised the baseline; no escalation raised it further.
    Baseline,
    /// An escalation rule raised the tier above the baseline.
    Escalated,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TierResult {
    pub tier: i64,
    pub label: String,
    pub baseline_tier: i64,
    pub escalated_rules: Vec<String>,
    pub method: TierMethod,
}

impl TierResult {
    fn not_configured() -> Self {
        TierResult {
            tier: 0,
            label: String::new(),
            baseline_tier: 0,
            escalated_rules: Vec::new(),
            method: TierMethod::NotConfigured,
        }
    }
}

/// Resolve a tier label to its ordinal, warning when it is not declared.
fn tier_value(config: &TierConfig, label: &str, context: &str) -> Option<i64> {
    let value = config.tier_value(label);
    if value.is_none() {
        warn!(tier = %label, context, "unknown tier label, skipping");
    }
    value
}

/// Score a tier from use-case selections and answers.
pub fn score_tier(config: &TierConfig, use_case_selections: &[String], answers: &Answers) -> TierResult {
    let Some(lowest) = config.lowest_tier() else {
        return TierResult::not_configured();
    };

    let default = config
        .baseline
        .default_tier
        .as_deref()
        .and_then(|label| tier_value(config, label, "defaultTier"))
        .unwrap_or(lowest.value);

    // Stage 1: use cases.
    let mut baseline = default;
    for selection in use_case_selections {
        let Some(use_case) = config.use_cases.iter().find(|u| u.is_selected_by(selection)) else {
            debug!(use_case = %selection, "selected use case has no tier mapping");
            continue;
        };
        if let Some(value) = use_case
            .baseline_tier
            .as_deref()
            .and_then(|label| tier_value(config, label, &use_case.id))
        {
            baseline = baseline.max(value);
        }
    }

    // Stage 2: gates.
    for question_id in &config.baseline.gate_order {
        let Some(gate) = config.baseline.gate(question_id) else {
            warn!(question = %question_id, "gateOrder names a question without a gate");
            continue;
        };
        let Some(answer) = answers.get(question_id).filter(|a| !a.is_empty()) else {
            continue;
        };
        if answer_in(answer, &gate.if_answer_in) {
            if let Some(value) = tier_value(config, &gate.then_tier, question_id) {
                debug!(question = %question_id, tier = %gate.then_tier, "baseline gate matched");
                baseline = baseline.max(value);
            }
        }
    }

    // Stage 3: escalation.
    let index = config.question_index();
    let mut tier = baseline;
    let mut escalated_rules = Vec::new();
    for (i, rule) in config.escalation_rules.iter().enumerate() {
        if !rule_matches(rule, &index, answers) {
            continue;
        }
        let name = rule.display_name(i);
        debug!(rule = %name, "escalation rule fired");
        if let Some(value) = rule
            .set_minimum_tier
            .as_deref()
            .and_then(|label| tier_value(config, label, &name))
        {
            tier = tier.max(value);
        }
        escalated_rules.push(name);
    }

    let method = if tier > baseline {
        TierMethod::Escalated
    } else if baseline > default {
        TierMethod::Baseline
    } else {
        TierMethod::Default
    };

    TierResult {
        tier,
        label: config.tier_label(tier).unwrap_or_default().to_string(),
        baseline_tier: baseline,
        escalated_rules,
        method,
    }
}

fn rule_matches(rule: &EscalationRule, index: &TierQuestionIndex<'_>, answers: &Answers) -> bool {
    let mut results = rule
        .conditions
        .iter()
        .map(|c| condition_matches(c, index, answers));
    match rule.combinator {
        Combinator::All => !rule.conditions.is_empty() && results.all(|m| m),
        Combinator::Any => results.any(|m| m),
    }
}

fn condition_matches(cond: &TierCondition, index: &TierQuestionIndex<'_>, answers: &Answers) -> bool {
    let Some(key) = &cond.key else {
        return false;
    };
    let Some(question_id) = index.question_for(key) else {
        warn!(key = ?key, "no question mapped to escalation condition");
        return false;
    };
    answers
        .get(question_id)
        .filter(|a| !a.is_empty())
        .is_some_and(|a| answer_in(a, &cond.in_answers))
}
