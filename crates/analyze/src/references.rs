//! Dangling references: names used in one part of the configuration that
//! no other part declares. The engine skips every one of them at runtime,
//! so each is a silent no-op until reported here.

use std::collections::BTreeSet;

use riskmap_interchange::{Condition, RiskMapConfig, TierKey};
use serde::Serialize;

use crate::conditions::ConditionIndex;
use crate::report::FindingSeverity;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ReferenceKind {
    TierLabel,
    Driver,
    Control,
    Gate,
    Step,
    Block,
    Fact,
    Flag,
    Question,
    CatalogControl,
    CatalogRisk,
    Persona,
}

impl ReferenceKind {
    pub fn severity(&self) -> FindingSeverity {
        match self {
            ReferenceKind::TierLabel => FindingSeverity::Error,
            ReferenceKind::CatalogRisk | ReferenceKind::Persona => FindingSeverity::Info,
            _ => FindingSeverity::Warning,
        }
    }

    pub fn describe(&self) -> &'static str {
        match self {
            ReferenceKind::TierLabel => "Tier label",
            ReferenceKind::Driver => "Escalation driver",
            ReferenceKind::Control => "Escalation control",
            ReferenceKind::Gate => "Gate",
            ReferenceKind::Step => "Step",
            ReferenceKind::Block => "Repeating block",
            ReferenceKind::Fact => "Fact",
            ReferenceKind::Flag => "Flag",
            ReferenceKind::Question => "Question",
            ReferenceKind::CatalogControl => "Control",
            ReferenceKind::CatalogRisk => "Risk",
            ReferenceKind::Persona => "Persona",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DanglingReference {
    pub location: String,
    pub kind: ReferenceKind,
    pub target: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ReferenceResult {
    pub dangling: Vec<DanglingReference>,
}

impl ReferenceResult {
    fn push(&mut self, location: impl Into<String>, kind: ReferenceKind, target: &str) {
        self.dangling.push(DanglingReference {
            location: location.into(),
            kind,
            target: target.to_string(),
        });
    }
}

pub fn analyze_references(config: &RiskMapConfig) -> ReferenceResult {
    let mut result = ReferenceResult::default();
    check_tier(config, &mut result);
    check_steps(config, &mut result);
    check_conditions(config, &mut result);
    check_questions(config, &mut result);
    check_catalog(config, &mut result);
    result
}

fn check_tier(config: &RiskMapConfig, result: &mut ReferenceResult) {
    let tier = &config.self_assessment.tier;
    let mut label = |location: String, value: &str| {
        if tier.tier_value(value).is_none() {
            result.push(location, ReferenceKind::TierLabel, value);
        }
    };

    if let Some(default) = &tier.baseline.default_tier {
        label("vayu.baseline.defaultTier".to_string(), default);
    }
    for use_case in &tier.use_cases {
        if let Some(t) = &use_case.baseline_tier {
            label(format!("vayu.useCases.{}.baselineTier", use_case.id), t);
        }
    }
    for gate in &tier.baseline.gates {
        label(
            format!("vayu.baseline.gates.{}.then_tier", gate.question_id),
            &gate.then_tier,
        );
    }
    for (i, rule) in tier.escalation_rules.iter().enumerate() {
        if let Some(t) = &rule.set_minimum_tier {
            label(format!("vayu.escalationRules[{}].set_minimum_tier", i), t);
        }
    }

    for question_id in &tier.baseline.gate_order {
        if tier.baseline.gate(question_id).is_none() {
            result.push("vayu.baseline.gateOrder", ReferenceKind::Gate, question_id);
        }
    }

    let index = tier.question_index();
    for (i, rule) in tier.escalation_rules.iter().enumerate() {
        for (k, cond) in rule.conditions.iter().enumerate() {
            let Some(key) = &cond.key else {
                continue;
            };
            if index.question_for(key).is_some() {
                continue;
            }
            let location = format!("vayu.escalationRules[{}].when[{}]", i, k);
            match key {
                TierKey::Driver(d) => result.push(location, ReferenceKind::Driver, d),
                TierKey::Control(c) => result.push(location, ReferenceKind::Control, c),
            }
        }
    }
}

fn check_steps(config: &RiskMapConfig, result: &mut ReferenceResult) {
    let inventory = &config.inventory;
    for (i, step) in inventory.steps.iter().enumerate() {
        for (k, rule) in step.display_rules.iter().enumerate() {
            for target in &rule.hide_steps {
                if inventory.step(target).is_none() {
                    result.push(
                        format!("inventory.steps[{}].displayRules[{}].hideSteps", i, k),
                        ReferenceKind::Step,
                        target,
                    );
                }
            }
        }
    }
    for (i, rule) in inventory.rules.iter().enumerate() {
        if let Some(state) = &rule.step_state {
            if !state.step_id.is_empty() && inventory.step(&state.step_id).is_none() {
                result.push(
                    format!("inventory.rules[{}].stepState", i),
                    ReferenceKind::Step,
                    &state.step_id,
                );
            }
        }
    }
}

fn check_conditions(config: &RiskMapConfig, result: &mut ReferenceResult) {
    let blocks: BTreeSet<&str> = config.inventory.block_ids().into_iter().collect();

    let mut facts: BTreeSet<&str> = config
        .routing
        .fact_defaults
        .0
        .keys()
        .map(String::as_str)
        .collect();
    for rule in &config.routing.fact_rules {
        facts.extend(rule.set_facts.0.keys().map(String::as_str));
    }

    let mut flags: BTreeSet<&str> = config
        .inventory
        .flag_defaults
        .0
        .keys()
        .map(String::as_str)
        .collect();
    for rule in &config.inventory.rules {
        if let Some(set) = &rule.set_flags {
            flags.extend(set.0.keys().map(String::as_str));
        }
    }

    let index = ConditionIndex::new(config);
    for located in index.iter() {
        for block in located.condition.referenced_blocks() {
            if !blocks.contains(block) {
                result.push(located.location, ReferenceKind::Block, block);
            }
        }
        for fact in located.condition.referenced_facts() {
            if !facts.contains(fact) {
                result.push(located.location, ReferenceKind::Fact, fact);
            }
        }
        let mut seen: Vec<&str> = Vec::new();
        located.condition.walk(&mut |node| {
            if let Condition::Flag(p) = node {
                if !flags.contains(p.key.as_str()) && !seen.contains(&p.key.as_str()) {
                    seen.push(&p.key);
                }
            }
        });
        for flag in seen {
            result.push(located.location, ReferenceKind::Flag, flag);
        }
    }
}

fn check_questions(config: &RiskMapConfig, result: &mut ReferenceResult) {
    let assessment = &config.self_assessment;
    let declared: BTreeSet<&str> = assessment
        .questions
        .iter()
        .map(|q| q.id.as_str())
        .chain(assessment.tier.questions.iter().map(|q| q.id.as_str()))
        .collect();
    if declared.is_empty() {
        return;
    }

    for (i, entry) in config.routing.entries.iter().enumerate() {
        for (k, rule) in entry.question_rules.iter().enumerate() {
            if !declared.contains(rule.question_id.as_str()) {
                result.push(
                    format!("routing.assessmentRouting[{}].questionRules[{}]", i, k),
                    ReferenceKind::Question,
                    &rule.question_id,
                );
            }
        }
    }
    for gate in &assessment.tier.baseline.gates {
        if !declared.contains(gate.question_id.as_str()) {
            result.push("vayu.baseline.gates", ReferenceKind::Question, &gate.question_id);
        }
    }
}

fn check_catalog(config: &RiskMapConfig, result: &mut ReferenceResult) {
    let catalog = &config.catalog;

    if !catalog.controls.is_empty() {
        for risk in &catalog.risks {
            for control in &risk.controls {
                if catalog.control(control).is_none() {
                    result.push(
                        format!("risks.{}.controls", risk.id),
                        ReferenceKind::CatalogControl,
                        control,
                    );
                }
            }
        }
    }

    if !catalog.risks.is_empty() {
        for q in &config.self_assessment.questions {
            for risk in &q.risks {
                if catalog.risk(risk).is_none() {
                    result.push(
                        format!("selfAssessment.questions.{}.risks", q.id),
                        ReferenceKind::CatalogRisk,
                        risk,
                    );
                }
            }
        }
    }

    if !catalog.personas.is_empty() {
        for (i, entry) in config.routing.entries.iter().enumerate() {
            for (persona, _) in &entry.personas {
                if catalog.persona(persona).is_none() {
                    result.push(
                        format!("routing.assessmentRouting[{}].personas", i),
                        ReferenceKind::Persona,
                        persona,
                    );
                }
            }
        }
    }
}
