//! Every condition in a configuration, paired with where it was declared.

use riskmap_interchange::{Condition, RiskMapConfig};

/// A condition and its location, e.g. `routing.factRules[2].when`.
#[derive(Debug, Clone, Copy)]
pub struct LocatedCondition<'a> {
    pub location: &'a str,
    pub condition: &'a Condition,
}

/// Owned locations plus borrowed conditions, in declaration order.
pub struct ConditionIndex<'a> {
    entries: Vec<(String, &'a Condition)>,
}

impl<'a> ConditionIndex<'a> {
    pub fn new(config: &'a RiskMapConfig) -> Self {
        let mut entries: Vec<(String, &'a Condition)> = Vec::new();

        for (i, step) in config.inventory.steps.iter().enumerate() {
            let at = format!("inventory.steps[{}]", i);
            for (j, field) in step.fields.iter().enumerate() {
                if let Some(c) = &field.visible_when {
                    entries.push((format!("{}.fields[{}].visibleWhen", at, j), c));
                }
            }
            for (b, block) in step.repeating_blocks.iter().enumerate() {
                for (j, field) in block.fields.iter().enumerate() {
                    if let Some(c) = &field.visible_when {
                        entries.push((
                            format!("{}.repeatingBlocks[{}].fields[{}].visibleWhen", at, b, j),
                            c,
                        ));
                    }
                }
            }
            for (k, rule) in step.display_rules.iter().enumerate() {
                entries.push((format!("{}.displayRules[{}].when", at, k), &rule.when));
            }
            if let Some(c) = &step.shown_when {
                entries.push((format!("{}.shownWhen", at), c));
            }
            if let Some(c) = &step.optional_when {
                entries.push((format!("{}.optionalWhen", at), c));
            }
        }

        for (i, rule) in config.inventory.rules.iter().enumerate() {
            if let Some(c) = &rule.when {
                entries.push((format!("inventory.rules[{}].when", i), c));
            }
        }

        for (i, rule) in config.routing.fact_rules.iter().enumerate() {
            if let Some(c) = &rule.when {
                entries.push((format!("routing.factRules[{}].when", i), c));
            }
        }

        for (i, entry) in config.routing.entries.iter().enumerate() {
            let at = format!("routing.assessmentRouting[{}]", i);
            for (persona, c) in &entry.personas {
                entries.push((format!("{}.personas.{}", at, persona), c));
            }
            for (k, rule) in entry.question_rules.iter().enumerate() {
                if let Some(c) = &rule.visible_when {
                    entries.push((format!("{}.questionRules[{}].visibleWhen", at, k), c));
                }
                for (m, default) in rule.default_answer_from_facts.iter().enumerate() {
                    entries.push((
                        format!("{}.questionRules[{}].defaultAnswerFromFacts[{}].when", at, k, m),
                        &default.when,
                    ));
                }
            }
        }

        ConditionIndex { entries }
    }

    pub fn iter(&self) -> impl Iterator<Item = LocatedCondition<'_>> {
        self.entries.iter().map(|(location, condition)| LocatedCondition {
            location: location.as_str(),
            condition: *condition,
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
