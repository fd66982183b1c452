//! Intake form state: step visibility, requiredness, field visibility and
//! relevance, and completion progress.

use std::collections::{BTreeMap, BTreeSet};

use riskmap_interchange::{
    Condition, FieldDecl, FlagMap, InventorySchema, Record, RepeatingBlockSet, RequirednessPolicy,
    StepDecl,
};
use serde::Serialize;

use crate::condition::{eval_when, ConditionContext};
use crate::flags::compute_flags;

/// Resolved `stepState` for one step.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StepState {
    pub required: Option<bool>,
    pub collapsed_by_default: Option<bool>,
}

/// Routing selector fields. Always relevant, whatever track they declare.
pub const ROUTING_FIELDS: &[&str] = &["modelCreator", "modelUsage"];

/// `modelCreator` answer that leaves the creator track inactive.
pub const NO_MODEL_CREATION: &str = "No model creation, use existing model";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldView {
    pub key: String,
    pub visible: bool,
    pub relevant: bool,
    pub filled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StepView {
    pub id: String,
    pub title: Option<String>,
    pub visible: bool,
    pub optional: bool,
    pub collapsed_by_default: bool,
    /// Counted fields holding a value.
    pub filled: usize,
    /// Visible, relevant, non-`autoId` fields.
    pub total: usize,
    pub fields: Vec<FieldView>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormState {
    pub flags: FlagMap,
    pub steps: Vec<StepView>,
    /// Completion over visible steps only.
    pub filled: usize,
    pub total: usize,
    /// Labels of empty counted fields in visible steps, skipping optional
    /// field types.
    pub missing_fields: Vec<String>,
}

/// Active relevance tracks derived from the routing answers. `neither` is
/// always active; `both` is active when either model track is.
pub fn active_relevance(inventory: &Record) -> BTreeSet<&'static str> {
    let mut active = BTreeSet::from(["neither"]);
    let answered = |key: &str| inventory.get(key).filter(|v| v.is_present());

    if answered("modelCreator").is_some_and(|v| v.to_string() != NO_MODEL_CREATION) {
        active.insert("modelCreator");
    }
    if answered("modelUsage").is_some() {
        active.insert("modelUsage");
    }
    if active.contains("modelCreator") || active.contains("modelUsage") {
        active.insert("both");
    }
    active
}

pub fn field_relevant(field: &FieldDecl, active: &BTreeSet<&str>) -> bool {
    ROUTING_FIELDS.contains(&field.key.as_str()) || active.contains(field.relevance.as_str())
}

fn field_filled(field: &FieldDecl, inventory: &Record) -> bool {
    inventory.get(&field.key).is_some_and(|v| v.is_present())
}

/// A field with no `visibleWhen`, or an inert one, is visible. Field
/// visibility reads top-level inventory data only.
pub fn field_visible(visible_when: Option<&Condition>, inventory: &Record) -> bool {
    match visible_when {
        None | Some(Condition::Inert) => true,
        Some(cond) => {
            let no_blocks = RepeatingBlockSet::new();
            eval_when(cond, &ConditionContext::new(inventory, &no_blocks))
        }
    }
}

/// Steps hidden by the first step's `displayRules`.
pub fn hidden_steps(
    schema: &InventorySchema,
    inventory: &Record,
    blocks: &RepeatingBlockSet,
) -> BTreeSet<String> {
    let ctx = ConditionContext::new(inventory, blocks);
    schema
        .steps
        .first()
        .map(|first| {
            first
                .display_rules
                .iter()
                .filter(|r| !r.hide_steps.is_empty() && eval_when(&r.when, &ctx))
                .flat_map(|r| r.hide_steps.iter().cloned())
                .collect()
        })
        .unwrap_or_default()
}

/// Resolve `stepState` from every firing rule, per the schema's
/// requiredness policy. `collapsedByDefault` is always last-write-wins.
pub fn step_states(
    schema: &InventorySchema,
    inventory: &Record,
    blocks: &RepeatingBlockSet,
) -> BTreeMap<String, StepState> {
    let ctx = ConditionContext::new(inventory, blocks);
    let mut required_values: BTreeMap<String, Vec<bool>> = BTreeMap::new();
    let mut collapsed: BTreeMap<String, Option<bool>> = BTreeMap::new();

    for rule in &schema.rules {
        let (Some(when), Some(state)) = (&rule.when, &rule.step_state) else {
            continue;
        };
        if state.step_id.is_empty() || !eval_when(when, &ctx) {
            continue;
        }
        let values = required_values.entry(state.step_id.clone()).or_default();
        if let Some(required) = state.required {
            values.push(required);
        }
        let slot = collapsed.entry(state.step_id.clone()).or_default();
        if state.collapsed_by_default.is_some() {
            *slot = state.collapsed_by_default;
        }
    }

    required_values
        .into_iter()
        .map(|(step_id, values)| {
            let required = match schema.requiredness {
                _ if values.is_empty() => None,
                RequirednessPolicy::RequiredWins => Some(values.iter().any(|v| *v)),
                RequirednessPolicy::LastWins => values.last().copied(),
            };
            let collapsed_by_default = collapsed.get(&step_id).copied().flatten();
            (
                step_id,
                StepState {
                    required,
                    collapsed_by_default,
                },
            )
        })
        .collect()
}

/// Hidden by display rules -> not visible; `shownWhen` decides otherwise,
/// with flags in scope. No `shownWhen` means visible.
pub fn step_visible(
    step: &StepDecl,
    hidden: &BTreeSet<String>,
    ctx: &ConditionContext<'_>,
) -> bool {
    if hidden.contains(&step.id) {
        return false;
    }
    step.shown_when.as_ref().map_or(true, |c| eval_when(c, ctx))
}

/// A step resolved `required` is never optional; `required: false` or
/// collapsed means optional; otherwise `optionalWhen` decides.
pub fn step_optional(
    step: &StepDecl,
    state: Option<&StepState>,
    inventory: &Record,
    blocks: &RepeatingBlockSet,
) -> bool {
    if let Some(state) = state {
        if state.required == Some(true) {
            return false;
        }
        if state.required == Some(false) || state.collapsed_by_default == Some(true) {
            return true;
        }
    }
    step.optional_when
        .as_ref()
        .is_some_and(|c| eval_when(c, &ConditionContext::new(inventory, blocks)))
}

/// Compute flags and resolve every step of the form.
pub fn resolve_form(
    schema: &InventorySchema,
    inventory: &Record,
    blocks: &RepeatingBlockSet,
) -> FormState {
    let flags = compute_flags(schema, inventory, blocks);
    let hidden = hidden_steps(schema, inventory, blocks);
    let states = step_states(schema, inventory, blocks);
    let ctx = ConditionContext::new(inventory, blocks).with_flags(&flags);

    let active = active_relevance(inventory);
    let mut missing_fields = Vec::new();

    let steps: Vec<StepView> = schema
        .steps
        .iter()
        .map(|step| {
            let state = states.get(&step.id);
            let visible = step_visible(step, &hidden, &ctx);
            let fields: Vec<FieldView> = step
                .fields
                .iter()
                .map(|f| FieldView {
                    key: f.key.clone(),
                    visible: field_visible(f.visible_when.as_ref(), inventory),
                    relevant: field_relevant(f, &active),
                    filled: field_filled(f, inventory),
                })
                .collect();

            let counted = || {
                step.fields
                    .iter()
                    .zip(&fields)
                    .filter(|(decl, view)| !decl.is_auto_id() && view.visible && view.relevant)
            };
            if visible {
                missing_fields.extend(
                    counted()
                        .filter(|(decl, view)| !view.filled && !decl.is_optional_type())
                        .map(|(decl, _)| decl.display_name().to_string()),
                );
            }

            StepView {
                id: step.id.clone(),
                title: step.title.clone(),
                visible,
                optional: step_optional(step, state, inventory, blocks),
                collapsed_by_default: state
                    .and_then(|s| s.collapsed_by_default)
                    .unwrap_or(false),
                filled: counted().filter(|(_, view)| view.filled).count(),
                total: counted().count(),
                fields,
            }
        })
        .collect();

    let (filled, total) = steps
        .iter()
        .filter(|s| s.visible)
        .fold((0, 0), |(f, t), s| (f + s.filled, t + s.total));

    FormState {
        flags,
        steps,
        filled,
        total,
        missing_fields,
    }
}
