//! Risk map rule engine.
//!
//! Consumes the typed configuration from `riskmap-interchange` plus one
//! session's inventory data and answers, and computes the layered results:
//! inventory flags, routing facts, assessment prefill, form step state,
//! relevant risks, the risk tier and the mapped controls.
//!
//! Every function here is pure and total. Nothing performs I/O, nothing
//! holds session state, and malformed configuration has already been
//! reduced to inert conditions at load time.

pub mod assess;
pub mod condition;
pub mod controls;
pub mod facts;
pub mod flags;
pub mod form;
pub mod predicate;
pub mod prefill;
pub mod provenance;
pub mod relevance;
pub mod state;
pub mod tier;

pub use assess::{assess, AssessmentResult};
pub use condition::{eval_row, eval_when, eval_when_traced, ConditionContext};
pub use controls::map_controls;
pub use facts::{compute_facts, compute_facts_traced};
pub use flags::compute_flags;
pub use form::{
    field_visible, hidden_steps, resolve_form, step_optional, step_states, step_visible,
    FieldView, FormState, StepState, StepView,
};
pub use predicate::{eval_operator, eval_predicate};
pub use prefill::{
    resolve_prefill, resolve_prefill_with_flags, PrefillBundle, PrefillKind, PrefillReason,
};
pub use provenance::{FactProvenance, FactTrace, ProvenanceCollector};
pub use relevance::relevant_risks;
pub use state::AssessmentState;
pub use tier::{score_tier, TierMethod, TierResult};
