//! Immutable assessment state passed into and returned from the engine.

use riskmap_interchange::{AssessmentSession, Answers};
use serde::Serialize;

use crate::prefill::PrefillBundle;

/// Answers and selections owned by the host. The engine never mutates a
/// state in place; it returns a new one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentState {
    pub answers: Answers,
    pub selected_personas: Vec<String>,
    pub selected_use_cases: Vec<String>,
}

impl AssessmentState {
    pub fn from_session(session: &AssessmentSession) -> Self {
        AssessmentState {
            answers: session.answers.clone(),
            selected_personas: session.selected_personas.clone(),
            selected_use_cases: session.selected_use_cases.clone(),
        }
    }

    /// Fill empty slots from `bundle`. Existing answers and non-empty
    /// selections are never replaced, so applying the same bundle twice is
    /// the same as applying it once.
    pub fn apply_prefill(&self, bundle: &PrefillBundle) -> AssessmentState {
        let mut next = self.clone();
        for (question_id, label) in &bundle.answers {
            if !next.answers.is_answered(question_id) {
                next.answers.insert(question_id.clone(), label.clone());
            }
        }
        if next.selected_personas.is_empty() {
            next.selected_personas = bundle.personas.clone();
        }
        if next.selected_use_cases.is_empty() {
            next.selected_use_cases = bundle.use_cases.clone();
        }
        next
    }
}
