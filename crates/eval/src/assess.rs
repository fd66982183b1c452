//! The full assessment pipeline.

use riskmap_interchange::{AssessmentSession, FactMap, FlagMap, RiskMapConfig};
use serde::Serialize;
use tracing::debug;

use crate::controls::map_controls;
use crate::flags::compute_flags;
use crate::prefill::{resolve_prefill_with_flags, PrefillBundle};
use crate::relevance::relevant_risks;
use crate::state::AssessmentState;
use crate::tier::{score_tier, TierResult};

/// Everything computed for one session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentResult {
    pub flags: FlagMap,
    pub facts: FactMap,
    pub prefill: PrefillBundle,
    /// The session's state with prefill applied to empty slots.
    pub state: AssessmentState,
    pub risks: Vec<String>,
    pub tier: TierResult,
    pub controls: Vec<String>,
}

/// Run flags, facts, prefill, relevance, tier scoring and control mapping
/// for one session. The session is not modified.
pub fn assess(config: &RiskMapConfig, session: &AssessmentSession) -> AssessmentResult {
    let flags = compute_flags(&config.inventory, &session.inventory, &session.repeat_blocks);
    let prefill = resolve_prefill_with_flags(
        &config.routing,
        &session.inventory,
        &session.repeat_blocks,
        &flags,
    );
    let state = AssessmentState::from_session(session).apply_prefill(&prefill);

    let risks = relevant_risks(
        &config.self_assessment.questions,
        &state.answers,
        &state.selected_personas,
    );
    let tier = score_tier(
        &config.self_assessment.tier,
        &state.selected_use_cases,
        &state.answers,
    );
    let controls = map_controls(&risks, &config.catalog);

    debug!(
        risks = risks.len(),
        controls = controls.len(),
        tier = %tier.label,
        "assessment complete"
    );

    AssessmentResult {
        flags,
        facts: prefill.facts.clone(),
        prefill,
        state,
        risks,
        tier,
        controls,
    }
}
