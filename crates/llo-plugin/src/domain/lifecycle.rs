//! Protocol instance lifecycle
//!
//! ```text
//! [STAGING] ──verified predecessor retirement──→ [PRODUCTION] ──> f retire votes──→ [RETIRED]
//! ```
//!
//! Transitions only move forward. Retired is terminal.

use llo_types::LifeCycleStage;

/// Next stage given the previous outcome's stage and this round's signals.
///
/// # Arguments
/// * `previous` - Stage of the previous outcome
/// * `predecessor_retired` - A verified predecessor retirement report was observed
/// * `should_retire_votes` - Observations voting to retire
/// * `f` - Maximum number of faulty participants
pub fn next_life_cycle_stage(
    previous: LifeCycleStage,
    predecessor_retired: bool,
    should_retire_votes: usize,
    f: usize,
) -> LifeCycleStage {
    let mut stage = previous;

    if stage == LifeCycleStage::Staging && predecessor_retired {
        stage = LifeCycleStage::Production;
    }

    // At least one honest participant must want to retire
    if stage == LifeCycleStage::Production && should_retire_votes > f {
        stage = LifeCycleStage::Retired;
    }

    stage
}
