//! Domain module for the reporting plugin
//!
//! Everything in here is pure: no clocks, randomness, network or shared
//! mutable state. External inputs arrive as explicit arguments.
//!
//! ## Core Modules
//! - channel_definitions: verifier and deterministic reconciler
//! - observation: per-peer round data and its validator
//! - outcome: agreed state threaded round to round
//! - outcome_builder: merges validated observations into the next outcome
//! - aggregation: median / mode / quote aggregators
//! - lifecycle: staging → production → retired transitions
//! - report: report payloads and the retirement report
//! - round: per-round phase tracker driven by the host

pub mod aggregation;
pub mod channel_definitions;
pub mod lifecycle;
pub mod observation;
pub mod outcome;
pub mod outcome_builder;
pub mod report;
pub mod round;

// These limits are relied upon as a property of coming to consensus, so they
// are not configurable per node.

/// Maximum channels one observation may propose to remove. Larger removals
/// are spread over several rounds.
pub const MAX_OBSERVATION_REMOVE_CHANNEL_IDS_LENGTH: usize = 5;
/// Maximum channels one observation may propose to add or change. Larger
/// reconfigurations are spread over several rounds.
pub const MAX_OBSERVATION_UPDATE_CHANNEL_DEFINITIONS_LENGTH: usize = 5;
/// Maximum streams observed per round.
pub const MAX_OBSERVATION_STREAM_VALUES_LENGTH: usize = 10_000;
/// Maximum channels an outcome may hold.
pub const MAX_OUTCOME_CHANNEL_DEFINITIONS_LENGTH: usize = 10_000;

pub use aggregation::aggregate;
pub use channel_definitions::{
    changed_channel_definitions, channel_hash, subtract_channel_definitions,
    verify_channel_definitions, verify_evm_premium_legacy_channel_definition, ChannelHash,
};
pub use lifecycle::next_life_cycle_stage;
pub use observation::{validate_observation, Observation};
pub use outcome::{NotReportable, Outcome};
pub use outcome_builder::{build_outcome, initial_outcome, ObservationVotes};
pub use report::{AttestedRetirementReport, Report, ReportWithInfo, RetirementReport};
pub use round::{RoundEvent, RoundPhase, RoundTracker};
