//! Outcome derivation
//!
//! Pure merge of the previous outcome and one round's validated observations.
//! Every correct participant runs this independently on identical inputs and
//! must arrive at identical bytes, so all tallies are kept in ordered maps and
//! no clock, randomness or shared state is consulted.

use llo_types::{
    Aggregator, ChannelDefinition, ChannelId, LifeCycleStage, StreamId, StreamValue,
};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info, warn};

use super::aggregation::aggregate;
use super::channel_definitions::{channel_hash, verify_channel_definitions, ChannelHash};
use super::lifecycle::next_life_cycle_stage;
use super::observation::Observation;
use super::outcome::{Outcome, StreamAggregates};
use super::report::RetirementReport;
use super::MAX_OUTCOME_CHANNEL_DEFINITIONS_LENGTH;

/// Proposed channel definition and the number of observers proposing it
#[derive(Debug, Clone)]
struct UpdateVote {
    channel_id: ChannelId,
    definition: ChannelDefinition,
    votes: usize,
}

/// Tallies of one round's decoded observations
#[derive(Debug, Default)]
pub struct ObservationVotes {
    timestamps_nanoseconds: Vec<i64>,
    should_retire_votes: usize,
    remove_channel_votes: BTreeMap<ChannelId, usize>,
    update_channel_votes: BTreeMap<ChannelHash, UpdateVote>,
    stream_observations: BTreeMap<StreamId, Vec<StreamValue>>,
    predecessor_retirement: Option<RetirementReport>,
}

impl ObservationVotes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tally one observation. The attested retirement payload is verified by
    /// the caller and recorded through `record_predecessor_retirement`.
    pub fn add(&mut self, observation: &Observation) {
        if observation.should_retire {
            self.should_retire_votes += 1;
        }
        self.timestamps_nanoseconds
            .push(observation.unix_timestamp_nanoseconds);

        for &channel_id in &observation.remove_channel_ids {
            *self.remove_channel_votes.entry(channel_id).or_insert(0) += 1;
        }

        for (&channel_id, definition) in &observation.update_channel_definitions {
            self.update_channel_votes
                .entry(channel_hash(channel_id, definition))
                .or_insert_with(|| UpdateVote {
                    channel_id,
                    definition: definition.clone(),
                    votes: 0,
                })
                .votes += 1;
        }

        for (&stream_id, value) in &observation.stream_values {
            if let Some(value) = value {
                self.stream_observations
                    .entry(stream_id)
                    .or_default()
                    .push(*value);
            }
        }
    }

    /// Only the first verified retirement report counts
    pub fn record_predecessor_retirement(&mut self, report: RetirementReport) {
        if self.predecessor_retirement.is_none() {
            self.predecessor_retirement = Some(report);
        }
    }

    pub fn has_predecessor_retirement(&self) -> bool {
        self.predecessor_retirement.is_some()
    }

    pub fn observation_count(&self) -> usize {
        self.timestamps_nanoseconds.len()
    }

    fn median_timestamp(&self) -> Option<i64> {
        let mut timestamps = self.timestamps_nanoseconds.clone();
        timestamps.sort_unstable();
        timestamps.get(timestamps.len() / 2).copied()
    }
}

/// Outcome of the first round. No prior agreed state exists to build on.
pub fn initial_outcome(has_predecessor: bool) -> Outcome {
    Outcome {
        life_cycle_stage: if has_predecessor {
            LifeCycleStage::Staging
        } else {
            LifeCycleStage::Production
        },
        ..Default::default()
    }
}

/// Merge a round's tallies into the previous outcome
///
/// # Arguments
/// * `previous` - Outcome of the previous round (read only)
/// * `votes` - Tallies of this round's validated observations
/// * `f` - Maximum number of faulty participants
pub fn build_outcome(previous: &Outcome, votes: &ObservationVotes, f: usize) -> Outcome {
    let absorbed_retirement = match (&votes.predecessor_retirement, previous.life_cycle_stage) {
        (Some(report), LifeCycleStage::Staging) => Some(report),
        _ => None,
    };

    let life_cycle_stage = next_life_cycle_stage(
        previous.life_cycle_stage,
        absorbed_retirement.is_some(),
        votes.should_retire_votes,
        f,
    );
    if life_cycle_stage != previous.life_cycle_stage {
        info!(
            from = %previous.life_cycle_stage,
            to = %life_cycle_stage,
            "[llo] Life cycle stage transition"
        );
    }

    let mut outcome = Outcome {
        life_cycle_stage,
        observations_timestamp_nanoseconds: votes
            .median_timestamp()
            .unwrap_or(previous.observations_timestamp_nanoseconds),
        channel_definitions: previous.channel_definitions.clone(),
        valid_after_seconds: BTreeMap::new(),
        stream_aggregates: StreamAggregates::new(),
    };

    // Retired instances stop updating channel definitions
    if life_cycle_stage != LifeCycleStage::Retired {
        apply_channel_votes(&mut outcome, votes, f);
    }

    outcome.valid_after_seconds = next_valid_after_seconds(previous, &outcome, absorbed_retirement);

    if life_cycle_stage != LifeCycleStage::Retired {
        outcome.stream_aggregates =
            aggregate_streams(&outcome, &votes.stream_observations, f);
    }

    outcome
}

fn apply_channel_votes(outcome: &mut Outcome, votes: &ObservationVotes, f: usize) {
    for (&channel_id, &count) in &votes.remove_channel_votes {
        if count <= f {
            continue;
        }
        if outcome.channel_definitions.remove(&channel_id).is_some() {
            debug!(channel_id, votes = count, "[llo] Removing channel");
        }
    }

    // Apply in (channel id, hash) order so competing definitions for one
    // channel resolve identically everywhere.
    let mut accepted: Vec<(&ChannelHash, &UpdateVote)> = votes
        .update_channel_votes
        .iter()
        .filter(|(_, vote)| vote.votes > f)
        .collect();
    accepted.sort_by(|(ha, a), (hb, b)| a.channel_id.cmp(&b.channel_id).then(ha.cmp(hb)));

    for (_, vote) in accepted {
        let channel_id = vote.channel_id;
        let replaced = outcome.channel_definitions.get(&channel_id).cloned();

        if replaced.is_none()
            && outcome.channel_definitions.len() >= MAX_OUTCOME_CHANNEL_DEFINITIONS_LENGTH
        {
            warn!(
                channel_id,
                max = MAX_OUTCOME_CHANNEL_DEFINITIONS_LENGTH,
                "[llo] Cannot add channel, outcome already contains the maximum number of channels"
            );
            continue;
        }

        outcome
            .channel_definitions
            .insert(channel_id, vote.definition.clone());

        if let Err(e) = verify_channel_definitions(&outcome.channel_definitions) {
            warn!(
                channel_id,
                error = %e,
                "[llo] Channel update would break channel definition limits, skipping"
            );
            match replaced {
                Some(original) => {
                    outcome.channel_definitions.insert(channel_id, original);
                }
                None => {
                    outcome.channel_definitions.remove(&channel_id);
                }
            }
            continue;
        }

        if replaced.is_some() {
            debug!(channel_id, votes = vote.votes, "[llo] Replacing channel definition");
        } else {
            debug!(channel_id, votes = vote.votes, "[llo] Adding channel definition");
        }
    }
}

fn next_valid_after_seconds(
    previous: &Outcome,
    outcome: &Outcome,
    absorbed_retirement: Option<&RetirementReport>,
) -> BTreeMap<ChannelId, u32> {
    let removed: BTreeSet<ChannelId> = previous
        .channel_definitions
        .keys()
        .filter(|channel_id| !outcome.channel_definitions.contains_key(*channel_id))
        .copied()
        .collect();

    let mut valid_after_seconds = BTreeMap::new();
    let previous_timestamp_seconds = previous.observations_timestamp_seconds();

    for (&channel_id, &previous_valid_after) in &previous.valid_after_seconds {
        if removed.contains(&channel_id) {
            continue;
        }
        // A channel reported from the previous outcome is now covered up to
        // that outcome's timestamp
        let next = match (previous.is_reportable(channel_id), previous_timestamp_seconds) {
            (Ok(()), Some(reported_until)) => reported_until,
            _ => previous_valid_after,
        };
        valid_after_seconds.insert(channel_id, next);
    }

    if let Some(report) = absorbed_retirement {
        for (&channel_id, &retired_valid_after) in &report.valid_after_seconds {
            valid_after_seconds.insert(channel_id, retired_valid_after);
        }
    }

    if outcome.life_cycle_stage != LifeCycleStage::Retired {
        if let Some(now) = outcome.observations_timestamp_seconds() {
            for &channel_id in outcome.channel_definitions.keys() {
                valid_after_seconds.entry(channel_id).or_insert(now);
            }
        }
    }

    valid_after_seconds
}

fn aggregate_streams(
    outcome: &Outcome,
    stream_observations: &BTreeMap<StreamId, Vec<StreamValue>>,
    f: usize,
) -> StreamAggregates {
    let wanted: BTreeSet<(StreamId, Aggregator)> = outcome
        .channel_definitions
        .values()
        .flat_map(|cd| cd.streams.iter().map(|s| (s.stream_id, s.aggregator)))
        .collect();

    let mut aggregates = StreamAggregates::new();
    for (stream_id, aggregator) in wanted {
        let Some(samples) = stream_observations.get(&stream_id) else {
            continue;
        };
        match aggregate(aggregator, samples, f) {
            Some(value) => {
                aggregates
                    .entry(stream_id)
                    .or_default()
                    .insert(aggregator, value);
            }
            None => debug!(
                stream_id,
                aggregator = %aggregator,
                samples = samples.len(),
                "[llo] No aggregate for stream"
            ),
        }
    }
    aggregates
}
