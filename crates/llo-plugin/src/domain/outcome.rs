//! Agreed state threaded from one round to the next
//!
//! The previous outcome is read-only input to outcome derivation and the new
//! outcome is its only output. Nothing else mutates it.

use llo_types::{
    Aggregator, ChannelDefinition, ChannelDefinitions, ChannelId, LifeCycleStage, StreamId,
    StreamValue,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Aggregated value per stream and aggregator
pub type StreamAggregates = BTreeMap<StreamId, BTreeMap<Aggregator, StreamValue>>;

/// Why a channel produces no report for an outcome
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NotReportable {
    #[error("IsReportable=false; retired")]
    Retired,

    #[error("IsReportable=false; no channel definition with ID {0}")]
    UnknownChannel(ChannelId),

    #[error("IsReportable=false; invalid observations timestamp {0}ns")]
    InvalidObservationsTimestamp(i64),

    #[error("IsReportable=false; no ValidAfterSeconds entry yet, this must be a new channel")]
    NewChannel,

    #[error("IsReportable=false; ValidAfterSeconds={valid_after_seconds} >= ObservationsTimestampSeconds={observations_timestamp_seconds}, the report would overlap a previous one")]
    WouldOverlap {
        valid_after_seconds: u32,
        observations_timestamp_seconds: u32,
    },
}

/// Agreed state carried from round N to round N+1
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Outcome {
    /// Stage of this protocol instance
    pub life_cycle_stage: LifeCycleStage,
    /// Median of the observers' timestamps for this round
    pub observations_timestamp_nanoseconds: i64,
    /// Current agreed channel configuration
    pub channel_definitions: ChannelDefinitions,
    /// Per channel, the last instant already covered by a report. The next
    /// report for the channel covers (valid_after, observations_timestamp].
    pub valid_after_seconds: BTreeMap<ChannelId, u32>,
    /// Aggregated stream values for this round
    pub stream_aggregates: StreamAggregates,
}

impl NotReportable {
    /// Short label for metrics
    pub fn reason(&self) -> &'static str {
        match self {
            NotReportable::Retired => "retired",
            NotReportable::UnknownChannel(_) => "unknown_channel",
            NotReportable::InvalidObservationsTimestamp(_) => "invalid_observations_timestamp",
            NotReportable::NewChannel => "new_channel",
            NotReportable::WouldOverlap { .. } => "would_overlap",
        }
    }
}

impl Outcome {
    /// Observations timestamp truncated to whole seconds, if representable
    pub fn observations_timestamp_seconds(&self) -> Option<u32> {
        u32::try_from(self.observations_timestamp_nanoseconds / 1_000_000_000).ok()
    }

    /// Whether a report may be generated for `channel_id` from this outcome
    pub fn is_reportable(&self, channel_id: ChannelId) -> Result<(), NotReportable> {
        if self.life_cycle_stage == LifeCycleStage::Retired {
            return Err(NotReportable::Retired);
        }

        if !self.channel_definitions.contains_key(&channel_id) {
            return Err(NotReportable::UnknownChannel(channel_id));
        }

        let observations_timestamp_seconds = self.observations_timestamp_seconds().ok_or(
            NotReportable::InvalidObservationsTimestamp(self.observations_timestamp_nanoseconds),
        )?;

        let valid_after_seconds = *self
            .valid_after_seconds
            .get(&channel_id)
            .ok_or(NotReportable::NewChannel)?;

        if valid_after_seconds >= observations_timestamp_seconds {
            return Err(NotReportable::WouldOverlap {
                valid_after_seconds,
                observations_timestamp_seconds,
            });
        }

        Ok(())
    }

    /// Reportable channel ids in ascending order, plus the reasons the
    /// remaining channels are not reportable
    pub fn reportable_channels(&self) -> (Vec<ChannelId>, Vec<(ChannelId, NotReportable)>) {
        let mut reportable = Vec::new();
        let mut unreportable = Vec::new();

        for &channel_id in self.channel_definitions.keys() {
            match self.is_reportable(channel_id) {
                Ok(()) => reportable.push(channel_id),
                Err(reason) => unreportable.push((channel_id, reason)),
            }
        }

        (reportable, unreportable)
    }

    /// Aggregated values in the order of the channel's streams
    pub fn values_for(&self, cd: &ChannelDefinition) -> Vec<Option<StreamValue>> {
        cd.streams
            .iter()
            .map(|stream| {
                self.stream_aggregates
                    .get(&stream.stream_id)
                    .and_then(|by_aggregator| by_aggregator.get(&stream.aggregator))
                    .copied()
            })
            .collect()
    }
}
