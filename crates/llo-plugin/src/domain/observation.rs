//! Per-peer round data and its validator
//!
//! Validation is the quorum gate: the engine calls it once per received
//! observation and discards the ones that fail. None of these failures are
//! fatal to the instance.

use llo_types::{ChannelDefinitions, ChannelId, StreamValues};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::channel_definitions::verify_channel_definitions;
use super::{
    MAX_OBSERVATION_REMOVE_CHANNEL_IDS_LENGTH, MAX_OBSERVATION_STREAM_VALUES_LENGTH,
    MAX_OBSERVATION_UPDATE_CHANNEL_DEFINITIONS_LENGTH,
};
use crate::error::ObservationError;

/// One participant's proposal for a round
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Observation {
    /// Attested retirement report of the predecessor; empty unless this
    /// instance has a predecessor that has retired.
    pub attested_predecessor_retirement: Vec<u8>,
    /// Local should-retire signal
    pub should_retire: bool,
    /// Wall clock of the observer when the observation was made
    pub unix_timestamp_nanoseconds: i64,
    /// Channels to drop from the agreed configuration
    pub remove_channel_ids: BTreeSet<ChannelId>,
    /// Channels to add or replace in the agreed configuration
    pub update_channel_definitions: ChannelDefinitions,
    /// Observed values for the streams of the agreed configuration
    pub stream_values: StreamValues,
}

impl Observation {
    /// True for the zero-value observation required in the first round
    pub fn is_empty(&self) -> bool {
        *self == Observation::default()
    }
}

/// Validate a decoded observation
///
/// # Arguments
/// * `seq_nr` - Sequence number of the round being validated
/// * `has_predecessor` - Whether this instance was configured with a predecessor
/// * `observation` - The decoded observation
pub fn validate_observation(
    seq_nr: u64,
    has_predecessor: bool,
    observation: &Observation,
) -> Result<(), ObservationError> {
    if seq_nr < 1 {
        return Err(ObservationError::InvalidSeqNr { seq_nr });
    }
    if seq_nr == 1 && !observation.is_empty() {
        return Err(ObservationError::NonEmptyFirstRound);
    }

    if !has_predecessor && !observation.attested_predecessor_retirement.is_empty() {
        return Err(ObservationError::UnexpectedPredecessorRetirement {
            len: observation.attested_predecessor_retirement.len(),
        });
    }

    if observation.update_channel_definitions.len()
        > MAX_OBSERVATION_UPDATE_CHANNEL_DEFINITIONS_LENGTH
    {
        return Err(ObservationError::TooManyUpdateChannelDefinitions {
            got: observation.update_channel_definitions.len(),
            max: MAX_OBSERVATION_UPDATE_CHANNEL_DEFINITIONS_LENGTH,
        });
    }

    if observation.remove_channel_ids.len() > MAX_OBSERVATION_REMOVE_CHANNEL_IDS_LENGTH {
        return Err(ObservationError::TooManyRemoveChannelIds {
            got: observation.remove_channel_ids.len(),
            max: MAX_OBSERVATION_REMOVE_CHANNEL_IDS_LENGTH,
        });
    }

    verify_channel_definitions(&observation.update_channel_definitions)?;

    if observation.stream_values.len() > MAX_OBSERVATION_STREAM_VALUES_LENGTH {
        return Err(ObservationError::TooManyStreamValues {
            got: observation.stream_values.len(),
            max: MAX_OBSERVATION_STREAM_VALUES_LENGTH,
        });
    }

    Ok(())
}
