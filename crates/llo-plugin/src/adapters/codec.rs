//! Bincode wire codecs for observations and outcomes
//!
//! Both types only contain ordered maps and sets, so encoding is
//! byte-deterministic across participants.

use crate::domain::{Observation, Outcome};
use crate::error::CodecError;
use crate::ports::outbound::{ObservationCodec, OutcomeCodec};

#[derive(Debug, Default, Clone, Copy)]
pub struct BincodeObservationCodec;

impl ObservationCodec for BincodeObservationCodec {
    fn encode(&self, observation: &Observation) -> Result<Vec<u8>, CodecError> {
        bincode::serialize(observation).map_err(|e| CodecError::Encode {
            what: "observation",
            reason: e.to_string(),
        })
    }

    /// Empty bytes are the first-round observation
    fn decode(&self, bytes: &[u8]) -> Result<Observation, CodecError> {
        if bytes.is_empty() {
            return Ok(Observation::default());
        }
        bincode::deserialize(bytes).map_err(|e| CodecError::Decode {
            what: "observation",
            len: bytes.len(),
            reason: e.to_string(),
        })
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct BincodeOutcomeCodec;

impl OutcomeCodec for BincodeOutcomeCodec {
    fn encode(&self, outcome: &Outcome) -> Result<Vec<u8>, CodecError> {
        bincode::serialize(outcome).map_err(|e| CodecError::Encode {
            what: "outcome",
            reason: e.to_string(),
        })
    }

    fn decode(&self, bytes: &[u8]) -> Result<Outcome, CodecError> {
        bincode::deserialize(bytes).map_err(|e| CodecError::Decode {
            what: "outcome",
            len: bytes.len(),
            reason: e.to_string(),
        })
    }
}
