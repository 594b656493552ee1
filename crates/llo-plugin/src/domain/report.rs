//! Report payloads
//!
//! A `Report` is the per-channel input to a report codec. The
//! `RetirementReport` carries validity timestamps from a retiring instance to
//! its successor so neither a gap nor an overlap appears at the handover.

use llo_types::{ChannelId, ConfigDigest, ReportInfo, StreamValue};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::CodecError;

/// Input to a report codec for one channel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    pub config_digest: ConfigDigest,
    pub seq_nr: u64,
    pub channel_id: ChannelId,
    /// Exclusive lower bound of the interval this report covers
    pub valid_after_seconds: u32,
    /// Inclusive upper bound of the interval this report covers
    pub observation_timestamp_seconds: u32,
    /// Aggregated values in the order of the channel's streams
    pub values: Vec<Option<StreamValue>>,
    /// Set for reports of instances that are not in production
    pub specimen: bool,
}

/// Encoded report plus the metadata the transmitter needs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportWithInfo {
    pub report: Vec<u8>,
    pub info: ReportInfo,
}

/// Handover record written once by a retiring instance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct RetirementReport {
    /// Per channel, the last instant the retiring instance was responsible for
    #[serde(rename = "ValidAfterSeconds")]
    pub valid_after_seconds: BTreeMap<ChannelId, u32>,
}

impl RetirementReport {
    pub fn encode(&self) -> Result<Vec<u8>, CodecError> {
        serde_json::to_vec(self).map_err(|e| CodecError::Encode {
            what: "retirement report",
            reason: e.to_string(),
        })
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, CodecError> {
        serde_json::from_slice(bytes).map_err(|e| CodecError::Decode {
            what: "retirement report",
            len: bytes.len(),
            reason: e.to_string(),
        })
    }
}

/// Retirement report together with the instance and round that produced it.
///
/// The engine's attestation (signatures) travels alongside and is checked by
/// the retirement report cache, not here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttestedRetirementReport {
    pub config_digest: ConfigDigest,
    pub seq_nr: u64,
    pub retirement_report: Vec<u8>,
}

impl AttestedRetirementReport {
    pub fn encode(&self) -> Result<Vec<u8>, CodecError> {
        bincode::serialize(self).map_err(|e| CodecError::Encode {
            what: "attested retirement report",
            reason: e.to_string(),
        })
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, CodecError> {
        bincode::deserialize(bytes).map_err(|e| CodecError::Decode {
            what: "attested retirement report",
            len: bytes.len(),
            reason: e.to_string(),
        })
    }
}
