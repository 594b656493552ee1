//! Error types for the reporting plugin
//!
//! Two failure classes exist. Recoverable failures discard a single peer's
//! contribution (or a single report) and the round continues. Critical
//! failures are decode errors of observation or outcome bytes; they are
//! surfaced loudly because every correct participant would be stuck the same
//! way.

use llo_types::{ChannelId, ConfigDigest, ReportFormat, StreamId};
use thiserror::Error;

/// Channel definition verification failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChannelDefinitionError {
    #[error("too many channels, got: {got}/{max}")]
    TooManyChannels { got: usize, max: usize },

    #[error("ChannelDefinition with ID {channel_id} has no streams")]
    EmptyStreams { channel_id: ChannelId },

    #[error("ChannelDefinition with ID {channel_id} has stream {stream_id} with zero aggregator (this may indicate an uninitialized struct)")]
    UninitializedAggregator {
        channel_id: ChannelId,
        stream_id: StreamId,
    },

    #[error("invalid ChannelDefinition with ID {channel_id}: {reason}")]
    InvalidFormatShape {
        channel_id: ChannelId,
        reason: String,
    },

    #[error("too many unique stream IDs, got: {got}/{max}")]
    TooManyStreams { got: usize, max: usize },
}

/// Observation validation failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ObservationError {
    #[error("invalid SeqNr: {seq_nr}")]
    InvalidSeqNr { seq_nr: u64 },

    #[error("expected empty observation for first round")]
    NonEmptyFirstRound,

    #[error("observation decode error ({len} bytes): {reason}")]
    Decode { len: usize, reason: String },

    #[error("AttestedPredecessorRetirement is not empty ({len} bytes) even though this instance has no predecessor")]
    UnexpectedPredecessorRetirement { len: usize },

    #[error("UpdateChannelDefinitions is too long: {got} vs {max}")]
    TooManyUpdateChannelDefinitions { got: usize, max: usize },

    #[error("RemoveChannelIDs is too long: {got} vs {max}")]
    TooManyRemoveChannelIds { got: usize, max: usize },

    #[error("UpdateChannelDefinitions is invalid: {0}")]
    InvalidUpdateChannelDefinitions(#[from] ChannelDefinitionError),

    #[error("StreamValues is too long: {got} vs {max}")]
    TooManyStreamValues { got: usize, max: usize },
}

impl ObservationError {
    /// Decode failures are critical; everything else only discards the peer's
    /// observation.
    pub fn is_critical(&self) -> bool {
        matches!(self, ObservationError::Decode { .. })
    }

    /// Short label used for metrics and log fields
    pub fn reason(&self) -> &'static str {
        match self {
            ObservationError::InvalidSeqNr { .. } => "invalid_seq_nr",
            ObservationError::NonEmptyFirstRound => "non_empty_first_round",
            ObservationError::Decode { .. } => "decode",
            ObservationError::UnexpectedPredecessorRetirement { .. } => {
                "unexpected_predecessor_retirement"
            }
            ObservationError::TooManyUpdateChannelDefinitions { .. } => "too_many_updates",
            ObservationError::TooManyRemoveChannelIds { .. } => "too_many_removals",
            ObservationError::InvalidUpdateChannelDefinitions(_) => "invalid_channel_definitions",
            ObservationError::TooManyStreamValues { .. } => "too_many_stream_values",
        }
    }
}

/// Retirement handover failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RetirementError {
    #[error("attested retirement report for predecessor {config_digest} is not yet available")]
    NotYetAvailable { config_digest: ConfigDigest },

    #[error("attested retirement report for {config_digest} already stored with different contents")]
    ConflictingWrite { config_digest: ConfigDigest },

    #[error("attested retirement report names {actual}, expected predecessor {expected}")]
    DigestMismatch {
        expected: ConfigDigest,
        actual: ConfigDigest,
    },

    #[error("malformed attested retirement report ({len} bytes): {reason}")]
    Malformed { len: usize, reason: String },

    #[error("should-retire oracle unavailable: {0}")]
    ShouldRetireUnavailable(String),
}

impl RetirementError {
    /// Callers poll again on the next round instead of failing.
    pub fn is_retryable(&self) -> bool {
        matches!(self, RetirementError::NotYetAvailable { .. })
    }
}

/// Encoding and decoding failures of wire bytes
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    #[error("failed to encode {what}: {reason}")]
    Encode { what: &'static str, reason: String },

    #[error("failed to decode {what} ({len} bytes): {reason}")]
    Decode {
        what: &'static str,
        len: usize,
        reason: String,
    },

    #[error("no report codec registered for {0}")]
    MissingReportCodec(ReportFormat),

    #[error("channel {channel_id}: missing value for stream at position {index}")]
    MissingValue { channel_id: ChannelId, index: usize },

    #[error("channel {channel_id}: {reason}")]
    InvalidReport {
        channel_id: ChannelId,
        reason: String,
    },
}

/// Data source failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DataSourceError {
    #[error("data source unavailable: {0}")]
    Unavailable(String),
}

/// Errors returned by the plugin callbacks
#[derive(Debug, Error)]
pub enum PluginError {
    #[error(transparent)]
    Observation(#[from] ObservationError),

    #[error(transparent)]
    Retirement(#[from] RetirementError),

    #[error(transparent)]
    DataSource(#[from] DataSourceError),

    /// Previous outcome or offchain config bytes could not be decoded
    #[error("critical: {0}")]
    Critical(CodecError),

    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error("outcome requires at least one observation")]
    NoObservations,

    #[error("invalid plugin configuration: {0}")]
    InvalidConfig(String),
}

impl PluginError {
    pub fn is_critical(&self) -> bool {
        match self {
            PluginError::Critical(_) => true,
            PluginError::Observation(e) => e.is_critical(),
            _ => false,
        }
    }
}

/// Result type for plugin callbacks
pub type PluginResult<T> = Result<T, PluginError>;
