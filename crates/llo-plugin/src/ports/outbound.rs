//! Driven Ports (SPI - Outbound Dependencies)
//!
//! Collaborators owned outside the plugin. The retirement report cache in
//! particular outlives any single protocol instance: the retiring instance
//! writes to it and its successor reads from it.

use crate::domain::{Observation, Outcome, Report, RetirementReport};
use crate::error::{CodecError, DataSourceError, RetirementError};
use async_trait::async_trait;
use llo_types::{ChannelDefinition, ChannelDefinitions, ConfigDigest, StreamValues};

/// Options passed to the data source for one round
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DataSourceOpts {
    pub verbose_logging: bool,
    pub seq_nr: u64,
}

/// Source of raw stream values
#[async_trait]
pub trait DataSource: Send + Sync {
    /// For each requested stream id, set the observed value. Streams that are
    /// unknown or failed to observe stay `None`.
    async fn observe(
        &self,
        stream_values: &mut StreamValues,
        opts: &DataSourceOpts,
    ) -> Result<(), DataSourceError>;
}

/// Desired channel configuration, read asynchronously from its origin
pub trait ChannelDefinitionCache: Send + Sync {
    fn definitions(&self) -> ChannelDefinitions;
}

/// Whether this protocol instance has been told to retire
pub trait ShouldRetireCache: Send + Sync {
    fn should_retire(&self) -> Result<bool, RetirementError>;
}

/// Shared store of attested retirement reports, keyed by the retiring
/// instance's config digest
pub trait PredecessorRetirementReportCache: Send + Sync {
    /// Attested report of the predecessor; `NotYetAvailable` until it retired
    fn attested_retirement_report(
        &self,
        predecessor_config_digest: ConfigDigest,
    ) -> Result<Vec<u8>, RetirementError>;

    /// Verify a candidate payload against the predecessor identity. Must not
    /// block: it runs inside outcome derivation.
    fn check_attested_retirement_report(
        &self,
        predecessor_config_digest: ConfigDigest,
        attested_retirement_report: &[u8],
    ) -> Result<RetirementReport, RetirementError>;
}

/// Per-format report encoder
///
/// Encoding may be lossy, so no decode is expected. A codec that needs a value
/// the outcome does not hold returns an error instead of panicking.
pub trait ReportCodec: Send + Sync {
    fn encode(&self, report: &Report, cd: &ChannelDefinition) -> Result<Vec<u8>, CodecError>;
}

/// Wire codec for observations
pub trait ObservationCodec: Send + Sync {
    fn encode(&self, observation: &Observation) -> Result<Vec<u8>, CodecError>;
    fn decode(&self, bytes: &[u8]) -> Result<Observation, CodecError>;
}

/// Wire codec for outcomes
pub trait OutcomeCodec: Send + Sync {
    fn encode(&self, outcome: &Outcome) -> Result<Vec<u8>, CodecError>;
    fn decode(&self, bytes: &[u8]) -> Result<Outcome, CodecError>;
}

/// Wall clock used to timestamp observations
pub trait TimeSource: Send + Sync {
    fn now_unix_nanoseconds(&self) -> i64;
}
