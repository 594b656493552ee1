//! Driving Ports (API - Inbound)
//!
//! The host engine calls these once per round. It owns the driving loop,
//! networking and signing; the plugin only supplies application logic.
//!
//! The engine may invoke `observation` and `validate_observation` concurrently
//! for different peers, and callbacks of consecutive rounds may overlap. The
//! only state carried between calls is the previous outcome inside
//! `OutcomeContext`.

use crate::config::{ReportingPluginConfig, ReportingPluginInfo};
use crate::domain::ReportWithInfo;
use crate::error::PluginResult;
use async_trait::async_trait;

/// Index of a participant within the protocol instance
pub type OracleId = u8;

/// Leader-issued query bytes. Always empty for this plugin.
pub type Query = Vec<u8>;

/// Round context handed to every callback
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OutcomeContext {
    /// Sequence number of the round, monotonically (not strictly) increasing
    pub seq_nr: u64,
    /// Encoded outcome of round `seq_nr - 1`; empty before the first outcome
    pub previous_outcome: Vec<u8>,
}

/// Observation together with the participant that produced it
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AttributedObservation {
    pub observation: Vec<u8>,
    pub observer: OracleId,
}

/// Per-round callback contract
///
/// Dropping a returned future cancels it; implementations must not hold
/// locks or leave shared state half-updated across an `.await`.
#[async_trait]
pub trait ReportingPlugin: Send + Sync {
    /// Query sent from the leader to all followers
    fn query(&self, ctx: &OutcomeContext) -> PluginResult<Query>;

    /// Serialized observation of this participant
    async fn observation(&self, ctx: &OutcomeContext, query: &[u8]) -> PluginResult<Vec<u8>>;

    /// Rejects observations that are not well formed. Called once per received
    /// observation; must be cheap.
    fn validate_observation(
        &self,
        ctx: &OutcomeContext,
        query: &[u8],
        ao: &AttributedObservation,
    ) -> PluginResult<()>;

    /// Minimum number of valid observations needed to derive an outcome
    fn observation_quorum(&self, ctx: &OutcomeContext, query: &[u8]) -> usize;

    /// Pure derivation of the next outcome. Never called with fewer than
    /// `observation_quorum` observations.
    fn outcome(
        &self,
        ctx: &OutcomeContext,
        query: &[u8],
        aos: &[AttributedObservation],
    ) -> PluginResult<Vec<u8>>;

    /// Pure derivation of the (possibly empty) list of reports of an outcome
    fn reports(&self, seq_nr: u64, outcome: &[u8]) -> PluginResult<Vec<ReportWithInfo>>;

    /// Whether an attested report should be accepted for transmission
    async fn should_accept_attested_report(
        &self,
        seq_nr: u64,
        report: &ReportWithInfo,
    ) -> PluginResult<bool>;

    /// Whether an accepted report should be transmitted
    async fn should_transmit_accepted_report(
        &self,
        seq_nr: u64,
        report: &ReportWithInfo,
    ) -> PluginResult<bool>;

    /// Release held resources
    fn close(&self) -> PluginResult<()>;
}

/// Creates one plugin per protocol instance
pub trait ReportingPluginFactory: Send + Sync {
    type Plugin: ReportingPlugin;

    /// Instance construction fails if the offchain config cannot be decoded
    fn new_reporting_plugin(
        &self,
        config: ReportingPluginConfig,
    ) -> PluginResult<(Self::Plugin, ReportingPluginInfo)>;
}
