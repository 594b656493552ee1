//! Reporting plugin service
//!
//! `LloPlugin` implements the host callback contract on top of the pure
//! domain functions. It holds no mutable round state: everything carried
//! between rounds travels in the encoded outcome.

mod observation;
mod outcome;
mod reports;


use crate::adapters::{BincodeObservationCodec, BincodeOutcomeCodec, ReportCodecs};
use crate::config::{OffchainConfig, PluginConfig, ReportingPluginConfig, ReportingPluginInfo};
use crate::domain::{validate_observation, Outcome, ReportWithInfo};
use crate::error::{ObservationError, PluginError, PluginResult};
use crate::metrics;
use crate::ports::inbound::{
    AttributedObservation, OutcomeContext, Query, ReportingPlugin, ReportingPluginFactory,
};
use crate::ports::outbound::{
    ChannelDefinitionCache, DataSource, ObservationCodec, OutcomeCodec,
    PredecessorRetirementReportCache, ShouldRetireCache, TimeSource,
};
use async_trait::async_trait;
use llo_types::ConfigDigest;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Collaborators shared by every plugin instance a factory creates
#[derive(Clone)]
pub struct PluginDependencies {
    pub retirement_report_cache: Arc<dyn PredecessorRetirementReportCache>,
    pub should_retire_cache: Arc<dyn ShouldRetireCache>,
    pub channel_definition_cache: Arc<dyn ChannelDefinitionCache>,
    pub data_source: Arc<dyn DataSource>,
    pub time_source: Arc<dyn TimeSource>,
    pub report_codecs: ReportCodecs,
}

/// Creates one `LloPlugin` per protocol instance
#[derive(Clone)]
pub struct LloPluginFactory {
    config: PluginConfig,
    deps: PluginDependencies,
}

impl LloPluginFactory {
    pub fn new(config: PluginConfig, deps: PluginDependencies) -> Self {
        Self { config, deps }
    }
}

impl ReportingPluginFactory for LloPluginFactory {
    type Plugin = LloPlugin;

    fn new_reporting_plugin(
        &self,
        config: ReportingPluginConfig,
    ) -> PluginResult<(LloPlugin, ReportingPluginInfo)> {
        let offchain_config = OffchainConfig::decode(&config.offchain_config)?;

        info!(
            config_digest = %config.config_digest,
            oracle_id = config.oracle_id,
            n = config.n,
            f = config.f,
            predecessor = ?offchain_config.predecessor_config_digest,
            "[llo] Starting reporting plugin instance"
        );

        let plugin = LloPlugin {
            config: self.config.clone(),
            config_digest: config.config_digest,
            predecessor_config_digest: offchain_config.predecessor_config_digest,
            f: config.f,
            deps: self.deps.clone(),
            observation_codec: Arc::new(BincodeObservationCodec),
            outcome_codec: Arc::new(BincodeOutcomeCodec),
        };
        Ok((plugin, ReportingPluginInfo::default()))
    }
}

/// Reporting plugin for one protocol instance
pub struct LloPlugin {
    config: PluginConfig,
    config_digest: ConfigDigest,
    predecessor_config_digest: Option<ConfigDigest>,
    f: usize,
    deps: PluginDependencies,
    observation_codec: Arc<dyn ObservationCodec>,
    outcome_codec: Arc<dyn OutcomeCodec>,
}

impl LloPlugin {
    pub fn config_digest(&self) -> ConfigDigest {
        self.config_digest
    }

    pub fn predecessor_config_digest(&self) -> Option<ConfigDigest> {
        self.predecessor_config_digest
    }

    /// Decode the previous outcome. Failure is critical: every correct
    /// participant holds the same bytes and would be stuck the same way.
    fn decode_previous_outcome(&self, ctx: &OutcomeContext) -> PluginResult<Outcome> {
        self.outcome_codec
            .decode(&ctx.previous_outcome)
            .map_err(|e| {
                tracing::error!(
                    seq_nr = ctx.seq_nr,
                    len = ctx.previous_outcome.len(),
                    error = %e,
                    "[llo] Failed to decode previous outcome"
                );
                PluginError::Critical(e)
            })
    }

    fn check_observation(
        &self,
        ctx: &OutcomeContext,
        ao: &AttributedObservation,
    ) -> Result<(), ObservationError> {
        if ctx.seq_nr < 1 {
            return Err(ObservationError::InvalidSeqNr { seq_nr: ctx.seq_nr });
        }
        if ctx.seq_nr == 1 && !ao.observation.is_empty() {
            warn!(
                observer = ao.observer,
                len = ao.observation.len(),
                observation = %hex::encode(&ao.observation),
                "[llo] Expected empty observation for first round"
            );
            return Err(ObservationError::NonEmptyFirstRound);
        }

        let observation = self
            .observation_codec
            .decode(&ao.observation)
            .map_err(|e| ObservationError::Decode {
                len: ao.observation.len(),
                reason: e.to_string(),
            })?;

        validate_observation(
            ctx.seq_nr,
            self.predecessor_config_digest.is_some(),
            &observation,
        )
    }
}

#[async_trait]
impl ReportingPlugin for LloPlugin {
    fn query(&self, _ctx: &OutcomeContext) -> PluginResult<Query> {
        Ok(Query::new())
    }

    async fn observation(&self, ctx: &OutcomeContext, _query: &[u8]) -> PluginResult<Vec<u8>> {
        let observation = self.observe(ctx).await?;
        metrics::record_observation_emitted();
        Ok(observation)
    }

    fn validate_observation(
        &self,
        ctx: &OutcomeContext,
        _query: &[u8],
        ao: &AttributedObservation,
    ) -> PluginResult<()> {
        self.check_observation(ctx, ao).map_err(|e| {
            metrics::record_observation_rejected(e.reason());
            if e.is_critical() {
                tracing::error!(
                    seq_nr = ctx.seq_nr,
                    observer = ao.observer,
                    observation = %hex::encode(&ao.observation),
                    error = %e,
                    "[llo] Critical: observation could not be decoded"
                );
            } else {
                debug!(
                    seq_nr = ctx.seq_nr,
                    observer = ao.observer,
                    error = %e,
                    "[llo] Rejected observation"
                );
            }
            PluginError::from(e)
        })
    }

    fn observation_quorum(&self, _ctx: &OutcomeContext, _query: &[u8]) -> usize {
        2 * self.f + 1
    }

    fn outcome(
        &self,
        ctx: &OutcomeContext,
        _query: &[u8],
        aos: &[AttributedObservation],
    ) -> PluginResult<Vec<u8>> {
        self.derive_outcome(ctx, aos)
    }

    fn reports(&self, seq_nr: u64, outcome: &[u8]) -> PluginResult<Vec<ReportWithInfo>> {
        self.generate_reports(seq_nr, outcome)
    }

    async fn should_accept_attested_report(
        &self,
        _seq_nr: u64,
        _report: &ReportWithInfo,
    ) -> PluginResult<bool> {
        Ok(true)
    }

    async fn should_transmit_accepted_report(
        &self,
        _seq_nr: u64,
        _report: &ReportWithInfo,
    ) -> PluginResult<bool> {
        Ok(true)
    }

    fn close(&self) -> PluginResult<()> {
        info!(config_digest = %self.config_digest, "[llo] Closing reporting plugin instance");
        Ok(())
    }
}
