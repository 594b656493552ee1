//! In-test engine loop
//!
//! `Cluster` plays the consensus engine for one protocol instance: it asks
//! every node for an observation, has every node validate every observation,
//! feeds the valid ones to each node's outcome derivation and checks that all
//! nodes agree byte for byte. Retirement reports are "transmitted" by storing
//! them in the retirement report cache shared with successor instances.

use anyhow::{ensure, Context};
use futures::future::join_all;
use llo_plugin::adapters::{
    InMemoryDataSource, InMemoryRetirementReportCache, ReportCodecs, StaticChannelDefinitionCache,
    StaticShouldRetireCache,
};
use llo_plugin::ports::outbound::{OutcomeCodec, PredecessorRetirementReportCache, TimeSource};
use llo_plugin::{
    AttestedRetirementReport, AttributedObservation, LloPlugin, LloPluginFactory, OffchainConfig,
    Outcome, OutcomeContext, PluginConfig, PluginDependencies, ReportWithInfo, ReportingPlugin,
    ReportingPluginConfig, ReportingPluginFactory, RoundEvent, RoundPhase, RoundTracker,
};
use llo_types::{ChannelDefinitions, ConfigDigest, LifeCycleStage, StreamId, StreamValue};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use tracing::info;

pub const SECOND: i64 = 1_000_000_000;

/// Clock shared by all nodes, advanced explicitly by the test
#[derive(Debug)]
pub struct ManualClock {
    now: AtomicI64,
}

impl ManualClock {
    pub fn new(unix_seconds: i64) -> Self {
        Self {
            now: AtomicI64::new(unix_seconds * SECOND),
        }
    }

    pub fn advance_seconds(&self, seconds: i64) {
        self.now.fetch_add(seconds * SECOND, Ordering::SeqCst);
    }

    pub fn now_seconds(&self) -> i64 {
        self.now.load(Ordering::SeqCst) / SECOND
    }
}

impl TimeSource for ManualClock {
    fn now_unix_nanoseconds(&self) -> i64 {
        self.now.load(Ordering::SeqCst)
    }
}

/// One participant
pub struct Node {
    pub plugin: LloPlugin,
    pub data_source: Arc<InMemoryDataSource>,
    pub should_retire: Arc<StaticShouldRetireCache>,
    pub channels: Arc<StaticChannelDefinitionCache>,
    /// Sends garbage instead of its observation
    pub faulty: bool,
}

/// Everything one round produced
#[derive(Debug)]
pub struct RoundResult {
    pub seq_nr: u64,
    pub outcome: Outcome,
    pub reports: Vec<ReportWithInfo>,
    pub rejected: usize,
    pub phase: RoundPhase,
}

/// N nodes of one protocol instance
pub struct Cluster {
    pub config_digest: ConfigDigest,
    pub f: usize,
    pub nodes: Vec<Node>,
    pub clock: Arc<ManualClock>,
    pub retirement_cache: Arc<InMemoryRetirementReportCache>,
    seq_nr: u64,
    previous_outcome: Vec<u8>,
}

impl Cluster {
    pub fn new(
        config_digest: ConfigDigest,
        n: usize,
        f: usize,
        predecessor: Option<ConfigDigest>,
        retirement_cache: Arc<InMemoryRetirementReportCache>,
        clock: Arc<ManualClock>,
    ) -> anyhow::Result<Self> {
        // The first cluster in a test binary installs the subscriber.
        let _ = llo_telemetry::init_tracing(&llo_telemetry::TelemetryConfig::from_env());

        let offchain_config = OffchainConfig {
            predecessor_config_digest: predecessor,
        }
        .encode()?;

        let mut nodes = Vec::with_capacity(n);
        for oracle_id in 0..n {
            let data_source = Arc::new(InMemoryDataSource::new());
            let should_retire = Arc::new(StaticShouldRetireCache::default());
            let channels = Arc::new(StaticChannelDefinitionCache::default());
            let deps = PluginDependencies {
                retirement_report_cache: retirement_cache.clone(),
                should_retire_cache: should_retire.clone(),
                channel_definition_cache: channels.clone(),
                data_source: data_source.clone(),
                time_source: clock.clone(),
                report_codecs: ReportCodecs::default(),
            };
            let factory = LloPluginFactory::new(PluginConfig::default(), deps);
            let (plugin, _info) = factory.new_reporting_plugin(ReportingPluginConfig {
                config_digest,
                oracle_id: u8::try_from(oracle_id).context("too many nodes")?,
                n,
                f,
                offchain_config: offchain_config.clone(),
            })?;
            nodes.push(Node {
                plugin,
                data_source,
                should_retire,
                channels,
                faulty: false,
            });
        }

        Ok(Self {
            config_digest,
            f,
            nodes,
            clock,
            retirement_cache,
            seq_nr: 0,
            previous_outcome: Vec::new(),
        })
    }

    pub fn seq_nr(&self) -> u64 {
        self.seq_nr
    }

    pub fn set_desired_channels(&self, definitions: &ChannelDefinitions) {
        for node in &self.nodes {
            node.channels.set_definitions(definitions.clone());
        }
    }

    pub fn set_stream_value(&self, stream_id: StreamId, value: StreamValue) {
        for node in &self.nodes {
            node.data_source.set(stream_id, value);
        }
    }

    pub fn set_should_retire(&self, should_retire: bool) {
        for node in &self.nodes {
            node.should_retire.set_should_retire(should_retire);
        }
    }

    /// Replace the previous outcome, e.g. to start from a known state
    pub fn seed(&mut self, seq_nr: u64, outcome: &Outcome) -> anyhow::Result<()> {
        self.seq_nr = seq_nr;
        self.previous_outcome = llo_plugin::adapters::BincodeOutcomeCodec.encode(outcome)?;
        Ok(())
    }

    /// Drive one full round through every node
    pub async fn run_round(&mut self) -> anyhow::Result<RoundResult> {
        self.seq_nr += 1;
        let ctx = OutcomeContext {
            seq_nr: self.seq_nr,
            previous_outcome: self.previous_outcome.clone(),
        };

        let leader = &self.nodes[0].plugin;
        let query = leader.query(&ctx)?;
        let quorum = leader.observation_quorum(&ctx, &query);
        let mut tracker = RoundTracker::new(self.seq_nr, quorum);
        tracker.process_event(RoundEvent::QueryEmitted);

        let observations = join_all(
            self.nodes
                .iter()
                .map(|node| node.plugin.observation(&ctx, &query)),
        )
        .await;
        tracker.process_event(RoundEvent::ObservationEmitted);

        let mut valid = Vec::new();
        for (index, (node, observation)) in self.nodes.iter().zip(observations).enumerate() {
            let observation = if node.faulty {
                vec![0xff; 7]
            } else {
                observation?
            };
            let ao = AttributedObservation {
                observation,
                observer: u8::try_from(index)?,
            };

            let verdicts: Vec<bool> = self
                .nodes
                .iter()
                .map(|n| n.plugin.validate_observation(&ctx, &query, &ao).is_ok())
                .collect();
            ensure!(
                verdicts.iter().all(|v| *v == verdicts[0]),
                "nodes disagree on validity of observation from {index}"
            );

            if verdicts[0] {
                tracker.process_event(RoundEvent::ObservationValidated);
                valid.push(ao);
            } else {
                tracker.process_event(RoundEvent::ObservationRejected);
            }
        }
        ensure!(
            tracker.has_quorum(),
            "round {} has {} valid observations, quorum is {quorum}",
            self.seq_nr,
            valid.len()
        );

        let mut outcomes = Vec::with_capacity(self.nodes.len());
        for node in &self.nodes {
            outcomes.push(node.plugin.outcome(&ctx, &query, &valid)?);
        }
        ensure!(
            outcomes.iter().all(|o| *o == outcomes[0]),
            "nodes derived different outcomes in round {}",
            self.seq_nr
        );
        tracker.process_event(RoundEvent::OutcomeDerived);
        let raw_outcome = outcomes.swap_remove(0);

        let mut reports = leader.reports(self.seq_nr, &raw_outcome)?;
        for node in &self.nodes[1..] {
            ensure!(
                node.plugin.reports(self.seq_nr, &raw_outcome)? == reports,
                "nodes generated different reports in round {}",
                self.seq_nr
            );
        }

        let mut transmitted = Vec::with_capacity(reports.len());
        for report in reports.drain(..) {
            if leader
                .should_accept_attested_report(self.seq_nr, &report)
                .await?
                && leader
                    .should_transmit_accepted_report(self.seq_nr, &report)
                    .await?
            {
                if report.info.life_cycle_stage == LifeCycleStage::Retired {
                    self.publish_retirement_report(&report)?;
                }
                transmitted.push(report);
            }
        }
        tracker.process_event(RoundEvent::ReportsEmitted);

        let outcome = llo_plugin::adapters::BincodeOutcomeCodec.decode(&raw_outcome)?;
        self.previous_outcome = raw_outcome;

        Ok(RoundResult {
            seq_nr: self.seq_nr,
            outcome,
            reports: transmitted,
            rejected: tracker.rejected(),
            phase: tracker.phase(),
        })
    }

    /// Attest and store the retirement report for successor instances.
    /// Later retired rounds repeat the same report; only the first is kept.
    fn publish_retirement_report(&self, report: &ReportWithInfo) -> anyhow::Result<()> {
        if self
            .retirement_cache
            .attested_retirement_report(self.config_digest)
            .is_ok()
        {
            return Ok(());
        }
        let attested = AttestedRetirementReport {
            config_digest: self.config_digest,
            seq_nr: self.seq_nr,
            retirement_report: report.report.clone(),
        };
        self.retirement_cache
            .store_attested_retirement_report(self.config_digest, attested.encode()?)?;
        info!(
            seq_nr = self.seq_nr,
            config_digest = %self.config_digest,
            "[llo] Published retirement report"
        );
        Ok(())
    }
}
