//! # llo-plugin
//!
//! Low-latency reporting plugin driven by a Byzantine fault tolerant
//! consensus engine.
//!
//! ## Overview
//!
//! In every round each participant proposes an observation; the engine
//! collects at least 2f+1 valid ones and every participant derives the same
//! outcome from them. Reports are then produced deterministically from the
//! outcome. This crate provides:
//! - **Channel reconciliation**: bounded, deterministic deltas between the
//!   agreed and the desired channel configuration
//! - **Observation validation**: the per-observation quorum gate
//! - **Outcome derivation**: voting on channel changes, stream aggregation,
//!   report validity windows
//! - **Retirement handover**: gap- and overlap-free transfer of reporting
//!   duty between protocol instances
//!
//! ## Round
//!
//! ```text
//! Query ──→ Observation ──→ ValidateObservation (per peer) ──→ quorum 2f+1
//!                                                                  │
//!            ShouldTransmit ←── ShouldAccept ←── Reports ←── Outcome
//! ```
//!
//! ## Life Cycle
//!
//! ```text
//! [STAGING] ──verified predecessor retirement report──→ [PRODUCTION]
//!                                                            │
//!                                        should-retire votes > f
//!                                                            ↓
//!                                                       [RETIRED] ──→ retirement report
//! ```
//!
//! ## Example
//!
//! ```rust,ignore
//! use llo_plugin::{LloPluginFactory, PluginConfig, PluginDependencies};
//! use llo_plugin::ports::inbound::{ReportingPlugin, ReportingPluginFactory};
//!
//! let factory = LloPluginFactory::new(PluginConfig::default(), deps);
//! let (plugin, info) = factory.new_reporting_plugin(instance_config)?;
//!
//! let observation = plugin.observation(&ctx, &[]).await?;
//! ```

pub mod adapters;
pub mod config;
pub mod domain;
pub mod error;
pub mod metrics;
pub mod ports;
pub mod service;

pub use config::{
    OffchainConfig, PluginConfig, ReportingPluginConfig, ReportingPluginInfo,
    ReportingPluginLimits,
};
pub use domain::{
    AttestedRetirementReport, NotReportable, Observation, Outcome, Report, ReportWithInfo,
    RetirementReport, RoundEvent, RoundPhase, RoundTracker,
};
pub use error::{
    ChannelDefinitionError, CodecError, DataSourceError, ObservationError, PluginError,
    PluginResult, RetirementError,
};
pub use ports::inbound::{
    AttributedObservation, OracleId, OutcomeContext, ReportingPlugin, ReportingPluginFactory,
};
pub use service::{LloPlugin, LloPluginFactory, PluginDependencies};
