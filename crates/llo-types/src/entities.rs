//! # Channel and Instance Entities
//!
//! Channels combine an ordered list of streams with a report format. A
//! protocol instance is named by its `ConfigDigest` and moves through the
//! `LifeCycleStage`s.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Unique key of a channel within a channel configuration.
pub type ChannelId = u32;

/// Identifier of one observable value source.
pub type StreamId = u32;

/// Selects how several raw samples of a stream combine into one value.
///
/// Zero is reserved as "uninitialized" and is never valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
pub struct Aggregator(pub u32);

impl Aggregator {
    /// Reserved value of a default-constructed stream.
    pub const UNINITIALIZED: Aggregator = Aggregator(0);
    /// Median over integer samples.
    pub const MEDIAN: Aggregator = Aggregator(1);
    /// Most frequent sample, ties broken towards the smallest value.
    pub const MODE: Aggregator = Aggregator(2);
    /// Per-field median over quote samples.
    pub const QUOTE: Aggregator = Aggregator(3);

    pub fn is_initialized(&self) -> bool {
        self.0 != 0
    }
}

impl fmt::Display for Aggregator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Aggregator::UNINITIALIZED => write!(f, "uninitialized"),
            Aggregator::MEDIAN => write!(f, "median"),
            Aggregator::MODE => write!(f, "mode"),
            Aggregator::QUOTE => write!(f, "quote"),
            Aggregator(other) => write!(f, "aggregator({})", other),
        }
    }
}

/// Tag selecting the codec a channel's reports are encoded with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
pub struct ReportFormat(pub u32);

impl ReportFormat {
    /// Legacy EVM premium report: native price, link price and a quote.
    pub const EVM_PREMIUM_LEGACY: ReportFormat = ReportFormat(1);
    /// Self-describing JSON report.
    pub const JSON: ReportFormat = ReportFormat(2);
}

impl fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            ReportFormat::EVM_PREMIUM_LEGACY => write!(f, "evm_premium_legacy"),
            ReportFormat::JSON => write!(f, "json"),
            ReportFormat(other) => write!(f, "report_format({})", other),
        }
    }
}

/// One stream referenced by a channel, with the aggregator applied to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct Stream {
    pub stream_id: StreamId,
    pub aggregator: Aggregator,
}

impl Stream {
    pub fn new(stream_id: StreamId, aggregator: Aggregator) -> Self {
        Self {
            stream_id,
            aggregator,
        }
    }
}

/// Definition of one deliverable feed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct ChannelDefinition {
    /// Codec selector for this channel's reports.
    pub report_format: ReportFormat,
    /// Ordered streams; the order is significant to the report codec.
    pub streams: Vec<Stream>,
    /// Format-specific configuration, opaque at this layer.
    pub opts: Vec<u8>,
}

/// Channel configuration keyed by channel id.
pub type ChannelDefinitions = BTreeMap<ChannelId, ChannelDefinition>;

/// A 32-byte identifier of one running protocol instance's configuration.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
pub struct ConfigDigest(pub [u8; 32]);

impl fmt::Debug for ConfigDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ConfigDigest({})", hex::encode(self.0))
    }
}

impl fmt::Display for ConfigDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

/// Protocol instances start in Staging or Production and may later retire,
/// handing their channels over to a successor.
///
/// ```text
/// [STAGING] ──verified predecessor retirement──→ [PRODUCTION] ──should retire──→ [RETIRED]
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
pub enum LifeCycleStage {
    /// Produces specimen reports while waiting for the predecessor to retire.
    #[default]
    Staging,
    /// Produces live reports.
    Production,
    /// Terminal. Only the retirement report is produced.
    Retired,
}

impl fmt::Display for LifeCycleStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LifeCycleStage::Staging => write!(f, "staging"),
            LifeCycleStage::Production => write!(f, "production"),
            LifeCycleStage::Retired => write!(f, "retired"),
        }
    }
}

/// Opaque metadata travelling with every emitted report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportInfo {
    pub life_cycle_stage: LifeCycleStage,
    pub report_format: ReportFormat,
}
