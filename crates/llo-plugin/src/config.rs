//! Plugin configuration
//!
//! `PluginConfig` is node-local and supplied once at factory construction.
//! `ReportingPluginConfig` is supplied by the host for every protocol instance;
//! its `offchain_config` bytes are agreed on by all participants.

use crate::domain::MAX_OUTCOME_CHANNEL_DEFINITIONS_LENGTH;
use crate::error::{PluginError, PluginResult};
use crate::ports::inbound::OracleId;
use llo_types::ConfigDigest;
use serde::{Deserialize, Serialize};

/// Name reported to the host engine
pub const PLUGIN_NAME: &str = "LLO";

/// Upper bound on an encoded observation
pub const MAX_OBSERVATION_LENGTH: usize = 1024 * 1024;
/// Upper bound on an encoded outcome
pub const MAX_OUTCOME_LENGTH: usize = 5 * 1024 * 1024;
/// Upper bound on a single encoded report
pub const MAX_REPORT_LENGTH: usize = 5 * 1024 * 1024;
/// One report per channel plus the retirement report
pub const MAX_REPORT_COUNT: usize = MAX_OUTCOME_CHANNEL_DEFINITIONS_LENGTH + 1;

/// Node-local plugin configuration
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginConfig {
    /// Log whole channel-definition maps and outcomes at debug level
    pub verbose_logging: bool,
}

/// Per-instance configuration supplied by the host
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReportingPluginConfig {
    pub config_digest: ConfigDigest,
    pub oracle_id: OracleId,
    /// Number of participants
    pub n: usize,
    /// Maximum number of faulty participants tolerated
    pub f: usize,
    /// Encoded `OffchainConfig`
    pub offchain_config: Vec<u8>,
}

/// Configuration agreed on by all participants of an instance
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OffchainConfig {
    /// Instance this one takes over from, if any
    pub predecessor_config_digest: Option<ConfigDigest>,
}

impl OffchainConfig {
    pub fn encode(&self) -> PluginResult<Vec<u8>> {
        bincode::serialize(self)
            .map_err(|e| PluginError::InvalidConfig(format!("failed to encode offchain config: {e}")))
    }

    /// Empty bytes decode to the default (no predecessor)
    pub fn decode(bytes: &[u8]) -> PluginResult<Self> {
        if bytes.is_empty() {
            return Ok(Self::default());
        }
        bincode::deserialize(bytes).map_err(|e| {
            PluginError::InvalidConfig(format!(
                "failed to decode offchain config ({} bytes): {e}",
                bytes.len()
            ))
        })
    }
}

/// Size limits the host enforces on plugin outputs
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReportingPluginLimits {
    pub max_query_length: usize,
    pub max_observation_length: usize,
    pub max_outcome_length: usize,
    pub max_report_length: usize,
    pub max_report_count: usize,
}

impl Default for ReportingPluginLimits {
    fn default() -> Self {
        Self {
            max_query_length: 0,
            max_observation_length: MAX_OBSERVATION_LENGTH,
            max_outcome_length: MAX_OUTCOME_LENGTH,
            max_report_length: MAX_REPORT_LENGTH,
            max_report_count: MAX_REPORT_COUNT,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReportingPluginInfo {
    pub name: String,
    pub limits: ReportingPluginLimits,
}

impl Default for ReportingPluginInfo {
    fn default() -> Self {
        Self {
            name: PLUGIN_NAME.to_string(),
            limits: ReportingPluginLimits::default(),
        }
    }
}
