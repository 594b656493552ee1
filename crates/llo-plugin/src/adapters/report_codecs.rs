//! Report codecs, one per report format
//!
//! Reports are only ever encoded; consumers verify them against the
//! attestation produced by the engine.

use crate::domain::{verify_evm_premium_legacy_channel_definition, Report};
use crate::error::CodecError;
use crate::ports::outbound::ReportCodec;
use llo_types::{ChannelDefinition, ReportFormat, StreamValue};
use primitive_types::U256;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Default validity window of an EVM premium legacy report (one day)
pub const DEFAULT_EXPIRATION_WINDOW_SECONDS: u32 = 86_400;

const WORD: usize = 32;

/// Codec lookup by report format
#[derive(Clone)]
pub struct ReportCodecs {
    codecs: BTreeMap<ReportFormat, Arc<dyn ReportCodec>>,
}

impl ReportCodecs {
    /// Registry without any codecs
    pub fn empty() -> Self {
        Self {
            codecs: BTreeMap::new(),
        }
    }

    pub fn register(&mut self, format: ReportFormat, codec: Arc<dyn ReportCodec>) {
        self.codecs.insert(format, codec);
    }

    pub fn get(&self, format: ReportFormat) -> Option<&Arc<dyn ReportCodec>> {
        self.codecs.get(&format)
    }
}

impl Default for ReportCodecs {
    fn default() -> Self {
        let mut codecs = Self::empty();
        codecs.register(ReportFormat::EVM_PREMIUM_LEGACY, Arc::new(EvmPremiumLegacyReportCodec));
        codecs.register(ReportFormat::JSON, Arc::new(JsonReportCodec));
        codecs
    }
}

impl std::fmt::Debug for ReportCodecs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.codecs.keys()).finish()
    }
}

// =============================================================================
// JSON
// =============================================================================

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct JsonReport {
    config_digest: String,
    seq_nr: u64,
    #[serde(rename = "ChannelID")]
    channel_id: u32,
    valid_after_seconds: u32,
    observation_timestamp_seconds: u32,
    values: Vec<Option<JsonValue>>,
    specimen: bool,
}

/// Wire form of a stream value: integers as bare hex strings, quotes as
/// objects
#[derive(Serialize)]
#[serde(untagged)]
enum JsonValue {
    Integer(U256),
    Quote {
        #[serde(rename = "Bid")]
        bid: U256,
        #[serde(rename = "Benchmark")]
        benchmark: U256,
        #[serde(rename = "Ask")]
        ask: U256,
    },
}

impl From<&StreamValue> for JsonValue {
    fn from(value: &StreamValue) -> Self {
        match value {
            StreamValue::Integer(v) => JsonValue::Integer(*v),
            StreamValue::Quote(q) => JsonValue::Quote {
                bid: q.bid,
                benchmark: q.benchmark,
                ask: q.ask,
            },
        }
    }
}

/// Self-describing JSON reports; unset values encode as `null`
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonReportCodec;

impl ReportCodec for JsonReportCodec {
    fn encode(&self, report: &Report, _cd: &ChannelDefinition) -> Result<Vec<u8>, CodecError> {
        let json = JsonReport {
            config_digest: report.config_digest.to_string(),
            seq_nr: report.seq_nr,
            channel_id: report.channel_id,
            valid_after_seconds: report.valid_after_seconds,
            observation_timestamp_seconds: report.observation_timestamp_seconds,
            values: report
                .values
                .iter()
                .map(|v| v.as_ref().map(JsonValue::from))
                .collect(),
            specimen: report.specimen,
        };
        serde_json::to_vec(&json).map_err(|e| CodecError::Encode {
            what: "json report",
            reason: e.to_string(),
        })
    }
}

// =============================================================================
// EVM PREMIUM LEGACY
// =============================================================================

/// Channel options understood by the EVM premium legacy codec
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvmPremiumLegacyOpts {
    #[serde(default = "default_expiration_window")]
    pub expiration_window: u32,
}

fn default_expiration_window() -> u32 {
    DEFAULT_EXPIRATION_WINDOW_SECONDS
}

impl Default for EvmPremiumLegacyOpts {
    fn default() -> Self {
        Self {
            expiration_window: DEFAULT_EXPIRATION_WINDOW_SECONDS,
        }
    }
}

impl EvmPremiumLegacyOpts {
    /// Empty opts select the defaults
    pub fn decode(opts: &[u8]) -> Result<Self, serde_json::Error> {
        if opts.is_empty() {
            return Ok(Self::default());
        }
        serde_json::from_slice(opts)
    }
}

/// Fixed-width ABI-style report made of 32-byte big-endian words:
/// config digest, channel id, valid after, observation timestamp, benchmark,
/// bid, ask, native price, link price, expires at.
///
/// Streams are (native price, link price, quote) in that order.
#[derive(Debug, Default, Clone, Copy)]
pub struct EvmPremiumLegacyReportCodec;

impl EvmPremiumLegacyReportCodec {
    pub const REPORT_LENGTH: usize = 10 * WORD;
}

impl ReportCodec for EvmPremiumLegacyReportCodec {
    fn encode(&self, report: &Report, cd: &ChannelDefinition) -> Result<Vec<u8>, CodecError> {
        let channel_id = report.channel_id;
        let invalid = |reason: String| CodecError::InvalidReport { channel_id, reason };

        verify_evm_premium_legacy_channel_definition(cd).map_err(invalid)?;
        let opts = EvmPremiumLegacyOpts::decode(&cd.opts)
            .map_err(|e| invalid(format!("invalid opts: {e}")))?;
        if report.values.len() != cd.streams.len() {
            return Err(invalid(format!(
                "expected {} values, got {}",
                cd.streams.len(),
                report.values.len()
            )));
        }

        let value = |index: usize| -> Result<StreamValue, CodecError> {
            report
                .values
                .get(index)
                .copied()
                .flatten()
                .ok_or(CodecError::MissingValue { channel_id, index })
        };
        let native_price = value(0)?
            .as_integer()
            .ok_or_else(|| invalid("native price must be an integer".to_string()))?;
        let link_price = value(1)?
            .as_integer()
            .ok_or_else(|| invalid("link price must be an integer".to_string()))?;
        let quote = value(2)?
            .as_quote()
            .ok_or_else(|| invalid("third stream must be a quote".to_string()))?;

        let expires_at =
            u64::from(report.observation_timestamp_seconds) + u64::from(opts.expiration_window);

        let mut out = Vec::with_capacity(Self::REPORT_LENGTH);
        out.extend_from_slice(&report.config_digest.0);
        for word in [
            U256::from(report.channel_id),
            U256::from(report.valid_after_seconds),
            U256::from(report.observation_timestamp_seconds),
            quote.benchmark,
            quote.bid,
            quote.ask,
            native_price,
            link_price,
            U256::from(expires_at),
        ] {
            let mut buf = [0u8; WORD];
            word.to_big_endian(&mut buf);
            out.extend_from_slice(&buf);
        }
        Ok(out)
    }
}
