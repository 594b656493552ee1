//! Channel definition verification and reconciliation
//!
//! The verifier runs both when a peer proposes channel changes and when the
//! outcome absorbs them, with identical rules each time. The reconciler
//! computes bounded deltas so large reconfigurations are spread over several
//! rounds instead of overflowing per-round limits.

use llo_types::{ChannelDefinition, ChannelDefinitions, ChannelId, ReportFormat, StreamId};
use sha2::{Digest, Sha256};
use std::collections::BTreeSet;

use super::{MAX_OBSERVATION_STREAM_VALUES_LENGTH, MAX_OUTCOME_CHANNEL_DEFINITIONS_LENGTH};
use crate::error::ChannelDefinitionError;

/// Number of streams an EVM premium legacy channel carries
/// (native price, link price, quote).
pub const EVM_PREMIUM_LEGACY_STREAM_COUNT: usize = 3;

/// SHA-256 over the encoded (channel id, definition) pair. Votes for channel
/// updates are grouped by this key.
pub type ChannelHash = [u8; 32];

/// Verify a channel configuration against global and per-format rules.
///
/// Checks short-circuit on the first failure, in order: channel count, then
/// per channel non-empty streams, non-zero aggregators and format shape, then
/// the number of distinct streams across all channels.
pub fn verify_channel_definitions(
    channel_defs: &ChannelDefinitions,
) -> Result<(), ChannelDefinitionError> {
    if channel_defs.len() > MAX_OUTCOME_CHANNEL_DEFINITIONS_LENGTH {
        return Err(ChannelDefinitionError::TooManyChannels {
            got: channel_defs.len(),
            max: MAX_OUTCOME_CHANNEL_DEFINITIONS_LENGTH,
        });
    }

    let mut unique_stream_ids: BTreeSet<StreamId> = BTreeSet::new();
    for (&channel_id, cd) in channel_defs {
        if cd.streams.is_empty() {
            return Err(ChannelDefinitionError::EmptyStreams { channel_id });
        }
        for stream in &cd.streams {
            if !stream.aggregator.is_initialized() {
                return Err(ChannelDefinitionError::UninitializedAggregator {
                    channel_id,
                    stream_id: stream.stream_id,
                });
            }
            unique_stream_ids.insert(stream.stream_id);
        }

        match cd.report_format {
            ReportFormat::EVM_PREMIUM_LEGACY => {
                verify_evm_premium_legacy_channel_definition(cd).map_err(|reason| {
                    ChannelDefinitionError::InvalidFormatShape { channel_id, reason }
                })?;
            }
            // Unknown formats are deferred to their report codec, which
            // fails on encode if the Opts are unusable.
            _ => {}
        }
    }

    if unique_stream_ids.len() > MAX_OBSERVATION_STREAM_VALUES_LENGTH {
        return Err(ChannelDefinitionError::TooManyStreams {
            got: unique_stream_ids.len(),
            max: MAX_OBSERVATION_STREAM_VALUES_LENGTH,
        });
    }

    Ok(())
}

/// Shape check for the EVM premium legacy format.
pub fn verify_evm_premium_legacy_channel_definition(
    cd: &ChannelDefinition,
) -> Result<(), String> {
    if cd.report_format != ReportFormat::EVM_PREMIUM_LEGACY {
        return Err(format!(
            "expected {}, got: {}",
            ReportFormat::EVM_PREMIUM_LEGACY,
            cd.report_format
        ));
    }
    if cd.streams.len() != EVM_PREMIUM_LEGACY_STREAM_COUNT {
        return Err(format!(
            "{} requires exactly {} streams (NativePrice, LinkPrice, Quote); got: {}",
            ReportFormat::EVM_PREMIUM_LEGACY,
            EVM_PREMIUM_LEGACY_STREAM_COUNT,
            cd.streams.len()
        ));
    }
    Ok(())
}

/// Entries of `minuend` whose key is absent from `subtrahend`, in ascending
/// channel id order, truncated to `limit` entries.
///
/// Participants must compute identical deltas, so the result is ordered by
/// key before truncation.
pub fn subtract_channel_definitions(
    minuend: &ChannelDefinitions,
    subtrahend: &ChannelDefinitions,
    limit: usize,
) -> ChannelDefinitions {
    let mut difference: Vec<(ChannelId, &ChannelDefinition)> = minuend
        .iter()
        .filter(|(channel_id, _)| !subtrahend.contains_key(*channel_id))
        .map(|(&channel_id, cd)| (channel_id, cd))
        .collect();

    difference.sort_by_key(|(channel_id, _)| *channel_id);
    difference.truncate(limit);

    difference
        .into_iter()
        .map(|(channel_id, cd)| (channel_id, cd.clone()))
        .collect()
}

/// Entries of `desired` that exist in `current` under the same key but with a
/// different definition, ascending by channel id, truncated to `limit`.
pub fn changed_channel_definitions(
    desired: &ChannelDefinitions,
    current: &ChannelDefinitions,
    limit: usize,
) -> ChannelDefinitions {
    desired
        .iter()
        .filter(|(channel_id, cd)| matches!(current.get(*channel_id), Some(existing) if existing != *cd))
        .take(limit)
        .map(|(&channel_id, cd)| (channel_id, cd.clone()))
        .collect()
}

/// Vote key for a proposed (channel id, definition) pair.
pub fn channel_hash(channel_id: ChannelId, cd: &ChannelDefinition) -> ChannelHash {
    let mut hasher = Sha256::new();
    hasher.update(channel_id.to_be_bytes());
    hasher.update(cd.report_format.0.to_be_bytes());
    hasher.update((cd.streams.len() as u64).to_be_bytes());
    for stream in &cd.streams {
        hasher.update(stream.stream_id.to_be_bytes());
        hasher.update(stream.aggregator.0.to_be_bytes());
    }
    hasher.update((cd.opts.len() as u64).to_be_bytes());
    hasher.update(&cd.opts);
    hasher.finalize().into()
}
