//! Observation construction

use super::LloPlugin;
use crate::domain::{
    changed_channel_definitions, subtract_channel_definitions, verify_channel_definitions,
    Observation, Outcome, MAX_OBSERVATION_REMOVE_CHANNEL_IDS_LENGTH,
    MAX_OBSERVATION_STREAM_VALUES_LENGTH, MAX_OBSERVATION_UPDATE_CHANNEL_DEFINITIONS_LENGTH,
};
use crate::error::PluginResult;
use crate::ports::inbound::OutcomeContext;
use crate::ports::outbound::DataSourceOpts;
use llo_types::{ChannelDefinitions, LifeCycleStage, StreamValues};
use tracing::{debug, info, warn};

impl LloPlugin {
    pub(super) async fn observe(&self, ctx: &OutcomeContext) -> PluginResult<Vec<u8>> {
        // First round has no previous outcome to build on
        if ctx.seq_nr <= 1 {
            return Ok(Vec::new());
        }

        let previous = self.decode_previous_outcome(ctx)?;
        let mut observation = Observation {
            attested_predecessor_retirement: self.fetch_predecessor_retirement(ctx, &previous),
            should_retire: self.read_should_retire(ctx),
            unix_timestamp_nanoseconds: self.deps.time_source.now_unix_nanoseconds(),
            ..Default::default()
        };

        if previous.life_cycle_stage != LifeCycleStage::Retired {
            let desired = self.deps.channel_definition_cache.definitions();
            self.propose_channel_changes(ctx, &previous.channel_definitions, &desired, &mut observation);
        }

        let mut stream_values = requested_stream_values(&previous);
        let opts = DataSourceOpts {
            verbose_logging: self.config.verbose_logging,
            seq_nr: ctx.seq_nr,
        };
        // Data source failures fail the whole observation; a partial value
        // set is indistinguishable from missing streams for the peers.
        self.deps.data_source.observe(&mut stream_values, &opts).await?;
        observation.stream_values = stream_values;

        let encoded = self.observation_codec.encode(&observation)?;
        debug!(
            seq_nr = ctx.seq_nr,
            len = encoded.len(),
            should_retire = observation.should_retire,
            removals = observation.remove_channel_ids.len(),
            updates = observation.update_channel_definitions.len(),
            stream_values = observation.stream_values.len(),
            "[llo] Generated observation"
        );
        Ok(encoded)
    }

    /// Attested retirement report of the predecessor, empty until it retired
    fn fetch_predecessor_retirement(&self, ctx: &OutcomeContext, previous: &Outcome) -> Vec<u8> {
        let Some(predecessor) = self.predecessor_config_digest else {
            return Vec::new();
        };
        if previous.life_cycle_stage != LifeCycleStage::Staging {
            return Vec::new();
        }

        match self
            .deps
            .retirement_report_cache
            .attested_retirement_report(predecessor)
        {
            Ok(report) => {
                info!(
                    seq_nr = ctx.seq_nr,
                    %predecessor,
                    len = report.len(),
                    "[llo] Attaching predecessor retirement report"
                );
                report
            }
            Err(e) if e.is_retryable() => {
                debug!(seq_nr = ctx.seq_nr, %predecessor, "[llo] Predecessor has not retired yet");
                Vec::new()
            }
            Err(e) => {
                warn!(
                    seq_nr = ctx.seq_nr,
                    %predecessor,
                    error = %e,
                    "[llo] Failed to fetch predecessor retirement report"
                );
                Vec::new()
            }
        }
    }

    fn read_should_retire(&self, ctx: &OutcomeContext) -> bool {
        match self.deps.should_retire_cache.should_retire() {
            Ok(should_retire) => {
                if should_retire {
                    info!(seq_nr = ctx.seq_nr, "[llo] Voting to retire");
                }
                should_retire
            }
            Err(e) => {
                warn!(seq_nr = ctx.seq_nr, error = %e, "[llo] Should-retire oracle failed, voting not to retire");
                false
            }
        }
    }

    fn propose_channel_changes(
        &self,
        ctx: &OutcomeContext,
        current: &ChannelDefinitions,
        desired: &ChannelDefinitions,
        observation: &mut Observation,
    ) {
        if self.config.verbose_logging {
            debug!(seq_nr = ctx.seq_nr, ?desired, "[llo] Desired channel definitions");
        }

        observation.remove_channel_ids = subtract_channel_definitions(
            current,
            desired,
            MAX_OBSERVATION_REMOVE_CHANNEL_IDS_LENGTH,
        )
        .into_keys()
        .collect();

        // An invalid entry would be picked again every round and hold back
        // every channel after it, so only valid entries are candidates.
        let candidates = verified_channel_definitions(ctx, desired);
        let mut updates = subtract_channel_definitions(
            &candidates,
            current,
            MAX_OBSERVATION_UPDATE_CHANNEL_DEFINITIONS_LENGTH,
        );
        let room = MAX_OBSERVATION_UPDATE_CHANNEL_DEFINITIONS_LENGTH - updates.len();
        if room > 0 {
            updates.extend(changed_channel_definitions(&candidates, current, room));
        }

        // Peers reject the whole observation if the proposed updates are
        // invalid, so drop them rather than lose the stream values too.
        // Individually valid entries can still exceed the stream limit together.
        if let Err(e) = verify_channel_definitions(&updates) {
            warn!(
                seq_nr = ctx.seq_nr,
                error = %e,
                "[llo] Desired channel definitions are invalid, not proposing updates"
            );
            updates.clear();
        }
        observation.update_channel_definitions = updates;
    }
}

/// Entries of `desired` that pass verification on their own
fn verified_channel_definitions(
    ctx: &OutcomeContext,
    desired: &ChannelDefinitions,
) -> ChannelDefinitions {
    desired
        .iter()
        .filter(|&(&channel_id, cd)| {
            let single = ChannelDefinitions::from([(channel_id, cd.clone())]);
            match verify_channel_definitions(&single) {
                Ok(()) => true,
                Err(e) => {
                    warn!(
                        seq_nr = ctx.seq_nr,
                        channel_id,
                        error = %e,
                        "[llo] Desired channel definition is invalid, not proposing it"
                    );
                    false
                }
            }
        })
        .map(|(&channel_id, cd)| (channel_id, cd.clone()))
        .collect()
}

/// One `None` slot per stream referenced by the agreed channel definitions,
/// capped at the per-observation limit
fn requested_stream_values(previous: &Outcome) -> StreamValues {
    let mut stream_values = StreamValues::new();
    for stream in previous
        .channel_definitions
        .values()
        .flat_map(|cd| cd.streams.iter())
    {
        stream_values.insert(stream.stream_id, None);
    }

    if stream_values.len() > MAX_OBSERVATION_STREAM_VALUES_LENGTH {
        warn!(
            requested = stream_values.len(),
            max = MAX_OBSERVATION_STREAM_VALUES_LENGTH,
            "[llo] Too many streams referenced, observing the lowest stream ids only"
        );
        stream_values = stream_values
            .into_iter()
            .take(MAX_OBSERVATION_STREAM_VALUES_LENGTH)
            .collect();
    }
    stream_values
}
