//! Outcome derivation
//!
//! Decoding and retirement verification happen here; the merge itself is
//! `domain::build_outcome`.

use super::LloPlugin;
use crate::domain::{build_outcome, initial_outcome, ObservationVotes};
use crate::error::{PluginError, PluginResult};
use crate::metrics;
use crate::ports::inbound::{AttributedObservation, OutcomeContext};
use tracing::{debug, info, warn};

impl LloPlugin {
    pub(super) fn derive_outcome(
        &self,
        ctx: &OutcomeContext,
        aos: &[AttributedObservation],
    ) -> PluginResult<Vec<u8>> {
        if aos.is_empty() {
            return Err(PluginError::NoObservations);
        }

        if ctx.seq_nr <= 1 {
            let outcome = initial_outcome(self.predecessor_config_digest.is_some());
            info!(
                seq_nr = ctx.seq_nr,
                stage = %outcome.life_cycle_stage,
                "[llo] Generated initial outcome"
            );
            metrics::record_outcome_derived(0, outcome.life_cycle_stage);
            return Ok(self.outcome_codec.encode(&outcome)?);
        }

        let previous = self.decode_previous_outcome(ctx)?;
        let mut votes = ObservationVotes::new();

        for ao in aos {
            let observation = match self.observation_codec.decode(&ao.observation) {
                Ok(observation) => observation,
                Err(e) => {
                    // Validation runs before this, so this only happens if
                    // the engine hands over observations it did not validate
                    warn!(
                        seq_nr = ctx.seq_nr,
                        observer = ao.observer,
                        error = %e,
                        "[llo] Skipping undecodable observation"
                    );
                    continue;
                }
            };

            if !observation.attested_predecessor_retirement.is_empty()
                && !votes.has_predecessor_retirement()
            {
                if let Some(predecessor) = self.predecessor_config_digest {
                    match self
                        .deps
                        .retirement_report_cache
                        .check_attested_retirement_report(
                            predecessor,
                            &observation.attested_predecessor_retirement,
                        ) {
                        Ok(report) => {
                            debug!(
                                seq_nr = ctx.seq_nr,
                                observer = ao.observer,
                                channels = report.valid_after_seconds.len(),
                                "[llo] Verified predecessor retirement report"
                            );
                            votes.record_predecessor_retirement(report);
                        }
                        Err(e) => warn!(
                            seq_nr = ctx.seq_nr,
                            observer = ao.observer,
                            error = %e,
                            "[llo] Ignoring invalid predecessor retirement report"
                        ),
                    }
                }
            }

            votes.add(&observation);
        }

        if votes.observation_count() == 0 {
            return Err(PluginError::NoObservations);
        }

        let outcome = build_outcome(&previous, &votes, self.f);

        if self.config.verbose_logging {
            debug!(seq_nr = ctx.seq_nr, ?outcome, "[llo] Generated outcome");
        } else {
            debug!(
                seq_nr = ctx.seq_nr,
                stage = %outcome.life_cycle_stage,
                channels = outcome.channel_definitions.len(),
                observations_timestamp_nanoseconds = outcome.observations_timestamp_nanoseconds,
                "[llo] Generated outcome"
            );
        }
        metrics::record_outcome_derived(outcome.channel_definitions.len(), outcome.life_cycle_stage);

        Ok(self.outcome_codec.encode(&outcome)?)
    }
}
