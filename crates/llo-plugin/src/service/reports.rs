//! Report generation

use super::LloPlugin;
use crate::domain::{Report, ReportWithInfo, RetirementReport};
use crate::error::{CodecError, PluginError, PluginResult};
use crate::metrics;
use llo_types::{LifeCycleStage, ReportFormat, ReportInfo};
use tracing::{debug, info, warn};

impl LloPlugin {
    pub(super) fn generate_reports(
        &self,
        seq_nr: u64,
        raw_outcome: &[u8],
    ) -> PluginResult<Vec<ReportWithInfo>> {
        // The first round only establishes the initial outcome
        if seq_nr <= 1 {
            return Ok(Vec::new());
        }

        let outcome = self.outcome_codec.decode(raw_outcome).map_err(|e| {
            tracing::error!(seq_nr, len = raw_outcome.len(), error = %e, "[llo] Failed to decode outcome");
            PluginError::Critical(e)
        })?;

        if outcome.life_cycle_stage == LifeCycleStage::Retired {
            // Handover record for the successor instance
            let retirement_report = RetirementReport {
                valid_after_seconds: outcome.valid_after_seconds.clone(),
            };
            info!(
                seq_nr,
                channels = retirement_report.valid_after_seconds.len(),
                "[llo] Emitting retirement report"
            );
            metrics::record_report_emitted("retirement");
            return Ok(vec![ReportWithInfo {
                report: retirement_report.encode()?,
                info: ReportInfo {
                    life_cycle_stage: LifeCycleStage::Retired,
                    report_format: ReportFormat::JSON,
                },
            }]);
        }

        let (reportable, unreportable) = outcome.reportable_channels();
        for (channel_id, reason) in &unreportable {
            metrics::record_channel_unreportable(reason.reason());
            debug!(seq_nr, channel_id, %reason, "[llo] Skipping channel");
        }

        let Some(observation_timestamp_seconds) = outcome.observations_timestamp_seconds() else {
            return Ok(Vec::new());
        };
        let specimen = outcome.life_cycle_stage != LifeCycleStage::Production;

        let mut reports = Vec::with_capacity(reportable.len());
        for channel_id in reportable {
            let (Some(cd), Some(&valid_after_seconds)) = (
                outcome.channel_definitions.get(&channel_id),
                outcome.valid_after_seconds.get(&channel_id),
            ) else {
                continue;
            };

            let report = Report {
                config_digest: self.config_digest,
                seq_nr,
                channel_id,
                valid_after_seconds,
                observation_timestamp_seconds,
                values: outcome.values_for(cd),
                specimen,
            };

            let encoded = self
                .deps
                .report_codecs
                .get(cd.report_format)
                .ok_or(CodecError::MissingReportCodec(cd.report_format))
                .and_then(|codec| codec.encode(&report, cd));

            match encoded {
                Ok(bytes) => {
                    metrics::record_report_emitted(&cd.report_format.to_string());
                    reports.push(ReportWithInfo {
                        report: bytes,
                        info: ReportInfo {
                            life_cycle_stage: outcome.life_cycle_stage,
                            report_format: cd.report_format,
                        },
                    });
                }
                Err(e) => {
                    warn!(seq_nr, channel_id, error = %e, "[llo] Failed to encode report, skipping");
                }
            }
        }

        debug!(
            seq_nr,
            reports = reports.len(),
            skipped = unreportable.len(),
            "[llo] Generated reports"
        );
        Ok(reports)
    }
}
