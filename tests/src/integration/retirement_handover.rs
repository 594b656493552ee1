//! # Retirement Handover
//!
//! A retiring instance publishes its per-channel validity timestamps; its
//! successor absorbs them when leaving staging so reports of the two
//! instances neither overlap nor leave a gap.

#[cfg(test)]
mod tests {
    use super::super::{json_channel, json_report, report_window};
    use crate::harness::{Cluster, ManualClock};
    use llo_plugin::adapters::InMemoryRetirementReportCache;
    use llo_plugin::ports::outbound::PredecessorRetirementReportCache;
    use llo_plugin::RetirementReport;
    use llo_types::{ChannelDefinitions, ConfigDigest, LifeCycleStage, ReportFormat, StreamValue};
    use std::sync::Arc;

    const RETIRING: ConfigDigest = ConfigDigest([0xaa; 32]);
    const SUCCESSOR: ConfigDigest = ConfigDigest([0xbb; 32]);
    const CHANNEL: u32 = 7;

    fn clusters() -> (Cluster, Cluster) {
        let cache = Arc::new(InMemoryRetirementReportCache::new());
        let clock = Arc::new(ManualClock::new(1_700_000_000));
        let retiring = Cluster::new(RETIRING, 4, 1, None, cache.clone(), clock.clone()).unwrap();
        let successor =
            Cluster::new(SUCCESSOR, 4, 1, Some(RETIRING), cache, clock).unwrap();

        let desired = ChannelDefinitions::from([(CHANNEL, json_channel(CHANNEL))]);
        for cluster in [&retiring, &successor] {
            cluster.set_desired_channels(&desired);
            cluster.set_stream_value(CHANNEL, StreamValue::integer(5));
        }
        (retiring, successor)
    }

    #[tokio::test]
    async fn test_successor_continues_where_predecessor_stopped() {
        let (mut retiring, mut successor) = clusters();

        // Both instances run side by side; the successor only produces specimens
        let mut last_retiring_report = None;
        for _ in 0..4 {
            retiring.clock.advance_seconds(1);
            let round = retiring.run_round().await.unwrap();
            if let Some(report) = round.reports.last() {
                last_retiring_report = report_window(report);
            }

            let round = successor.run_round().await.unwrap();
            assert_eq!(round.outcome.life_cycle_stage, LifeCycleStage::Staging);
            for report in &round.reports {
                assert_eq!(json_report(report)["Specimen"], true);
            }
        }
        let (_, _, reported_until) = last_retiring_report.unwrap();

        // Retire: the first retired outcome freezes validity timestamps
        retiring.set_should_retire(true);
        retiring.clock.advance_seconds(1);
        let round = retiring.run_round().await.unwrap();
        assert_eq!(round.outcome.life_cycle_stage, LifeCycleStage::Retired);
        assert_eq!(round.reports.len(), 1);
        assert_eq!(round.reports[0].info.report_format, ReportFormat::JSON);
        let retirement = RetirementReport::decode(&round.reports[0].report).unwrap();
        let handover_at = retirement.valid_after_seconds[&CHANNEL];
        assert_eq!(u64::from(handover_at), reported_until);
        assert!(retiring
            .retirement_cache
            .attested_retirement_report(RETIRING)
            .is_ok());

        // Retired instances keep emitting the identical report
        retiring.clock.advance_seconds(1);
        let again = retiring.run_round().await.unwrap();
        assert_eq!(again.reports, round.reports);

        // The successor picks the report up and takes over
        let round = successor.run_round().await.unwrap();
        assert_eq!(round.outcome.life_cycle_stage, LifeCycleStage::Production);
        assert_eq!(round.outcome.valid_after_seconds[&CHANNEL], handover_at);

        let first = round
            .reports
            .iter()
            .find(|r| report_window(r).map(|w| w.0) == Some(u64::from(CHANNEL)))
            .unwrap();
        assert_eq!(json_report(first)["Specimen"], false);
        assert_eq!(json_report(first)["ValidAfterSeconds"], handover_at);

        // And never reports a window starting before the handover
        for _ in 0..3 {
            successor.clock.advance_seconds(1);
            let round = successor.run_round().await.unwrap();
            for (_, valid_after, _) in round.reports.iter().filter_map(report_window) {
                assert!(valid_after >= u64::from(handover_at));
            }
        }
    }

    #[tokio::test]
    async fn test_successor_stays_in_staging_without_report() {
        let (_retiring, mut successor) = clusters();
        for _ in 0..5 {
            successor.clock.advance_seconds(1);
            let round = successor.run_round().await.unwrap();
            assert_eq!(round.outcome.life_cycle_stage, LifeCycleStage::Staging);
        }
    }

    #[tokio::test]
    async fn test_retired_instance_freezes_channels() {
        let (mut retiring, _successor) = clusters();
        for _ in 0..3 {
            retiring.clock.advance_seconds(1);
            retiring.run_round().await.unwrap();
        }
        retiring.set_should_retire(true);
        retiring.clock.advance_seconds(1);
        retiring.run_round().await.unwrap();

        retiring.set_desired_channels(&ChannelDefinitions::new());
        retiring.clock.advance_seconds(1);
        let round = retiring.run_round().await.unwrap();
        assert_eq!(round.outcome.life_cycle_stage, LifeCycleStage::Retired);
        assert!(round.outcome.channel_definitions.contains_key(&CHANNEL));
        assert!(round.outcome.stream_aggregates.is_empty());
    }
}
