//! # Quorum Rounds
//!
//! Nodes of one instance reconcile the desired channel configuration through
//! voting, agree on identical outcomes and emit contiguous report windows.

#[cfg(test)]
mod tests {
    use super::super::{json_channel, json_report, report_window};
    use crate::harness::{Cluster, ManualClock, SECOND};
    use llo_plugin::adapters::InMemoryRetirementReportCache;
    use llo_plugin::{Outcome, RoundPhase};
    use llo_types::{Aggregator, ChannelDefinitions, ConfigDigest, LifeCycleStage, StreamValue};
    use std::collections::BTreeMap;
    use std::sync::Arc;

    const START: i64 = 1_700_000_000;

    fn cluster(n: usize, f: usize) -> Cluster {
        Cluster::new(
            ConfigDigest([0x11; 32]),
            n,
            f,
            None,
            Arc::new(InMemoryRetirementReportCache::new()),
            Arc::new(ManualClock::new(START)),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_channels_are_adopted_then_reported() {
        let mut cluster = cluster(4, 1);
        cluster.set_desired_channels(&ChannelDefinitions::from([
            (1, json_channel(1)),
            (2, json_channel(2)),
        ]));
        cluster.set_stream_value(1, StreamValue::integer(100));
        cluster.set_stream_value(2, StreamValue::integer(200));

        // Round 1 only establishes the initial outcome
        cluster.clock.advance_seconds(1);
        let round = cluster.run_round().await.unwrap();
        assert_eq!(round.outcome.life_cycle_stage, LifeCycleStage::Production);
        assert!(round.outcome.channel_definitions.is_empty());
        assert!(round.reports.is_empty());

        // Round 2 adopts the channels; they are new, so nothing is reported
        cluster.clock.advance_seconds(1);
        let round = cluster.run_round().await.unwrap();
        assert_eq!(round.outcome.channel_definitions.len(), 2);
        assert_eq!(round.outcome.valid_after_seconds[&1], (START + 2) as u32);
        assert!(round.reports.is_empty());

        // Round 3 aggregates values and reports both channels
        cluster.clock.advance_seconds(1);
        let round = cluster.run_round().await.unwrap();
        assert_eq!(
            round.outcome.stream_aggregates[&1],
            BTreeMap::from([(Aggregator::MEDIAN, StreamValue::integer(100))])
        );
        let windows: Vec<_> = round.reports.iter().filter_map(report_window).collect();
        assert_eq!(
            windows,
            vec![
                (1, (START + 2) as u64, (START + 3) as u64),
                (2, (START + 2) as u64, (START + 3) as u64),
            ]
        );
        assert_eq!(json_report(&round.reports[0])["Values"][0], "0x64");
        assert_eq!(round.phase, RoundPhase::ReportsEmitted);
    }

    #[tokio::test]
    async fn test_report_windows_are_contiguous() {
        let mut cluster = cluster(4, 1);
        cluster.set_desired_channels(&ChannelDefinitions::from([(5, json_channel(5))]));
        cluster.set_stream_value(5, StreamValue::integer(42));

        let mut windows = Vec::new();
        for _ in 0..8 {
            cluster.clock.advance_seconds(1);
            let round = cluster.run_round().await.unwrap();
            windows.extend(round.reports.iter().filter_map(report_window));
        }

        assert!(windows.len() >= 5);
        for pair in windows.windows(2) {
            let (_, _, previous_until) = pair[0];
            let (_, valid_after, until) = pair[1];
            assert_eq!(valid_after, previous_until, "gap or overlap between reports");
            assert!(valid_after < until);
        }
    }

    #[tokio::test]
    async fn test_three_observations_add_a_channel() {
        let mut cluster = cluster(4, 1);
        cluster.nodes[3].faulty = true;

        let mut previous = Outcome {
            life_cycle_stage: LifeCycleStage::Production,
            observations_timestamp_nanoseconds: (START - 1) * SECOND,
            ..Outcome::default()
        };
        for id in [1, 2] {
            previous.channel_definitions.insert(id, json_channel(id));
            previous.valid_after_seconds.insert(id, (START - 2) as u32);
        }
        cluster.seed(10, &previous).unwrap();
        cluster.set_desired_channels(&ChannelDefinitions::from([
            (1, json_channel(1)),
            (2, json_channel(2)),
            (3, json_channel(3)),
        ]));

        let round = cluster.run_round().await.unwrap();

        assert_eq!(round.seq_nr, 11);
        assert_eq!(round.rejected, 1);
        assert_eq!(
            round.outcome.channel_definitions.keys().copied().collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
        assert_eq!(round.outcome.valid_after_seconds[&3], START as u32);
        // Existing channels were reported from the seeded outcome
        assert_eq!(round.outcome.valid_after_seconds[&1], (START - 1) as u32);
    }

    #[tokio::test]
    async fn test_channel_removal_drops_validity_entry() {
        let mut cluster = cluster(4, 1);
        cluster.set_desired_channels(&ChannelDefinitions::from([
            (1, json_channel(1)),
            (2, json_channel(2)),
        ]));
        for _ in 0..3 {
            cluster.clock.advance_seconds(1);
            cluster.run_round().await.unwrap();
        }

        cluster.set_desired_channels(&ChannelDefinitions::from([(1, json_channel(1))]));
        cluster.clock.advance_seconds(1);
        let round = cluster.run_round().await.unwrap();

        assert!(!round.outcome.channel_definitions.contains_key(&2));
        assert!(!round.outcome.valid_after_seconds.contains_key(&2));
        assert!(round.outcome.channel_definitions.contains_key(&1));
    }

    #[tokio::test]
    async fn test_changed_definition_is_replaced() {
        let mut cluster = cluster(4, 1);
        cluster.set_desired_channels(&ChannelDefinitions::from([(1, json_channel(1))]));
        for _ in 0..2 {
            cluster.clock.advance_seconds(1);
            cluster.run_round().await.unwrap();
        }

        cluster.set_desired_channels(&ChannelDefinitions::from([(1, json_channel(10))]));
        cluster.clock.advance_seconds(1);
        let round = cluster.run_round().await.unwrap();
        assert_eq!(round.outcome.channel_definitions[&1], json_channel(10));
    }
}
