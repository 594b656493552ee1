//! # Faulty Observers
//!
//! Up to f participants may send garbage or lie about the desired
//! configuration without stalling the instance or steering its outcome.

#[cfg(test)]
mod tests {
    use super::super::json_channel;
    use crate::harness::{Cluster, ManualClock};
    use llo_plugin::adapters::InMemoryRetirementReportCache;
    use llo_plugin::RoundPhase;
    use llo_types::{ChannelDefinitions, ConfigDigest, LifeCycleStage, StreamValue};
    use std::sync::Arc;

    fn cluster() -> Cluster {
        Cluster::new(
            ConfigDigest([0x22; 32]),
            4,
            1,
            None,
            Arc::new(InMemoryRetirementReportCache::new()),
            Arc::new(ManualClock::new(1_700_000_000)),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_one_garbage_observation_is_tolerated() {
        let mut cluster = cluster();
        cluster.nodes[2].faulty = true;
        cluster.set_desired_channels(&ChannelDefinitions::from([(1, json_channel(1))]));

        cluster.clock.advance_seconds(1);
        let first = cluster.run_round().await.unwrap();
        // Garbage is not empty, so it is rejected in the first round too
        assert_eq!(first.rejected, 1);

        cluster.clock.advance_seconds(1);
        let second = cluster.run_round().await.unwrap();
        assert_eq!(second.rejected, 1);
        assert_eq!(second.phase, RoundPhase::ReportsEmitted);
        assert!(second.outcome.channel_definitions.contains_key(&1));
    }

    #[tokio::test]
    async fn test_too_many_faulty_observers_prevent_quorum() {
        let mut cluster = cluster();
        cluster.nodes[1].faulty = true;
        cluster.nodes[2].faulty = true;

        let err = cluster.run_round().await.unwrap_err();
        assert!(err.to_string().contains("quorum is 3"));
    }

    #[tokio::test]
    async fn test_single_node_cannot_add_a_channel() {
        let mut cluster = cluster();
        cluster.clock.advance_seconds(1);
        cluster.run_round().await.unwrap();

        cluster.nodes[0]
            .channels
            .set_definitions(ChannelDefinitions::from([(9, json_channel(9))]));
        cluster.clock.advance_seconds(1);
        let round = cluster.run_round().await.unwrap();
        assert!(round.outcome.channel_definitions.is_empty());
    }

    #[tokio::test]
    async fn test_outlier_value_does_not_move_median() {
        let mut cluster = cluster();
        cluster.set_desired_channels(&ChannelDefinitions::from([(1, json_channel(1))]));
        cluster.set_stream_value(1, StreamValue::integer(100));
        cluster.nodes[3]
            .data_source
            .set(1, StreamValue::integer(1_000_000));

        for _ in 0..3 {
            cluster.clock.advance_seconds(1);
            cluster.run_round().await.unwrap();
        }
        cluster.clock.advance_seconds(1);
        let round = cluster.run_round().await.unwrap();
        let aggregate = round.outcome.stream_aggregates[&1]
            .values()
            .next()
            .copied()
            .unwrap();
        assert_eq!(aggregate, StreamValue::integer(100));
    }

    #[tokio::test]
    async fn test_single_retire_vote_is_not_enough() {
        let mut cluster = cluster();
        for _ in 0..2 {
            cluster.clock.advance_seconds(1);
            cluster.run_round().await.unwrap();
        }
        cluster.nodes[0].should_retire.set_should_retire(true);
        cluster.clock.advance_seconds(1);
        let round = cluster.run_round().await.unwrap();
        assert_eq!(round.outcome.life_cycle_stage, LifeCycleStage::Production);
    }
}
