//! # Reporting Plugin Benchmarks
//!
//! Callbacks that run on every round must stay cheap:
//!
//! | Operation | Input | Target |
//! |-----------|-------|--------|
//! | verify_channel_definitions | 10,000 channels | < 10ms |
//! | subtract_channel_definitions | 10,000 vs 10,000 channels | < 5ms |
//! | build_outcome | 10,000 channels, 16 observers | < 50ms |

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use llo_plugin::domain::{
    build_outcome, subtract_channel_definitions, verify_channel_definitions, ObservationVotes,
    MAX_OUTCOME_CHANNEL_DEFINITIONS_LENGTH,
};
use llo_plugin::{Observation, Outcome};
use llo_types::{
    Aggregator, ChannelDefinition, ChannelDefinitions, LifeCycleStage, ReportFormat, Stream,
    StreamValue,
};
use std::time::Duration;

fn definitions(count: u32, offset: u32) -> ChannelDefinitions {
    (0..count)
        .map(|i| {
            (
                i + offset,
                ChannelDefinition {
                    report_format: ReportFormat::JSON,
                    streams: vec![Stream::new(i % 1_000, Aggregator::MEDIAN)],
                    opts: vec![],
                },
            )
        })
        .collect()
}

fn bench_verify(c: &mut Criterion) {
    let mut group = c.benchmark_group("channel-definitions");
    group.measurement_time(Duration::from_secs(5));

    for count in [100u32, 1_000, MAX_OUTCOME_CHANNEL_DEFINITIONS_LENGTH as u32] {
        let defs = definitions(count, 0);
        group.bench_with_input(BenchmarkId::new("verify", count), &defs, |b, defs| {
            b.iter(|| black_box(verify_channel_definitions(defs).is_ok()))
        });
    }

    let current = definitions(10_000, 0);
    let desired = definitions(10_000, 5_000);
    group.bench_function("subtract_10k", |b| {
        b.iter(|| black_box(subtract_channel_definitions(&desired, &current, 5)))
    });
    group.finish();
}

fn bench_outcome(c: &mut Criterion) {
    let mut group = c.benchmark_group("outcome");
    group.measurement_time(Duration::from_secs(10));

    let previous = Outcome {
        life_cycle_stage: LifeCycleStage::Production,
        observations_timestamp_nanoseconds: 1_700_000_000_000_000_000,
        channel_definitions: definitions(10_000, 0),
        valid_after_seconds: (0..10_000).map(|i| (i, 1_699_999_999)).collect(),
        ..Outcome::default()
    };

    for observers in [4usize, 16] {
        let mut votes = ObservationVotes::new();
        for o in 0..observers {
            votes.add(&Observation {
                unix_timestamp_nanoseconds: 1_700_000_001_000_000_000 + o as i64,
                stream_values: (0..1_000)
                    .map(|s| (s, Some(StreamValue::integer(u64::from(s) + o as u64))))
                    .collect(),
                ..Observation::default()
            });
        }
        let f = (observers - 1) / 3;
        group.bench_with_input(
            BenchmarkId::new("build_outcome", observers),
            &votes,
            |b, votes| b.iter(|| black_box(build_outcome(&previous, votes, f))),
        );
    }
    group.finish();
}

criterion_group!(benches, bench_verify, bench_outcome);
criterion_main!(benches);
