//! Stream aggregators
//!
//! Every correct participant aggregates the same multiset of samples, so each
//! aggregator sorts before selecting. More than f samples of the right kind
//! are required so that at least one honest observer contributed.

use llo_types::{Aggregator, Quote, StreamValue};
use primitive_types::U256;
use std::collections::BTreeMap;

/// Aggregate `samples` with `aggregator`, or `None` if there are not enough
/// samples of the kind the aggregator consumes or the aggregator is unknown.
pub fn aggregate(aggregator: Aggregator, samples: &[StreamValue], f: usize) -> Option<StreamValue> {
    match aggregator {
        Aggregator::MEDIAN => {
            let integers: Vec<U256> = samples.iter().filter_map(StreamValue::as_integer).collect();
            if integers.len() <= f {
                return None;
            }
            median(integers).map(StreamValue::Integer)
        }
        Aggregator::MODE => {
            if samples.len() <= f {
                return None;
            }
            mode(samples)
        }
        Aggregator::QUOTE => {
            let quotes: Vec<Quote> = samples.iter().filter_map(StreamValue::as_quote).collect();
            if quotes.len() <= f {
                return None;
            }
            Some(StreamValue::Quote(Quote {
                bid: median(quotes.iter().map(|q| q.bid).collect())?,
                benchmark: median(quotes.iter().map(|q| q.benchmark).collect())?,
                ask: median(quotes.iter().map(|q| q.ask).collect())?,
            }))
        }
        _ => None,
    }
}

/// Upper median
fn median(mut values: Vec<U256>) -> Option<U256> {
    values.sort_unstable();
    values.get(values.len() / 2).copied()
}

/// Most frequent value; ties go to the smallest value
fn mode(samples: &[StreamValue]) -> Option<StreamValue> {
    let mut counts: BTreeMap<StreamValue, usize> = BTreeMap::new();
    for sample in samples {
        *counts.entry(*sample).or_insert(0) += 1;
    }

    let mut best: Option<(StreamValue, usize)> = None;
    for (value, count) in counts {
        match best {
            Some((_, best_count)) if best_count >= count => {}
            _ => best = Some((value, count)),
        }
    }
    best.map(|(value, _)| value)
}
