//! # Stream Values
//!
//! Observed values are either plain integers or three-sided quotes. A stream
//! that was not observed in a round carries `None`.

use primitive_types::U256;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::entities::StreamId;

/// Bid / benchmark / ask triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Quote {
    pub bid: U256,
    pub benchmark: U256,
    pub ask: U256,
}

/// One observed or aggregated value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum StreamValue {
    Integer(U256),
    Quote(Quote),
}

impl StreamValue {
    pub fn integer(value: u64) -> Self {
        StreamValue::Integer(U256::from(value))
    }

    pub fn as_integer(&self) -> Option<U256> {
        match self {
            StreamValue::Integer(v) => Some(*v),
            StreamValue::Quote(_) => None,
        }
    }

    pub fn as_quote(&self) -> Option<Quote> {
        match self {
            StreamValue::Quote(q) => Some(*q),
            StreamValue::Integer(_) => None,
        }
    }
}

/// Values for the streams requested in one round.
pub type StreamValues = BTreeMap<StreamId, Option<StreamValue>>;
