//! # LLO Types Crate
//!
//! Identifiers and the data model shared by the low-latency reporting plugin,
//! its adapters and the integration test suite.
//!
//! ## Clusters
//!
//! - **Channels**: `ChannelId`, `ChannelDefinition`, `ChannelDefinitions`, `ReportFormat`
//! - **Streams**: `StreamId`, `Aggregator`, `StreamValue`, `StreamValues`
//! - **Instances**: `ConfigDigest`, `LifeCycleStage`, `ReportInfo`
//!
//! ## Design Principles
//!
//! - **Deterministic encoding**: every mapping is a `BTreeMap`, so any two
//!   participants serializing the same value produce identical bytes.
//! - **Lenient tags**: `ReportFormat` and `Aggregator` are open newtypes, so
//!   definitions for formats this build does not know still round-trip.

pub mod entities;
pub mod values;

pub use entities::*;
pub use values::*;
