//! Adapters module for the reporting plugin
//!
//! Default implementations of the outbound ports.

pub mod channel_definition_cache;
pub mod codec;
pub mod data_source;
pub mod report_codecs;
pub mod retirement_cache;
pub mod should_retire;
pub mod time;

pub use channel_definition_cache::StaticChannelDefinitionCache;
pub use codec::{BincodeObservationCodec, BincodeOutcomeCodec};
pub use data_source::InMemoryDataSource;
pub use report_codecs::{EvmPremiumLegacyReportCodec, JsonReportCodec, ReportCodecs};
pub use retirement_cache::InMemoryRetirementReportCache;
pub use should_retire::StaticShouldRetireCache;
pub use time::SystemTimeSource;
