//! Ports module for the reporting plugin
//!
//! `inbound` is the fixed callback contract the host consensus engine drives.
//! `outbound` lists the collaborators the plugin consumes.

pub mod inbound;
pub mod outbound;

pub use inbound::{
    AttributedObservation, OracleId, OutcomeContext, Query, ReportingPlugin,
    ReportingPluginFactory,
};
pub use outbound::{
    ChannelDefinitionCache, DataSource, DataSourceOpts, ObservationCodec, OutcomeCodec,
    PredecessorRetirementReportCache, ReportCodec, ShouldRetireCache, TimeSource,
};
