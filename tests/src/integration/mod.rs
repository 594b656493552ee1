//! Multi-node integration scenarios

pub mod faulty_observers;
pub mod quorum_rounds;
pub mod retirement_handover;

use llo_plugin::ReportWithInfo;
use llo_types::{Aggregator, ChannelDefinition, ReportFormat, Stream, StreamId};

/// Single-stream JSON channel
pub fn json_channel(stream_id: StreamId) -> ChannelDefinition {
    ChannelDefinition {
        report_format: ReportFormat::JSON,
        streams: vec![Stream::new(stream_id, Aggregator::MEDIAN)],
        opts: vec![],
    }
}

/// Decoded JSON report body
pub fn json_report(report: &ReportWithInfo) -> serde_json::Value {
    serde_json::from_slice(&report.report).unwrap_or(serde_json::Value::Null)
}

/// (channel id, valid after, observation timestamp) of a JSON report
pub fn report_window(report: &ReportWithInfo) -> Option<(u64, u64, u64)> {
    let json = json_report(report);
    Some((
        json["ChannelID"].as_u64()?,
        json["ValidAfterSeconds"].as_u64()?,
        json["ObservationTimestampSeconds"].as_u64()?,
    ))
}
