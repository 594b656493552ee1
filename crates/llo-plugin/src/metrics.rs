//! # Plugin Metrics
//!
//! Prometheus metrics for monitoring round health.
//!
//! Enable with the `metrics` feature:
//! ```toml
//! llo-plugin = { path = "...", features = ["metrics"] }
//! ```
//!
//! ## Metrics Exported
//!
//! - `llo_observations_emitted_total` - Counter of observations produced
//! - `llo_observations_rejected_total` - Counter of rejected peer observations (by reason)
//! - `llo_outcomes_derived_total` - Counter of outcomes derived
//! - `llo_reports_emitted_total` - Counter of reports emitted (by format)
//! - `llo_channels_unreportable_total` - Counter of skipped channels (by reason)
//! - `llo_outcome_channel_definitions` - Gauge of channels in the latest outcome
//! - `llo_life_cycle_stage` - Gauge of the stage (0=Staging, 1=Production, 2=Retired)

#[cfg(feature = "metrics")]
use lazy_static::lazy_static;

#[cfg(feature = "metrics")]
use prometheus::{
    register_gauge, register_int_counter, register_int_counter_vec, Gauge, IntCounter,
    IntCounterVec,
};

use llo_types::LifeCycleStage;

#[cfg(feature = "metrics")]
lazy_static! {
    pub static ref OBSERVATIONS_EMITTED: IntCounter = register_int_counter!(
        "llo_observations_emitted_total",
        "Total number of observations produced by this node"
    )
    .expect("Failed to create OBSERVATIONS_EMITTED metric");

    /// Rejected peer observations, labeled by reason
    pub static ref OBSERVATIONS_REJECTED: IntCounterVec = register_int_counter_vec!(
        "llo_observations_rejected_total",
        "Total number of peer observations rejected",
        &["reason"]
    )
    .expect("Failed to create OBSERVATIONS_REJECTED metric");

    pub static ref OUTCOMES_DERIVED: IntCounter = register_int_counter!(
        "llo_outcomes_derived_total",
        "Total number of outcomes derived"
    )
    .expect("Failed to create OUTCOMES_DERIVED metric");

    /// Emitted reports, labeled by report format
    pub static ref REPORTS_EMITTED: IntCounterVec = register_int_counter_vec!(
        "llo_reports_emitted_total",
        "Total number of reports emitted",
        &["format"]
    )
    .expect("Failed to create REPORTS_EMITTED metric");

    /// Channels skipped during report generation, labeled by reason
    pub static ref CHANNELS_UNREPORTABLE: IntCounterVec = register_int_counter_vec!(
        "llo_channels_unreportable_total",
        "Total number of channels skipped during report generation",
        &["reason"]
    )
    .expect("Failed to create CHANNELS_UNREPORTABLE metric");

    pub static ref OUTCOME_CHANNEL_DEFINITIONS: Gauge = register_gauge!(
        "llo_outcome_channel_definitions",
        "Number of channel definitions in the latest outcome"
    )
    .expect("Failed to create OUTCOME_CHANNEL_DEFINITIONS metric");

    /// Stage (0=Staging, 1=Production, 2=Retired)
    pub static ref LIFE_CYCLE_STAGE: Gauge = register_gauge!(
        "llo_life_cycle_stage",
        "Life cycle stage of the protocol instance (0=Staging, 1=Production, 2=Retired)"
    )
    .expect("Failed to create LIFE_CYCLE_STAGE metric");
}

#[cfg_attr(not(feature = "metrics"), allow(dead_code))]
fn stage_value(stage: LifeCycleStage) -> f64 {
    match stage {
        LifeCycleStage::Staging => 0.0,
        LifeCycleStage::Production => 1.0,
        LifeCycleStage::Retired => 2.0,
    }
}

// =============================================================================
// METRIC RECORDING FUNCTIONS
// =============================================================================

#[cfg(feature = "metrics")]
pub fn record_observation_emitted() {
    OBSERVATIONS_EMITTED.inc();
}

#[cfg(feature = "metrics")]
pub fn record_observation_rejected(reason: &str) {
    OBSERVATIONS_REJECTED.with_label_values(&[reason]).inc();
}

/// Record a derived outcome and its resulting shape
#[cfg(feature = "metrics")]
pub fn record_outcome_derived(channel_count: usize, stage: LifeCycleStage) {
    OUTCOMES_DERIVED.inc();
    OUTCOME_CHANNEL_DEFINITIONS.set(channel_count as f64);
    LIFE_CYCLE_STAGE.set(stage_value(stage));
}

#[cfg(feature = "metrics")]
pub fn record_report_emitted(format: &str) {
    REPORTS_EMITTED.with_label_values(&[format]).inc();
}

#[cfg(feature = "metrics")]
pub fn record_channel_unreportable(reason: &str) {
    CHANNELS_UNREPORTABLE.with_label_values(&[reason]).inc();
}

// =============================================================================
// NO-OP IMPLEMENTATIONS (when metrics feature disabled)
// =============================================================================

#[cfg(not(feature = "metrics"))]
pub fn record_observation_emitted() {}

#[cfg(not(feature = "metrics"))]
pub fn record_observation_rejected(_reason: &str) {}

#[cfg(not(feature = "metrics"))]
pub fn record_outcome_derived(_channel_count: usize, _stage: LifeCycleStage) {}

#[cfg(not(feature = "metrics"))]
pub fn record_report_emitted(_format: &str) {}

#[cfg(not(feature = "metrics"))]
pub fn record_channel_unreportable(_reason: &str) {}
