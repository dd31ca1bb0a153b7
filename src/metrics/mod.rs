//! Prometheus metrics for the publishing scheduler
//!
//! This module tracks:
//! - Schedule requests by platform and outcome
//! - Conflicts by platform and resolution
//! - Tick promotions
//! - Remaining slots per platform (updated on every forecast)
//!
//! # Usage
//!
//! Call `init_metrics()` at application startup to register all metrics.
//! Until then (or if registration fails) every recording function is a no-op.

use prometheus::{
    register_counter_vec, register_gauge_vec, register_int_counter, CounterVec, Encoder,
    GaugeVec, IntCounter, TextEncoder,
};
use std::sync::{Mutex, OnceLock};

// ============================================================================
// Metrics Storage
// ============================================================================

struct SchedulerMetrics {
    schedule_requests: CounterVec,
    conflicts: CounterVec,
    tick_promoted: IntCounter,
    ticks_skipped: IntCounter,
    slots_remaining: GaugeVec,
}

static METRICS: OnceLock<SchedulerMetrics> = OnceLock::new();

/// Serializes registration so concurrent callers never double-register
static INIT_LOCK: Mutex<()> = Mutex::new(());

// ============================================================================
// Initialization
// ============================================================================

/// Register all metrics with the default Prometheus registry.
///
/// Idempotent: later calls return `Ok(())` without registering again.
pub fn init_metrics() -> Result<(), prometheus::Error> {
    let _guard = INIT_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    if METRICS.get().is_some() {
        return Ok(());
    }

    let metrics = SchedulerMetrics {
        schedule_requests: register_counter_vec!(
            "reelcast_schedule_requests_total",
            "Schedule requests by platform and outcome",
            &["platform", "outcome"]
        )?,
        conflicts: register_counter_vec!(
            "reelcast_conflicts_total",
            "Scheduling conflicts by platform and resolution",
            &["platform", "resolution"]
        )?,
        tick_promoted: register_int_counter!(
            "reelcast_tick_promoted_total",
            "Entries promoted from scheduled to pending by the tick"
        )?,
        ticks_skipped: register_int_counter!(
            "reelcast_ticks_skipped_total",
            "Ticks skipped because another tick was running"
        )?,
        slots_remaining: register_gauge_vec!(
            "reelcast_slots_remaining_today",
            "Publishing slots left today per platform",
            &["platform"]
        )?,
    };

    let _ = METRICS.set(metrics);
    tracing::info!("Prometheus metrics initialized successfully");
    Ok(())
}

/// Check if metrics have been initialized
pub fn metrics_initialized() -> bool {
    METRICS.get().is_some()
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Encode all metrics to Prometheus text format
pub fn encode_metrics() -> Result<String, Box<dyn std::error::Error + Send + Sync>> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    Ok(String::from_utf8(buffer)?)
}

/// Record the outcome of a schedule request
pub fn record_schedule_outcome(platform: &str, outcome: &str) {
    if let Some(m) = METRICS.get() {
        m.schedule_requests
            .with_label_values(&[platform, outcome])
            .inc();
    }
}

/// Record a detected conflict and how it was settled
pub fn record_conflict(platform: &str, resolution: &str) {
    if let Some(m) = METRICS.get() {
        m.conflicts.with_label_values(&[platform, resolution]).inc();
    }
}

/// Record entries promoted by a tick
pub fn record_tick(promoted: usize) {
    if let Some(m) = METRICS.get() {
        m.tick_promoted.inc_by(promoted as u64);
    }
}

/// Record a tick skipped due to an in-flight tick
pub fn record_tick_skipped() {
    if let Some(m) = METRICS.get() {
        m.ticks_skipped.inc();
    }
}

/// Update the remaining-slots gauge for a platform
pub fn set_slots_remaining(platform: &str, remaining: u32) {
    if let Some(m) = METRICS.get() {
        m.slots_remaining
            .with_label_values(&[platform])
            .set(f64::from(remaining));
    }
}
