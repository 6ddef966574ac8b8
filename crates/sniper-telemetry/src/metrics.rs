//! Prometheus metrics for the whale sniper.
//!
//! Metrics live in the default registry; exposition is left to the host.
//!
//! # Panics
//!
//! Metric registration uses `unwrap()` intentionally. A registration failure
//! means duplicate metric names, a programming error that should crash at
//! startup. These panics only occur during static initialization.

use once_cell::sync::Lazy;
use prometheus::{
    register_int_counter, register_int_counter_vec, register_int_gauge, IntCounter,
    IntCounterVec, IntGauge,
};

/// WebSocket connection state (1 = connected, 0 = disconnected).
pub static WS_CONNECTED: Lazy<IntGauge> = Lazy::new(|| {
    register_int_gauge!("sniper_ws_connected", "WebSocket connection state (1=connected)")
        .unwrap()
});

/// Sessions started after the first one.
pub static WS_RECONNECT_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "sniper_ws_reconnect_total",
        "Total WebSocket reconnections"
    )
    .unwrap()
});

/// Binary frames received from the exchange.
pub static FRAMES_RECEIVED_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "sniper_frames_received_total",
        "Total binary frames received"
    )
    .unwrap()
});

/// Frames dropped because they failed to decode.
pub static DECODE_FAILURES_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "sniper_decode_failures_total",
        "Total frames dropped on decode failure"
    )
    .unwrap()
});

/// Snapshots applied to the order book.
pub static SNAPSHOTS_APPLIED_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "sniper_snapshots_applied_total",
        "Total order-book snapshots applied"
    )
    .unwrap()
});

/// Alerts emitted, by rule.
pub static ALERTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!("sniper_alerts_total", "Total alerts emitted", &["rule"]).unwrap()
});

/// Failed alert deliveries, by sink.
pub static SINK_FAILURES_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "sniper_sink_failures_total",
        "Total failed alert deliveries",
        &["sink"]
    )
    .unwrap()
});

/// Metrics helper.
pub struct Metrics;

impl Metrics {
    pub fn ws_connected() {
        WS_CONNECTED.set(1);
    }

    pub fn ws_disconnected() {
        WS_CONNECTED.set(0);
    }

    pub fn ws_reconnect() {
        WS_RECONNECT_TOTAL.inc();
    }

    pub fn frame_received() {
        FRAMES_RECEIVED_TOTAL.inc();
    }

    pub fn decode_failed() {
        DECODE_FAILURES_TOTAL.inc();
    }

    pub fn snapshot_applied() {
        SNAPSHOTS_APPLIED_TOTAL.inc();
    }

    pub fn alert_emitted(rule: &str) {
        ALERTS_TOTAL.with_label_values(&[rule]).inc();
    }

    pub fn sink_failed(sink: &str) {
        SINK_FAILURES_TOTAL.with_label_values(&[sink]).inc();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_gauge() {
        Metrics::ws_connected();
        assert_eq!(WS_CONNECTED.get(), 1);
        Metrics::ws_disconnected();
        assert_eq!(WS_CONNECTED.get(), 0);
    }

    #[test]
    fn test_labelled_counters() {
        let before = ALERTS_TOTAL.with_label_values(&["wall"]).get();
        Metrics::alert_emitted("wall");
        Metrics::alert_emitted("wall");
        assert_eq!(ALERTS_TOTAL.with_label_values(&["wall"]).get(), before + 2);

        Metrics::sink_failed("telegram");
        assert!(SINK_FAILURES_TOTAL.with_label_values(&["telegram"]).get() >= 1);
    }

    #[test]
    fn test_pipeline_counters_registered() {
        Metrics::frame_received();
        Metrics::decode_failed();
        Metrics::snapshot_applied();
        Metrics::ws_reconnect();

        let names: Vec<String> = prometheus::gather()
            .iter()
            .map(|family| family.get_name().to_string())
            .collect();
        assert!(names.contains(&"sniper_frames_received_total".to_string()));
        assert!(names.contains(&"sniper_decode_failures_total".to_string()));
    }
}
