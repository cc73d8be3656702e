use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use prometheus::{
    Encoder, Histogram, IntCounter, IntCounterVec, IntGauge, TextEncoder, register_histogram,
    register_int_counter, register_int_counter_vec, register_int_gauge,
};
use std::time::Duration;

pub static TOOL_CALL_LATENCY_HISTO: Lazy<Histogram> = Lazy::new(|| {
    register_histogram!(
        "bridge_tool_call_latency_ms",
        "Latency of remote tool calls in ms"
    )
    .unwrap()
});

pub static TOOL_CALLS_INFLIGHT: Lazy<IntGauge> = Lazy::new(|| {
    register_int_gauge!("bridge_tool_calls_inflight", "In-flight remote tool calls").unwrap()
});

pub static TOOL_CALLS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "bridge_tool_calls_total",
        "Function tool invocations by outcome",
        &["outcome"]
    )
    .unwrap()
});

pub static DISCOVERY_FAILURES: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "bridge_discovery_failures_total",
        "Servers whose tool listing failed"
    )
    .unwrap()
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallOutcome {
    Ok,
    ArgumentError,
    CallError,
}

impl CallOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            CallOutcome::Ok => "ok",
            CallOutcome::ArgumentError => "argument_error",
            CallOutcome::CallError => "call_error",
        }
    }
}

/// Holds the in-flight gauge up for as long as it lives.
pub struct PendingGaugeGuard;

impl PendingGaugeGuard {
    pub fn new() -> Self {
        TOOL_CALLS_INFLIGHT.inc();
        PendingGaugeGuard
    }
}

impl Drop for PendingGaugeGuard {
    fn drop(&mut self) {
        TOOL_CALLS_INFLIGHT.dec();
    }
}

pub fn record_call(outcome: CallOutcome) {
    TOOL_CALLS_TOTAL.with_label_values(&[outcome.as_str()]).inc();
}

pub fn observe_call_latency(duration: Duration) {
    TOOL_CALL_LATENCY_HISTO.observe(duration.as_secs_f64() * 1000.0);
}

pub fn record_discovery_failure() {
    DISCOVERY_FAILURES.inc();
}

/// Prometheus text exposition of every registered metric.
pub fn render() -> Result<String> {
    Lazy::force(&TOOL_CALL_LATENCY_HISTO);
    Lazy::force(&TOOL_CALLS_INFLIGHT);
    Lazy::force(&TOOL_CALLS_TOTAL);
    Lazy::force(&DISCOVERY_FAILURES);
    let encoder = TextEncoder::new();
    let mut buf = Vec::new();
    encoder
        .encode(&prometheus::gather(), &mut buf)
        .context("encode metrics")?;
    String::from_utf8(buf).context("metrics output is not utf-8")
}
