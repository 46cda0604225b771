//! Metrics collection for observability
//!
//! # Metrics
//!
//! - `account_commands_total` - Commands processed, by outcome counters below
//! - `account_commands_rejected_total` - Commands rejected by domain rules
//! - `account_write_conflicts_total` - Optimistic write conflicts observed
//! - `account_retries_exhausted_total` - Commands that ran out of attempts
//! - `account_command_duration_seconds` - Full command cycle latency
//! - `account_events_appended_total` - Events persisted
//! - `account_queries_total` - Account queries served

use prometheus::{
    register_histogram_with_registry, register_int_counter_with_registry, Encoder, Histogram,
    HistogramOpts, IntCounter, Opts, Registry, TextEncoder,
};

/// Metrics collector
#[derive(Clone)]
pub struct Metrics {
    /// Commands processed (any outcome)
    pub commands_total: IntCounter,

    /// Commands rejected by domain rules
    pub commands_rejected_total: IntCounter,

    /// Optimistic write conflicts observed
    pub write_conflicts_total: IntCounter,

    /// Commands that exhausted their attempt budget
    pub retries_exhausted_total: IntCounter,

    /// Full command cycle latency
    pub command_duration_seconds: Histogram,

    /// Events persisted
    pub events_appended_total: IntCounter,

    /// Account queries served
    pub queries_total: IntCounter,

    /// Prometheus registry
    pub registry: Registry,
}

impl Metrics {
    /// Create new metrics collector with its own registry
    pub fn new() -> prometheus::Result<Self> {
        let registry = Registry::new();

        let commands_total = register_int_counter_with_registry!(
            Opts::new("account_commands_total", "Commands processed"),
            registry
        )?;

        let commands_rejected_total = register_int_counter_with_registry!(
            Opts::new(
                "account_commands_rejected_total",
                "Commands rejected by domain rules"
            ),
            registry
        )?;

        let write_conflicts_total = register_int_counter_with_registry!(
            Opts::new(
                "account_write_conflicts_total",
                "Optimistic write conflicts observed"
            ),
            registry
        )?;

        let retries_exhausted_total = register_int_counter_with_registry!(
            Opts::new(
                "account_retries_exhausted_total",
                "Commands that exhausted their attempt budget"
            ),
            registry
        )?;

        let command_duration_seconds = register_histogram_with_registry!(
            HistogramOpts::new(
                "account_command_duration_seconds",
                "Full command cycle latency in seconds"
            )
            .buckets(vec![0.001, 0.005, 0.010, 0.025, 0.050, 0.100, 0.250, 0.500, 1.0]),
            registry
        )?;

        let events_appended_total = register_int_counter_with_registry!(
            Opts::new("account_events_appended_total", "Events persisted"),
            registry
        )?;

        let queries_total = register_int_counter_with_registry!(
            Opts::new("account_queries_total", "Account queries served"),
            registry
        )?;

        Ok(Self {
            commands_total,
            commands_rejected_total,
            write_conflicts_total,
            retries_exhausted_total,
            command_duration_seconds,
            events_appended_total,
            queries_total,
            registry,
        })
    }

    /// Record one processed command
    pub fn record_command(&self) {
        self.commands_total.inc();
    }

    /// Record a domain rejection
    pub fn record_rejection(&self) {
        self.commands_rejected_total.inc();
    }

    /// Record one optimistic write conflict
    pub fn record_conflict(&self) {
        self.write_conflicts_total.inc();
    }

    /// Record an exhausted attempt budget
    pub fn record_retries_exhausted(&self) {
        self.retries_exhausted_total.inc();
    }

    /// Record the duration of a full command cycle
    pub fn record_command_duration(&self, duration_seconds: f64) {
        self.command_duration_seconds.observe(duration_seconds);
    }

    /// Record a persisted event
    pub fn record_event_appended(&self) {
        self.events_appended_total.inc();
    }

    /// Record a served query
    pub fn record_query(&self) {
        self.queries_total.inc();
    }

    /// Render all metrics in Prometheus text exposition format
    pub fn export(&self) -> prometheus::Result<String> {
        let mut buffer = Vec::new();
        let encoder = TextEncoder::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8(buffer).unwrap_or_default())
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new().expect("Failed to create metrics")
    }
}
