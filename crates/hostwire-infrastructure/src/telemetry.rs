//! Telemetry pipeline
//!
//! Components opt their instrumentation into the host by name. A tracing
//! source is a `tracing` target whose spans and events the host subscriber
//! should let through; a meter is a metric namespace the component records
//! to through the `metrics` facade. The host decides what to do with them
//! when it installs its subscriber and recorder.

use crate::constants::TRACING_SOURCE_LEVEL;
use std::collections::BTreeSet;

/// Tracing sources and meters enabled by registered components
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TelemetryBuilder {
    tracing_sources: BTreeSet<String>,
    meters: BTreeSet<String>,
}

impl TelemetryBuilder {
    /// Create an empty pipeline
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable spans and events emitted under `source`
    pub fn add_tracing_source(&mut self, source: impl Into<String>) -> &mut Self {
        self.tracing_sources.insert(source.into());
        self
    }

    /// Enable metrics recorded under `meter`
    pub fn add_meter(&mut self, meter: impl Into<String>) -> &mut Self {
        self.meters.insert(meter.into());
        self
    }

    /// Whether `source` was added to the tracing pipeline
    pub fn is_tracing_source_enabled(&self, source: &str) -> bool {
        self.tracing_sources.contains(source)
    }

    /// Whether `meter` was added to the metrics pipeline
    pub fn is_meter_enabled(&self, meter: &str) -> bool {
        self.meters.contains(meter)
    }

    /// Enabled tracing sources, sorted
    pub fn tracing_sources(&self) -> impl Iterator<Item = &str> {
        self.tracing_sources.iter().map(String::as_str)
    }

    /// Enabled meters, sorted
    pub fn meters(&self) -> impl Iterator<Item = &str> {
        self.meters.iter().map(String::as_str)
    }

    /// `EnvFilter` directives: `base_level` plus one directive per source
    ///
    /// ```
    /// use hostwire_infrastructure::telemetry::TelemetryBuilder;
    ///
    /// let mut telemetry = TelemetryBuilder::new();
    /// telemetry.add_tracing_source("MySqlConnector");
    /// assert_eq!(telemetry.filter_directives("warn"), "warn,MySqlConnector=info");
    /// ```
    pub fn filter_directives(&self, base_level: &str) -> String {
        std::iter::once(base_level.to_string())
            .chain(
                self.tracing_sources
                    .iter()
                    .map(|source| format!("{source}={TRACING_SOURCE_LEVEL}")),
            )
            .collect::<Vec<_>>()
            .join(",")
    }
}
