//! Host builder
//!
//! Startup composition happens against a [`HostApplicationBuilder`]:
//! components read its [`Configuration`], add services, health checks and
//! telemetry sources, then [`build`](HostApplicationBuilder::build) freezes
//! everything into a [`Host`].

use crate::config::{ConfigLoader, Configuration, LoggingConfig};
use crate::constants::LOGGING_SECTION;
use crate::di::{ServiceCollection, ServiceProvider};
use crate::health::{HealthChecksBuilder, HealthRegistry};
use crate::logging::init_logging;
use crate::telemetry::TelemetryBuilder;
use hostwire_domain::error::Result;
use tracing::info;

/// Mutable host state during startup composition
#[derive(Debug, Clone, Default)]
pub struct HostApplicationBuilder {
    configuration: Configuration,
    services: ServiceCollection,
    health_checks: HealthChecksBuilder,
    telemetry: TelemetryBuilder,
}

impl HostApplicationBuilder {
    /// Create a builder over an existing configuration
    pub fn new(configuration: Configuration) -> Self {
        Self {
            configuration,
            ..Self::default()
        }
    }

    /// Create a builder from the default configuration sources
    pub fn from_loader(loader: &ConfigLoader) -> Self {
        Self::new(loader.load())
    }

    /// Host configuration
    pub fn configuration(&self) -> &Configuration {
        &self.configuration
    }

    /// Service registrations
    pub fn services(&self) -> &ServiceCollection {
        &self.services
    }

    /// Service registrations, for adding
    pub fn services_mut(&mut self) -> &mut ServiceCollection {
        &mut self.services
    }

    /// Health check registrations
    pub fn health_checks(&self) -> &HealthChecksBuilder {
        &self.health_checks
    }

    /// Health check registrations, for adding
    pub fn health_checks_mut(&mut self) -> &mut HealthChecksBuilder {
        &mut self.health_checks
    }

    /// Telemetry pipeline
    pub fn telemetry(&self) -> &TelemetryBuilder {
        &self.telemetry
    }

    /// Telemetry pipeline, for adding sources and meters
    pub fn telemetry_mut(&mut self) -> &mut TelemetryBuilder {
        &mut self.telemetry
    }

    /// Freeze the registrations into a running host
    pub fn build(self) -> Host {
        let services = self.services.build();
        let health = self.health_checks.build(services.clone());
        info!(
            services = self.services.len(),
            health_checks = self.health_checks.len(),
            "Host built"
        );

        Host {
            configuration: self.configuration,
            services,
            health,
            telemetry: self.telemetry,
        }
    }
}

/// A composed host
#[derive(Debug, Clone)]
pub struct Host {
    configuration: Configuration,
    services: ServiceProvider,
    health: HealthRegistry,
    telemetry: TelemetryBuilder,
}

impl Host {
    /// Host configuration
    pub fn configuration(&self) -> &Configuration {
        &self.configuration
    }

    /// Service provider
    pub fn services(&self) -> &ServiceProvider {
        &self.services
    }

    /// Health registry bound to this host's services
    pub fn health(&self) -> &HealthRegistry {
        &self.health
    }

    /// Tracing sources and meters enabled during composition
    pub fn telemetry(&self) -> &TelemetryBuilder {
        &self.telemetry
    }

    /// Logging settings from the `Logging` section
    pub fn logging_config(&self) -> Result<LoggingConfig> {
        self.configuration.bind(LOGGING_SECTION)
    }

    /// Install the global tracing subscriber for this host
    pub fn init_logging(&self) -> Result<()> {
        init_logging(&self.logging_config()?, &self.telemetry)
    }
}
