//! Host builder registration
//!
//! [`MySqlHostBuilderExt`] wires a MySQL data source into a
//! [`HostApplicationBuilder`]:
//!
//! 1. settings are bound from `Aspire:MySql` (or `Aspire:MySql:<name>`)
//! 2. a `ConnectionStrings:<name>` entry replaces the bound connection string
//! 3. the caller's callback gets the last word
//! 4. the data source and its aliases are registered; the connection string is
//!    only checked when the data source is first resolved
//! 5. a health check, the tracing source and the meter are added as enabled

use crate::constants::{
    ACTIVITY_SOURCE_NAME, DEFAULT_CONFIG_SECTION_NAME, DRIVER_QUERY_TARGET, HEALTH_CHECK_NAME,
    METER_NAME,
};
use crate::data_source::{MySqlDataSource, MySqlDataSourceBuilder};
use crate::health::{MySqlHealthCheck, MySqlHealthCheckOptions};
use crate::metrics::describe_metrics;
use crate::services::MySqlServiceCollectionExt;
use crate::settings::MySqlConnectorSettings;
use hostwire_domain::error::{Error, Result};
use hostwire_infrastructure::constants::CONNECTION_STRINGS_SECTION;
use hostwire_infrastructure::health::{HealthCheckRegistration, HealthChecker};
use hostwire_infrastructure::host::HostApplicationBuilder;
use tracing::{debug, info};

/// MySQL registration methods for [`HostApplicationBuilder`]
pub trait MySqlHostBuilderExt {
    /// Register an unkeyed [`MySqlDataSource`]
    ///
    /// Settings come from the `Aspire:MySql` section; `connection_name`
    /// selects the `ConnectionStrings` entry.
    fn add_mysql_data_source(&mut self, connection_name: &str) -> Result<&mut Self>;

    /// Like [`add_mysql_data_source`](Self::add_mysql_data_source), with a
    /// callback invoked after the settings are read from configuration
    fn add_mysql_data_source_with<F>(&mut self, connection_name: &str, configure: F) -> Result<&mut Self>
    where
        F: FnOnce(&mut MySqlConnectorSettings);

    /// Register a [`MySqlDataSource`] keyed by `name`
    ///
    /// Settings come from `Aspire:MySql:<name>` and `name` also selects the
    /// `ConnectionStrings` entry.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if `name` is empty.
    fn add_keyed_mysql_data_source(&mut self, name: &str) -> Result<&mut Self>;

    /// Like [`add_keyed_mysql_data_source`](Self::add_keyed_mysql_data_source),
    /// with a callback invoked after the settings are read from configuration
    fn add_keyed_mysql_data_source_with<F>(&mut self, name: &str, configure: F) -> Result<&mut Self>
    where
        F: FnOnce(&mut MySqlConnectorSettings);
}

impl MySqlHostBuilderExt for HostApplicationBuilder {
    fn add_mysql_data_source(&mut self, connection_name: &str) -> Result<&mut Self> {
        self.add_mysql_data_source_with(connection_name, |_| {})
    }

    fn add_mysql_data_source_with<F>(&mut self, connection_name: &str, configure: F) -> Result<&mut Self>
    where
        F: FnOnce(&mut MySqlConnectorSettings),
    {
        register(self, DEFAULT_CONFIG_SECTION_NAME, configure, connection_name, None)?;
        Ok(self)
    }

    fn add_keyed_mysql_data_source(&mut self, name: &str) -> Result<&mut Self> {
        self.add_keyed_mysql_data_source_with(name, |_| {})
    }

    fn add_keyed_mysql_data_source_with<F>(&mut self, name: &str, configure: F) -> Result<&mut Self>
    where
        F: FnOnce(&mut MySqlConnectorSettings),
    {
        if name.is_empty() {
            return Err(Error::invalid_argument("Parameter 'name' must not be empty"));
        }

        let section = format!("{DEFAULT_CONFIG_SECTION_NAME}:{name}");
        register(self, &section, configure, name, Some(name))?;
        Ok(self)
    }
}

fn register<F>(
    builder: &mut HostApplicationBuilder,
    section: &str,
    configure: F,
    connection_name: &str,
    key: Option<&str>,
) -> Result<()>
where
    F: FnOnce(&mut MySqlConnectorSettings),
{
    let mut settings: MySqlConnectorSettings = builder.configuration().bind(section)?;

    if let Some(connection_string) = builder.configuration().connection_string(connection_name)? {
        debug!(connection_name, "Using connection string from {CONNECTION_STRINGS_SECTION}");
        settings.connection_string = Some(connection_string);
    }

    configure(&mut settings);

    register_data_source(builder, &settings, section, connection_name, key);

    if settings.health_checks {
        let name = match key {
            None => HEALTH_CHECK_NAME.to_string(),
            Some(_) => format!("{HEALTH_CHECK_NAME}_{connection_name}"),
        };
        let key = key.map(str::to_string);
        let check_name = name.clone();
        let registration = HealthCheckRegistration::new(name, move |sp| {
            let data_source: MySqlDataSource = match &key {
                None => sp.get_required()?,
                Some(key) => sp.get_required_keyed(key)?,
            };
            let options = MySqlHealthCheckOptions::new(data_source.connection_string());
            Ok(Box::new(MySqlHealthCheck::new(options).with_name(check_name.as_str()))
                as Box<dyn HealthChecker>)
        });
        if !builder.health_checks_mut().try_add(registration) {
            debug!(section, "MySQL health check already registered");
        }
    }

    if settings.tracing {
        builder
            .telemetry_mut()
            .add_tracing_source(ACTIVITY_SOURCE_NAME)
            .add_tracing_source(DRIVER_QUERY_TARGET);
    }

    if settings.metrics {
        builder.telemetry_mut().add_meter(METER_NAME);
        describe_metrics();
    }

    info!(
        section,
        connection_name,
        key,
        health_checks = settings.health_checks,
        tracing = settings.tracing,
        metrics = settings.metrics,
        "Registered MySQL data source"
    );
    Ok(())
}

fn register_data_source(
    builder: &mut HostApplicationBuilder,
    settings: &MySqlConnectorSettings,
    section: &str,
    connection_name: &str,
    key: Option<&str>,
) {
    let validated = ValidatedConnection {
        connection_string: settings.effective_connection_string().map(str::to_string),
        section: section.to_string(),
        connection_name: connection_name.to_string(),
    };
    let metrics = settings.metrics;
    let pool_name = connection_name.to_string();

    match key {
        None => {
            builder.services_mut().add_mysql_data_source_services(
                settings.connection_string.clone().unwrap_or_default(),
                move |data_source| {
                    validated.connection_string()?;
                    Ok(data_source.name(pool_name.as_str()).metrics(metrics))
                },
            );
        }
        Some(key) => {
            builder
                .services_mut()
                .add_keyed_mysql_data_source_services(key, move |_, key| {
                    let connection_string = validated.connection_string()?;
                    MySqlDataSourceBuilder::new(connection_string)
                        .name(key)
                        .metrics(metrics)
                        .build()
                });
        }
    }
}

/// Connection string captured at registration, checked on first resolution
struct ValidatedConnection {
    connection_string: Option<String>,
    section: String,
    connection_name: String,
}

impl ValidatedConnection {
    fn connection_string(&self) -> Result<&str> {
        self.connection_string.as_deref().ok_or_else(|| {
            Error::configuration(format!(
                "ConnectionString is missing. It should be provided in '{}:{}' or under the 'ConnectionString' key in '{}' configuration section.",
                CONNECTION_STRINGS_SECTION, self.connection_name, self.section
            ))
        })
    }
}
