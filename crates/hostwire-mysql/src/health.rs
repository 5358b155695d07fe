//! MySQL health check
//!
//! Opens a dedicated trial connection (outside any pool), runs a trivial
//! statement and closes it again.

use crate::connection_string::MySqlConnectionInfo;
use crate::constants::{ACTIVITY_SOURCE_NAME, HEALTH_CHECK_COMMAND, HEALTH_CHECK_NAME};
use async_trait::async_trait;
use hostwire_domain::error::{Error, Result};
use hostwire_infrastructure::error_ext::ErrorContext;
use hostwire_infrastructure::health::{HealthCheck, HealthChecker};
use sqlx::mysql::MySqlConnection as SqlxConnection;
use sqlx::{Connection, Executor};
use std::fmt;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Options for [`MySqlHealthCheck`]
#[derive(Clone)]
pub struct MySqlHealthCheckOptions {
    /// Connection string of the checked database
    pub connection_string: String,
    /// Statement executed on the trial connection
    pub command: String,
    /// Time allowed for connecting plus running the command; defaults to the
    /// connection string's `Connection Timeout`
    pub timeout: Option<Duration>,
}

impl MySqlHealthCheckOptions {
    /// Check `connection_string` with the default command
    pub fn new(connection_string: impl Into<String>) -> Self {
        Self {
            connection_string: connection_string.into(),
            command: HEALTH_CHECK_COMMAND.to_string(),
            timeout: None,
        }
    }
}

impl fmt::Debug for MySqlHealthCheckOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MySqlHealthCheckOptions")
            .field("connection_string", &"<redacted>")
            .field("command", &self.command)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Health check for a MySQL database
#[derive(Debug, Clone)]
pub struct MySqlHealthCheck {
    name: String,
    options: MySqlHealthCheckOptions,
}

impl MySqlHealthCheck {
    /// Create a check reporting under the default `MySql` name
    pub fn new(options: MySqlHealthCheckOptions) -> Self {
        Self {
            name: HEALTH_CHECK_NAME.to_string(),
            options,
        }
    }

    /// Report under `name` instead
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    async fn run_check(&self) -> Result<()> {
        let info = MySqlConnectionInfo::parse(&self.options.connection_string)?;
        let timeout = self.options.timeout.unwrap_or(info.pool.connection_timeout);

        let attempt = async {
            let mut connection = SqlxConnection::connect_with(&info.options)
                .await
                .db_context("Failed to open MySQL connection")?;
            connection
                .execute(self.options.command.as_str())
                .await
                .db_context("MySQL health command failed")?;
            connection
                .close()
                .await
                .db_context("Failed to close MySQL connection")
        };

        tokio::time::timeout(timeout, attempt).await.map_err(|_| {
            Error::database(format!("MySQL health check timed out after {timeout:?}"))
        })?
    }
}

#[async_trait]
impl HealthChecker for MySqlHealthCheck {
    async fn check_health(&self) -> HealthCheck {
        let started = Instant::now();
        let result = self.run_check().await;
        let elapsed = started.elapsed();

        match result {
            Ok(()) => {
                debug!(target: ACTIVITY_SOURCE_NAME, check = %self.name, ?elapsed, "MySQL health check passed");
                HealthCheck::healthy(self.name.as_str()).with_response_time(elapsed)
            }
            Err(e) => {
                warn!(target: ACTIVITY_SOURCE_NAME, check = %self.name, error = %e, "MySQL health check failed");
                HealthCheck::failed(self.name.as_str(), Some(e.to_string()))
                    .with_response_time(elapsed)
            }
        }
    }
}
