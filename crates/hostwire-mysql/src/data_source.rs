//! MySQL data source
//!
//! [`MySqlDataSource`] wraps a lazily connecting `sqlx` pool together with
//! the connection string it was built from. Building one does no I/O; the
//! first connection is made when something opens it. Building must happen
//! inside a Tokio runtime because the pool starts its maintenance task.

use crate::connection_string::{MySqlConnectionInfo, PoolSettings};
use crate::constants::{ACTIVITY_SOURCE_NAME, PROVIDER_NAME};
use crate::metrics::{record_failure, record_open};
use async_trait::async_trait;
use hostwire_domain::error::{Error, Result};
use hostwire_domain::ports::{DbConnection, DbDataSource};
use hostwire_infrastructure::error_ext::ErrorContext;
use sqlx::mysql::{MySql, MySqlPool, MySqlPoolOptions};
use sqlx::pool::PoolConnection;
use sqlx::Connection;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;
use tracing::{Instrument, debug, info_span, warn};

struct DataSourceInner {
    name: String,
    connection_string: String,
    pool: MySqlPool,
    pool_settings: PoolSettings,
    metrics_enabled: bool,
}

/// Handle to a configured MySQL database
///
/// Cloning is cheap and clones share the pool.
#[derive(Clone)]
pub struct MySqlDataSource {
    inner: Arc<DataSourceInner>,
}

impl MySqlDataSource {
    /// Name used in logs and metric labels
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Connection string this data source was built from
    pub fn connection_string(&self) -> &str {
        &self.inner.connection_string
    }

    /// The underlying pool
    pub fn pool(&self) -> &MySqlPool {
        &self.inner.pool
    }

    /// Pool sizing taken from the connection string
    pub fn pool_settings(&self) -> PoolSettings {
        self.inner.pool_settings
    }

    /// Whether pool metrics are recorded
    pub fn metrics_enabled(&self) -> bool {
        self.inner.metrics_enabled
    }

    /// Create a new, unopened connection
    pub fn create_connection(&self) -> MySqlConnection {
        MySqlConnection {
            data_source: self.clone(),
            connection: None,
        }
    }

    /// Acquire a connection from the pool
    pub async fn open_connection(&self) -> Result<PoolConnection<MySql>> {
        let span = info_span!(target: ACTIVITY_SOURCE_NAME, "mysql.open", db.system = "mysql", pool_name = %self.inner.name);
        let started = Instant::now();

        let acquired = self.inner.pool.acquire().instrument(span).await;
        match acquired {
            Ok(connection) => {
                if self.inner.metrics_enabled {
                    record_open(&self.inner.name, started.elapsed());
                }
                Ok(connection)
            }
            Err(e) => {
                if self.inner.metrics_enabled {
                    record_failure(&self.inner.name);
                }
                warn!(target: ACTIVITY_SOURCE_NAME, pool_name = %self.inner.name, error = %e, "Failed to open MySQL connection");
                Err(Error::database_with_source(
                    format!("Failed to open MySQL connection for '{}'", self.inner.name),
                    e,
                ))
            }
        }
    }

    /// Open a connection, ping the server and release the connection
    pub async fn ping(&self) -> Result<()> {
        let mut connection = self.open_connection().await?;
        connection
            .ping()
            .await
            .db_context(format!("MySQL ping failed for '{}'", self.inner.name))
    }
}

impl fmt::Debug for MySqlDataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MySqlDataSource")
            .field("name", &self.inner.name)
            .field("pool_settings", &self.inner.pool_settings)
            .field("metrics_enabled", &self.inner.metrics_enabled)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl DbDataSource for MySqlDataSource {
    fn provider_name(&self) -> &str {
        PROVIDER_NAME
    }

    fn connection_string(&self) -> &str {
        MySqlDataSource::connection_string(self)
    }

    fn create_connection(&self) -> Box<dyn DbConnection> {
        Box::new(MySqlDataSource::create_connection(self))
    }

    async fn ping(&self) -> Result<()> {
        MySqlDataSource::ping(self).await
    }
}

/// Builds a [`MySqlDataSource`] from a connection string
#[derive(Debug, Clone)]
pub struct MySqlDataSourceBuilder {
    connection_string: String,
    name: String,
    metrics_enabled: bool,
}

impl MySqlDataSourceBuilder {
    /// Start from a connection string in either supported form
    pub fn new(connection_string: impl Into<String>) -> Self {
        Self {
            connection_string: connection_string.into(),
            name: PROVIDER_NAME.to_string(),
            metrics_enabled: false,
        }
    }

    /// Name used in logs and metric labels
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Record pool metrics through the `metrics` facade
    #[must_use]
    pub fn metrics(mut self, enabled: bool) -> Self {
        self.metrics_enabled = enabled;
        self
    }

    /// Parse the connection string and create the lazily connecting pool
    pub fn build(self) -> Result<MySqlDataSource> {
        let info = MySqlConnectionInfo::parse(&self.connection_string)?;
        let (min_connections, max_connections) = info.pool.bounds();

        let pool = MySqlPoolOptions::new()
            .min_connections(min_connections)
            .max_connections(max_connections)
            .acquire_timeout(info.pool.connection_timeout)
            .connect_lazy_with(info.options);

        debug!(
            target: ACTIVITY_SOURCE_NAME,
            pool_name = %self.name,
            host = info.host.as_deref(),
            database = info.database.as_deref(),
            max_connections,
            "Built MySQL data source"
        );

        Ok(MySqlDataSource {
            inner: Arc::new(DataSourceInner {
                name: self.name,
                connection_string: self.connection_string,
                pool,
                pool_settings: info.pool,
                metrics_enabled: self.metrics_enabled,
            }),
        })
    }
}

/// A connection handle that starts closed
///
/// [`open`](Self::open) acquires a pooled connection; dropping or closing the
/// handle returns it to the pool.
pub struct MySqlConnection {
    data_source: MySqlDataSource,
    connection: Option<PoolConnection<MySql>>,
}

impl MySqlConnection {
    /// The data source this connection belongs to
    pub fn data_source(&self) -> &MySqlDataSource {
        &self.data_source
    }

    /// Connection string of the owning data source
    pub fn connection_string(&self) -> &str {
        self.data_source.connection_string()
    }

    /// Whether the connection has been opened
    pub fn is_open(&self) -> bool {
        self.connection.is_some()
    }

    /// Acquire the underlying connection; a no-op when already open
    pub async fn open(&mut self) -> Result<()> {
        if self.connection.is_none() {
            self.connection = Some(self.data_source.open_connection().await?);
        }
        Ok(())
    }

    /// Round-trip to the server
    pub async fn ping(&mut self) -> Result<()> {
        let connection = self
            .connection
            .as_mut()
            .ok_or_else(|| Error::invalid_argument("Connection is not open"))?;
        connection.ping().await.db_context("MySQL ping failed")
    }

    /// Borrow the open driver connection, e.g. to run queries
    pub fn as_inner(&mut self) -> Option<&mut PoolConnection<MySql>> {
        self.connection.as_mut()
    }

    /// Return the connection to the pool
    pub fn close(&mut self) {
        self.connection = None;
    }
}

impl fmt::Debug for MySqlConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MySqlConnection")
            .field("data_source", &self.data_source.name())
            .field("open", &self.is_open())
            .finish()
    }
}

#[async_trait]
impl DbConnection for MySqlConnection {
    fn connection_string(&self) -> &str {
        MySqlConnection::connection_string(self)
    }

    fn is_open(&self) -> bool {
        MySqlConnection::is_open(self)
    }

    async fn open(&mut self) -> Result<()> {
        MySqlConnection::open(self).await
    }

    async fn ping(&mut self) -> Result<()> {
        MySqlConnection::ping(self).await
    }

    async fn close(&mut self) {
        MySqlConnection::close(self);
    }
}
