//! Data-source ports
//!
//! A data source owns the resolved connection string and whatever pooling
//! the driver provides. Connections handed out by it start closed and are
//! opened on demand.

use crate::error::Result;
use async_trait::async_trait;
use std::fmt;

/// Provider-agnostic handle to a configured database
///
/// # Example
///
/// ```no_run
/// use hostwire_domain::ports::DbDataSource;
/// use std::sync::Arc;
///
/// async fn check(source: Arc<dyn DbDataSource>) -> hostwire_domain::Result<()> {
///     let mut connection = source.create_connection();
///     connection.open().await?;
///     connection.ping().await
/// }
/// ```
#[async_trait]
pub trait DbDataSource: Send + Sync + fmt::Debug {
    /// Short name of the underlying provider (e.g. `"mysql"`)
    fn provider_name(&self) -> &str;

    /// Connection string this data source was built from
    fn connection_string(&self) -> &str;

    /// Create a new, unopened connection
    fn create_connection(&self) -> Box<dyn DbConnection>;

    /// Open a connection, round-trip to the server and release it
    async fn ping(&self) -> Result<()>;
}

/// A single database connection obtained from a [`DbDataSource`]
#[async_trait]
pub trait DbConnection: Send + Sync {
    /// Connection string of the owning data source
    fn connection_string(&self) -> &str;

    /// Whether [`open`](Self::open) has completed successfully
    fn is_open(&self) -> bool;

    /// Acquire the underlying connection. Opening twice is a no-op.
    async fn open(&mut self) -> Result<()>;

    /// Round-trip to the server. Fails if the connection is not open.
    async fn ping(&mut self) -> Result<()>;

    /// Release the underlying connection back to its pool
    async fn close(&mut self);
}
