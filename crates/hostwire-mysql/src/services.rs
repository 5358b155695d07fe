//! Service-collection registration
//!
//! Registers a [`MySqlDataSource`] together with the services derived from it,
//! so consumers can resolve whichever shape they need:
//!
//! | Service | Lifetime |
//! |---------|----------|
//! | `MySqlDataSource` | singleton |
//! | `Arc<dyn DbDataSource>` | singleton, same pool |
//! | `MySqlConnection` | transient, unopened |
//! | `Box<dyn DbConnection>` | transient, unopened |

use crate::data_source::{MySqlConnection, MySqlDataSource, MySqlDataSourceBuilder};
use hostwire_domain::error::Result;
use hostwire_domain::ports::{DbConnection, DbDataSource};
use hostwire_infrastructure::di::{ServiceCollection, ServiceProvider};
use std::sync::Arc;
use tracing::debug;

/// MySQL registration helpers for [`ServiceCollection`]
pub trait MySqlServiceCollectionExt {
    /// Register an unkeyed data source built from `connection_string`
    ///
    /// `configure` runs when the data source is first resolved, before the
    /// connection string is parsed; an error from it fails that resolution.
    /// Return the builder unchanged to keep the defaults.
    fn add_mysql_data_source_services<F>(
        &mut self,
        connection_string: impl Into<String>,
        configure: F,
    ) -> &mut Self
    where
        F: Fn(MySqlDataSourceBuilder) -> Result<MySqlDataSourceBuilder> + Send + Sync + 'static;

    /// Register a data source under `key`, plus keyed aliases resolving through it
    fn add_keyed_mysql_data_source_services<F>(&mut self, key: impl Into<String>, factory: F) -> &mut Self
    where
        F: Fn(&ServiceProvider, &str) -> Result<MySqlDataSource> + Send + Sync + 'static;
}

impl MySqlServiceCollectionExt for ServiceCollection {
    fn add_mysql_data_source_services<F>(
        &mut self,
        connection_string: impl Into<String>,
        configure: F,
    ) -> &mut Self
    where
        F: Fn(MySqlDataSourceBuilder) -> Result<MySqlDataSourceBuilder> + Send + Sync + 'static,
    {
        let connection_string = connection_string.into();

        self.add_singleton(move |_| {
            debug!("Creating MySQL data source");
            configure(MySqlDataSourceBuilder::new(connection_string.clone()))?.build()
        })
        .add_singleton(|sp| {
            let data_source: MySqlDataSource = sp.get_required()?;
            Ok(Arc::new(data_source) as Arc<dyn DbDataSource>)
        })
        .add_transient(|sp| {
            let data_source: MySqlDataSource = sp.get_required()?;
            Ok(data_source.create_connection())
        })
        .add_transient(|sp| {
            let connection: MySqlConnection = sp.get_required()?;
            Ok(Box::new(connection) as Box<dyn DbConnection>)
        })
    }

    fn add_keyed_mysql_data_source_services<F>(&mut self, key: impl Into<String>, factory: F) -> &mut Self
    where
        F: Fn(&ServiceProvider, &str) -> Result<MySqlDataSource> + Send + Sync + 'static,
    {
        let key = key.into();

        self.add_keyed_singleton(key.clone(), move |sp, key| {
            debug!(key, "Creating keyed MySQL data source");
            factory(sp, key)
        })
        .add_keyed_singleton(key.clone(), |sp, key| {
            let data_source: MySqlDataSource = sp.get_required_keyed(key)?;
            Ok(Arc::new(data_source) as Arc<dyn DbDataSource>)
        })
        .add_keyed_transient(key.clone(), |sp, key| {
            let data_source: MySqlDataSource = sp.get_required_keyed(key)?;
            Ok(data_source.create_connection())
        })
        .add_keyed_transient(key, |sp, key| {
            let connection: MySqlConnection = sp.get_required_keyed(key)?;
            Ok(Box::new(connection) as Box<dyn DbConnection>)
        })
    }
}
