//! # hostwire MySQL
//!
//! Registers a MySQL data source with a hostwire host: binds
//! [`MySqlConnectorSettings`] from configuration, adds the data source and
//! its connection aliases to the service container, and optionally a health
//! check plus tracing and metrics instrumentation.
//!
//! ```no_run
//! use hostwire_infrastructure::config::ConfigLoader;
//! use hostwire_infrastructure::host::HostApplicationBuilder;
//! use hostwire_mysql::{MySqlDataSource, MySqlHostBuilderExt};
//!
//! # async fn run() -> hostwire_domain::Result<()> {
//! let mut builder = HostApplicationBuilder::from_loader(&ConfigLoader::new());
//! builder.add_mysql_data_source("catalog")?;
//! builder.add_keyed_mysql_data_source("orders")?;
//!
//! let host = builder.build();
//! let orders: MySqlDataSource = host.services().get_required_keyed("orders")?;
//! orders.ping().await?;
//! # Ok(())
//! # }
//! ```
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`extensions`] | Host builder registration methods |
//! | [`settings`] | Settings bound from `Aspire:MySql[:<name>]` |
//! | [`connection_string`] | URL and key/value connection string parsing |
//! | [`data_source`] | Lazily connecting pool and connection handles |
//! | [`services`] | Service-collection registration of the data source and aliases |
//! | [`health`] | Trial-connection health check |
//! | [`metrics`] | Metric names and recording helpers |

pub mod connection_string;
pub mod constants;
pub mod data_source;
pub mod extensions;
pub mod health;
pub mod metrics;
pub mod services;
pub mod settings;

pub use connection_string::MySqlConnectionInfo;
pub use data_source::{MySqlConnection, MySqlDataSource, MySqlDataSourceBuilder};
pub use extensions::MySqlHostBuilderExt;
pub use health::{MySqlHealthCheck, MySqlHealthCheckOptions};
pub use services::MySqlServiceCollectionExt;
pub use settings::MySqlConnectorSettings;
