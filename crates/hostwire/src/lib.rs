//! # hostwire
//!
//! Host composition for services: a configuration tree, a keyed service
//! container, health checks and telemetry registration, plus the MySQL
//! data-source component built on top of them.
//!
//! ## Example
//!
//! ```no_run
//! use hostwire::{ConfigLoader, HostApplicationBuilder, MySqlDataSource, MySqlHostBuilderExt};
//!
//! # async fn run() -> hostwire::Result<()> {
//! let mut builder = HostApplicationBuilder::from_loader(&ConfigLoader::new());
//! builder.add_keyed_mysql_data_source("orders")?;
//!
//! let host = builder.build();
//! host.init_logging()?;
//!
//! let orders: MySqlDataSource = host.services().get_required_keyed("orders")?;
//! orders.ping().await?;
//!
//! let health = host.health().perform_health_checks().await;
//! println!("{:?}", health.status);
//! # Ok(())
//! # }
//! ```
//!
//! ## Layout
//!
//! - `domain` - error type and data-source ports
//! - `infrastructure` - configuration, DI, health, telemetry, logging, host builder
//! - `mysql` - MySQL settings, connection strings, data source and registration

/// Domain layer - error type and ports
///
/// Re-exports from the domain crate for convenience
pub mod domain {
    pub use hostwire_domain::*;
}

/// Infrastructure layer - configuration, DI, health and host composition
///
/// Re-exports from the infrastructure crate for convenience
pub mod infrastructure {
    pub use hostwire_infrastructure::*;
}

/// MySQL component
pub mod mysql {
    pub use hostwire_mysql::*;
}

pub use domain::{Error, Result};
pub use infrastructure::config::ConfigLoader;
pub use infrastructure::{Configuration, Host, HostApplicationBuilder, ServiceCollection, ServiceProvider};
pub use mysql::{MySqlConnectorSettings, MySqlDataSource, MySqlHostBuilderExt};
