//! MySQL component constants

use std::time::Duration;

/// Configuration section read by the unkeyed registration
pub const DEFAULT_CONFIG_SECTION_NAME: &str = "Aspire:MySql";

/// Health check name, suffixed with `_<name>` for keyed registrations
pub const HEALTH_CHECK_NAME: &str = "MySql";

/// Tracing target the data source emits spans and events under
pub const ACTIVITY_SOURCE_NAME: &str = "MySqlConnector";

/// Tracing target the driver logs executed statements under
pub const DRIVER_QUERY_TARGET: &str = "sqlx::query";

/// Meter the data source records pool metrics under
pub const METER_NAME: &str = "MySqlConnector";

/// Provider name reported by the data source
pub const PROVIDER_NAME: &str = "mysql";

/// Default server port
pub const DEFAULT_PORT: u16 = 3306;

/// Default upper bound on pooled connections
pub const DEFAULT_MAXIMUM_POOL_SIZE: u32 = 100;

/// Default number of connections kept open
pub const DEFAULT_MINIMUM_POOL_SIZE: u32 = 0;

/// Default time allowed for establishing a connection
pub const DEFAULT_CONNECTION_TIMEOUT: Duration = Duration::from_secs(15);

/// Statement the health check runs
pub const HEALTH_CHECK_COMMAND: &str = "SELECT 1;";
