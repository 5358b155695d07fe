//! Infrastructure layer constants

use std::time::Duration;

// ============================================================================
// CONFIGURATION CONSTANTS
// ============================================================================

/// Default configuration file name
pub const DEFAULT_CONFIG_FILENAME: &str = "hostwire.toml";

/// Default configuration directory name
pub const DEFAULT_CONFIG_DIR: &str = "hostwire";

/// Environment variable prefix for configuration
pub const CONFIG_ENV_PREFIX: &str = "HOSTWIRE";

/// Separator for nested keys in environment variables (`HOSTWIRE__A__B`)
pub const CONFIG_ENV_SEPARATOR: &str = "__";

/// Separator between segments of a configuration section path
pub const CONFIG_SECTION_SEPARATOR: char = ':';

/// Section holding named connection strings
pub const CONNECTION_STRINGS_SECTION: &str = "ConnectionStrings";

/// Section holding logging configuration
pub const LOGGING_SECTION: &str = "Logging";

// ============================================================================
// LOGGING CONSTANTS
// ============================================================================

/// Default log level
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Environment variable overriding the log filter
pub const LOG_FILTER_ENV: &str = "HOSTWIRE_LOG";

/// Level at which registered tracing sources are enabled
pub const TRACING_SOURCE_LEVEL: &str = "info";

// ============================================================================
// HEALTH CHECK CONSTANTS
// ============================================================================

/// Timeout applied to a health check when its registration sets none
pub const HEALTH_CHECK_DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);
