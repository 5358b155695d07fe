//! MySQL connector settings

use serde::{Deserialize, Serialize};
use std::fmt;

/// Settings for one MySQL data source registration
///
/// Bound from the `Aspire:MySql` section (or `Aspire:MySql:<name>` for keyed
/// registrations). Keys match case-insensitively, and the snake_case
/// spelling is accepted too, so `ConnectionString`, `connectionstring` and
/// `connection_string` all bind `connection_string`.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MySqlConnectorSettings {
    /// Connection string of the MySQL database
    #[serde(rename = "connectionstring", alias = "connection_string")]
    pub connection_string: Option<String>,

    /// Register a health check for the data source (default `true`)
    #[serde(rename = "healthchecks", alias = "health_checks")]
    pub health_checks: bool,

    /// Add the data source's spans to the tracing pipeline (default `true`)
    pub tracing: bool,

    /// Record pool metrics (default `true`)
    pub metrics: bool,
}

impl Default for MySqlConnectorSettings {
    fn default() -> Self {
        Self {
            connection_string: None,
            health_checks: true,
            tracing: true,
            metrics: true,
        }
    }
}

impl MySqlConnectorSettings {
    /// The connection string, if set and non-empty
    pub fn effective_connection_string(&self) -> Option<&str> {
        self.connection_string.as_deref().filter(|s| !s.is_empty())
    }
}

// connection strings carry passwords
impl fmt::Debug for MySqlConnectorSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MySqlConnectorSettings")
            .field(
                "connection_string",
                &self.connection_string.as_ref().map(|_| "<redacted>"),
            )
            .field("health_checks", &self.health_checks)
            .field("tracing", &self.tracing)
            .field("metrics", &self.metrics)
            .finish()
    }
}
