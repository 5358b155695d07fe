//! Health checks
//!
//! Components add [`HealthCheckRegistration`]s to the host's
//! [`HealthChecksBuilder`] during startup. A registration holds a factory,
//! not a checker: the checker is built from the [`ServiceProvider`] each
//! time the registry runs, so a check can depend on services that are only
//! valid once the host is up.

use crate::constants::HEALTH_CHECK_DEFAULT_TIMEOUT;
use crate::di::ServiceProvider;
use crate::logging::log_health_check;
use hostwire_domain::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Health status enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    /// Service is healthy and fully operational
    Up,
    /// Service is experiencing issues but still operational
    Degraded,
    /// Service is down and not operational
    Down,
}

impl HealthStatus {
    /// Check if the status indicates the service is healthy
    pub fn is_healthy(&self) -> bool {
        matches!(self, Self::Up)
    }

    /// Check if the service is operational (healthy or degraded)
    pub fn is_operational(&self) -> bool {
        matches!(self, Self::Up | Self::Degraded)
    }
}

/// Individual health check result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthCheck {
    /// Name of the health check
    pub name: String,
    /// Current status
    pub status: HealthStatus,
    /// Timestamp of last check
    pub timestamp: chrono::DateTime<chrono::Utc>,
    /// Response time in milliseconds
    pub response_time_ms: u64,
    /// Optional error message
    pub error: Option<String>,
    /// Additional details
    pub details: Option<serde_json::Value>,
}

impl HealthCheck {
    /// Create a successful health check
    pub fn healthy<S: Into<String>>(name: S) -> Self {
        Self::with_status(name, HealthStatus::Up, None)
    }

    /// Create a failed health check
    pub fn failed<S: Into<String>>(name: S, error: Option<String>) -> Self {
        Self::with_status(name, HealthStatus::Down, error)
    }

    /// Create a degraded health check; `details` describes what is degraded
    pub fn degraded<S: Into<String>>(name: S, details: Option<String>) -> Self {
        let mut check = Self::with_status(name, HealthStatus::Degraded, None);
        check.details = details.map(serde_json::Value::String);
        check
    }

    fn with_status<S: Into<String>>(name: S, status: HealthStatus, error: Option<String>) -> Self {
        Self {
            name: name.into(),
            status,
            timestamp: chrono::Utc::now(),
            response_time_ms: 0,
            error,
            details: None,
        }
    }

    /// Set response time
    #[must_use]
    pub fn with_response_time(mut self, duration: Duration) -> Self {
        self.response_time_ms = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX);
        self
    }
}

/// Overall health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Overall system status
    pub status: HealthStatus,
    /// Timestamp of the health check
    pub timestamp: chrono::DateTime<chrono::Utc>,
    /// Total response time in milliseconds
    pub response_time_ms: u64,
    /// Individual health check results
    pub checks: HashMap<String, HealthCheck>,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self::new()
    }
}

impl HealthResponse {
    /// Create a new health response
    pub fn new() -> Self {
        Self {
            status: HealthStatus::Up,
            timestamp: chrono::Utc::now(),
            response_time_ms: 0,
            checks: HashMap::new(),
        }
    }

    /// Add a health check result
    #[must_use]
    pub fn add_check(mut self, check: HealthCheck) -> Self {
        if check.status == HealthStatus::Down {
            self.status = HealthStatus::Down;
        } else if check.status == HealthStatus::Degraded && self.status == HealthStatus::Up {
            self.status = HealthStatus::Degraded;
        }

        self.checks.insert(check.name.clone(), check);
        self
    }

    /// Set response time
    #[must_use]
    pub fn with_response_time(mut self, duration: Duration) -> Self {
        self.response_time_ms = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Check if the overall system is healthy
    pub fn is_healthy(&self) -> bool {
        self.status.is_healthy()
    }
}

/// Health check function trait
///
/// # Example
///
/// ```no_run
/// use hostwire_infrastructure::health::{HealthChecker, HealthCheck};
/// use async_trait::async_trait;
///
/// struct DatabaseHealthChecker;
///
/// #[async_trait]
/// impl HealthChecker for DatabaseHealthChecker {
///     async fn check_health(&self) -> HealthCheck {
///         HealthCheck::healthy("database")
///     }
/// }
/// ```
#[async_trait::async_trait]
pub trait HealthChecker: Send + Sync {
    /// Perform a health check
    async fn check_health(&self) -> HealthCheck;
}

type CheckerFactory = Arc<dyn Fn(&ServiceProvider) -> Result<Box<dyn HealthChecker>> + Send + Sync>;

/// A named health check and how to build it
#[derive(Clone)]
pub struct HealthCheckRegistration {
    name: String,
    factory: CheckerFactory,
    failure_status: HealthStatus,
    tags: Vec<String>,
    timeout: Option<Duration>,
}

impl HealthCheckRegistration {
    /// Create a registration whose checker is built from the service provider
    pub fn new<S, F>(name: S, factory: F) -> Self
    where
        S: Into<String>,
        F: Fn(&ServiceProvider) -> Result<Box<dyn HealthChecker>> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            factory: Arc::new(factory),
            failure_status: HealthStatus::Down,
            tags: Vec::new(),
            timeout: None,
        }
    }

    /// Status reported when the check fails (default `Down`)
    #[must_use]
    pub fn with_failure_status(mut self, status: HealthStatus) -> Self {
        self.failure_status = status;
        self
    }

    /// Tags for filtering checks
    #[must_use]
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Per-check timeout (defaults to the registry timeout)
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Check name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Check tags
    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    /// Status reported when the check fails
    pub fn failure_status(&self) -> HealthStatus {
        self.failure_status
    }

    /// Build the checker from `provider`
    pub fn create_checker(&self, provider: &ServiceProvider) -> Result<Box<dyn HealthChecker>> {
        (self.factory)(provider)
    }
}

impl fmt::Debug for HealthCheckRegistration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HealthCheckRegistration")
            .field("name", &self.name)
            .field("failure_status", &self.failure_status)
            .field("tags", &self.tags)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

/// Health check registrations collected during startup
#[derive(Debug, Clone, Default)]
pub struct HealthChecksBuilder {
    registrations: Vec<HealthCheckRegistration>,
}

impl HealthChecksBuilder {
    /// Create an empty builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a registration, replacing any with the same name
    pub fn add(&mut self, registration: HealthCheckRegistration) -> &mut Self {
        self.registrations.retain(|r| r.name != registration.name);
        self.registrations.push(registration);
        self
    }

    /// Add a registration unless one with the same name exists
    ///
    /// Returns whether the registration was added.
    pub fn try_add(&mut self, registration: HealthCheckRegistration) -> bool {
        if self.contains(&registration.name) {
            return false;
        }
        self.registrations.push(registration);
        true
    }

    /// Whether a registration named `name` exists
    pub fn contains(&self, name: &str) -> bool {
        self.registrations.iter().any(|r| r.name == name)
    }

    /// Registration named `name`
    pub fn get(&self, name: &str) -> Option<&HealthCheckRegistration> {
        self.registrations.iter().find(|r| r.name == name)
    }

    /// Registered check names in registration order
    pub fn names(&self) -> Vec<&str> {
        self.registrations.iter().map(|r| r.name.as_str()).collect()
    }

    /// Number of registrations
    pub fn len(&self) -> usize {
        self.registrations.len()
    }

    /// Whether nothing is registered
    pub fn is_empty(&self) -> bool {
        self.registrations.is_empty()
    }

    /// Bind the registrations to a provider
    pub fn build(&self, provider: ServiceProvider) -> HealthRegistry {
        HealthRegistry {
            provider,
            registrations: Arc::new(self.registrations.clone()),
            default_timeout: HEALTH_CHECK_DEFAULT_TIMEOUT,
        }
    }
}

/// Runs registered health checks against a built service provider
#[derive(Debug, Clone)]
pub struct HealthRegistry {
    provider: ServiceProvider,
    registrations: Arc<Vec<HealthCheckRegistration>>,
    default_timeout: Duration,
}

impl HealthRegistry {
    /// Perform all registered health checks
    pub async fn perform_health_checks(&self) -> HealthResponse {
        let start_time = Instant::now();
        let mut response = HealthResponse::new();

        for registration in self.registrations.iter() {
            response = response.add_check(self.run(registration).await);
        }

        response.with_response_time(start_time.elapsed())
    }

    /// Perform the health checks carrying `tag`
    pub async fn perform_tagged_health_checks(&self, tag: &str) -> HealthResponse {
        let start_time = Instant::now();
        let mut response = HealthResponse::new();

        for registration in self
            .registrations
            .iter()
            .filter(|r| r.tags.iter().any(|t| t == tag))
        {
            response = response.add_check(self.run(registration).await);
        }

        response.with_response_time(start_time.elapsed())
    }

    /// Perform a single check by name
    pub async fn check(&self, name: &str) -> Option<HealthCheck> {
        let registration = self.registrations.iter().find(|r| r.name == name)?;
        Some(self.run(registration).await)
    }

    /// Get a list of registered health check names
    pub fn list_checks(&self) -> Vec<String> {
        self.registrations.iter().map(|r| r.name.clone()).collect()
    }

    async fn run(&self, registration: &HealthCheckRegistration) -> HealthCheck {
        let start_time = Instant::now();
        let timeout = registration.timeout.unwrap_or(self.default_timeout);

        let mut check = match registration.create_checker(&self.provider) {
            Ok(checker) => match tokio::time::timeout(timeout, checker.check_health()).await {
                Ok(check) => check,
                Err(_) => HealthCheck::failed(
                    &registration.name,
                    Some(format!("Health check timed out after {timeout:?}")),
                ),
            },
            Err(e) => HealthCheck::failed(&registration.name, Some(e.to_string())),
        };

        check.name.clone_from(&registration.name);
        if check.status == HealthStatus::Down {
            check.status = registration.failure_status;
        }

        log_health_check(
            &registration.name,
            check.status.is_healthy(),
            check.error.as_deref(),
        );
        check.with_response_time(start_time.elapsed())
    }
}
