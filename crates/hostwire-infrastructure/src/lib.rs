//! # Infrastructure Layer
//!
//! The host surface that database providers plug into: configuration,
//! the service container, health checks, telemetry and logging.
//!
//! ## Module Categories
//!
//! ### Configuration & DI
//! | Module | Description |
//! |--------|-------------|
//! | [`config`] | Figment-backed configuration tree with `:` section paths |
//! | [`di`] | Service collection and provider with keyed, lazy singletons |
//! | [`host`] | Host builder tying configuration, services, health and telemetry together |
//! | [`constants`] | Centralized configuration constants |
//!
//! ### Observability
//! | Module | Description |
//! |--------|-------------|
//! | [`health`] | Health check registrations and registry |
//! | [`logging`] | Structured logging with tracing |
//! | [`telemetry`] | Tracing sources and meters enabled by registered components |

pub mod config;
pub mod constants;
pub mod di;
pub mod error_ext;
pub mod health;
pub mod host;
pub mod logging;
pub mod telemetry;

// Re-export commonly used types
pub use config::Configuration;
pub use di::{ServiceCollection, ServiceProvider};
pub use error_ext::ErrorContext;
pub use host::{Host, HostApplicationBuilder};
