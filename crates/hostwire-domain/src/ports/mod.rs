//! Port traits
//!
//! Interfaces implemented by concrete database providers and consumed by
//! host services that should not depend on a particular driver.

pub mod data_source;

pub use data_source::{DbConnection, DbDataSource};
