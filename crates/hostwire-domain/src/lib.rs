//! # hostwire domain
//!
//! Core types shared by the hostwire crates: the error type and the
//! provider-agnostic data-source ports that host services depend on.
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`error`] | `Error` enum and `Result` alias |
//! | [`ports`] | Data-source and connection traits |

pub mod error;
pub mod ports;

pub use error::{Error, Result};
