//! Dependency Injection
//!
//! A small service container in the shape hosts expect: register factories
//! on a [`ServiceCollection`] during startup, freeze it into a
//! [`ServiceProvider`], resolve on demand.
//!
//! ```text
//! ServiceCollection (startup)          ServiceProvider (runtime)
//! ───────────────────────────          ─────────────────────────
//! add_singleton::<T>(factory)    →     get::<T>()           once-cell per descriptor
//! add_keyed_singleton::<T>(k, f) →     get_keyed::<T>(k)
//! add_transient::<T>(factory)    →     get::<T>()           factory per call
//! ```
//!
//! Services are looked up by `(TypeId, Option<key>)`. Aliases are plain
//! registrations whose factory resolves another service, which is how a
//! keyed singleton gets trait-object views that share the same instance.

pub mod collection;
pub mod provider;

pub use collection::{ServiceCollection, ServiceDescriptor, ServiceLifetime};
pub use provider::ServiceProvider;
