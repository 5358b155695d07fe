//! Service registrations
//!
//! A [`ServiceCollection`] is an ordered list of [`ServiceDescriptor`]s.
//! Each descriptor maps a service type, optionally paired with a string key,
//! to a factory and a lifetime. Factories are not run here; they run when
//! the built [`ServiceProvider`] resolves the service.

use super::provider::ServiceProvider;
use hostwire_domain::error::Result;
use std::any::{Any, TypeId, type_name};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

pub(crate) type AnyService = Box<dyn Any + Send + Sync>;

pub(crate) type ServiceFactory =
    Arc<dyn Fn(&ServiceProvider, Option<&str>) -> Result<AnyService> + Send + Sync>;

pub(crate) type CloneFn = fn(&(dyn Any + Send + Sync)) -> Option<AnyService>;

/// How long a resolved instance lives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceLifetime {
    /// Created once per provider on first resolution, then shared
    Singleton,
    /// Created on every resolution
    Transient,
}

/// A single registration
#[derive(Clone)]
pub struct ServiceDescriptor {
    pub(crate) service_type: TypeId,
    pub(crate) type_name: &'static str,
    pub(crate) key: Option<String>,
    pub(crate) lifetime: ServiceLifetime,
    pub(crate) factory: ServiceFactory,
    pub(crate) clone_fn: Option<CloneFn>,
}

impl ServiceDescriptor {
    /// Type name of the registered service
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Service key, if this is a keyed registration
    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    /// Lifetime of the registration
    pub fn lifetime(&self) -> ServiceLifetime {
        self.lifetime
    }

    /// Whether this descriptor serves `T` under `key`
    pub fn is<T: 'static>(&self, key: Option<&str>) -> bool {
        self.service_type == TypeId::of::<T>() && self.key.as_deref() == key
    }
}

impl fmt::Debug for ServiceDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceDescriptor")
            .field("type_name", &self.type_name)
            .field("key", &self.key)
            .field("lifetime", &self.lifetime)
            .finish_non_exhaustive()
    }
}

fn erase<T: Send + Sync + 'static>(value: T) -> AnyService {
    Box::new(value)
}

fn clone_service<T: Clone + Send + Sync + 'static>(
    value: &(dyn Any + Send + Sync),
) -> Option<AnyService> {
    value
        .downcast_ref::<T>()
        .map(|v| Box::new(v.clone()) as AnyService)
}

/// Ordered set of service registrations
///
/// When several descriptors serve the same type and key, the last one wins
/// on resolution. The `try_add_*` variants register only if nothing serves
/// that type and key yet.
///
/// # Example
///
/// ```
/// use hostwire_infrastructure::di::ServiceCollection;
/// use std::sync::Arc;
///
/// let mut services = ServiceCollection::new();
/// services.add_singleton(|_| Ok(Arc::new(String::from("shared"))));
/// services.add_keyed_singleton("primary", |_, key| Ok(key.len()));
///
/// let provider = services.build();
/// let shared: Arc<String> = provider.get_required().unwrap();
/// assert_eq!(shared.as_str(), "shared");
/// assert_eq!(provider.get_required_keyed::<usize>("primary").unwrap(), 7);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ServiceCollection {
    descriptors: Vec<ServiceDescriptor>,
}

impl ServiceCollection {
    /// Create an empty collection
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of registrations
    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    /// Whether the collection has no registrations
    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// All registrations in insertion order
    pub fn descriptors(&self) -> &[ServiceDescriptor] {
        &self.descriptors
    }

    /// Whether any registration serves unkeyed `T`
    pub fn contains<T: 'static>(&self) -> bool {
        self.descriptors.iter().any(|d| d.is::<T>(None))
    }

    /// Whether any registration serves `T` under `key`
    pub fn contains_keyed<T: 'static>(&self, key: &str) -> bool {
        self.descriptors.iter().any(|d| d.is::<T>(Some(key)))
    }

    /// Register an unkeyed singleton
    pub fn add_singleton<T, F>(&mut self, factory: F) -> &mut Self
    where
        T: Clone + Send + Sync + 'static,
        F: Fn(&ServiceProvider) -> Result<T> + Send + Sync + 'static,
    {
        self.push_singleton::<T>(
            None,
            Arc::new(move |sp: &ServiceProvider, _: Option<&str>| factory(sp).map(erase)),
        )
    }

    /// Register an unkeyed singleton unless `T` is already registered
    pub fn try_add_singleton<T, F>(&mut self, factory: F) -> &mut Self
    where
        T: Clone + Send + Sync + 'static,
        F: Fn(&ServiceProvider) -> Result<T> + Send + Sync + 'static,
    {
        if !self.contains::<T>() {
            self.add_singleton(factory);
        }
        self
    }

    /// Register a singleton under `key`
    ///
    /// The factory receives the key it was registered under, so one factory
    /// body can serve several keys.
    pub fn add_keyed_singleton<T, F>(&mut self, key: impl Into<String>, factory: F) -> &mut Self
    where
        T: Clone + Send + Sync + 'static,
        F: Fn(&ServiceProvider, &str) -> Result<T> + Send + Sync + 'static,
    {
        self.push_singleton::<T>(
            Some(key.into()),
            Arc::new(move |sp: &ServiceProvider, key: Option<&str>| {
                factory(sp, key.unwrap_or_default()).map(erase)
            }),
        )
    }

    /// Register an unkeyed transient
    pub fn add_transient<T, F>(&mut self, factory: F) -> &mut Self
    where
        T: Send + Sync + 'static,
        F: Fn(&ServiceProvider) -> Result<T> + Send + Sync + 'static,
    {
        self.push_transient::<T>(
            None,
            Arc::new(move |sp: &ServiceProvider, _: Option<&str>| factory(sp).map(erase)),
        )
    }

    /// Register an unkeyed transient unless `T` is already registered
    pub fn try_add_transient<T, F>(&mut self, factory: F) -> &mut Self
    where
        T: Send + Sync + 'static,
        F: Fn(&ServiceProvider) -> Result<T> + Send + Sync + 'static,
    {
        if !self.contains::<T>() {
            self.add_transient(factory);
        }
        self
    }

    /// Register a transient under `key`
    pub fn add_keyed_transient<T, F>(&mut self, key: impl Into<String>, factory: F) -> &mut Self
    where
        T: Send + Sync + 'static,
        F: Fn(&ServiceProvider, &str) -> Result<T> + Send + Sync + 'static,
    {
        self.push_transient::<T>(
            Some(key.into()),
            Arc::new(move |sp: &ServiceProvider, key: Option<&str>| {
                factory(sp, key.unwrap_or_default()).map(erase)
            }),
        )
    }

    /// Freeze the registrations into a provider
    pub fn build(&self) -> ServiceProvider {
        debug!(services = self.descriptors.len(), "Building service provider");
        ServiceProvider::new(self.descriptors.clone())
    }

    fn push_singleton<T>(&mut self, key: Option<String>, factory: ServiceFactory) -> &mut Self
    where
        T: Clone + Send + Sync + 'static,
    {
        self.push(ServiceDescriptor {
            service_type: TypeId::of::<T>(),
            type_name: type_name::<T>(),
            key,
            lifetime: ServiceLifetime::Singleton,
            factory,
            clone_fn: Some(clone_service::<T>),
        })
    }

    fn push_transient<T>(&mut self, key: Option<String>, factory: ServiceFactory) -> &mut Self
    where
        T: Send + Sync + 'static,
    {
        self.push(ServiceDescriptor {
            service_type: TypeId::of::<T>(),
            type_name: type_name::<T>(),
            key,
            lifetime: ServiceLifetime::Transient,
            factory,
            clone_fn: None,
        })
    }

    fn push(&mut self, descriptor: ServiceDescriptor) -> &mut Self {
        debug!(
            service = descriptor.type_name,
            key = descriptor.key.as_deref(),
            lifetime = ?descriptor.lifetime,
            "Registered service"
        );
        self.descriptors.push(descriptor);
        self
    }
}
