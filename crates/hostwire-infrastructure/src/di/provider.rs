//! Service resolution
//!
//! The provider owns one once-cell per singleton descriptor. A singleton
//! factory runs at most once per provider even when several threads resolve
//! it at the same time; the others block until the first finishes. A factory
//! that fails leaves its cell empty, so the next resolution tries again and
//! reports the same error.

use super::collection::{AnyService, ServiceDescriptor, ServiceLifetime};
use hostwire_domain::error::{Error, Result};
use once_cell::sync::OnceCell;
use std::any::{TypeId, type_name};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::trace;

type DescriptorKey = (TypeId, Option<String>);

struct ProviderInner {
    descriptors: Vec<ServiceDescriptor>,
    index: HashMap<DescriptorKey, usize>,
    singletons: Vec<OnceCell<AnyService>>,
}

/// Resolves services registered in a [`ServiceCollection`](super::ServiceCollection)
///
/// Cloning is cheap; clones share the same singleton instances.
#[derive(Clone)]
pub struct ServiceProvider {
    inner: Arc<ProviderInner>,
}

impl ServiceProvider {
    pub(crate) fn new(descriptors: Vec<ServiceDescriptor>) -> Self {
        let index = descriptors
            .iter()
            .enumerate()
            .map(|(i, d)| ((d.service_type, d.key.clone()), i))
            .collect();
        let singletons = descriptors.iter().map(|_| OnceCell::new()).collect();

        Self {
            inner: Arc::new(ProviderInner {
                descriptors,
                index,
                singletons,
            }),
        }
    }

    /// Resolve unkeyed `T`, or `None` if it is not registered
    pub fn get<T: Send + Sync + 'static>(&self) -> Result<Option<T>> {
        self.resolve::<T>(None)
    }

    /// Resolve `T` registered under `key`, or `None` if it is not registered
    pub fn get_keyed<T: Send + Sync + 'static>(&self, key: &str) -> Result<Option<T>> {
        self.resolve::<T>(Some(key))
    }

    /// Resolve unkeyed `T`, failing if it is not registered
    pub fn get_required<T: Send + Sync + 'static>(&self) -> Result<T> {
        self.get::<T>()?
            .ok_or_else(|| Error::service_not_found(type_name::<T>(), None))
    }

    /// Resolve `T` registered under `key`, failing if it is not registered
    pub fn get_required_keyed<T: Send + Sync + 'static>(&self, key: &str) -> Result<T> {
        self.get_keyed::<T>(key)?
            .ok_or_else(|| Error::service_not_found(type_name::<T>(), Some(key)))
    }

    /// Whether unkeyed `T` is registered
    pub fn contains<T: 'static>(&self) -> bool {
        self.position::<T>(None).is_some()
    }

    /// Whether `T` is registered under `key`
    pub fn contains_keyed<T: 'static>(&self, key: &str) -> bool {
        self.position::<T>(Some(key)).is_some()
    }

    fn position<T: 'static>(&self, key: Option<&str>) -> Option<usize> {
        self.inner
            .index
            .get(&(TypeId::of::<T>(), key.map(ToOwned::to_owned)))
            .copied()
    }

    fn resolve<T: Send + Sync + 'static>(&self, key: Option<&str>) -> Result<Option<T>> {
        let Some(position) = self.position::<T>(key) else {
            return Ok(None);
        };
        let descriptor = &self.inner.descriptors[position];
        trace!(service = descriptor.type_name, key, "Resolving service");

        let instance = match descriptor.lifetime {
            ServiceLifetime::Transient => (descriptor.factory)(self, key)?,
            ServiceLifetime::Singleton => {
                let cell = &self.inner.singletons[position];
                let shared = cell.get_or_try_init(|| (descriptor.factory)(self, key))?;
                descriptor
                    .clone_fn
                    .and_then(|clone| clone(&**shared))
                    .ok_or_else(|| mismatch::<T>(descriptor))?
            }
        };

        instance
            .downcast::<T>()
            .map(|boxed| Some(*boxed))
            .map_err(|_| mismatch::<T>(descriptor))
    }
}

fn mismatch<T>(descriptor: &ServiceDescriptor) -> Error {
    Error::internal(format!(
        "Service registered as '{}' produced a value that is not '{}'",
        descriptor.type_name,
        type_name::<T>()
    ))
}

impl fmt::Debug for ServiceProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceProvider")
            .field("services", &self.inner.descriptors.len())
            .finish_non_exhaustive()
    }
}
