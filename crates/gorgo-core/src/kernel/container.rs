use std::any::{Any, type_name};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use crate::kernel::error::ContainerError;

/// A type-erased service instance as stored in the [`Container`]
pub type Service = Arc<dyn Any + Send + Sync>;

/// Name-keyed, thread-safe registry of shared service instances.
///
/// Registration silently overwrites an existing entry with the same name.
/// Entries are never removed. All operations take `&self`; a single
/// reader/writer lock guards the map so readers never observe a torn write.
#[derive(Default)]
pub struct Container {
    services: RwLock<HashMap<String, Service>>,
}

impl Container {
    /// Create a new empty container
    pub fn new() -> Self {
        Self {
            services: RwLock::new(HashMap::new()),
        }
    }

    /// Register a service by value. The value is wrapped in an `Arc`.
    pub fn register<T: Any + Send + Sync>(&self, name: impl Into<String>, instance: T) {
        self.register_service(name, Arc::new(instance));
    }

    /// Register an already shared service without re-wrapping it.
    pub fn register_shared<T: Any + Send + Sync>(&self, name: impl Into<String>, instance: Arc<T>) {
        self.register_service(name, instance);
    }

    /// Register a type-erased service, overwriting any prior entry.
    pub fn register_service(&self, name: impl Into<String>, service: Service) {
        let name = name.into();
        let mut services = self.services.write().unwrap_or_else(PoisonError::into_inner);
        if services.insert(name.clone(), service).is_some() {
            log::debug!("Service '{}' overwritten", name);
        }
    }

    /// Get the type-erased service registered under `name`.
    pub fn get(&self, name: &str) -> Option<Service> {
        let services = self.services.read().unwrap_or_else(PoisonError::into_inner);
        services.get(name).cloned()
    }

    /// Get a service downcast to its concrete type `T`.
    ///
    /// Fails with [`ContainerError::ServiceNotFound`] if nothing is registered
    /// under `name`, and with [`ContainerError::InvalidTarget`] if the stored
    /// value is not a `T`.
    pub fn get_typed<T: Any + Send + Sync>(&self, name: &str) -> Result<Arc<T>, ContainerError> {
        let service = self.get(name).ok_or_else(|| ContainerError::ServiceNotFound {
            name: name.to_string(),
        })?;
        Arc::downcast::<T>(service).map_err(|_| ContainerError::InvalidTarget {
            name: name.to_string(),
            expected: type_name::<T>(),
        })
    }

    /// Like [`get_typed`](Self::get_typed), but returns a clone of the stored value.
    pub fn get_cloned<T: Any + Send + Sync + Clone>(&self, name: &str) -> Result<T, ContainerError> {
        self.get_typed::<T>(name).map(|service| (*service).clone())
    }

    /// Assign the service registered under `name` into `target`.
    ///
    /// `target` is left untouched on error.
    pub fn resolve_into<T: Any + Send + Sync>(
        &self,
        name: &str,
        target: &mut Option<Arc<T>>,
    ) -> Result<(), ContainerError> {
        *target = Some(self.get_typed::<T>(name)?);
        Ok(())
    }

    /// Check whether a service is registered under `name`
    pub fn contains(&self, name: &str) -> bool {
        let services = self.services.read().unwrap_or_else(PoisonError::into_inner);
        services.contains_key(name)
    }

    /// Names of all registered services, sorted
    pub fn names(&self) -> Vec<String> {
        let services = self.services.read().unwrap_or_else(PoisonError::into_inner);
        let mut names: Vec<String> = services.keys().cloned().collect();
        names.sort();
        names
    }

    /// Number of registered services
    pub fn len(&self) -> usize {
        self.services.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Debug for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Container")
            .field("services", &self.names())
            .finish()
    }
}
