//! Scoped resolution.

use std::any::Any;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Instant;

use crate::container::Container;
use crate::error::{DiError, DiResult};
use crate::internal::CycleGuard;
use crate::key::ServiceKey;
use crate::lifetime::Lifetime;
use crate::registration::{AnyHandle, BindingSource};
use crate::resolver::{ResolverContext, ResolverCore};

/// An isolation unit for scoped services.
///
/// A scope shares its container's registration store but owns a private
/// cache: each scoped binding materialises at most once per scope, and
/// distinct scopes hold distinct values. Singletons resolved through a
/// scope still come from the container-wide slot, and transients are always
/// fresh. Unlike the root container, a scope resolves every lifetime.
///
/// Scopes are not hierarchical; dropping one releases its cache and nothing
/// else.
///
/// # Examples
///
/// ```rust
/// use wirebox::{Container, Lifetime, Resolver};
/// use std::sync::Arc;
/// use std::sync::atomic::{AtomicU64, Ordering};
///
/// struct RequestId(u64);
///
/// static NEXT: AtomicU64 = AtomicU64::new(1);
///
/// let container = Container::new();
/// container.must_register(
///     || RequestId(NEXT.fetch_add(1, Ordering::SeqCst)),
///     Lifetime::Scoped,
/// );
///
/// let a = container.create_scope();
/// let b = container.create_scope();
///
/// let id_a1 = a.get_required::<RequestId>();
/// let id_a2 = a.get_required::<RequestId>();
/// let id_b = b.get_required::<RequestId>();
///
/// assert!(Arc::ptr_eq(&id_a1, &id_a2));
/// assert!(!Arc::ptr_eq(&id_a1, &id_b));
/// ```
pub struct Scope {
    root: Container,
    cache: RwLock<HashMap<ServiceKey, AnyHandle>>,
}

impl Scope {
    pub(crate) fn new(root: Container) -> Self {
        Self {
            root,
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Empties this scope's cache. Root registrations and singletons are
    /// untouched; the next scoped resolve materialises anew.
    pub fn reset(&self) {
        self.cache.write().unwrap().clear();
    }

    fn cached(&self, key: &ServiceKey) -> Option<AnyHandle> {
        self.cache.read().unwrap().get(key).cloned()
    }

    /// Publishes a scoped value; if another thread got there first, the
    /// earlier value wins so that one scope only ever exposes one instance.
    fn publish(&self, key: ServiceKey, value: AnyHandle) -> AnyHandle {
        match self.cache.write().unwrap().entry(key) {
            Entry::Occupied(existing) => existing.get().clone(),
            Entry::Vacant(slot) => {
                slot.insert(value.clone());
                value
            }
        }
    }

    fn resolve_local(&self, key: &ServiceKey) -> DiResult<AnyHandle> {
        let binding = self
            .root
            .lookup(key)
            .ok_or(DiError::NotFound(key.display_name()))?;
        let _guard = CycleGuard::enter(*key)?;
        match &binding.source {
            BindingSource::Instance { value } => match binding.lifetime {
                Lifetime::Scoped => {
                    if let Some(cached) = self.cached(key) {
                        return Ok(cached);
                    }
                    Ok(self.publish(*key, value.clone()))
                }
                _ => Ok(value.clone()),
            },
            BindingSource::Factory { .. } => match binding.lifetime {
                Lifetime::Singleton => {
                    // The container-wide slot is consulted directly rather
                    // than through a root resolve, so the cycle tracker
                    // keeps its current shape while the factory's own
                    // dependencies resolve through this scope.
                    binding.resolve_singleton(&ResolverContext::new(self))
                }
                Lifetime::Scoped => {
                    if let Some(cached) = self.cached(key) {
                        return Ok(cached);
                    }
                    let value = binding.materialize(&ResolverContext::new(self))?;
                    Ok(self.publish(*key, value))
                }
                Lifetime::Transient => binding.materialize(&ResolverContext::new(self)),
            },
        }
    }
}

impl ResolverCore for Scope {
    fn resolve_key(&self, key: &ServiceKey) -> DiResult<Arc<dyn Any + Send + Sync>> {
        let observers = self.root.observers();
        if observers.is_empty() {
            return self.resolve_local(key);
        }
        observers.resolving(key);
        let started = Instant::now();
        let result = self.resolve_local(key);
        match &result {
            Ok(_) => observers.resolved(key, started.elapsed()),
            Err(err) => observers.failed(key, err),
        }
        result
    }

    fn resolve_named_key(
        &self,
        name: &str,
        key: &ServiceKey,
    ) -> DiResult<Arc<dyn Any + Send + Sync>> {
        self.root.resolve_named_key(name, key)
    }

    fn has_default(&self, key: &ServiceKey) -> bool {
        self.root.has_default(key)
    }

    fn default_instance(&self, key: &ServiceKey) -> Option<Arc<dyn Any + Send + Sync>> {
        self.root.default_instance(key)
    }

    fn named_instances(&self, key: &ServiceKey) -> Vec<(String, Arc<dyn Any + Send + Sync>)> {
        self.root.named_instances(key)
    }
}
