//! Resolver traits shared by the container, scopes, and factory contexts.

use std::any::Any;
use std::sync::Arc;

use crate::error::{DiError, DiResult};
use crate::key::ServiceKey;

/// Object-safe resolution core.
///
/// Implemented by [`Container`](crate::Container), [`Scope`](crate::Scope),
/// and [`ResolverContext`]; everything the generic surface and the
/// auto-collection rules need, in type-erased form.
pub trait ResolverCore: Send + Sync {
    /// Resolves the default binding for `key` to its type-erased handle.
    fn resolve_key(&self, key: &ServiceKey) -> DiResult<Arc<dyn Any + Send + Sync>>;

    /// Resolves the named binding for `(name, key)`.
    fn resolve_named_key(
        &self,
        name: &str,
        key: &ServiceKey,
    ) -> DiResult<Arc<dyn Any + Send + Sync>>;

    /// True when the default table holds a binding for `key`.
    fn has_default(&self, key: &ServiceKey) -> bool;

    /// The default binding's stored value when it is pre-built.
    fn default_instance(&self, key: &ServiceKey) -> Option<Arc<dyn Any + Send + Sync>>;

    /// Snapshot of pre-built named bindings stored under `key`. Name order
    /// is unspecified.
    fn named_instances(&self, key: &ServiceKey) -> Vec<(String, Arc<dyn Any + Send + Sync>)>;
}

fn downcast_handle<T: ?Sized + Send + Sync + 'static>(
    handle: &Arc<dyn Any + Send + Sync>,
    key: &ServiceKey,
) -> DiResult<Arc<T>> {
    handle
        .downcast_ref::<Arc<T>>()
        .cloned()
        .ok_or(DiError::TypeMismatch(key.display_name()))
}

/// Typed resolution surface, blanket-implemented over [`ResolverCore`].
///
/// # Examples
///
/// ```rust
/// use wirebox::{Container, Lifetime, Resolver};
/// use std::sync::Arc;
///
/// struct Config { port: u16 }
///
/// let container = Container::new();
/// container.must_register_instance(Config { port: 8080 }, Lifetime::Singleton);
///
/// let config: Arc<Config> = container.get_required::<Config>();
/// assert_eq!(config.port, 8080);
/// ```
pub trait Resolver: ResolverCore {
    /// Resolves a service, returning its shared handle.
    ///
    /// Works for concrete types and trait objects alike:
    /// `get::<Database>()`, `get::<dyn Logger>()`.
    fn get<T: ?Sized + Send + Sync + 'static>(&self) -> DiResult<Arc<T>> {
        let key = ServiceKey::of::<T>();
        let handle = self.resolve_key(&key)?;
        downcast_handle(&handle, &key)
    }

    /// Resolves a service, panicking with the error payload on failure.
    fn get_required<T: ?Sized + Send + Sync + 'static>(&self) -> Arc<T> {
        self.get::<T>()
            .unwrap_or_else(|err| panic!("failed to resolve {}: {}", std::any::type_name::<T>(), err))
    }

    /// Resolves the pre-built instance registered under `name`.
    fn get_named<T: ?Sized + Send + Sync + 'static>(&self, name: &str) -> DiResult<Arc<T>> {
        let key = ServiceKey::of::<T>();
        let handle = self.resolve_named_key(name, &key)?;
        downcast_handle(&handle, &key)
    }

    /// Named resolution, panicking with the error payload on failure.
    fn get_named_required<T: ?Sized + Send + Sync + 'static>(&self, name: &str) -> Arc<T> {
        self.get_named::<T>(name).unwrap_or_else(|err| {
            panic!(
                "failed to resolve {} under name {:?}: {}",
                std::any::type_name::<T>(),
                name,
                err
            )
        })
    }

    /// Collects every pre-built binding of `T`: the default one first (when
    /// it is pre-built), then each named one in unspecified order.
    fn get_all<T: ?Sized + Send + Sync + 'static>(&self) -> DiResult<Vec<Arc<T>>> {
        let key = ServiceKey::of::<T>();
        let mut all = Vec::new();
        if let Some(handle) = self.default_instance(&key) {
            all.push(downcast_handle(&handle, &key)?);
        }
        for (_, handle) in self.named_instances(&key) {
            all.push(downcast_handle(&handle, &key)?);
        }
        Ok(all)
    }

    /// [`get_all`](Self::get_all), panicking on failure.
    fn get_all_required<T: ?Sized + Send + Sync + 'static>(&self) -> Vec<Arc<T>> {
        self.get_all::<T>().unwrap_or_else(|err| {
            panic!(
                "failed to resolve all {}: {}",
                std::any::type_name::<T>(),
                err
            )
        })
    }
}

impl<R: ResolverCore + ?Sized> Resolver for R {}

/// The resolver handed to factory parameters while they resolve.
///
/// Borrows whichever resolver began the outer call (root container or
/// scope), so nested resolution follows the same lifetime rules and shares
/// the same cycle tracking as the call that triggered the factory.
pub struct ResolverContext<'a> {
    resolver: &'a dyn ResolverCore,
}

impl<'a> ResolverContext<'a> {
    pub(crate) fn new<R: ResolverCore>(resolver: &'a R) -> Self {
        Self { resolver }
    }
}

impl ResolverCore for ResolverContext<'_> {
    fn resolve_key(&self, key: &ServiceKey) -> DiResult<Arc<dyn Any + Send + Sync>> {
        self.resolver.resolve_key(key)
    }

    fn resolve_named_key(
        &self,
        name: &str,
        key: &ServiceKey,
    ) -> DiResult<Arc<dyn Any + Send + Sync>> {
        self.resolver.resolve_named_key(name, key)
    }

    fn has_default(&self, key: &ServiceKey) -> bool {
        self.resolver.has_default(key)
    }

    fn default_instance(&self, key: &ServiceKey) -> Option<Arc<dyn Any + Send + Sync>> {
        self.resolver.default_instance(key)
    }

    fn named_instances(&self, key: &ServiceKey) -> Vec<(String, Arc<dyn Any + Send + Sync>)> {
        self.resolver.named_instances(key)
    }
}
