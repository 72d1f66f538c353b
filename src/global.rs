//! The process-wide convenience container.
//!
//! Single-container applications can skip carrying a [`Container`] around
//! and use these free functions instead. The global container is created
//! lazily on first touch; [`reset`] exists for test teardown. Everything
//! defined for instance containers applies identically.
//!
//! # Examples
//!
//! ```rust
//! use wirebox::{global, Lifetime};
//!
//! struct AppConfig { name: &'static str }
//!
//! global::reset();
//! global::must_register_instance(AppConfig { name: "demo" }, Lifetime::Singleton);
//!
//! let config = global::must_get::<AppConfig>();
//! assert_eq!(config.name, "demo");
//! # global::reset();
//! ```

use std::sync::Arc;

use once_cell::sync::Lazy;

use crate::container::Container;
use crate::error::DiResult;
use crate::factory::ServiceFactory;
use crate::lifetime::Lifetime;
use crate::resolver::Resolver;
use crate::scope::Scope;

static GLOBAL: Lazy<Container> = Lazy::new(Container::new);

/// The global container itself, for operations without a free-function
/// wrapper here.
pub fn container() -> &'static Container {
    &GLOBAL
}

/// Registers a factory on the global container.
pub fn register<Args, F>(factory: F, lifetime: Lifetime) -> DiResult<()>
where
    F: ServiceFactory<Args>,
{
    GLOBAL.register(factory, lifetime)
}

/// [`register`], panicking on failure.
pub fn must_register<Args, F>(factory: F, lifetime: Lifetime)
where
    F: ServiceFactory<Args>,
{
    GLOBAL.must_register(factory, lifetime)
}

/// Registers a trait-keyed factory on the global container.
pub fn register_trait<S, Args, F>(factory: F, lifetime: Lifetime) -> DiResult<()>
where
    S: ?Sized + Send + Sync + 'static,
    F: ServiceFactory<Args, Output = Arc<S>>,
{
    GLOBAL.register_trait::<S, Args, F>(factory, lifetime)
}

/// [`register_trait`], panicking on failure.
pub fn must_register_trait<S, Args, F>(factory: F, lifetime: Lifetime)
where
    S: ?Sized + Send + Sync + 'static,
    F: ServiceFactory<Args, Output = Arc<S>>,
{
    GLOBAL.must_register_trait::<S, Args, F>(factory, lifetime)
}

/// Registers a pre-built value on the global container.
pub fn register_instance<T>(value: T, lifetime: Lifetime) -> DiResult<()>
where
    T: Send + Sync + 'static,
{
    GLOBAL.register_instance(value, lifetime)
}

/// [`register_instance`], panicking on failure.
pub fn must_register_instance<T>(value: T, lifetime: Lifetime)
where
    T: Send + Sync + 'static,
{
    GLOBAL.must_register_instance(value, lifetime)
}

/// Registers a named pre-built value on the global container.
pub fn register_instance_named<T>(
    name: impl Into<String>,
    value: T,
    lifetime: Lifetime,
) -> DiResult<()>
where
    T: Send + Sync + 'static,
{
    GLOBAL.register_instance_named(name, value, lifetime)
}

/// [`register_instance_named`], panicking on failure.
pub fn must_register_instance_named<T>(name: impl Into<String>, value: T, lifetime: Lifetime)
where
    T: Send + Sync + 'static,
{
    GLOBAL.must_register_instance_named(name, value, lifetime)
}

/// Resolves a service from the global container.
pub fn get<T: ?Sized + Send + Sync + 'static>() -> DiResult<Arc<T>> {
    GLOBAL.get::<T>()
}

/// [`get`], panicking on failure.
pub fn must_get<T: ?Sized + Send + Sync + 'static>() -> Arc<T> {
    GLOBAL.get_required::<T>()
}

/// Resolves a named pre-built value from the global container.
pub fn get_named<T: ?Sized + Send + Sync + 'static>(name: &str) -> DiResult<Arc<T>> {
    GLOBAL.get_named::<T>(name)
}

/// Resolves a service through `scope`, honouring scoped lifetimes.
pub fn get_scoped<T: ?Sized + Send + Sync + 'static>(scope: &Scope) -> DiResult<Arc<T>> {
    scope.get::<T>()
}

/// [`get_scoped`], panicking on failure.
pub fn must_get_scoped<T: ?Sized + Send + Sync + 'static>(scope: &Scope) -> Arc<T> {
    scope.get_required::<T>()
}

/// Creates a scope over the global container.
pub fn create_scope() -> Scope {
    GLOBAL.create_scope()
}

/// Empties the global container's registration store. For tests.
pub fn reset() {
    GLOBAL.reset();
}
