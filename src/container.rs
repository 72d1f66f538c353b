//! The root container: registration surface and root resolver.

use std::any::Any;
use std::sync::{Arc, RwLock};
use std::time::Instant;

use crate::error::{DiError, DiResult};
use crate::factory::ServiceFactory;
use crate::internal::CycleGuard;
use crate::key::ServiceKey;
use crate::lifetime::Lifetime;
use crate::observer::{DiObserver, Observers};
use crate::registration::{AnyHandle, Binding, BindingSource, Ctor, Registry};
use crate::resolver::{ResolverContext, ResolverCore};
use crate::scope::Scope;

/// The dependency injection container.
///
/// A `Container` owns the registration store and acts as the root resolver.
/// Registrations and resolutions may interleave; registering after
/// resolution has begun is a documented contract the container does not
/// enforce. Cloning is cheap and clones share the same store.
///
/// Factories declare their dependencies positionally: every parameter is
/// itself a registered service (or an auto-assembled collection), resolved
/// recursively when the factory runs.
///
/// # Examples
///
/// ```rust
/// use wirebox::{Container, Lifetime, Resolver};
/// use std::sync::Arc;
///
/// struct Database { url: String }
/// struct UserService { db: Arc<Database> }
///
/// let container = Container::new();
/// container.must_register_instance(
///     Database { url: "postgres://localhost".to_string() },
///     Lifetime::Singleton,
/// );
/// container.must_register(
///     |db: Arc<Database>| UserService { db },
///     Lifetime::Transient,
/// );
///
/// let service = container.get_required::<UserService>();
/// assert_eq!(service.db.url, "postgres://localhost");
/// ```
#[derive(Clone)]
pub struct Container {
    inner: Arc<ContainerInner>,
}

struct ContainerInner {
    registry: RwLock<Registry>,
    observers: Observers,
}

impl Default for Container {
    fn default() -> Self {
        Self::new()
    }
}

impl Container {
    /// Creates an empty container.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(ContainerInner {
                registry: RwLock::new(Registry::new()),
                observers: Observers::new(),
            }),
        }
    }

    // ----- Factory registrations -----

    /// Registers a factory keyed by its return type.
    ///
    /// Each factory parameter must be a registered service handle
    /// (`Arc<Dep>`), a sequence (`Vec<Arc<Dep>>`), or a named map
    /// (`HashMap<String, Arc<Dep>>`); see [`Dependency`](crate::Dependency).
    ///
    /// Fails with [`DiError::Duplicate`] when the return type is already
    /// registered.
    pub fn register<Args, F>(&self, factory: F, lifetime: Lifetime) -> DiResult<()>
    where
        F: ServiceFactory<Args>,
    {
        let key = ServiceKey::of::<F::Output>();
        let params = F::parameter_specs().into_boxed_slice();
        let ctor: Ctor = Arc::new(move |ctx: &ResolverContext<'_>| {
            let value = factory.invoke(ctx)?;
            Ok(Arc::new(Arc::new(value)) as AnyHandle)
        });
        self.insert_default(key, Binding::factory(lifetime, ctor, params))
    }

    /// Registers a factory under a trait-object key.
    ///
    /// The factory produces `Arc<S>` for the trait `S`; consumers resolve
    /// it with `get::<dyn Trait>()`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use wirebox::{Container, Lifetime, Resolver};
    /// use std::sync::Arc;
    ///
    /// trait Greeter: Send + Sync {
    ///     fn hello(&self) -> String;
    /// }
    ///
    /// struct English;
    /// impl Greeter for English {
    ///     fn hello(&self) -> String { "hello".to_string() }
    /// }
    ///
    /// let container = Container::new();
    /// container
    ///     .register_trait::<dyn Greeter, _, _>(
    ///         || Arc::new(English) as Arc<dyn Greeter>,
    ///         Lifetime::Singleton,
    ///     )
    ///     .unwrap();
    ///
    /// let greeter = container.get_required::<dyn Greeter>();
    /// assert_eq!(greeter.hello(), "hello");
    /// ```
    pub fn register_trait<S, Args, F>(&self, factory: F, lifetime: Lifetime) -> DiResult<()>
    where
        S: ?Sized + Send + Sync + 'static,
        F: ServiceFactory<Args, Output = Arc<S>>,
    {
        let key = ServiceKey::of::<S>();
        let params = F::parameter_specs().into_boxed_slice();
        let ctor: Ctor = Arc::new(move |ctx: &ResolverContext<'_>| {
            let value = factory.invoke(ctx)?;
            Ok(Arc::new(value) as AnyHandle)
        });
        self.insert_default(key, Binding::factory(lifetime, ctor, params))
    }

    /// Registers a factory under a different concrete key, converting the
    /// produced value via [`Into`].
    pub fn register_as<Target, Args, F>(&self, factory: F, lifetime: Lifetime) -> DiResult<()>
    where
        Target: Send + Sync + 'static,
        F: ServiceFactory<Args>,
        F::Output: Into<Target>,
    {
        let key = ServiceKey::of::<Target>();
        let params = F::parameter_specs().into_boxed_slice();
        let ctor: Ctor = Arc::new(move |ctx: &ResolverContext<'_>| {
            let value: Target = factory.invoke(ctx)?.into();
            Ok(Arc::new(Arc::new(value)) as AnyHandle)
        });
        self.insert_default(key, Binding::factory(lifetime, ctor, params))
    }

    // ----- Instance registrations -----

    /// Registers a pre-built value keyed by its type.
    ///
    /// Fails with [`DiError::TransientInstance`] for `Lifetime::Transient`:
    /// a stored value cannot satisfy a fresh-instance-per-resolve contract.
    pub fn register_instance<T>(&self, value: T, lifetime: Lifetime) -> DiResult<()>
    where
        T: Send + Sync + 'static,
    {
        let key = ServiceKey::of::<T>();
        guard_instance_lifetime(key, lifetime)?;
        self.insert_default(key, Binding::instance(lifetime, Arc::new(Arc::new(value))))
    }

    /// Registers a pre-built trait object under its trait key.
    pub fn register_instance_trait<S>(&self, value: Arc<S>, lifetime: Lifetime) -> DiResult<()>
    where
        S: ?Sized + Send + Sync + 'static,
    {
        let key = ServiceKey::of::<S>();
        guard_instance_lifetime(key, lifetime)?;
        self.insert_default(key, Binding::instance(lifetime, Arc::new(value)))
    }

    /// Registers a pre-built value under a different concrete key,
    /// converting it via [`Into`].
    pub fn register_instance_as<Target, V>(&self, value: V, lifetime: Lifetime) -> DiResult<()>
    where
        Target: Send + Sync + 'static,
        V: Into<Target>,
    {
        let key = ServiceKey::of::<Target>();
        guard_instance_lifetime(key, lifetime)?;
        let converted: Target = value.into();
        self.insert_default(key, Binding::instance(lifetime, Arc::new(Arc::new(converted))))
    }

    /// Registers a pre-built value under a name, allowing many values of
    /// one type to coexist.
    ///
    /// Named bindings participate in [`get_named`](crate::Resolver::get_named),
    /// [`get_all`](crate::Resolver::get_all), and the collection
    /// auto-assembly rules. Fails with [`DiError::EmptyName`] for an empty
    /// name and [`DiError::DuplicateNamed`] on a (name, type) collision.
    pub fn register_instance_named<T>(
        &self,
        name: impl Into<String>,
        value: T,
        lifetime: Lifetime,
    ) -> DiResult<()>
    where
        T: Send + Sync + 'static,
    {
        let key = ServiceKey::of::<T>();
        let name = name.into();
        guard_instance_lifetime(key, lifetime)?;
        guard_name(key, &name)?;
        self.insert_named(name, key, Binding::instance(lifetime, Arc::new(Arc::new(value))))
    }

    /// Registers a pre-built trait object under a name.
    pub fn register_instance_trait_named<S>(
        &self,
        name: impl Into<String>,
        value: Arc<S>,
        lifetime: Lifetime,
    ) -> DiResult<()>
    where
        S: ?Sized + Send + Sync + 'static,
    {
        let key = ServiceKey::of::<S>();
        let name = name.into();
        guard_instance_lifetime(key, lifetime)?;
        guard_name(key, &name)?;
        self.insert_named(name, key, Binding::instance(lifetime, Arc::new(value)))
    }

    /// Registers a pre-built value under a name and a different concrete
    /// key, converting it via [`Into`].
    pub fn register_instance_as_named<Target, V>(
        &self,
        name: impl Into<String>,
        value: V,
        lifetime: Lifetime,
    ) -> DiResult<()>
    where
        Target: Send + Sync + 'static,
        V: Into<Target>,
    {
        let key = ServiceKey::of::<Target>();
        let name = name.into();
        guard_instance_lifetime(key, lifetime)?;
        guard_name(key, &name)?;
        let converted: Target = value.into();
        self.insert_named(name, key, Binding::instance(lifetime, Arc::new(Arc::new(converted))))
    }

    // ----- Panicking registration variants -----

    /// [`register`](Self::register), panicking on failure.
    pub fn must_register<Args, F>(&self, factory: F, lifetime: Lifetime)
    where
        F: ServiceFactory<Args>,
    {
        if let Err(err) = self.register(factory, lifetime) {
            panic!(
                "failed to register {}: {}",
                std::any::type_name::<F::Output>(),
                err
            );
        }
    }

    /// [`register_trait`](Self::register_trait), panicking on failure.
    pub fn must_register_trait<S, Args, F>(&self, factory: F, lifetime: Lifetime)
    where
        S: ?Sized + Send + Sync + 'static,
        F: ServiceFactory<Args, Output = Arc<S>>,
    {
        if let Err(err) = self.register_trait::<S, Args, F>(factory, lifetime) {
            panic!("failed to register {}: {}", std::any::type_name::<S>(), err);
        }
    }

    /// [`register_as`](Self::register_as), panicking on failure.
    pub fn must_register_as<Target, Args, F>(&self, factory: F, lifetime: Lifetime)
    where
        Target: Send + Sync + 'static,
        F: ServiceFactory<Args>,
        F::Output: Into<Target>,
    {
        if let Err(err) = self.register_as::<Target, Args, F>(factory, lifetime) {
            panic!(
                "failed to register {}: {}",
                std::any::type_name::<Target>(),
                err
            );
        }
    }

    /// [`register_instance`](Self::register_instance), panicking on failure.
    pub fn must_register_instance<T>(&self, value: T, lifetime: Lifetime)
    where
        T: Send + Sync + 'static,
    {
        if let Err(err) = self.register_instance(value, lifetime) {
            panic!("failed to register {}: {}", std::any::type_name::<T>(), err);
        }
    }

    /// [`register_instance_trait`](Self::register_instance_trait), panicking
    /// on failure.
    pub fn must_register_instance_trait<S>(&self, value: Arc<S>, lifetime: Lifetime)
    where
        S: ?Sized + Send + Sync + 'static,
    {
        if let Err(err) = self.register_instance_trait(value, lifetime) {
            panic!("failed to register {}: {}", std::any::type_name::<S>(), err);
        }
    }

    /// [`register_instance_as`](Self::register_instance_as), panicking on
    /// failure.
    pub fn must_register_instance_as<Target, V>(&self, value: V, lifetime: Lifetime)
    where
        Target: Send + Sync + 'static,
        V: Into<Target>,
    {
        if let Err(err) = self.register_instance_as::<Target, V>(value, lifetime) {
            panic!(
                "failed to register {}: {}",
                std::any::type_name::<Target>(),
                err
            );
        }
    }

    /// [`register_instance_named`](Self::register_instance_named), panicking
    /// on failure.
    pub fn must_register_instance_named<T>(
        &self,
        name: impl Into<String>,
        value: T,
        lifetime: Lifetime,
    ) where
        T: Send + Sync + 'static,
    {
        if let Err(err) = self.register_instance_named(name, value, lifetime) {
            panic!("failed to register {}: {}", std::any::type_name::<T>(), err);
        }
    }

    /// [`register_instance_trait_named`](Self::register_instance_trait_named),
    /// panicking on failure.
    pub fn must_register_instance_trait_named<S>(
        &self,
        name: impl Into<String>,
        value: Arc<S>,
        lifetime: Lifetime,
    ) where
        S: ?Sized + Send + Sync + 'static,
    {
        if let Err(err) = self.register_instance_trait_named(name, value, lifetime) {
            panic!("failed to register {}: {}", std::any::type_name::<S>(), err);
        }
    }

    /// [`register_instance_as_named`](Self::register_instance_as_named),
    /// panicking on failure.
    pub fn must_register_instance_as_named<Target, V>(
        &self,
        name: impl Into<String>,
        value: V,
        lifetime: Lifetime,
    ) where
        Target: Send + Sync + 'static,
        V: Into<Target>,
    {
        if let Err(err) = self.register_instance_as_named::<Target, V>(name, value, lifetime) {
            panic!(
                "failed to register {}: {}",
                std::any::type_name::<Target>(),
                err
            );
        }
    }

    // ----- Scopes, observers, teardown -----

    /// Creates a scope sharing this container's registrations but owning an
    /// independent cache for scoped services.
    pub fn create_scope(&self) -> Scope {
        Scope::new(self.clone())
    }

    /// Attaches an observer notified around every resolution, including
    /// resolutions performed by this container's scopes.
    pub fn add_observer(&self, observer: Arc<dyn DiObserver>) {
        self.inner.observers.push(observer);
    }

    /// Empties the registration store, default and named tables both.
    /// Intended for test teardown; any subsequent resolve reports
    /// [`DiError::NotFound`].
    pub fn reset(&self) {
        self.inner.registry.write().unwrap().clear();
    }

    // ----- Internals shared with scopes and validation -----

    pub(crate) fn lookup(&self, key: &ServiceKey) -> Option<Arc<Binding>> {
        self.inner.registry.read().unwrap().get_default(key)
    }

    pub(crate) fn observers(&self) -> &Observers {
        &self.inner.observers
    }

    pub(crate) fn with_registry<R>(&self, f: impl FnOnce(&Registry) -> R) -> R {
        f(&self.inner.registry.read().unwrap())
    }

    fn insert_default(&self, key: ServiceKey, binding: Binding) -> DiResult<()> {
        self.inner.registry.write().unwrap().insert_default(key, binding)
    }

    fn insert_named(&self, name: String, key: ServiceKey, binding: Binding) -> DiResult<()> {
        self.inner.registry.write().unwrap().insert_named(name, key, binding)
    }

    /// Root resolution: scoped bindings are rejected outright, pre-built
    /// values short-circuit, singletons publish through their one-shot slot.
    fn resolve_default(&self, key: &ServiceKey) -> DiResult<AnyHandle> {
        let binding = self
            .lookup(key)
            .ok_or(DiError::NotFound(key.display_name()))?;
        let _guard = CycleGuard::enter(*key)?;
        if binding.lifetime == Lifetime::Scoped {
            return Err(DiError::ScopedFromRoot(key.display_name()));
        }
        match &binding.source {
            BindingSource::Instance { value } => Ok(value.clone()),
            BindingSource::Factory { .. } => {
                let ctx = ResolverContext::new(self);
                match binding.lifetime {
                    Lifetime::Singleton => binding.resolve_singleton(&ctx),
                    _ => binding.materialize(&ctx),
                }
            }
        }
    }
}

fn guard_instance_lifetime(key: ServiceKey, lifetime: Lifetime) -> DiResult<()> {
    if lifetime == Lifetime::Transient {
        return Err(DiError::TransientInstance(key.display_name()));
    }
    Ok(())
}

fn guard_name(key: ServiceKey, name: &str) -> DiResult<()> {
    if name.is_empty() {
        return Err(DiError::EmptyName(key.display_name()));
    }
    Ok(())
}

impl ResolverCore for Container {
    fn resolve_key(&self, key: &ServiceKey) -> DiResult<Arc<dyn Any + Send + Sync>> {
        let observers = &self.inner.observers;
        if observers.is_empty() {
            return self.resolve_default(key);
        }
        observers.resolving(key);
        let started = Instant::now();
        let result = self.resolve_default(key);
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
        let binding = self.inner.registry.read().unwrap().get_named(name, key);
        let binding = match binding {
            Some(binding) => binding,
            None => return Err(DiError::NotFoundNamed(key.display_name(), name.to_string())),
        };
        // Named registrations always carry pre-built values.
        match &binding.source {
            BindingSource::Instance { value } => Ok(value.clone()),
            BindingSource::Factory { .. } => {
                Err(DiError::NotFoundNamed(key.display_name(), name.to_string()))
            }
        }
    }

    fn has_default(&self, key: &ServiceKey) -> bool {
        self.inner.registry.read().unwrap().contains_default(key)
    }

    fn default_instance(&self, key: &ServiceKey) -> Option<Arc<dyn Any + Send + Sync>> {
        self.inner.registry.read().unwrap().default_instance(key)
    }

    fn named_instances(&self, key: &ServiceKey) -> Vec<(String, Arc<dyn Any + Send + Sync>)> {
        self.inner.registry.read().unwrap().named_instances(key)
    }
}
