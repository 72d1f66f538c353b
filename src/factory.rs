//! Factory signatures and per-parameter dependency resolution.
//!
//! A registered factory is any `Fn` whose parameters all implement
//! [`Dependency`] and whose single return value is the service being
//! produced. The parameter list is lifted into [`ParameterSpec`] metadata at
//! registration and each parameter resolves itself against the active
//! resolver when the factory runs, in declaration order.

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{DiError, DiResult};
use crate::key::ServiceKey;
use crate::resolver::{Resolver, ResolverContext, ResolverCore};

/// Shape of one factory parameter, recorded per binding for diagnostics and
/// graph validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParameterSpec {
    /// Key of the parameter type exactly as declared.
    pub key: ServiceKey,
    /// Structural shape driving the walker's dispatch.
    pub shape: ParameterShape,
}

/// Structural classification of a factory parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterShape {
    /// An ordinary service handle, resolved recursively.
    Plain,
    /// `Vec<Arc<E>>`: assembled from the element type's bindings when the
    /// sequence type itself is not registered.
    Sequence {
        /// Key of the element type `E`.
        element: ServiceKey,
    },
    /// `HashMap<String, Arc<V>>`: assembled from the value type's named
    /// bindings when the map type itself is not registered.
    Mapping {
        /// Key of the value type `V`.
        value: ServiceKey,
    },
}

/// A type that can appear as a factory parameter.
///
/// Implementations exist for `Arc<T>` (plain services, including trait
/// objects), `Vec<Arc<T>>` (sequence auto-collection), and
/// `HashMap<String, Arc<T>>` (named-map auto-collection). Custom
/// implementations are possible for bespoke injection shapes.
pub trait Dependency: Sized + Send + Sync + 'static {
    /// The parameter's key and shape, as seen by the walker.
    fn parameter_spec() -> ParameterSpec;

    /// Produces the argument from the active resolver.
    fn resolve(ctx: &ResolverContext<'_>) -> DiResult<Self>;
}

impl<T: ?Sized + Send + Sync + 'static> Dependency for Arc<T> {
    fn parameter_spec() -> ParameterSpec {
        ParameterSpec {
            key: ServiceKey::of::<T>(),
            shape: ParameterShape::Plain,
        }
    }

    fn resolve(ctx: &ResolverContext<'_>) -> DiResult<Self> {
        ctx.get::<T>()
    }
}

/// Sequence auto-collection.
///
/// When `Vec<Arc<T>>` itself has a default binding, the sequence resolves as
/// an ordinary service. Otherwise the argument is assembled in place: the
/// default binding of `T` first (skipped if it fails to resolve in the
/// current context), then every pre-built named binding of `T`, in
/// unspecified name order. The result may be empty.
impl<T: ?Sized + Send + Sync + 'static> Dependency for Vec<Arc<T>> {
    fn parameter_spec() -> ParameterSpec {
        ParameterSpec {
            key: ServiceKey::of::<Vec<Arc<T>>>(),
            shape: ParameterShape::Sequence {
                element: ServiceKey::of::<T>(),
            },
        }
    }

    fn resolve(ctx: &ResolverContext<'_>) -> DiResult<Self> {
        let own_key = ServiceKey::of::<Vec<Arc<T>>>();
        if ctx.has_default(&own_key) {
            let whole = ctx.get::<Vec<Arc<T>>>()?;
            return Ok(Vec::clone(&whole));
        }

        let element = ServiceKey::of::<T>();
        let mut items = Vec::new();
        if ctx.has_default(&element) {
            // A default element that does not resolve here (e.g. a scoped
            // binding reached from the root) is omitted, not fatal.
            if let Ok(item) = ctx.get::<T>() {
                items.push(item);
            }
        }
        for (_, handle) in ctx.named_instances(&element) {
            if let Some(item) = handle.downcast_ref::<Arc<T>>() {
                items.push(item.clone());
            }
        }
        Ok(items)
    }
}

/// Named-map auto-collection.
///
/// When `HashMap<String, Arc<T>>` itself has a default binding, the map
/// resolves as an ordinary service. Otherwise every pre-built named binding
/// of `T` is inserted under its registration name; the default binding of
/// `T` is not included. The result may be empty.
impl<T: ?Sized + Send + Sync + 'static> Dependency for HashMap<String, Arc<T>> {
    fn parameter_spec() -> ParameterSpec {
        ParameterSpec {
            key: ServiceKey::of::<HashMap<String, Arc<T>>>(),
            shape: ParameterShape::Mapping {
                value: ServiceKey::of::<T>(),
            },
        }
    }

    fn resolve(ctx: &ResolverContext<'_>) -> DiResult<Self> {
        let own_key = ServiceKey::of::<HashMap<String, Arc<T>>>();
        if ctx.has_default(&own_key) {
            let whole = ctx.get::<HashMap<String, Arc<T>>>()?;
            return Ok(HashMap::clone(&whole));
        }

        let value = ServiceKey::of::<T>();
        let mut entries = HashMap::new();
        for (name, handle) in ctx.named_instances(&value) {
            if let Some(item) = handle.downcast_ref::<Arc<T>>() {
                entries.insert(name, item.clone());
            }
        }
        Ok(entries)
    }
}

/// A registered service factory.
///
/// Implemented for every `Fn` of up to eight parameters where each parameter
/// implements [`Dependency`]. `Args` is the parameter tuple; it pins the
/// blanket implementation to the closure's signature.
pub trait ServiceFactory<Args>: Send + Sync + 'static {
    /// The produced service type.
    type Output: Send + Sync + 'static;

    /// Ordered parameter metadata for this factory's signature.
    fn parameter_specs() -> Vec<ParameterSpec>;

    /// Resolves the parameters in order and invokes the factory.
    fn invoke(&self, ctx: &ResolverContext<'_>) -> DiResult<Self::Output>;
}

macro_rules! impl_service_factory {
    ($($param:ident),*) => {
        #[allow(non_snake_case)]
        impl<Func, Out, $($param,)*> ServiceFactory<($($param,)*)> for Func
        where
            Func: Fn($($param),*) -> Out + Send + Sync + 'static,
            Out: Send + Sync + 'static,
            $($param: Dependency,)*
        {
            type Output = Out;

            fn parameter_specs() -> Vec<ParameterSpec> {
                vec![$($param::parameter_spec()),*]
            }

            fn invoke(&self, ctx: &ResolverContext<'_>) -> DiResult<Self::Output> {
                $(
                    let $param = $param::resolve(ctx).map_err(|err| DiError::Dependency {
                        type_name: $param::parameter_spec().key.display_name(),
                        source: Box::new(err),
                    })?;
                )*
                let _ = ctx;
                Ok((self)($($param),*))
            }
        }
    };
}

impl_service_factory!();
impl_service_factory!(P1);
impl_service_factory!(P1, P2);
impl_service_factory!(P1, P2, P3);
impl_service_factory!(P1, P2, P3, P4);
impl_service_factory!(P1, P2, P3, P4, P5);
impl_service_factory!(P1, P2, P3, P4, P5, P6);
impl_service_factory!(P1, P2, P3, P4, P5, P6, P7);
impl_service_factory!(P1, P2, P3, P4, P5, P6, P7, P8);
