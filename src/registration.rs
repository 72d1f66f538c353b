//! Binding records and the registration store.

use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

use once_cell::sync::OnceCell;

use crate::error::{DiError, DiResult};
use crate::factory::ParameterSpec;
use crate::key::ServiceKey;
use crate::lifetime::Lifetime;
use crate::resolver::ResolverContext;

/// Type-erased service handle. The payload behind the `dyn Any` is always
/// the `Arc<T>` of the service itself, so concrete and trait-object
/// services share one retrieval path.
pub(crate) type AnyHandle = Arc<dyn Any + Send + Sync>;

/// Type-erased constructor closing over a registered factory.
pub(crate) type Ctor =
    Arc<dyn for<'a> Fn(&ResolverContext<'a>) -> DiResult<AnyHandle> + Send + Sync>;

/// How a binding produces its value.
pub(crate) enum BindingSource {
    /// Factory-backed: invoke the constructor, walking its parameters.
    Factory {
        ctor: Ctor,
        params: Box<[ParameterSpec]>,
    },
    /// Pre-built: hand out the stored value.
    Instance { value: AnyHandle },
}

/// One registration: immutable metadata plus the guarded singleton slot.
///
/// The immutable fields never change after registration. The singleton slot
/// transitions empty -> filled exactly once; the `OnceCell` serialises
/// racing first resolves so the factory runs at most once.
pub(crate) struct Binding {
    pub(crate) lifetime: Lifetime,
    pub(crate) source: BindingSource,
    singleton: OnceCell<AnyHandle>,
}

impl Binding {
    pub(crate) fn factory(lifetime: Lifetime, ctor: Ctor, params: Box<[ParameterSpec]>) -> Self {
        Self {
            lifetime,
            source: BindingSource::Factory { ctor, params },
            singleton: OnceCell::new(),
        }
    }

    pub(crate) fn instance(lifetime: Lifetime, value: AnyHandle) -> Self {
        Self {
            lifetime,
            source: BindingSource::Instance { value },
            singleton: OnceCell::new(),
        }
    }

    pub(crate) fn params(&self) -> Option<&[ParameterSpec]> {
        match &self.source {
            BindingSource::Factory { params, .. } => Some(params),
            BindingSource::Instance { .. } => None,
        }
    }

    /// Runs the factory with its parameters resolved through `ctx`.
    ///
    /// No container lock is held here; factories are free to resolve
    /// further services on the same thread.
    pub(crate) fn materialize(&self, ctx: &ResolverContext<'_>) -> DiResult<AnyHandle> {
        match &self.source {
            BindingSource::Factory { ctor, .. } => ctor(ctx),
            BindingSource::Instance { value } => Ok(value.clone()),
        }
    }

    /// Materialises at most once and publishes through the singleton slot.
    ///
    /// Errors leave the slot empty so a later resolve can retry.
    pub(crate) fn resolve_singleton(&self, ctx: &ResolverContext<'_>) -> DiResult<AnyHandle> {
        self.singleton
            .get_or_try_init(|| self.materialize(ctx))
            .map(Clone::clone)
    }
}

/// The registration store: a default table keyed by type, and a named table
/// keyed by (name, type). The two tables are logically independent; a type
/// may appear in both without conflict.
#[derive(Default)]
pub(crate) struct Registry {
    default: HashMap<ServiceKey, Arc<Binding>>,
    named: HashMap<String, HashMap<ServiceKey, Arc<Binding>>>,
}

impl Registry {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert_default(&mut self, key: ServiceKey, binding: Binding) -> DiResult<()> {
        match self.default.entry(key) {
            std::collections::hash_map::Entry::Occupied(_) => {
                Err(DiError::Duplicate(key.display_name()))
            }
            std::collections::hash_map::Entry::Vacant(slot) => {
                slot.insert(Arc::new(binding));
                Ok(())
            }
        }
    }

    pub(crate) fn insert_named(
        &mut self,
        name: String,
        key: ServiceKey,
        binding: Binding,
    ) -> DiResult<()> {
        let bucket = self.named.entry(name.clone()).or_default();
        match bucket.entry(key) {
            std::collections::hash_map::Entry::Occupied(_) => {
                Err(DiError::DuplicateNamed(key.display_name(), name))
            }
            std::collections::hash_map::Entry::Vacant(slot) => {
                slot.insert(Arc::new(binding));
                Ok(())
            }
        }
    }

    pub(crate) fn get_default(&self, key: &ServiceKey) -> Option<Arc<Binding>> {
        self.default.get(key).cloned()
    }

    pub(crate) fn get_named(&self, name: &str, key: &ServiceKey) -> Option<Arc<Binding>> {
        self.named.get(name).and_then(|bucket| bucket.get(key)).cloned()
    }

    pub(crate) fn contains_default(&self, key: &ServiceKey) -> bool {
        self.default.contains_key(key)
    }

    /// The default binding's stored value, only when it is pre-built.
    pub(crate) fn default_instance(&self, key: &ServiceKey) -> Option<AnyHandle> {
        let binding = self.default.get(key)?;
        match &binding.source {
            BindingSource::Instance { value } => Some(value.clone()),
            BindingSource::Factory { .. } => None,
        }
    }

    /// Every pre-built named binding stored under `key`, as (name, handle)
    /// pairs. Iteration order over names is unspecified; consumers must not
    /// rely on it.
    pub(crate) fn named_instances(&self, key: &ServiceKey) -> Vec<(String, AnyHandle)> {
        let mut found = Vec::new();
        for (name, bucket) in &self.named {
            if let Some(binding) = bucket.get(key) {
                if let BindingSource::Instance { value } = &binding.source {
                    found.push((name.clone(), value.clone()));
                }
            }
        }
        found
    }

    pub(crate) fn iter_default(&self) -> impl Iterator<Item = (&ServiceKey, &Arc<Binding>)> {
        self.default.iter()
    }

    pub(crate) fn clear(&mut self) {
        self.default.clear();
        self.named.clear();
    }
}
