//! # wirebox
//!
//! Runtime dependency injection for Rust: register factories and pre-built
//! values under one of three lifetimes, then resolve fully-wired object
//! graphs on demand.
//!
//! ## Features
//!
//! - **Positional injection**: factory parameters *are* the dependencies;
//!   the container resolves them recursively in declaration order
//! - **Three lifetimes**: `Singleton`, `Scoped`, and `Transient`, with
//!   scoped services isolated per [`Scope`]
//! - **Trait bindings**: register and resolve `dyn Trait` services through
//!   the same key space as concrete types
//! - **Named services**: many pre-built values of one type, addressable by
//!   name
//! - **Collection auto-wiring**: a `Vec<Arc<T>>` or `HashMap<String, Arc<T>>`
//!   parameter assembles itself from the registered bindings of `T`
//! - **Cycle detection**: recursive resolution aborts with the full
//!   dependency path instead of looping
//! - **Thread-safe**: `Arc`-based sharing, readers-writer locking, and
//!   at-most-once singleton initialisation
//!
//! ## Quick Start
//!
//! ```rust
//! use wirebox::{Container, Lifetime, Resolver};
//! use std::sync::Arc;
//!
//! struct Database {
//!     connection_string: String,
//! }
//!
//! struct UserService {
//!     db: Arc<Database>,
//! }
//!
//! let container = Container::new();
//! container.must_register_instance(
//!     Database { connection_string: "postgres://localhost".to_string() },
//!     Lifetime::Singleton,
//! );
//! container.must_register(
//!     |db: Arc<Database>| UserService { db },
//!     Lifetime::Transient,
//! );
//!
//! let service = container.get_required::<UserService>();
//! assert_eq!(service.db.connection_string, "postgres://localhost");
//! ```
//!
//! ## Collection auto-wiring
//!
//! When a factory asks for a sequence or a string-keyed map of a service
//! type that is not itself registered, the container assembles the argument
//! from that type's bindings:
//!
//! ```rust
//! use wirebox::{Container, Lifetime, Resolver};
//! use std::sync::Arc;
//! use std::collections::HashMap;
//!
//! struct Database { host: String }
//! struct Router { backends: HashMap<String, Arc<Database>> }
//!
//! let container = Container::new();
//! container.must_register_instance_named(
//!     "primary", Database { host: "db1".to_string() }, Lifetime::Singleton);
//! container.must_register_instance_named(
//!     "replica", Database { host: "db2".to_string() }, Lifetime::Singleton);
//! container.must_register(
//!     |backends: HashMap<String, Arc<Database>>| Router { backends },
//!     Lifetime::Singleton,
//! );
//!
//! let router = container.get_required::<Router>();
//! assert_eq!(router.backends.len(), 2);
//! assert_eq!(router.backends["primary"].host, "db1");
//! ```
//!
//! ## Scoped services
//!
//! ```rust
//! use wirebox::{Container, Lifetime, Resolver};
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicU32, Ordering};
//!
//! struct RequestContext { id: u32 }
//!
//! static COUNTER: AtomicU32 = AtomicU32::new(0);
//!
//! let container = Container::new();
//! container.must_register(
//!     || RequestContext { id: COUNTER.fetch_add(1, Ordering::SeqCst) },
//!     Lifetime::Scoped,
//! );
//!
//! let scope1 = container.create_scope();
//! let scope2 = container.create_scope();
//!
//! let a = scope1.get_required::<RequestContext>();
//! let b = scope1.get_required::<RequestContext>();
//! let c = scope2.get_required::<RequestContext>();
//!
//! assert!(Arc::ptr_eq(&a, &b)); // one instance per scope
//! assert!(!Arc::ptr_eq(&a, &c)); // scopes are isolated
//!
//! // Scoped services never resolve from the root.
//! assert!(container.get::<RequestContext>().is_err());
//! ```

pub mod container;
pub mod error;
pub mod factory;
pub mod global;
pub mod key;
pub mod lifetime;
pub mod observer;
pub mod resolver;
pub mod scope;
pub mod validation;

mod internal;
mod registration;

pub use container::Container;
pub use error::{DiError, DiResult};
pub use factory::{Dependency, ParameterShape, ParameterSpec, ServiceFactory};
pub use key::ServiceKey;
pub use lifetime::Lifetime;
pub use observer::{DiObserver, LoggingObserver};
pub use resolver::{Resolver, ResolverContext, ResolverCore};
pub use scope::Scope;
pub use validation::{ValidationError, ValidationReport, ValidationWarning};

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn singleton_resolution_shares_one_instance() {
        let container = Container::new();
        container.must_register_instance(42usize, Lifetime::Singleton);

        let a = container.get_required::<usize>();
        let b = container.get_required::<usize>();

        assert_eq!(*a, 42);
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn transient_resolution_is_fresh() {
        let counter = Arc::new(Mutex::new(0));
        let counter_clone = counter.clone();

        let container = Container::new();
        container.must_register(
            move || {
                let mut c = counter_clone.lock().unwrap();
                *c += 1;
                format!("instance-{}", *c)
            },
            Lifetime::Transient,
        );

        let a = container.get_required::<String>();
        let b = container.get_required::<String>();

        assert_eq!(a.as_str(), "instance-1");
        assert_eq!(b.as_str(), "instance-2");
        assert!(!Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn trait_registration_resolves_through_dyn_key() {
        trait Speaker: Send + Sync {
            fn speak(&self) -> &'static str;
        }

        struct Dog;
        impl Speaker for Dog {
            fn speak(&self) -> &'static str {
                "woof"
            }
        }

        let container = Container::new();
        container.must_register_instance_trait::<dyn Speaker>(Arc::new(Dog), Lifetime::Singleton);

        let speaker = container.get_required::<dyn Speaker>();
        assert_eq!(speaker.speak(), "woof");
    }

    #[test]
    fn duplicate_registration_is_rejected() {
        let container = Container::new();
        container.must_register_instance(1u8, Lifetime::Singleton);

        assert!(matches!(
            container.register_instance(2u8, Lifetime::Singleton),
            Err(DiError::Duplicate(_))
        ));
    }
}
