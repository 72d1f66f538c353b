//! Service lifetime definitions.

/// Service lifetimes controlling how resolved instances are cached and shared.
///
/// Every registration carries a lifetime. The lifetime, together with the
/// resolver used (root container or scope), fully determines the identity of
/// the values a resolve returns; the caller's requested type never does.
///
/// # Examples
///
/// ```rust
/// use wirebox::{Container, Lifetime, Resolver};
/// use std::sync::Arc;
///
/// struct Database { url: String }
/// struct Session { id: u64 }
/// struct Audit;
///
/// let container = Container::new();
///
/// // Singleton: one instance for the whole process.
/// container.must_register(|| Database { url: "postgres://localhost".to_string() },
///     Lifetime::Singleton);
///
/// // Scoped: one instance per scope, never resolvable from the root.
/// container.must_register(|| Session { id: 7 }, Lifetime::Scoped);
///
/// // Transient: a fresh instance on every resolve.
/// container.must_register(|| Audit, Lifetime::Transient);
///
/// let db1 = container.get_required::<Database>();
/// let db2 = container.get_required::<Database>();
/// assert!(Arc::ptr_eq(&db1, &db2));
///
/// let scope = container.create_scope();
/// let s1 = scope.get_required::<Session>();
/// let s2 = scope.get_required::<Session>();
/// assert!(Arc::ptr_eq(&s1, &s2));
///
/// let a1 = container.get_required::<Audit>();
/// let a2 = container.get_required::<Audit>();
/// assert!(!Arc::ptr_eq(&a1, &a2));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Lifetime {
    /// New instance per resolution, never cached.
    Transient,
    /// Single instance process-wide, created lazily on first resolve and
    /// shared by the root container and every scope.
    Singleton,
    /// Single instance per scope; distinct scopes hold distinct values.
    ///
    /// Resolving a scoped service directly from the root container is an
    /// error ([`DiError::ScopedFromRoot`](crate::DiError::ScopedFromRoot)).
    Scoped,
}
