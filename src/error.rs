//! Error types for the dependency injection container.

use std::fmt;

/// Dependency injection errors.
///
/// Registration-time variants (`Duplicate*`, `TransientInstance`,
/// `EmptyName`) signal caller bugs and are surfaced immediately by the
/// `register*` family. Resolution-time variants are returned by `get*` and
/// carry enough context to locate the offending type; nested failures are
/// chained through [`DiError::Dependency`].
///
/// # Examples
///
/// ```rust
/// use wirebox::{Container, DiError, Resolver};
///
/// let container = Container::new();
/// match container.get::<String>() {
///     Err(DiError::NotFound(name)) => assert_eq!(name, "alloc::string::String"),
///     other => panic!("unexpected: {:?}", other),
/// }
/// ```
#[derive(Debug, Clone)]
pub enum DiError {
    /// No default binding exists for the requested type.
    NotFound(&'static str),
    /// No named binding exists for the requested (name, type) pair.
    NotFoundNamed(&'static str, String),
    /// The stored value could not be converted to the caller's type.
    TypeMismatch(&'static str),
    /// A registration cycle was hit during recursive descent; carries the
    /// full path, ending with the repeated type.
    Circular(Vec<&'static str>),
    /// A scoped binding was resolved directly from the root container.
    ScopedFromRoot(&'static str),
    /// A default binding already exists for this type.
    Duplicate(&'static str),
    /// A named binding already exists for this (name, type) pair.
    DuplicateNamed(&'static str, String),
    /// Pre-built instances cannot promise a fresh value per resolve.
    TransientInstance(&'static str),
    /// Named registration requires a non-empty name.
    EmptyName(&'static str),
    /// Recursion depth cap hit while walking the graph.
    DepthExceeded(usize),
    /// A factory parameter failed to resolve; wraps the underlying error
    /// with the parameter's type name.
    Dependency {
        /// Type name of the parameter that failed.
        type_name: &'static str,
        /// The underlying resolution error.
        source: Box<DiError>,
    },
}

impl fmt::Display for DiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiError::NotFound(name) => write!(f, "service not registered: {}", name),
            DiError::NotFoundNamed(ty, name) => {
                write!(f, "named service not registered: {} under name {:?}", ty, name)
            }
            DiError::TypeMismatch(name) => {
                write!(f, "resolved instance cannot be converted to {}", name)
            }
            DiError::Circular(path) => {
                write!(f, "circular dependency: {}", path.join(" -> "))
            }
            DiError::ScopedFromRoot(name) => write!(
                f,
                "scoped service {} cannot be resolved from the root container; use a scope",
                name
            ),
            DiError::Duplicate(name) => write!(f, "service already registered: {}", name),
            DiError::DuplicateNamed(ty, name) => {
                write!(f, "service already registered: {} under name {:?}", ty, name)
            }
            DiError::TransientInstance(name) => write!(
                f,
                "pre-built instance of {} cannot be registered as transient",
                name
            ),
            DiError::EmptyName(name) => {
                write!(f, "named registration of {} requires a non-empty name", name)
            }
            DiError::DepthExceeded(depth) => {
                write!(f, "resolution depth cap of {} exceeded", depth)
            }
            DiError::Dependency { type_name, source } => {
                write!(f, "failed to resolve dependency {}: {}", type_name, source)
            }
        }
    }
}

impl std::error::Error for DiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DiError::Dependency { source, .. } => Some(&**source),
            _ => None,
        }
    }
}

/// Result type for DI operations.
pub type DiResult<T> = Result<T, DiError>;
