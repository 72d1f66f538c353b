//! Diagnostic observers for resolution traceability.
//!
//! Observers receive hooks around every resolution the container or one of
//! its scopes performs. They are meant for structured tracing and debugging;
//! keep implementations lightweight, the calls run synchronously on the
//! resolving thread.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Duration;

use crate::error::DiError;
use crate::key::ServiceKey;

/// Observer of resolution events.
///
/// # Examples
///
/// ```rust
/// use wirebox::{Container, DiObserver, Lifetime, Resolver, ServiceKey};
/// use std::sync::{Arc, Mutex};
/// use std::time::Duration;
///
/// #[derive(Default)]
/// struct Recorder {
///     seen: Mutex<Vec<&'static str>>,
/// }
///
/// impl DiObserver for Recorder {
///     fn resolving(&self, key: &ServiceKey) {
///         self.seen.lock().unwrap().push(key.display_name());
///     }
///     fn resolved(&self, _key: &ServiceKey, _elapsed: Duration) {}
///     fn failed(&self, _key: &ServiceKey, _error: &wirebox::DiError) {}
/// }
///
/// let container = Container::new();
/// let recorder = Arc::new(Recorder::default());
/// container.add_observer(recorder.clone());
///
/// container.must_register_instance(5u32, Lifetime::Singleton);
/// let _ = container.get_required::<u32>();
///
/// assert_eq!(recorder.seen.lock().unwrap().as_slice(), &["u32"]);
/// ```
pub trait DiObserver: Send + Sync {
    /// A resolution is starting for `key`.
    fn resolving(&self, key: &ServiceKey);

    /// The resolution for `key` completed successfully.
    fn resolved(&self, key: &ServiceKey, elapsed: Duration);

    /// The resolution for `key` failed.
    fn failed(&self, key: &ServiceKey, error: &DiError);
}

/// Observer printing each event to stdout, prefixed with a label.
pub struct LoggingObserver {
    prefix: String,
}

impl LoggingObserver {
    /// Creates an observer tagging its output with `prefix`.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }
}

impl DiObserver for LoggingObserver {
    fn resolving(&self, key: &ServiceKey) {
        println!("[{}] resolving {}", self.prefix, key.display_name());
    }

    fn resolved(&self, key: &ServiceKey, elapsed: Duration) {
        println!(
            "[{}] resolved {} in {:?}",
            self.prefix,
            key.display_name(),
            elapsed
        );
    }

    fn failed(&self, key: &ServiceKey, error: &DiError) {
        println!("[{}] failed {}: {}", self.prefix, key.display_name(), error);
    }
}

/// Registered observers, with a lock-free emptiness check for the hot path.
#[derive(Default)]
pub(crate) struct Observers {
    list: RwLock<Vec<Arc<dyn DiObserver>>>,
    active: AtomicBool,
}

impl Observers {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub(crate) fn is_empty(&self) -> bool {
        !self.active.load(Ordering::Relaxed)
    }

    pub(crate) fn push(&self, observer: Arc<dyn DiObserver>) {
        self.list.write().unwrap().push(observer);
        self.active.store(true, Ordering::Relaxed);
    }

    pub(crate) fn resolving(&self, key: &ServiceKey) {
        for observer in self.list.read().unwrap().iter() {
            observer.resolving(key);
        }
    }

    pub(crate) fn resolved(&self, key: &ServiceKey, elapsed: Duration) {
        for observer in self.list.read().unwrap().iter() {
            observer.resolved(key, elapsed);
        }
    }

    pub(crate) fn failed(&self, key: &ServiceKey, error: &DiError) {
        for observer in self.list.read().unwrap().iter() {
            observer.failed(key, error);
        }
    }
}
