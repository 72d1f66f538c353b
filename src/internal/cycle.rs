//! Cycle detection for recursive resolution.
//!
//! One resolve operation is a plain recursive call on the caller's thread,
//! so the set of types currently being materialised lives in a thread-local
//! stack. Entering a type already on the stack aborts the resolve with the
//! full path; the RAII guard pops on every exit path, including errors.

use std::cell::RefCell;

use crate::error::{DiError, DiResult};
use crate::key::ServiceKey;

const MAX_DEPTH: usize = 1024;

thread_local! {
    static RESOLUTION_STACK: RefCell<Vec<ServiceKey>> = RefCell::new(Vec::new());
}

/// Marks a service as in-flight for the duration of its materialisation.
pub(crate) struct CycleGuard {
    _private: (),
}

impl CycleGuard {
    pub(crate) fn enter(key: ServiceKey) -> DiResult<Self> {
        RESOLUTION_STACK.with(|stack| {
            let mut stack = stack.borrow_mut();
            if stack.iter().any(|entered| *entered == key) {
                let mut path: Vec<&'static str> =
                    stack.iter().map(|entered| entered.display_name()).collect();
                path.push(key.display_name());
                return Err(DiError::Circular(path));
            }
            if stack.len() >= MAX_DEPTH {
                return Err(DiError::DepthExceeded(MAX_DEPTH));
            }
            stack.push(key);
            Ok(CycleGuard { _private: () })
        })
    }
}

impl Drop for CycleGuard {
    fn drop(&mut self) {
        RESOLUTION_STACK.with(|stack| {
            stack.borrow_mut().pop();
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reentry_reports_full_path() {
        let a = ServiceKey::of::<u8>();
        let b = ServiceKey::of::<u16>();

        let _ga = CycleGuard::enter(a).unwrap();
        let _gb = CycleGuard::enter(b).unwrap();
        match CycleGuard::enter(a) {
            Err(DiError::Circular(path)) => {
                assert_eq!(path, vec!["u8", "u16", "u8"]);
            }
            other => panic!("expected circular error, got {:?}", other.err()),
        }
    }

    #[test]
    fn guard_pops_on_drop() {
        let key = ServiceKey::of::<u32>();
        {
            let _guard = CycleGuard::enter(key).unwrap();
        }
        let _again = CycleGuard::enter(key).unwrap();
    }
}
