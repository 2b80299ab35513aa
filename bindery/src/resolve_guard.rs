//! Thread-local stack guard for circular dependency detection.
//!
//! [`ResolveGuard`] tracks the chain of abstracts being resolved on the
//! current thread. Entries are tagged with the owning container so two
//! containers resolving the same id never trip over each other.
//!
//! # Example
//! ```
//! use bindery::{Abstract, ErrorKind, ResolveGuard};
//!
//! let _a = ResolveGuard::push(1, &Abstract::named("a")).unwrap();
//! let _b = ResolveGuard::push(1, &Abstract::named("b")).unwrap();
//! let err = ResolveGuard::push(1, &Abstract::named("a")).unwrap_err();
//! assert_eq!(err.kind, ErrorKind::CircularDependency);
//! ```

use std::cell::RefCell;

use crate::error::Error;
use crate::key::Abstract;

thread_local! {
    static RESOLVE_STACK: RefCell<Vec<(usize, Abstract)>> = const { RefCell::new(Vec::new()) };
}

/// Guard that pops its entry from the thread-local stack on drop.
#[derive(Debug)]
pub struct ResolveGuard {
    pub key: Abstract,
}

impl ResolveGuard {
    /// Pushes `key` for the container identified by `owner`.
    ///
    /// Returns `Err(Error::circular_dependency(..))` if the pair is already on the stack.
    pub fn push(owner: usize, key: &Abstract) -> Result<Self, Error> {
        RESOLVE_STACK.with(|stack| {
            let mut stack = stack.borrow_mut();
            if stack.iter().any(|(o, k)| *o == owner && k == key) {
                let mut chain: Vec<&str> = stack
                    .iter()
                    .filter(|(o, _)| *o == owner)
                    .map(|(_, k)| k.name())
                    .collect();
                chain.push(key.name());
                return Err(Error::circular_dependency(&chain));
            }
            stack.push((owner, key.clone()));
            Ok(ResolveGuard { key: key.clone() })
        })
    }
}

impl Drop for ResolveGuard {
    fn drop(&mut self) {
        RESOLVE_STACK.with(|stack| {
            stack.borrow_mut().pop();
        });
    }
}
