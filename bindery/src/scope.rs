use std::fmt;

/// Lifecycle of a binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// A fresh object on every resolution.
    Transient,
    /// Built once, then served from the instance cache.
    Singleton,
}

impl Scope {
    pub fn is_shared(self) -> bool {
        matches!(self, Scope::Singleton)
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scope::Transient => f.write_str("transient"),
            Scope::Singleton => f.write_str("singleton"),
        }
    }
}
