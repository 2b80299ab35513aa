//! Abstract identifiers.
//!
//! Services are registered and resolved under an [`Abstract`]: either a type
//! key derived from a Rust type, or a free-form name. A [`Target`] is an
//! abstract plus an optional alias registered alongside it.

use std::any::TypeId;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Identifier a binding, instance or alias is stored under.
///
/// ```
/// use bindery::Abstract;
///
/// trait Mailer {}
///
/// assert_eq!(Abstract::of::<dyn Mailer>(), Abstract::of::<dyn Mailer>());
/// assert_ne!(Abstract::of::<dyn Mailer>(), Abstract::named("mailer"));
/// assert_eq!(Abstract::from("mailer").name(), "mailer");
/// ```
#[derive(Debug, Clone)]
pub enum Abstract {
    /// Keyed by a Rust type; `name` is only used for diagnostics.
    Type { id: TypeId, name: &'static str },
    Named(String),
}

impl Abstract {
    pub fn of<T: ?Sized + 'static>() -> Self {
        Abstract::Type {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    pub fn named(name: impl Into<String>) -> Self {
        Abstract::Named(name.into())
    }

    pub fn name(&self) -> &str {
        match self {
            Abstract::Type { name, .. } => name,
            Abstract::Named(name) => name,
        }
    }
}

impl PartialEq for Abstract {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Abstract::Type { id: a, .. }, Abstract::Type { id: b, .. }) => a == b,
            (Abstract::Named(a), Abstract::Named(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Abstract {}

impl Hash for Abstract {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            Abstract::Type { id, .. } => {
                0u8.hash(state);
                id.hash(state);
            }
            Abstract::Named(name) => {
                1u8.hash(state);
                name.hash(state);
            }
        }
    }
}

impl fmt::Display for Abstract {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl From<&str> for Abstract {
    fn from(name: &str) -> Self {
        Abstract::named(name)
    }
}

impl From<String> for Abstract {
    fn from(name: String) -> Self {
        Abstract::Named(name)
    }
}

impl From<&Abstract> for Abstract {
    fn from(key: &Abstract) -> Self {
        key.clone()
    }
}

/// Registration target: the abstract to bind plus an optional alias for it.
///
/// ```
/// use bindery::Target;
///
/// let target = Target::from(("mail.smtp", "mailer"));
/// assert_eq!(target.key.name(), "mail.smtp");
/// assert_eq!(target.alias.map(|a| a.to_string()), Some("mailer".to_string()));
/// ```
#[derive(Debug, Clone)]
pub struct Target {
    pub key: Abstract,
    pub alias: Option<Abstract>,
}

impl From<Abstract> for Target {
    fn from(key: Abstract) -> Self {
        Self { key, alias: None }
    }
}

impl From<&str> for Target {
    fn from(name: &str) -> Self {
        Abstract::named(name).into()
    }
}

impl From<String> for Target {
    fn from(name: String) -> Self {
        Abstract::Named(name).into()
    }
}

impl From<(&str, &str)> for Target {
    fn from((key, alias): (&str, &str)) -> Self {
        Self {
            key: Abstract::named(key),
            alias: Some(Abstract::named(alias)),
        }
    }
}

impl From<(Abstract, &str)> for Target {
    fn from((key, alias): (Abstract, &str)) -> Self {
        Self {
            key,
            alias: Some(Abstract::named(alias)),
        }
    }
}
