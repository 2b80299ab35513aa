//! Declared parameter lists.
//!
//! Rust has no runtime reflection over constructor parameters, so every
//! injectable type and every callable states its parameters up front. The
//! resolver walks a [`Signature`] in declaration order exactly as it would
//! walk reflected parameters: override by name, then the container for
//! class dependencies, then the declared default.

use crate::injectable::{Injectable, recipe};
use crate::instance::{ErasedInstance, Instance};
use crate::key::Abstract;
use crate::runtime::{MaybeSync, Shared};
use crate::types::Recipe;

#[derive(Clone)]
pub(crate) enum ParameterKind {
    /// Resolved through the container; `recipe` allows building an unbound target.
    Class {
        target: Abstract,
        recipe: Option<Recipe>,
    },
    /// A plain value; only overrides and defaults can satisfy it.
    Value { type_name: &'static str },
}

#[derive(Clone)]
pub(crate) enum Fallback {
    Required,
    Null,
    Value(ErasedInstance),
}

/// One declared parameter.
#[derive(Clone)]
pub struct Parameter {
    pub(crate) name: &'static str,
    pub(crate) kind: ParameterKind,
    pub(crate) fallback: Fallback,
}

impl Parameter {
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn is_optional(&self) -> bool {
        !matches!(self.fallback, Fallback::Required)
    }

    pub fn is_class(&self) -> bool {
        matches!(self.kind, ParameterKind::Class { .. })
    }

    pub(crate) fn default_value(&self) -> Option<ErasedInstance> {
        match &self.fallback {
            Fallback::Value(value) => Some(value.clone()),
            Fallback::Required | Fallback::Null => None,
        }
    }
}

/// Ordered parameter list of a constructor or callable.
///
/// ```
/// use bindery::Signature;
///
/// trait Mailer {}
///
/// let signature = Signature::new()
///     .service::<dyn Mailer>("mailer")
///     .value::<String>("subject")
///     .value_or("retries", 3u32);
///
/// assert_eq!(signature.names().collect::<Vec<_>>(), ["mailer", "subject", "retries"]);
/// ```
#[derive(Clone, Default)]
pub struct Signature {
    parameters: Vec<Parameter>,
}

impl Signature {
    pub fn new() -> Self {
        Self::default()
    }

    /// A required dependency resolved under the type key of `T`.
    pub fn service<T>(self, name: &'static str) -> Self
    where
        T: ?Sized + 'static,
    {
        self.class(name, Abstract::of::<T>(), None, Fallback::Required)
    }

    /// A required dependency resolved under an explicit id.
    pub fn service_named(self, name: &'static str, target: impl Into<Abstract>) -> Self {
        self.class(name, target.into(), None, Fallback::Required)
    }

    /// A required dependency that is built on the spot when nothing is bound for it.
    pub fn injectable<T: Injectable>(self, name: &'static str) -> Self {
        self.class(name, Abstract::of::<T>(), Some(recipe::<T>), Fallback::Required)
    }

    /// A dependency that falls back to `None` when it cannot be resolved.
    pub fn optional<T>(self, name: &'static str) -> Self
    where
        T: ?Sized + 'static,
    {
        self.class(name, Abstract::of::<T>(), None, Fallback::Null)
    }

    /// A dependency with a fallback object used when resolution fails.
    pub fn service_or<T>(self, name: &'static str, default: Shared<T>) -> Self
    where
        T: ?Sized + MaybeSync + 'static,
    {
        let fallback = Fallback::Value(Instance::erase(default));
        self.class(name, Abstract::of::<T>(), None, fallback)
    }

    /// A required plain value, satisfiable only through overrides.
    pub fn value<T: 'static>(mut self, name: &'static str) -> Self {
        self.parameters.push(Parameter {
            name,
            kind: ParameterKind::Value {
                type_name: std::any::type_name::<T>(),
            },
            fallback: Fallback::Required,
        });
        self
    }

    /// A plain value with a default.
    pub fn value_or<T>(mut self, name: &'static str, default: T) -> Self
    where
        T: MaybeSync + 'static,
    {
        self.parameters.push(Parameter {
            name,
            kind: ParameterKind::Value {
                type_name: std::any::type_name::<T>(),
            },
            fallback: Fallback::Value(Instance::erase(Shared::new(default))),
        });
        self
    }

    fn class(
        mut self,
        name: &'static str,
        target: Abstract,
        recipe: Option<Recipe>,
        fallback: Fallback,
    ) -> Self {
        self.parameters.push(Parameter {
            name,
            kind: ParameterKind::Class { target, recipe },
            fallback,
        });
        self
    }

    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.parameters.iter().map(|parameter| parameter.name)
    }

    pub fn len(&self) -> usize {
        self.parameters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty()
    }
}
