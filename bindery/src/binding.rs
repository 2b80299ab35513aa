//! Binding recipes.
//!
//! A [`Binding`] pairs a factory with a [`Scope`]. Whatever the caller
//! registered (a closure, a self-built concrete type, a redirect to another
//! abstract) ends up as a factory here, so the resolver only ever invokes
//! one shape of recipe.

use crate::container::Container;
use crate::error::Error;
use crate::injectable::{Injectable, recipe};
use crate::instance::{ErasedInstance, Instance};
use crate::key::Abstract;
use crate::parameters::Parameters;
use crate::runtime::{MaybeSync, Shared};
use crate::scope::Scope;
use crate::types::{Decorator, Factory};

#[cfg(feature = "tracing")]
use tracing::trace;

/// A registered recipe for one abstract.
#[derive(Clone)]
pub struct Binding {
    pub(crate) factory: Factory,
    pub scope: Scope,
}

impl Binding {
    pub fn new(factory: Factory, scope: Scope) -> Self {
        Self { factory, scope }
    }

    pub fn is_shared(&self) -> bool {
        self.scope.is_shared()
    }

    /// Wraps the current factory so `decorator` sees every object it builds.
    pub(crate) fn decorated(&self, decorator: Decorator) -> Self {
        let inner = self.factory.clone();
        let factory: Factory = Shared::new(
            move |container: &Container,
                  parameters: &Parameters|
                  -> Result<ErasedInstance, Error> {
                let object = inner(container, parameters)?;
                decorator(object, container)
            },
        );
        Self::new(factory, self.scope)
    }
}

/// Erases a typed closure factory.
pub(crate) fn closure<T, F>(factory: F) -> Factory
where
    T: ?Sized + MaybeSync + 'static,
    F: Fn(&Container, &Parameters) -> Result<Shared<T>, Error> + MaybeSync + 'static,
{
    Shared::new(
        move |container: &Container, parameters: &Parameters| -> Result<ErasedInstance, Error> {
            factory(container, parameters).map(Instance::erase)
        },
    )
}

/// Builds `C` from its signature, every time.
pub(crate) fn concrete<C: Injectable>() -> Factory {
    Shared::new(recipe::<C>)
}

/// Builds `C` and hands it out as the abstract `A`.
pub(crate) fn upcast<A, C>(upcast: fn(Shared<C>) -> Shared<A>) -> Factory
where
    A: ?Sized + MaybeSync + 'static,
    C: Injectable,
{
    Shared::new(
        move |container: &Container, parameters: &Parameters| -> Result<ErasedInstance, Error> {
            let built = container.build::<C>(parameters)?;
            Ok(Instance::erase(upcast(built)))
        },
    )
}

/// Resolves another abstract instead (`make(concrete)`).
pub(crate) fn redirect(target: Abstract) -> Factory {
    Shared::new(
        move |container: &Container, parameters: &Parameters| -> Result<ErasedInstance, Error> {
            #[cfg(feature = "tracing")]
            trace!("Redirecting resolution to {}", target);

            container.resolve_abstract(target.clone(), parameters, None)
        },
    )
}
