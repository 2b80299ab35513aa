//! Resolution: `make`, `autowire`, `build` and argument assembly.

use std::any::type_name;

use crate::container::Container;
use crate::error::Error;
use crate::injectable::{Injectable, recipe};
use crate::instance::{ErasedInstance, Instance};
use crate::key::Abstract;
use crate::parameters::{Arguments, Parameters};
use crate::resolve_guard::ResolveGuard;
use crate::runtime::{Shared, read, write};
use crate::signature::{Fallback, Parameter, ParameterKind, Signature};
use crate::types::{Factory, Recipe};

#[cfg(feature = "tracing")]
use tracing::{debug, trace};

fn downcast<T: ?Sized + 'static>(key: &Abstract, object: &ErasedInstance) -> Result<Shared<T>, Error> {
    Instance::<T>::downcast(object).ok_or_else(|| Error::type_mismatch(key.name(), type_name::<T>()))
}

impl Container {
    /// Resolves the type key of `T`.
    ///
    /// Fails with `NotInstantiable` when `T` has no binding or instance;
    /// use [`autowire`](Self::autowire) for self-constructing types.
    pub fn make<T: ?Sized + 'static>(&self) -> Result<Shared<T>, Error> {
        self.make_named_with::<T>(Abstract::of::<T>(), Parameters::new())
    }

    pub fn make_with<T: ?Sized + 'static>(&self, parameters: Parameters) -> Result<Shared<T>, Error> {
        self.make_named_with::<T>(Abstract::of::<T>(), parameters)
    }

    pub fn make_named<T: ?Sized + 'static>(&self, key: impl Into<Abstract>) -> Result<Shared<T>, Error> {
        self.make_named_with::<T>(key, Parameters::new())
    }

    pub fn make_named_with<T: ?Sized + 'static>(
        &self,
        key: impl Into<Abstract>,
        parameters: Parameters,
    ) -> Result<Shared<T>, Error> {
        let key = key.into();
        let object = self.resolve_abstract(key.clone(), &parameters, None)?;
        downcast::<T>(&key, &object)
    }

    /// Resolves `C`, building it from its signature when nothing is bound.
    pub fn autowire<C: Injectable>(&self) -> Result<Shared<C>, Error> {
        self.autowire_with::<C>(Parameters::new())
    }

    pub fn autowire_with<C: Injectable>(&self, parameters: Parameters) -> Result<Shared<C>, Error> {
        let key = Abstract::of::<C>();
        let object = self.resolve_abstract(key.clone(), &parameters, Some(recipe::<C>))?;
        downcast::<C>(&key, &object)
    }

    /// Constructs `C` directly, bypassing bindings, instances and hooks.
    ///
    /// Positional overrides map onto the declared parameters in order.
    pub fn build<C: Injectable>(&self, parameters: &Parameters) -> Result<Shared<C>, Error> {
        let signature = C::signature();
        let parameters = parameters.rekey(signature.names());

        #[cfg(feature = "tracing")]
        trace!("Building {} ({} parameters)", type_name::<C>(), signature.len());

        let arguments = self.resolve_arguments(type_name::<C>(), &signature, parameters)?;
        C::construct(&arguments).map(Shared::new)
    }

    /// The resolution pipeline shared by every entry point.
    ///
    /// `recipe` is used when `key` has no binding, which is how autowiring
    /// works without a registration.
    pub(crate) fn resolve_abstract(
        &self,
        key: Abstract,
        parameters: &Parameters,
        recipe: Option<Recipe>,
    ) -> Result<ErasedInstance, Error> {
        let key = read(&self.registry).canonical(key)?;

        let cached = read(&self.registry).instances.get(&key).cloned();
        if let Some(object) = cached {
            #[cfg(feature = "tracing")]
            trace!("Using cached instance of {}", key);

            return Ok(object);
        }

        let _guard = ResolveGuard::push(self.id(), &key)?;

        let binding = read(&self.registry).bindings.get(&key).cloned();
        let (factory, shared) = match binding {
            Some(binding) => (binding.factory, binding.scope.is_shared()),
            None => match recipe {
                Some(recipe) => (Shared::new(recipe) as Factory, false),
                None => return Err(Error::not_instantiable(key.name())),
            },
        };

        #[cfg(feature = "tracing")]
        debug!(
            "Resolving {} ({})",
            key,
            if shared { "singleton" } else { "transient" }
        );

        let built = factory(self, parameters)?;
        let object = if shared {
            // Another thread may have cached one meanwhile; the first stays.
            let mut registry = write(&self.registry);
            registry.instances.entry(key.clone()).or_insert(built).clone()
        } else {
            built
        };

        self.fire_resolving_callbacks(&key, &object);
        write(&self.registry).resolved.insert(key);

        Ok(object)
    }

    fn fire_resolving_callbacks(&self, key: &Abstract, object: &ErasedInstance) {
        let callbacks = read(&self.registry).callbacks.for_resolution(key);
        if callbacks.is_empty() {
            return;
        }

        #[cfg(feature = "tracing")]
        trace!("Firing {} resolving callback(s) for {}", callbacks.len(), key);

        for callback in callbacks {
            callback(key, object, self);
        }
    }

    /// Fills every declared parameter: an override of the same name, then
    /// the container, then the declared default.
    pub(crate) fn resolve_arguments(
        &self,
        owner: &str,
        signature: &Signature,
        mut parameters: Parameters,
    ) -> Result<Arguments, Error> {
        let mut values = Vec::with_capacity(signature.len());

        for parameter in signature.parameters() {
            let value = match parameters.take(parameter.name()) {
                Some(value) => Some(value),
                None => self.resolve_parameter(owner, parameter)?,
            };
            values.push((parameter.name(), value));
        }

        Ok(Arguments::new(values, parameters.into_rest()))
    }

    fn resolve_parameter(
        &self,
        owner: &str,
        parameter: &Parameter,
    ) -> Result<Option<ErasedInstance>, Error> {
        match &parameter.kind {
            ParameterKind::Class { target, recipe } => {
                match self.resolve_abstract(target.clone(), &Parameters::new(), *recipe) {
                    Ok(object) => Ok(Some(object)),
                    Err(error) if error.kind.is_resolution_failure() && parameter.is_optional() => {
                        #[cfg(feature = "tracing")]
                        debug!(
                            "Using default for {} in {}: {}",
                            parameter.name(),
                            owner,
                            error.message
                        );

                        Ok(parameter.default_value())
                    }
                    Err(error) => Err(error),
                }
            }
            ParameterKind::Value { type_name } => match parameter.fallback {
                Fallback::Required => Err(Error::unresolvable_dependency(
                    &format!("{}: {}", parameter.name(), type_name),
                    owner,
                )),
                _ => Ok(parameter.default_value()),
            },
        }
    }
}
