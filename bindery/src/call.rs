//! Callable injection.
//!
//! [`Container::call`] accepts a declared [`Closure`], a `"Class@method"`
//! string, or a bare class name together with a default method. Methods
//! are registered up front with [`Container::method`] (target autowired) or
//! [`Container::contract_method`] (target must be bound).

use std::any::{Any, type_name};

use crate::container::Container;
use crate::error::Error;
use crate::injectable::{Injectable, recipe};
use crate::instance::{ErasedInstance, Instance};
use crate::key::Abstract;
use crate::parameters::{Arguments, Parameters};
use crate::runtime::{MaybeSync, Shared, read, write};
use crate::signature::Signature;
use crate::types::{Invoker, Recipe};

#[cfg(feature = "tracing")]
use tracing::{debug, trace};

/// A callable body with a declared parameter list.
///
/// ```
/// use bindery::{Closure, Container, Parameters, Signature};
///
/// let container = Container::new();
/// let greet = Closure::new(Signature::new().value::<String>("name"), |args| {
///     Ok(format!("hello {}", args.value::<String>("name")?))
/// });
///
/// let out: String = container
///     .call(&greet, Parameters::new().with("name", "Ada".to_string()), None)
///     .unwrap();
/// assert_eq!(out, "hello Ada");
/// ```
pub struct Closure<R> {
    signature: Signature,
    body: Box<dyn Fn(&Arguments) -> Result<R, Error>>,
}

impl<R> Closure<R> {
    pub fn new<F>(signature: Signature, body: F) -> Self
    where
        F: Fn(&Arguments) -> Result<R, Error> + 'static,
    {
        Self {
            signature,
            body: Box::new(body),
        }
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }
}

/// Something [`Container::call`] can invoke.
pub enum Callback<'a, R> {
    /// `"Class@method"`, or `"Class"` when a default method is supplied.
    Target(&'a str),
    Closure(&'a Closure<R>),
}

impl<'a, R> From<&'a str> for Callback<'a, R> {
    fn from(target: &'a str) -> Self {
        Callback::Target(target)
    }
}

impl<'a, R> From<&'a String> for Callback<'a, R> {
    fn from(target: &'a String) -> Self {
        Callback::Target(target)
    }
}

impl<'a, R> From<&'a Closure<R>> for Callback<'a, R> {
    fn from(closure: &'a Closure<R>) -> Self {
        Callback::Closure(closure)
    }
}

/// A registered `Class@method` entry.
#[derive(Clone)]
pub(crate) struct Method {
    class: Abstract,
    autowire: Option<(Abstract, Recipe)>,
    signature: Signature,
    invoke: Invoker,
}

impl Container {
    /// Registers `name` as a method of `class`.
    ///
    /// The target is whatever is bound under `class`; when nothing is, `S`
    /// is resolved under its own type key, so bindings and hooks of `S` apply.
    ///
    /// ```
    /// use bindery::{Arguments, Container, Error, Parameters, Signature};
    ///
    /// #[derive(Default)]
    /// struct Greeter;
    ///
    /// bindery::injectable!(Greeter);
    ///
    /// impl Greeter {
    ///     fn hello(&self, args: &Arguments) -> Result<String, Error> {
    ///         Ok(format!("Hello, {}", args.value::<String>("name")?))
    ///     }
    /// }
    ///
    /// let container = Container::new();
    /// container.method(
    ///     "Greeter",
    ///     "hello",
    ///     Signature::new().value::<String>("name"),
    ///     Greeter::hello,
    /// );
    ///
    /// let greeting: String = container
    ///     .call("Greeter@hello", Parameters::new().with("name", "Ada".to_string()), None)
    ///     .unwrap();
    /// assert_eq!(greeting, "Hello, Ada");
    /// ```
    pub fn method<S, R, F>(&self, class: &str, name: &str, signature: Signature, body: F)
    where
        S: Injectable,
        R: 'static,
        F: Fn(&S, &Arguments) -> Result<R, Error> + MaybeSync + 'static,
    {
        let autowire = (Abstract::of::<S>(), recipe::<S> as Recipe);
        self.register_method::<S, R, F>(class, name, Some(autowire), signature, body)
    }

    /// Like [`method`](Self::method), for targets that must be bound under `class`.
    pub fn contract_method<S, R, F>(&self, class: &str, name: &str, signature: Signature, body: F)
    where
        S: ?Sized + 'static,
        R: 'static,
        F: Fn(&S, &Arguments) -> Result<R, Error> + MaybeSync + 'static,
    {
        self.register_method::<S, R, F>(class, name, None, signature, body)
    }

    fn register_method<S, R, F>(
        &self,
        class: &str,
        name: &str,
        autowire: Option<(Abstract, Recipe)>,
        signature: Signature,
        body: F,
    ) where
        S: ?Sized + 'static,
        R: 'static,
        F: Fn(&S, &Arguments) -> Result<R, Error> + MaybeSync + 'static,
    {
        #[cfg(feature = "tracing")]
        debug!("Registering method {}@{}", class, name);

        let owner = format!("{}@{}", class, name);
        let invoke: Invoker = Shared::new(
            move |target: &ErasedInstance, arguments: &Arguments| -> Result<Box<dyn Any>, Error> {
                let target = Instance::<S>::downcast(target)
                    .ok_or_else(|| Error::type_mismatch(&owner, type_name::<S>()))?;
                let result = body(&*target, arguments)?;
                Ok(Box::new(result))
            },
        );

        let method = Method {
            class: Abstract::named(class),
            autowire,
            signature,
            invoke,
        };
        write(&self.registry)
            .methods
            .insert((Abstract::named(class), name.to_string()), method);
    }

    /// Invokes `callback`, injecting its declared parameters.
    ///
    /// Named overrides win; class dependencies come from the container;
    /// positional overrides fill the remaining plain values in order, and
    /// anything left over is available as [`Arguments::rest`].
    pub fn call<'a, R: 'static>(
        &self,
        callback: impl Into<Callback<'a, R>>,
        parameters: Parameters,
        default_method: Option<&str>,
    ) -> Result<R, Error> {
        match callback.into() {
            Callback::Closure(closure) => {
                let arguments = self.call_arguments("Closure", closure.signature(), parameters)?;
                (closure.body)(&arguments)
            }
            Callback::Target(target) => self.call_target(target, parameters, default_method),
        }
    }

    fn call_target<R: 'static>(
        &self,
        target: &str,
        parameters: Parameters,
        default_method: Option<&str>,
    ) -> Result<R, Error> {
        let (class, name) = match target.split_once('@') {
            Some((class, name)) => (class, name),
            None => match default_method {
                Some(name) => (target, name),
                None => return Err(Error::method_not_provided(target)),
            },
        };

        let method = read(&self.registry)
            .methods
            .get(&(Abstract::named(class), name.to_string()))
            .cloned()
            .ok_or_else(|| Error::method_not_registered(class, name))?;

        #[cfg(feature = "tracing")]
        trace!("Calling {}@{}", class, name);

        let owner = format!("{}@{}", class, name);
        let unbound = !self.bound(method.class.clone());
        let instance = match (method.autowire, unbound) {
            (Some((concrete, recipe)), true) => {
                self.resolve_abstract(concrete, &Parameters::new(), Some(recipe))?
            }
            (autowire, _) => self.resolve_abstract(
                method.class.clone(),
                &Parameters::new(),
                autowire.map(|(_, recipe)| recipe),
            )?,
        };
        let arguments = self.call_arguments(&owner, &method.signature, parameters)?;
        let result = (method.invoke)(&instance, &arguments)?;

        result
            .downcast::<R>()
            .map(|result| *result)
            .map_err(|_| Error::type_mismatch(&owner, type_name::<R>()))
    }

    /// Positional overrides go to plain values not already given by name.
    fn call_arguments(
        &self,
        owner: &str,
        signature: &Signature,
        parameters: Parameters,
    ) -> Result<Arguments, Error> {
        let names = signature
            .parameters()
            .iter()
            .filter(|parameter| !parameter.is_class() && !parameters.contains(parameter.name()))
            .map(|parameter| parameter.name());
        let parameters = parameters.rekey(names);
        self.resolve_arguments(owner, signature, parameters)
    }
}
