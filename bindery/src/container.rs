//! The service container.
//!
//! Public API:
//! - `bind` / `singleton` (+ `_if`, `_named`, `_self`, `_as`, `_to` variants): register recipes
//! - `instance` / `instance_named`: register a ready-made shared object
//! - `alias`: register an alternative id for an abstract
//! - `make` / `autowire` / `build` / `call`: resolve (see the resolver and call modules)
//! - `extend`: decorate an existing recipe or cached instance
//! - `resolving` / `after_resolving` / `rebinding` / `refresh`: lifecycle hooks
//! - `bound` / `resolved` / `is_alias` / `is_shared`: introspection
//!
//! Registration returns `Result` because replacing a recipe that was already
//! resolved immediately resolves the new one for the rebinding hooks.
//!
//! No borrow of the registry is held while factories, decorators or hooks
//! run, so all of them may call back into the container.

use std::collections::{HashMap, HashSet};

use crate::binding::{self, Binding};
use crate::call::Method;
use crate::callbacks::{self, Callbacks};
use crate::error::Error;
use crate::injectable::Injectable;
use crate::instance::{ErasedInstance, Instance};
use crate::key::{Abstract, Target};
use crate::parameters::Parameters;
use crate::runtime::{MaybeSync, Shared, Store, read, write};
use crate::scope::Scope;
use crate::types::{Decorator, Factory, ResolvingCallback};

#[cfg(feature = "tracing")]
use tracing::{debug, trace};

/// Everything the container owns, behind a single lock.
#[derive(Default)]
pub(crate) struct Registry {
    pub(crate) bindings: HashMap<Abstract, Binding>,
    pub(crate) instances: HashMap<Abstract, ErasedInstance>,
    pub(crate) aliases: HashMap<Abstract, Abstract>,
    pub(crate) resolved: HashSet<Abstract>,
    pub(crate) callbacks: Callbacks,
    pub(crate) methods: HashMap<(Abstract, String), Method>,
}

impl Registry {
    /// Follows the alias chain starting at `key`.
    pub(crate) fn canonical(&self, key: Abstract) -> Result<Abstract, Error> {
        self.follow_aliases(key).map_err(|seen| {
            let chain: Vec<&str> = seen.iter().map(Abstract::name).collect();
            Error::circular_dependency(&chain)
        })
    }

    /// Like [`canonical`](Self::canonical), but a cyclic chain leaves `key`
    /// as it is. Cycles surface when the id is resolved.
    fn canonical_or_self(&self, key: Abstract) -> Abstract {
        self.follow_aliases(key.clone()).unwrap_or(key)
    }

    /// The end of the alias chain, or the ids visited when it loops.
    fn follow_aliases(&self, key: Abstract) -> Result<Abstract, Vec<Abstract>> {
        let mut current = key;
        let mut seen: Vec<Abstract> = Vec::new();

        while let Some(next) = self.aliases.get(&current) {
            if seen.contains(&current) {
                seen.push(current);
                return Err(seen);
            }
            seen.push(current);
            current = next.clone();
        }

        Ok(current)
    }

    fn is_bound(&self, key: &Abstract) -> bool {
        self.bindings.contains_key(key)
            || self.instances.contains_key(key)
            || self.aliases.contains_key(key)
    }

    fn is_resolved(&self, key: &Abstract) -> bool {
        self.resolved.contains(key) || self.instances.contains_key(key)
    }

    fn drop_stale_instances(&mut self, key: &Abstract) {
        self.instances.remove(key);
        self.aliases.remove(key);
    }
}

/// The service container.
pub struct Container {
    pub(crate) registry: Store<Registry>,
}

#[cfg(feature = "debug")]
impl std::fmt::Debug for Container {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let registry = read(&self.registry);
        f.debug_struct("Container")
            .field("bindings", &registry.bindings.len())
            .field("instances", &registry.instances.len())
            .field("aliases", &registry.aliases.len())
            .field("resolved", &registry.resolved.len())
            .field("callbacks", &registry.callbacks.len())
            .field("methods", &registry.methods.len())
            .finish()
    }
}

impl Default for Container {
    fn default() -> Self {
        Self::new()
    }
}

impl Container {
    pub fn new() -> Self {
        Self {
            registry: Store::new(Registry::default()),
        }
    }

    /// Identity used to scope the per-thread resolving stack.
    /// The id `key` resolves to after following aliases.
    pub(crate) fn canonical(&self, key: Abstract) -> Result<Abstract, Error> {
        read(&self.registry).canonical(key)
    }

    pub(crate) fn id(&self) -> usize {
        self as *const Self as usize
    }

    // ------------------------------------------------------------------
    // Registration
    // ------------------------------------------------------------------

    /// Registers a transient factory under the type key of `T`.
    ///
    /// ```
    /// use bindery::{Container, Shared};
    ///
    /// trait Mailer: Send + Sync {
    ///     fn transport(&self) -> &'static str;
    /// }
    ///
    /// struct Smtp;
    ///
    /// impl Mailer for Smtp {
    ///     fn transport(&self) -> &'static str {
    ///         "smtp"
    ///     }
    /// }
    ///
    /// let container = Container::new();
    /// container
    ///     .bind::<dyn Mailer, _>(|_, _| Ok(Shared::new(Smtp) as Shared<dyn Mailer>))
    ///     .unwrap();
    ///
    /// let first = container.make::<dyn Mailer>().unwrap();
    /// let second = container.make::<dyn Mailer>().unwrap();
    /// assert_eq!(first.transport(), "smtp");
    /// assert!(!Shared::ptr_eq(&first, &second));
    /// ```
    pub fn bind<T, F>(&self, factory: F) -> Result<(), Error>
    where
        T: ?Sized + MaybeSync + 'static,
        F: Fn(&Container, &Parameters) -> Result<Shared<T>, Error> + MaybeSync + 'static,
    {
        self.register(
            Abstract::of::<T>().into(),
            binding::closure(factory),
            Scope::Transient,
        )
    }

    /// Registers a shared factory under the type key of `T`.
    pub fn singleton<T, F>(&self, factory: F) -> Result<(), Error>
    where
        T: ?Sized + MaybeSync + 'static,
        F: Fn(&Container, &Parameters) -> Result<Shared<T>, Error> + MaybeSync + 'static,
    {
        self.register(
            Abstract::of::<T>().into(),
            binding::closure(factory),
            Scope::Singleton,
        )
    }

    /// Like [`bind`](Self::bind), but leaves an existing registration alone.
    pub fn bind_if<T, F>(&self, factory: F) -> Result<(), Error>
    where
        T: ?Sized + MaybeSync + 'static,
        F: Fn(&Container, &Parameters) -> Result<Shared<T>, Error> + MaybeSync + 'static,
    {
        self.register_if(
            Abstract::of::<T>().into(),
            binding::closure(factory),
            Scope::Transient,
        )
    }

    pub fn singleton_if<T, F>(&self, factory: F) -> Result<(), Error>
    where
        T: ?Sized + MaybeSync + 'static,
        F: Fn(&Container, &Parameters) -> Result<Shared<T>, Error> + MaybeSync + 'static,
    {
        self.register_if(
            Abstract::of::<T>().into(),
            binding::closure(factory),
            Scope::Singleton,
        )
    }

    /// Registers a transient factory under an explicit id, optionally with an alias.
    pub fn bind_named<T, F>(&self, target: impl Into<Target>, factory: F) -> Result<(), Error>
    where
        T: ?Sized + MaybeSync + 'static,
        F: Fn(&Container, &Parameters) -> Result<Shared<T>, Error> + MaybeSync + 'static,
    {
        self.register(target.into(), binding::closure(factory), Scope::Transient)
    }

    pub fn singleton_named<T, F>(&self, target: impl Into<Target>, factory: F) -> Result<(), Error>
    where
        T: ?Sized + MaybeSync + 'static,
        F: Fn(&Container, &Parameters) -> Result<Shared<T>, Error> + MaybeSync + 'static,
    {
        self.register(target.into(), binding::closure(factory), Scope::Singleton)
    }

    pub fn bind_named_if<T, F>(&self, target: impl Into<Target>, factory: F) -> Result<(), Error>
    where
        T: ?Sized + MaybeSync + 'static,
        F: Fn(&Container, &Parameters) -> Result<Shared<T>, Error> + MaybeSync + 'static,
    {
        self.register_if(target.into(), binding::closure(factory), Scope::Transient)
    }

    /// Binds `C` to its own constructor.
    pub fn bind_self<C: Injectable>(&self) -> Result<(), Error> {
        self.register(
            Abstract::of::<C>().into(),
            binding::concrete::<C>(),
            Scope::Transient,
        )
    }

    pub fn singleton_self<C: Injectable>(&self) -> Result<(), Error> {
        self.register(
            Abstract::of::<C>().into(),
            binding::concrete::<C>(),
            Scope::Singleton,
        )
    }

    /// Binds the abstract `A` to the autowired concrete `C`.
    ///
    /// `upcast` turns the built concrete into the abstract, e.g.
    /// `|smtp| smtp as Shared<dyn Mailer>`.
    pub fn bind_as<A, C>(&self, upcast: fn(Shared<C>) -> Shared<A>) -> Result<(), Error>
    where
        A: ?Sized + MaybeSync + 'static,
        C: Injectable,
    {
        self.register(
            Abstract::of::<A>().into(),
            binding::upcast(upcast),
            Scope::Transient,
        )
    }

    pub fn singleton_as<A, C>(&self, upcast: fn(Shared<C>) -> Shared<A>) -> Result<(), Error>
    where
        A: ?Sized + MaybeSync + 'static,
        C: Injectable,
    {
        self.register(
            Abstract::of::<A>().into(),
            binding::upcast(upcast),
            Scope::Singleton,
        )
    }

    /// Resolves `target` by resolving `concrete` instead.
    pub fn bind_to(
        &self,
        target: impl Into<Target>,
        concrete: impl Into<Abstract>,
    ) -> Result<(), Error> {
        self.register(
            target.into(),
            binding::redirect(concrete.into()),
            Scope::Transient,
        )
    }

    pub fn singleton_to(
        &self,
        target: impl Into<Target>,
        concrete: impl Into<Abstract>,
    ) -> Result<(), Error> {
        self.register(
            target.into(),
            binding::redirect(concrete.into()),
            Scope::Singleton,
        )
    }

    /// Registers an existing object as the shared instance of `T`.
    pub fn instance<T>(&self, object: Shared<T>) -> Result<(), Error>
    where
        T: ?Sized + MaybeSync + 'static,
    {
        self.register_instance(Abstract::of::<T>().into(), Instance::erase(object))
    }

    pub fn instance_named<T>(&self, target: impl Into<Target>, object: Shared<T>) -> Result<(), Error>
    where
        T: ?Sized + MaybeSync + 'static,
    {
        self.register_instance(target.into(), Instance::erase(object))
    }

    /// Makes `alias` resolve to `key`.
    pub fn alias(&self, key: impl Into<Abstract>, alias: impl Into<Abstract>) {
        let (key, alias) = (key.into(), alias.into());

        #[cfg(feature = "tracing")]
        trace!("Aliasing {} to {}", alias, key);

        write(&self.registry).aliases.insert(alias, key);
    }

    pub(crate) fn register(&self, target: Target, factory: Factory, scope: Scope) -> Result<(), Error> {
        let Target { key, alias } = target;
        if let Some(alias) = alias {
            self.alias(key.clone(), alias);
        }

        #[cfg(feature = "tracing")]
        debug!("Binding {} ({})", key, scope);

        let resolved = {
            let mut registry = write(&self.registry);
            registry.drop_stale_instances(&key);
            registry
                .bindings
                .insert(key.clone(), Binding::new(factory, scope));
            registry.is_resolved(&key)
        };

        if resolved {
            self.rebound(&key)?;
        }

        Ok(())
    }

    fn register_if(&self, target: Target, factory: Factory, scope: Scope) -> Result<(), Error> {
        if self.bound(target.key.clone()) {
            #[cfg(feature = "tracing")]
            trace!("{} already bound, keeping the existing binding", target.key);

            return Ok(());
        }

        self.register(target, factory, scope)
    }

    fn register_instance(&self, target: Target, object: ErasedInstance) -> Result<(), Error> {
        let Target { key, alias } = target;
        if let Some(alias) = alias {
            self.alias(key.clone(), alias);
        }

        #[cfg(feature = "tracing")]
        debug!("Registering instance for {}", key);

        let bound = {
            let mut registry = write(&self.registry);
            registry.aliases.remove(&key);
            let bound = registry.is_bound(&key);
            registry.instances.insert(key.clone(), object);
            bound
        };

        if bound {
            self.rebound(&key)?;
        }

        Ok(())
    }

    // ------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------

    /// Resolves `key` with its new recipe and hands the result to its rebinding hooks.
    fn rebound(&self, key: &Abstract) -> Result<(), Error> {
        let object = self.resolve_abstract(key.clone(), &Parameters::new(), None)?;
        let callbacks = read(&self.registry).callbacks.for_rebound(key);

        #[cfg(feature = "tracing")]
        debug!("Rebound {}, notifying {} callback(s)", key, callbacks.len());

        for callback in callbacks {
            callback(self, &object);
        }

        Ok(())
    }

    /// Decorates what the binding of `T` produces.
    ///
    /// A cached instance is decorated in place; otherwise the factory is
    /// wrapped, keeping its scope. Fails with `NotBound` when `T` has no binding.
    pub fn extend<T, F>(&self, decorator: F) -> Result<(), Error>
    where
        T: ?Sized + MaybeSync + 'static,
        F: Fn(Shared<T>, &Container) -> Result<Shared<T>, Error> + MaybeSync + 'static,
    {
        self.extend_named::<T, F>(Abstract::of::<T>(), decorator)
    }

    pub fn extend_named<T, F>(&self, key: impl Into<Abstract>, decorator: F) -> Result<(), Error>
    where
        T: ?Sized + MaybeSync + 'static,
        F: Fn(Shared<T>, &Container) -> Result<Shared<T>, Error> + MaybeSync + 'static,
    {
        let key = key.into();
        let name = key.to_string();
        let decorator: Decorator = Shared::new(
            move |object: ErasedInstance, container: &Container| -> Result<ErasedInstance, Error> {
                let object = Instance::<T>::downcast(&object)
                    .ok_or_else(|| Error::type_mismatch(&name, std::any::type_name::<T>()))?;
                decorator(object, container).map(Instance::erase)
            },
        );

        self.extend_abstract(key, decorator)
    }

    fn extend_abstract(&self, key: Abstract, decorator: Decorator) -> Result<(), Error> {
        let (key, binding, cached) = {
            let registry = read(&self.registry);
            let key = registry.canonical(key)?;
            let binding = registry
                .bindings
                .get(&key)
                .cloned()
                .ok_or_else(|| Error::not_bound(key.name()))?;
            let cached = registry.instances.get(&key).cloned();
            (key, binding, cached)
        };

        match cached {
            Some(object) => {
                #[cfg(feature = "tracing")]
                debug!("Extending cached instance of {}", key);

                let decorated = decorator(object, self)?;
                write(&self.registry).instances.insert(key.clone(), decorated);
                self.rebound(&key)
            }
            None => {
                #[cfg(feature = "tracing")]
                debug!("Extending binding of {}", key);

                let scope = binding.scope;
                self.register(key.into(), binding.decorated(decorator).factory, scope)
            }
        }
    }

    /// Runs `callback` every time `T` is built.
    pub fn resolving<T, F>(&self, callback: F)
    where
        T: ?Sized + 'static,
        F: Fn(&Shared<T>, &Container) + MaybeSync + 'static,
    {
        self.resolving_named::<T, F>(Abstract::of::<T>(), callback)
    }

    pub fn resolving_named<T, F>(&self, key: impl Into<Abstract>, callback: F)
    where
        T: ?Sized + 'static,
        F: Fn(&Shared<T>, &Container) + MaybeSync + 'static,
    {
        let mut registry = write(&self.registry);
        let key = registry.canonical_or_self(key.into());
        registry
            .callbacks
            .add_resolving(Some(key), callbacks::resolving::<T, F>(callback));
    }

    /// Runs `callback` after any abstract is built.
    pub fn resolving_any<F>(&self, callback: F)
    where
        F: Fn(&Abstract, &ErasedInstance, &Container) + MaybeSync + 'static,
    {
        let callback: ResolvingCallback = Shared::new(callback);
        write(&self.registry).callbacks.add_resolving(None, callback);
    }

    /// Runs `callback` after the resolving hooks of `T`.
    pub fn after_resolving<T, F>(&self, callback: F)
    where
        T: ?Sized + 'static,
        F: Fn(&Shared<T>, &Container) + MaybeSync + 'static,
    {
        self.after_resolving_named::<T, F>(Abstract::of::<T>(), callback)
    }

    pub fn after_resolving_named<T, F>(&self, key: impl Into<Abstract>, callback: F)
    where
        T: ?Sized + 'static,
        F: Fn(&Shared<T>, &Container) + MaybeSync + 'static,
    {
        let mut registry = write(&self.registry);
        let key = registry.canonical_or_self(key.into());
        registry
            .callbacks
            .add_after_resolving(Some(key), callbacks::resolving::<T, F>(callback));
    }

    pub fn after_resolving_any<F>(&self, callback: F)
    where
        F: Fn(&Abstract, &ErasedInstance, &Container) + MaybeSync + 'static,
    {
        let callback: ResolvingCallback = Shared::new(callback);
        write(&self.registry).callbacks.add_after_resolving(None, callback);
    }

    /// Runs `callback` with the fresh object whenever `T` is rebound.
    ///
    /// If `T` is already bound it is resolved right away and returned.
    pub fn rebinding<T, F>(&self, callback: F) -> Result<Option<Shared<T>>, Error>
    where
        T: ?Sized + 'static,
        F: Fn(&Container, Shared<T>) + MaybeSync + 'static,
    {
        self.rebinding_named::<T, F>(Abstract::of::<T>(), callback)
    }

    pub fn rebinding_named<T, F>(
        &self,
        key: impl Into<Abstract>,
        callback: F,
    ) -> Result<Option<Shared<T>>, Error>
    where
        T: ?Sized + 'static,
        F: Fn(&Container, Shared<T>) + MaybeSync + 'static,
    {
        let key = {
            let mut registry = write(&self.registry);
            let key = registry.canonical_or_self(key.into());
            registry
                .callbacks
                .add_rebound(key.clone(), callbacks::rebound::<T, F>(callback));
            key
        };

        if self.bound(key.clone()) {
            return self.make_named::<T>(key).map(Some);
        }

        Ok(None)
    }

    /// Calls `method(&target, object)` whenever `T` is rebound.
    pub fn refresh<T, S>(
        &self,
        target: Shared<S>,
        method: fn(&S, Shared<T>),
    ) -> Result<Option<Shared<T>>, Error>
    where
        T: ?Sized + 'static,
        S: ?Sized + MaybeSync + 'static,
    {
        self.refresh_named::<T, S>(Abstract::of::<T>(), target, method)
    }

    pub fn refresh_named<T, S>(
        &self,
        key: impl Into<Abstract>,
        target: Shared<S>,
        method: fn(&S, Shared<T>),
    ) -> Result<Option<Shared<T>>, Error>
    where
        T: ?Sized + 'static,
        S: ?Sized + MaybeSync + 'static,
    {
        self.rebinding_named::<T, _>(key, move |_: &Container, object: Shared<T>| {
            method(&*target, object)
        })
    }

    pub fn forget_instance(&self, key: impl Into<Abstract>) {
        let mut registry = write(&self.registry);
        let key = registry.canonical_or_self(key.into());
        registry.instances.remove(&key);
    }

    pub fn forget_instances(&self) {
        write(&self.registry).instances.clear();
    }

    // ------------------------------------------------------------------
    // Introspection
    // ------------------------------------------------------------------

    /// Whether `key` has a binding, an instance, or is an alias.
    pub fn bound(&self, key: impl Into<Abstract>) -> bool {
        read(&self.registry).is_bound(&key.into())
    }

    pub fn has<T: ?Sized + 'static>(&self) -> bool {
        self.bound(Abstract::of::<T>())
    }

    /// Whether `key` (after aliases) has been resolved or holds an instance.
    pub fn resolved(&self, key: impl Into<Abstract>) -> bool {
        let registry = read(&self.registry);
        let key = registry.canonical_or_self(key.into());
        registry.is_resolved(&key)
    }

    pub fn is_alias(&self, key: impl Into<Abstract>) -> bool {
        read(&self.registry).aliases.contains_key(&key.into())
    }

    pub fn is_shared(&self, key: impl Into<Abstract>) -> bool {
        let registry = read(&self.registry);
        let key = registry.canonical_or_self(key.into());
        registry.instances.contains_key(&key)
            || registry.bindings.get(&key).is_some_and(Binding::is_shared)
    }

    /// Ids that currently have a binding.
    pub fn bindings(&self) -> Vec<Abstract> {
        read(&self.registry).bindings.keys().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    trait Transport: Send + Sync {
        fn name(&self) -> String;
    }

    struct Smtp;

    impl Transport for Smtp {
        fn name(&self) -> String {
            "smtp".to_string()
        }
    }

    struct Sendmail;

    impl Transport for Sendmail {
        fn name(&self) -> String {
            "sendmail".to_string()
        }
    }

    struct Logged(String);

    impl Transport for Logged {
        fn name(&self) -> String {
            format!("logged({})", self.0)
        }
    }

    fn logged(inner: Shared<dyn Transport>, _: &Container) -> Result<Shared<dyn Transport>, Error> {
        Ok(Shared::new(Logged(inner.name())))
    }

    fn smtp(_: &Container, _: &Parameters) -> Result<Shared<dyn Transport>, Error> {
        Ok(Shared::new(Smtp))
    }

    fn sendmail(_: &Container, _: &Parameters) -> Result<Shared<dyn Transport>, Error> {
        Ok(Shared::new(Sendmail))
    }

    #[test]
    fn singleton_is_cached_transient_is_not() {
        let container = Container::new();
        container.singleton::<dyn Transport, _>(smtp).unwrap();
        container.bind_named::<dyn Transport, _>("fresh", smtp).unwrap();

        let a = container.make::<dyn Transport>().unwrap();
        let b = container.make::<dyn Transport>().unwrap();
        assert!(Shared::ptr_eq(&a, &b));

        let c = container.make_named::<dyn Transport>("fresh").unwrap();
        let d = container.make_named::<dyn Transport>("fresh").unwrap();
        assert!(!Shared::ptr_eq(&c, &d));

        assert!(container.is_shared(Abstract::of::<dyn Transport>()));
        assert!(!container.is_shared("fresh"));
    }

    #[test]
    fn bind_drops_stale_instance() {
        let container = Container::new();
        container.singleton::<dyn Transport, _>(smtp).unwrap();
        assert_eq!(container.make::<dyn Transport>().unwrap().name(), "smtp");

        container.singleton::<dyn Transport, _>(sendmail).unwrap();
        assert_eq!(container.make::<dyn Transport>().unwrap().name(), "sendmail");
    }

    #[test]
    fn bind_if_keeps_first_binding() {
        let container = Container::new();
        container.bind_if::<dyn Transport, _>(smtp).unwrap();
        container.bind_if::<dyn Transport, _>(sendmail).unwrap();
        assert_eq!(container.make::<dyn Transport>().unwrap().name(), "smtp");
    }

    #[test]
    fn target_tuple_registers_alias() {
        let container = Container::new();
        container
            .singleton_named::<dyn Transport, _>(("mail.transport", "transport"), smtp)
            .unwrap();

        assert!(container.is_alias("transport"));
        assert!(container.bound("transport"));
        let via_alias = container.make_named::<dyn Transport>("transport").unwrap();
        let direct = container.make_named::<dyn Transport>("mail.transport").unwrap();
        assert!(Shared::ptr_eq(&via_alias, &direct));
    }

    #[test]
    fn instance_replaces_alias_and_is_shared() {
        let container = Container::new();
        container.alias("mail.transport", "transport");
        let object: Shared<dyn Transport> = Shared::new(Sendmail);
        container
            .instance_named::<dyn Transport>("transport", object.clone())
            .unwrap();

        assert!(!container.is_alias("transport"));
        let resolved = container.make_named::<dyn Transport>("transport").unwrap();
        assert!(Shared::ptr_eq(&resolved, &object));
        assert!(container.resolved("transport"));
    }

    #[test]
    fn alias_cycle_is_reported() {
        let container = Container::new();
        container.alias("a", "b");
        container.alias("b", "a");

        let Err(err) = container.make_named::<u8>("a") else {
            panic!("alias cycle should fail");
        };
        assert_eq!(err.kind, ErrorKind::CircularDependency);
    }

    #[test]
    fn alias_cycle_lookup_keeps_key_without_error() {
        let container = Container::new();
        container.alias("a", "b");
        container.alias("b", "a");

        container.resolving_named::<u8, _>("a", |_, _| {});
        container.forget_instance("a");
        assert!(!container.resolved("a"));
        assert!(!container.is_shared("a"));

        let registry = read(&container.registry);
        assert_eq!(
            registry.canonical_or_self(Abstract::named("a")),
            Abstract::named("a")
        );
        let seen = registry.follow_aliases(Abstract::named("a")).unwrap_err();
        assert_eq!(seen.len(), 3);
    }

    #[test]
    fn rebinding_hook_receives_new_object() {
        let container = Container::new();
        let seen = Shared::new(Mutex::new(Vec::new()));

        container.singleton::<dyn Transport, _>(smtp).unwrap();
        container.make::<dyn Transport>().unwrap();

        let log = seen.clone();
        let current = container
            .rebinding::<dyn Transport, _>(move |_, transport| {
                log.lock().unwrap().push(transport.name());
            })
            .unwrap();
        assert_eq!(current.map(|t| t.name()), Some("smtp".to_string()));

        container.bind::<dyn Transport, _>(sendmail).unwrap();
        assert_eq!(*seen.lock().unwrap(), ["sendmail"]);
    }

    #[test]
    fn rebinding_before_bound_returns_none() {
        let container = Container::new();
        let result = container
            .rebinding::<dyn Transport, _>(|_, _| {})
            .unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn binding_unresolved_abstract_does_not_rebound() {
        let container = Container::new();
        let hits = Shared::new(AtomicUsize::new(0));
        let counter = hits.clone();
        container
            .rebinding::<dyn Transport, _>(move |_, _| {
                counter.fetch_add(1, Ordering::SeqCst);
            })
            .unwrap();

        container.bind::<dyn Transport, _>(smtp).unwrap();
        container.bind::<dyn Transport, _>(sendmail).unwrap();
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn instance_over_binding_triggers_rebound() {
        let container = Container::new();
        let hits = Shared::new(AtomicUsize::new(0));
        container.bind::<dyn Transport, _>(smtp).unwrap();

        let counter = hits.clone();
        container
            .rebinding::<dyn Transport, _>(move |_, transport| {
                assert_eq!(transport.name(), "sendmail");
                counter.fetch_add(1, Ordering::SeqCst);
            })
            .unwrap();

        container
            .instance::<dyn Transport>(Shared::new(Sendmail))
            .unwrap();
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn extend_requires_binding() {
        let container = Container::new();
        let Err(err) = container.extend::<dyn Transport, _>(|t, _| Ok(t)) else {
            panic!("extend on unbound should fail");
        };
        assert_eq!(err.kind, ErrorKind::NotBound);
    }

    #[test]
    fn extend_wraps_factory_and_keeps_scope() {
        let container = Container::new();
        container.singleton::<dyn Transport, _>(smtp).unwrap();
        container
            .extend::<dyn Transport, _>(logged)
            .unwrap();

        let first = container.make::<dyn Transport>().unwrap();
        let second = container.make::<dyn Transport>().unwrap();
        assert_eq!(first.name(), "logged(smtp)");
        assert!(Shared::ptr_eq(&first, &second));
    }

    #[test]
    fn extend_decorates_cached_instance_in_place() {
        let container = Container::new();
        container.singleton::<dyn Transport, _>(smtp).unwrap();
        let before = container.make::<dyn Transport>().unwrap();

        container
            .extend::<dyn Transport, _>(logged)
            .unwrap();

        let after = container.make::<dyn Transport>().unwrap();
        assert_eq!(after.name(), "logged(smtp)");
        assert!(!Shared::ptr_eq(&before, &after));
        assert!(Shared::ptr_eq(&after, &container.make::<dyn Transport>().unwrap()));
    }

    #[test]
    fn extend_cached_instance_rebounds_once() {
        let container = Container::new();
        let seen: Shared<Mutex<Vec<Shared<dyn Transport>>>> = Shared::new(Mutex::new(Vec::new()));
        container.singleton::<dyn Transport, _>(smtp).unwrap();
        container.make::<dyn Transport>().unwrap();

        let log = seen.clone();
        container
            .rebinding::<dyn Transport, _>(move |_, transport| {
                log.lock().unwrap().push(transport);
            })
            .unwrap();
        container.extend::<dyn Transport, _>(logged).unwrap();

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].name(), "logged(smtp)");
        let current = container.make::<dyn Transport>().unwrap();
        assert!(Shared::ptr_eq(&seen[0], &current));
    }

    #[test]
    fn extend_resolved_factory_rebounds_once() {
        let container = Container::new();
        let seen = Shared::new(Mutex::new(Vec::new()));
        container.bind_named::<dyn Transport, _>("x", smtp).unwrap();
        container.make_named::<dyn Transport>("x").unwrap();

        let log = seen.clone();
        container
            .rebinding_named::<dyn Transport, _>("x", move |_, transport| {
                log.lock().unwrap().push(transport.name());
            })
            .unwrap();
        container.extend_named::<dyn Transport, _>("x", logged).unwrap();

        assert_eq!(*seen.lock().unwrap(), ["logged(smtp)"]);
        assert!(!container.is_shared("x"));
    }

    #[test]
    fn extend_through_alias() {
        let container = Container::new();
        container.bind_named::<dyn Transport, _>("mailer", smtp).unwrap();
        container.alias("mailer", "mail");
        container
            .extend_named::<dyn Transport, _>("mail", logged)
            .unwrap();

        assert_eq!(
            container.make_named::<dyn Transport>("mailer").unwrap().name(),
            "logged(smtp)"
        );
    }

    #[test]
    fn refresh_calls_method_on_target() {
        struct Holder {
            transport: Mutex<String>,
        }

        impl Holder {
            fn set_transport(&self, transport: Shared<dyn Transport>) {
                *self.transport.lock().unwrap() = transport.name();
            }
        }

        let container = Container::new();
        container.bind::<dyn Transport, _>(smtp).unwrap();
        container.make::<dyn Transport>().unwrap();

        let holder = Shared::new(Holder {
            transport: Mutex::new(String::new()),
        });
        container
            .refresh::<dyn Transport, Holder>(holder.clone(), Holder::set_transport)
            .unwrap();

        container.bind::<dyn Transport, _>(sendmail).unwrap();
        assert_eq!(*holder.transport.lock().unwrap(), "sendmail");
    }

    #[test]
    fn forget_instance_rebuilds() {
        let container = Container::new();
        container.singleton::<dyn Transport, _>(smtp).unwrap();
        let first = container.make::<dyn Transport>().unwrap();

        container.forget_instance(Abstract::of::<dyn Transport>());
        let second = container.make::<dyn Transport>().unwrap();
        assert!(!Shared::ptr_eq(&first, &second));

        container.forget_instances();
        let third = container.make::<dyn Transport>().unwrap();
        assert!(!Shared::ptr_eq(&second, &third));
    }

    #[derive(Default)]
    struct Clock;

    crate::injectable!(Clock);

    #[test]
    fn singleton_self_caches_concrete() {
        let container = Container::new();
        container.singleton_self::<Clock>().unwrap();

        let a = container.make::<Clock>().unwrap();
        let b = container.make::<Clock>().unwrap();
        assert!(Shared::ptr_eq(&a, &b));
    }

    #[test]
    fn bind_to_redirects_to_another_abstract() {
        let container = Container::new();
        container
            .singleton_named::<dyn Transport, _>("smtp", smtp)
            .unwrap();
        container.bind_to("mail.transport", "smtp").unwrap();

        let redirected = container.make_named::<dyn Transport>("mail.transport").unwrap();
        let direct = container.make_named::<dyn Transport>("smtp").unwrap();
        assert!(Shared::ptr_eq(&redirected, &direct));
    }

    #[test]
    fn introspection() {
        let container = Container::new();
        assert!(!container.has::<dyn Transport>());

        container.bind::<dyn Transport, _>(smtp).unwrap();
        assert!(container.has::<dyn Transport>());
        assert!(!container.resolved(Abstract::of::<dyn Transport>()));

        container.make::<dyn Transport>().unwrap();
        assert!(container.resolved(Abstract::of::<dyn Transport>()));
        assert_eq!(container.bindings(), vec![Abstract::of::<dyn Transport>()]);
    }
}
