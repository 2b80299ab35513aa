//! Application shell for registering and booting service providers.
//!
//! # Overview
//!
//! The `Application` manages:
//! - A shared root [`Container`]
//! - Provider registration (imports first, each provider once)
//! - Deferred providers, registered on first resolution of an id they provide
//! - The boot phase, run once for every registered provider
//!
//! # Examples
//!
//! ```
//! use bindery::{Abstract, Application, Container, Error, ServiceProvider, Shared};
//!
//! struct QueueProvider;
//!
//! impl ServiceProvider for QueueProvider {
//!     fn register(&self, container: &Container) -> Result<(), Error> {
//!         container.singleton_named("queue", |_, _| Ok(Shared::new(vec!["default"])))
//!     }
//!
//!     fn provides(&self) -> Vec<Abstract> {
//!         vec![Abstract::named("queue")]
//!     }
//!
//!     fn is_deferred(&self) -> bool {
//!         true
//!     }
//! }
//!
//! let mut app = Application::new();
//! app.register(QueueProvider).unwrap();
//! assert!(app.is_deferred("queue"));
//! assert!(!app.container().bound("queue"));
//!
//! let queues = app.make_named::<Vec<&'static str>>("queue").unwrap();
//! assert_eq!(queues.as_slice(), ["default"]);
//! ```

use std::collections::{HashMap, HashSet};

use crate::container::Container;
use crate::error::Error;
use crate::key::Abstract;
use crate::provider::ServiceProvider;
use crate::runtime::Shared;

#[cfg(feature = "tracing")]
use tracing::{debug, info, trace};

/// Owns the root container and the providers registered into it.
///
/// # Lifecycle
///
/// 1. **Creation**: [`new()`](Application::new) or [`with_container()`](Application::with_container)
/// 2. **Registration**: [`register()`](Application::register) each provider
/// 3. **Boot**: [`boot()`](Application::boot) runs every provider's `boot` once
/// 4. **Usage**: resolve through [`make()`](Application::make) or the shared [`container()`](Application::container)
///
/// Providers registered after booting are booted immediately.
pub struct Application {
    container: Shared<Container>,
    providers: Vec<Shared<dyn ServiceProvider>>,
    registered: HashSet<&'static str>,
    deferred: HashMap<Abstract, Shared<dyn ServiceProvider>>,
    booted: bool,
}

#[cfg(feature = "debug")]
impl std::fmt::Debug for Application {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Application")
            .field("container", &self.container)
            .field("providers", &self.provider_names())
            .field("deferred", &self.deferred.len())
            .field("booted", &self.booted)
            .finish()
    }
}

impl Default for Application {
    fn default() -> Self {
        Self::new()
    }
}

impl Application {
    pub fn new() -> Self {
        Self::with_container(Shared::new(Container::new()))
    }

    /// Creates an application around an existing container.
    pub fn with_container(container: Shared<Container>) -> Self {
        #[cfg(feature = "tracing")]
        info!("Creating new Application instance");

        Self {
            container,
            providers: Vec::new(),
            registered: HashSet::new(),
            deferred: HashMap::new(),
            booted: false,
        }
    }

    /// Registers `provider` and its imports.
    ///
    /// A provider whose name was already registered is skipped. A deferred
    /// provider is only indexed by the ids it provides.
    pub fn register(&mut self, provider: impl ServiceProvider + 'static) -> Result<(), Error> {
        self.register_boxed(Box::new(provider))
    }

    pub fn register_boxed(&mut self, provider: Box<dyn ServiceProvider>) -> Result<(), Error> {
        let provider: Shared<dyn ServiceProvider> = Shared::from(provider);

        if self.registered.contains(provider.name()) {
            #[cfg(feature = "tracing")]
            trace!("Provider {} already registered", provider.name());

            return Ok(());
        }

        if provider.is_deferred() {
            let provides = provider.provides();

            #[cfg(feature = "tracing")]
            debug!(
                "Deferring provider {} ({} id(s))",
                provider.name(),
                provides.len()
            );

            for key in provides {
                self.deferred.insert(key, provider.clone());
            }
            return Ok(());
        }

        self.load(provider)
    }

    fn load(&mut self, provider: Shared<dyn ServiceProvider>) -> Result<(), Error> {
        let name = provider.name();
        if !self.registered.insert(name) {
            return Ok(());
        }

        let imports = provider.imports();
        #[cfg(feature = "tracing")]
        if !imports.is_empty() {
            debug!("Provider {} has {} imports, loading them first", name, imports.len());
        }

        for import in imports {
            self.register_boxed(import)?;
        }

        #[cfg(feature = "tracing")]
        debug!("Registering provider {}", name);

        provider.register(&self.container)?;
        self.providers.push(provider.clone());

        if self.booted {
            #[cfg(feature = "tracing")]
            debug!("Booting late provider {}", name);

            provider.boot(&self.container)?;
        }

        Ok(())
    }

    /// Boots every registered provider, in registration order. Idempotent.
    pub fn boot(&mut self) -> Result<(), Error> {
        if self.booted {
            return Ok(());
        }

        #[cfg(feature = "tracing")]
        info!("Booting {} provider(s)", self.providers.len());

        for provider in &self.providers {
            #[cfg(feature = "tracing")]
            trace!("Booting provider {}", provider.name());

            provider.boot(&self.container)?;
        }
        self.booted = true;

        #[cfg(feature = "tracing")]
        info!("Application booted");

        Ok(())
    }

    pub fn is_booted(&self) -> bool {
        self.booted
    }

    /// Returns a shared reference to the root container.
    pub fn container(&self) -> Shared<Container> {
        self.container.clone()
    }

    /// Registers the deferred provider for `key`, if there is one.
    pub fn load_deferred(&mut self, key: impl Into<Abstract>) -> Result<(), Error> {
        let key = key.into();
        let Some(provider) = self.deferred.get(&key).cloned() else {
            return Ok(());
        };

        let name = provider.name();
        self.deferred.retain(|_, deferred| deferred.name() != name);

        #[cfg(feature = "tracing")]
        debug!("Loading deferred provider {} for {}", name, key);

        self.load(provider)
    }

    pub fn is_deferred(&self, key: impl Into<Abstract>) -> bool {
        self.deferred.contains_key(&key.into())
    }

    /// Resolves `T`, loading its deferred provider first.
    ///
    /// Both the requested id and the id it aliases are looked up.
    pub fn make<T: ?Sized + 'static>(&mut self) -> Result<Shared<T>, Error> {
        self.make_named::<T>(Abstract::of::<T>())
    }

    pub fn make_named<T: ?Sized + 'static>(
        &mut self,
        key: impl Into<Abstract>,
    ) -> Result<Shared<T>, Error> {
        let key = key.into();
        self.load_deferred(key.clone())?;

        let canonical = self.container.canonical(key.clone())?;
        if canonical != key {
            self.load_deferred(canonical)?;
        }

        self.container.make_named::<T>(key)
    }

    /// Names of the registered (non-deferred or loaded) providers, in order.
    pub fn provider_names(&self) -> Vec<&'static str> {
        self.providers.iter().map(|provider| provider.name()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use std::sync::Mutex;

    type Log = Shared<Mutex<Vec<String>>>;

    struct Recording {
        name: &'static str,
        log: Log,
        imports: Vec<&'static str>,
    }

    impl ServiceProvider for Recording {
        fn name(&self) -> &'static str {
            self.name
        }

        fn imports(&self) -> Vec<Box<dyn ServiceProvider>> {
            self.imports
                .iter()
                .map(|&name| {
                    Box::new(Recording {
                        name,
                        log: self.log.clone(),
                        imports: vec![],
                    }) as Box<dyn ServiceProvider>
                })
                .collect()
        }

        fn register(&self, _container: &Container) -> Result<(), Error> {
            self.log.lock().unwrap().push(format!("register {}", self.name));
            Ok(())
        }

        fn boot(&self, _container: &Container) -> Result<(), Error> {
            self.log.lock().unwrap().push(format!("boot {}", self.name));
            Ok(())
        }
    }

    fn recording(name: &'static str, log: &Log, imports: Vec<&'static str>) -> Recording {
        Recording {
            name,
            log: log.clone(),
            imports,
        }
    }

    struct Deferred;

    impl ServiceProvider for Deferred {
        fn register(&self, container: &Container) -> Result<(), Error> {
            container.singleton_named("answer", |_, _| Ok(Shared::new(42u32)))
        }

        fn provides(&self) -> Vec<Abstract> {
            vec![Abstract::named("answer")]
        }

        fn is_deferred(&self) -> bool {
            true
        }
    }

    #[test]
    fn test_new_application_is_not_booted() {
        let app = Application::new();
        assert!(!app.is_booted());
        assert!(app.provider_names().is_empty());
    }

    #[test]
    fn test_imports_register_first_and_once() {
        let log: Log = Shared::new(Mutex::new(Vec::new()));
        let mut app = Application::new();

        app.register(recording("root", &log, vec!["db", "cache"])).unwrap();
        app.register(recording("db", &log, vec![])).unwrap();

        assert_eq!(app.provider_names(), ["db", "cache", "root"]);
        assert_eq!(
            *log.lock().unwrap(),
            ["register db", "register cache", "register root"]
        );
    }

    #[test]
    fn test_boot_runs_once_in_order() {
        let log: Log = Shared::new(Mutex::new(Vec::new()));
        let mut app = Application::new();
        app.register(recording("a", &log, vec![])).unwrap();
        app.register(recording("b", &log, vec![])).unwrap();

        app.boot().unwrap();
        app.boot().unwrap();
        assert!(app.is_booted());

        let log = log.lock().unwrap();
        assert_eq!(log[2..], ["boot a", "boot b"]);
    }

    #[test]
    fn test_late_provider_boots_immediately() {
        let log: Log = Shared::new(Mutex::new(Vec::new()));
        let mut app = Application::new();
        app.boot().unwrap();

        app.register(recording("late", &log, vec![])).unwrap();
        assert_eq!(*log.lock().unwrap(), ["register late", "boot late"]);
    }

    #[test]
    fn test_deferred_provider_loads_on_make() {
        let mut app = Application::new();
        app.register(Deferred).unwrap();

        assert!(app.is_deferred("answer"));
        assert!(!app.container().bound("answer"));

        let answer = app.make_named::<u32>("answer").unwrap();
        assert_eq!(*answer, 42);
        assert!(!app.is_deferred("answer"));
        assert_eq!(app.provider_names().len(), 1);
    }

    #[test]
    fn test_deferred_provider_loads_through_alias() {
        let mut app = Application::new();
        app.register(Deferred).unwrap();
        app.container().alias("answer", "reply");

        let answer = app.make_named::<u32>("reply").unwrap();
        assert_eq!(*answer, 42);
        assert!(!app.is_deferred("answer"));
    }

    #[test]
    fn test_container_make_skips_deferred_providers() {
        let mut app = Application::new();
        app.register(Deferred).unwrap();

        let Err(err) = app.container().make_named::<u32>("answer") else {
            panic!("deferred provider was not loaded yet");
        };
        assert_eq!(err.kind, ErrorKind::NotInstantiable);
    }

    #[test]
    fn test_with_container_shares_the_container() {
        let container = Shared::new(Container::new());
        let app = Application::with_container(container.clone());
        container
            .instance_named("env", Shared::new("test".to_string()))
            .unwrap();

        assert!(app.container().bound("env"));
    }

    #[cfg(feature = "debug")]
    #[test]
    fn test_debug_implementation() {
        let app = Application::new();
        let debug_str = format!("{:?}", app);
        assert!(debug_str.contains("Application"));
    }
}
