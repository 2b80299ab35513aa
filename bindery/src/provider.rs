use crate::container::Container;
use crate::error::Error;
use crate::key::Abstract;
use crate::runtime::MaybeSync;

/// A unit of registration, loaded by an [`Application`](crate::Application).
///
/// `register` binds services; `boot` runs once every provider is registered
/// and may resolve services freely. A deferred provider is only registered
/// when one of the ids it `provides` is first resolved through the
/// application.
///
/// ```
/// use bindery::{Application, Container, Error, ServiceProvider, Shared};
///
/// struct ConfigProvider;
///
/// impl ServiceProvider for ConfigProvider {
///     fn register(&self, container: &Container) -> Result<(), Error> {
///         container.instance_named("app.name", Shared::new("bindery".to_string()))
///     }
/// }
///
/// let mut app = Application::new();
/// app.register(ConfigProvider).unwrap();
/// app.boot().unwrap();
///
/// let name = app.make_named::<String>("app.name").unwrap();
/// assert_eq!(name.as_str(), "bindery");
/// ```
pub trait ServiceProvider: MaybeSync {
    /// Identity used to register each provider once.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Providers registered before this one.
    fn imports(&self) -> Vec<Box<dyn ServiceProvider>> {
        vec![]
    }

    fn register(&self, container: &Container) -> Result<(), Error>;

    fn boot(&self, _container: &Container) -> Result<(), Error> {
        Ok(())
    }

    /// Ids whose first resolution loads a deferred provider.
    fn provides(&self) -> Vec<Abstract> {
        vec![]
    }

    fn is_deferred(&self) -> bool {
        false
    }
}
