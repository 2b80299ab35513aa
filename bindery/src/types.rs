use std::any::Any;

use crate::container::Container;
use crate::error::Error;
use crate::instance::ErasedInstance;
use crate::key::Abstract;
use crate::parameters::{Arguments, Parameters};
use crate::runtime::Shared;

/// Builds an object for a binding.
#[cfg(feature = "thread-safe")]
pub type Factory =
    Shared<dyn Fn(&Container, &Parameters) -> Result<ErasedInstance, Error> + Send + Sync>;
#[cfg(not(feature = "thread-safe"))]
pub type Factory = Shared<dyn Fn(&Container, &Parameters) -> Result<ErasedInstance, Error>>;

/// Wraps an already-built object (see `Container::extend`).
#[cfg(feature = "thread-safe")]
pub type Decorator =
    Shared<dyn Fn(ErasedInstance, &Container) -> Result<ErasedInstance, Error> + Send + Sync>;
#[cfg(not(feature = "thread-safe"))]
pub type Decorator = Shared<dyn Fn(ErasedInstance, &Container) -> Result<ErasedInstance, Error>>;

#[cfg(feature = "thread-safe")]
pub type ResolvingCallback = Shared<dyn Fn(&Abstract, &ErasedInstance, &Container) + Send + Sync>;
#[cfg(not(feature = "thread-safe"))]
pub type ResolvingCallback = Shared<dyn Fn(&Abstract, &ErasedInstance, &Container)>;

#[cfg(feature = "thread-safe")]
pub type ReboundCallback = Shared<dyn Fn(&Container, &ErasedInstance) + Send + Sync>;
#[cfg(not(feature = "thread-safe"))]
pub type ReboundCallback = Shared<dyn Fn(&Container, &ErasedInstance)>;

/// Invokes a registered method on its resolved target.
#[cfg(feature = "thread-safe")]
pub type Invoker = Shared<
    dyn Fn(&ErasedInstance, &Arguments) -> Result<Box<dyn Any>, Error> + Send + Sync,
>;
#[cfg(not(feature = "thread-safe"))]
pub type Invoker = Shared<dyn Fn(&ErasedInstance, &Arguments) -> Result<Box<dyn Any>, Error>>;

/// Builds a concrete type from its declared signature; see [`crate::Injectable`].
pub type Recipe = fn(&Container, &Parameters) -> Result<ErasedInstance, Error>;
