use crate::container::Container;
use crate::error::Error;
use crate::instance::{ErasedInstance, Instance};
use crate::parameters::{Arguments, Parameters};
use crate::runtime::MaybeSync;
use crate::signature::Signature;

/// A concrete type the container can construct by itself.
///
/// `signature` declares the constructor parameters; the container resolves
/// each one and hands the result to `construct`. Types with no dependencies
/// keep the default empty signature (see also [`crate::injectable!`]).
///
/// ```
/// use bindery::{Arguments, Container, Error, Injectable, Signature};
///
/// #[derive(Default)]
/// struct Clock;
///
/// bindery::injectable!(Clock);
///
/// struct Scheduler {
///     clock: bindery::Shared<Clock>,
///     workers: u8,
/// }
///
/// impl Injectable for Scheduler {
///     fn signature() -> Signature {
///         Signature::new().injectable::<Clock>("clock").value_or("workers", 4u8)
///     }
///
///     fn construct(args: &Arguments) -> Result<Self, Error> {
///         Ok(Self {
///             clock: args.service("clock")?,
///             workers: args.value("workers")?,
///         })
///     }
/// }
///
/// let container = Container::new();
/// let scheduler = container.autowire::<Scheduler>().unwrap();
/// assert_eq!(scheduler.workers, 4);
/// ```
pub trait Injectable: Sized + MaybeSync + 'static {
    fn signature() -> Signature {
        Signature::new()
    }

    fn construct(args: &Arguments) -> Result<Self, Error>;
}

/// Type-erased `build` for `T`, usable as a [`crate::types::Recipe`].
pub(crate) fn recipe<T: Injectable>(
    container: &Container,
    parameters: &Parameters,
) -> Result<ErasedInstance, Error> {
    container.build::<T>(parameters).map(Instance::erase)
}
