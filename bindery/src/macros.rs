//! Macros for ergonomic service registration and container setup.
//!
//! - [`bind!`] macro: Shorthand for registering services (transient, singleton, instance, alias).
//! - [`container!`] macro: Compose a container with multiple `bind!` statements in one block.
//! - [`injectable!`] macro: Mark `Default` types as buildable with no dependencies.
//!
//! # Example
//! ```
//! use bindery::{bind, container};
//!
//! trait Foo: Send + Sync {
//!     fn val(&self) -> i32;
//! }
//!
//! struct Bar;
//!
//! impl Foo for Bar {
//!     fn val(&self) -> i32 {
//!         42
//!     }
//! }
//!
//! let c = container! {
//!     bind(singleton dyn Foo => |_c| Bar)
//!     bind(instance u8 => 7u8)
//!     bind(alias "foo" => dyn Foo)
//! }
//! .unwrap();
//!
//! assert_eq!(c.make_named::<dyn Foo>("foo").unwrap().val(), 42);
//! ```

/// Shorthand for registering services in a container.
///
/// Factories take the container and return the bare value; it is wrapped
/// in [`Shared`](crate::Shared) and coerced to the bound type.
///
/// - `Type => factory`: Register a transient factory.
/// - `singleton Type => factory`: Register a singleton factory.
/// - `instance Type => value`: Register an existing value.
/// - `alias "name" => Type`: Make `"name"` resolve to `Type`.
///
/// Every arm evaluates to `Result<(), Error>`.
#[macro_export]
macro_rules! bind {
    ($container:expr, singleton $token:ty => $factory:expr) => {
        $container.singleton::<$token, _>(
            move |container: &$crate::Container, _: &$crate::Parameters| {
                ::std::result::Result::Ok(
                    $crate::Shared::new(($factory)(container)) as $crate::Shared<$token>
                )
            },
        )
    };

    ($container:expr, instance $token:ty => $instance:expr) => {
        $container.instance::<$token>($crate::Shared::new($instance))
    };

    ($container:expr, alias $alias:literal => $token:ty) => {{
        $container.alias($crate::Abstract::of::<$token>(), $alias);
        ::std::result::Result::<(), $crate::Error>::Ok(())
    }};

    ($container:expr, $token:ty => $factory:expr) => {
        $container.bind::<$token, _>(
            move |container: &$crate::Container, _: &$crate::Parameters| {
                ::std::result::Result::Ok(
                    $crate::Shared::new(($factory)(container)) as $crate::Shared<$token>
                )
            },
        )
    };
}

/// Compose a container with multiple `bind!` statements in one block.
///
/// Evaluates to `Result<Container, Error>`; the first failing registration
/// is returned.
#[macro_export]
macro_rules! container {
    (
        $(
            bind( $($stmt:tt)* )
        )*
    ) => {
        (|| -> ::std::result::Result<$crate::Container, $crate::Error> {
            let container = $crate::Container::new();

            $(
                $crate::bind!(container, $($stmt)*)?;
            )*

            ::std::result::Result::Ok(container)
        })()
    };
}

/// Implements [`Injectable`](crate::Injectable) for types built with `Default`.
#[macro_export]
macro_rules! injectable {
    ($($token:ty),+ $(,)?) => {
        $(
            impl $crate::Injectable for $token {
                fn construct(
                    _: &$crate::Arguments,
                ) -> ::std::result::Result<Self, $crate::Error> {
                    ::std::result::Result::Ok(<$token as ::std::default::Default>::default())
                }
            }
        )+
    };
}
