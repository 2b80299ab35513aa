//! A service container: bind abstract ids to recipes, resolve them with
//! their dependencies injected, and hook into their lifecycle.
//!
//! ```
//! use bindery::{Container, Shared};
//!
//! trait Greeter: Send + Sync {
//!     fn greet(&self, name: &str) -> String;
//! }
//!
//! struct English;
//!
//! impl Greeter for English {
//!     fn greet(&self, name: &str) -> String {
//!         format!("Hello, {name}")
//!     }
//! }
//!
//! let container = Container::new();
//! container
//!     .singleton::<dyn Greeter, _>(|_, _| Ok(Shared::new(English) as Shared<dyn Greeter>))
//!     .unwrap();
//!
//! let greeter = container.make::<dyn Greeter>().unwrap();
//! assert_eq!(greeter.greet("Ada"), "Hello, Ada");
//! ```

pub mod application;
pub mod binding;
pub mod call;
mod callbacks;
pub mod container;
pub mod error;
pub mod injectable;
pub mod instance;
pub mod key;
mod macros;
pub mod parameters;
pub mod provider;
pub mod resolve_guard;
mod resolver;
pub mod runtime;
pub mod scope;
pub mod signature;
pub mod types;

pub use application::*;
pub use binding::*;
pub use call::*;
pub use container::*;
pub use error::*;
pub use injectable::*;
pub use instance::*;
pub use key::*;
pub use parameters::*;
pub use provider::*;
pub use resolve_guard::*;
pub use runtime::*;
pub use scope::*;
pub use signature::*;
pub use types::*;
