//! Runtime type definitions for shared ownership and interior mutability.
//!
//! This module provides conditional type aliases based on the `thread-safe` feature flag:
//!
//! - When `thread-safe` is enabled: Uses thread-safe types (`Arc` and `RwLock`)
//! - When `thread-safe` is disabled: Uses single-threaded types (`Rc` and `RefCell`)
//!
//! # Type Aliases
//!
//! - [`Shared<T>`]: Smart pointer for shared ownership
//! - [`Store<T>`]: Container providing interior mutability
//! - [`AnyValue`]: The type-erased payload the container stores
//!
//! The [`MaybeSync`] marker carries the `Send + Sync` requirement only when
//! the `thread-safe` feature is on, so service bounds can be written once.
//!
//! # Examples
//!
//! ```
//! use bindery::runtime::{Shared, Store};
//!
//! let value = Store::new(42);
//! let shared = Shared::new(value);
//! ```

use std::any::Any;

#[cfg(feature = "thread-safe")]
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

#[cfg(not(feature = "thread-safe"))]
use std::{
    cell::{Ref, RefCell, RefMut},
    rc::Rc,
};

/// Type alias for shared ownership of data.
///
/// When the `thread-safe` feature is enabled, this is [`Arc<T>`].
/// When disabled, this is [`Rc<T>`].
///
/// Identity of resolved services is observable through `Shared::ptr_eq`.
#[cfg(feature = "thread-safe")]
pub type Shared<T> = Arc<T>;
#[cfg(not(feature = "thread-safe"))]
pub type Shared<T> = Rc<T>;

/// Type alias for interior mutability.
///
/// [`RwLock<T>`] with `thread-safe`, [`RefCell<T>`] otherwise.
#[cfg(feature = "thread-safe")]
pub type Store<T> = RwLock<T>;
#[cfg(not(feature = "thread-safe"))]
pub type Store<T> = RefCell<T>;

/// Type-erased value held by the container.
#[cfg(feature = "thread-safe")]
pub type AnyValue = dyn Any + Send + Sync;
#[cfg(not(feature = "thread-safe"))]
pub type AnyValue = dyn Any;

/// Marker for values the container may hold.
///
/// Implies `Send + Sync` with the `thread-safe` feature and nothing otherwise.
#[cfg(feature = "thread-safe")]
pub trait MaybeSync: Send + Sync {}
#[cfg(feature = "thread-safe")]
impl<T: ?Sized + Send + Sync> MaybeSync for T {}

/// Marker for values the container may hold.
///
/// Implies `Send + Sync` with the `thread-safe` feature and nothing otherwise.
#[cfg(not(feature = "thread-safe"))]
pub trait MaybeSync {}
#[cfg(not(feature = "thread-safe"))]
impl<T: ?Sized> MaybeSync for T {}

#[cfg(feature = "thread-safe")]
pub(crate) fn read<T>(store: &Store<T>) -> RwLockReadGuard<'_, T> {
    store.read().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(feature = "thread-safe")]
pub(crate) fn write<T>(store: &Store<T>) -> RwLockWriteGuard<'_, T> {
    store.write().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(not(feature = "thread-safe"))]
pub(crate) fn read<T>(store: &Store<T>) -> Ref<'_, T> {
    store.borrow()
}

#[cfg(not(feature = "thread-safe"))]
pub(crate) fn write<T>(store: &Store<T>) -> RefMut<'_, T> {
    store.borrow_mut()
}
