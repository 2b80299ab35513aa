use crate::runtime::{AnyValue, MaybeSync, Shared};

/// A type-erased shared object as stored in the container.
pub type ErasedInstance = Shared<AnyValue>;

/// Sized wrapper that lets a `Shared<T>` for an unsized `T` (e.g. `dyn Trait`)
/// travel through `Any`.
pub struct Instance<T: ?Sized + 'static> {
    value: Shared<T>,
}

impl<T: ?Sized + 'static> Instance<T> {
    pub fn new(value: Shared<T>) -> Self {
        Self { value }
    }

    pub fn value(&self) -> Shared<T> {
        self.value.clone()
    }

    /// Recovers the typed object, or `None` when `erased` holds another type.
    pub fn downcast(erased: &ErasedInstance) -> Option<Shared<T>> {
        erased
            .downcast_ref::<Instance<T>>()
            .map(|instance| instance.value())
    }
}

impl<T: ?Sized + MaybeSync + 'static> Instance<T> {
    pub fn erase(value: Shared<T>) -> ErasedInstance {
        Shared::new(Self::new(value))
    }
}

impl<T: ?Sized + 'static> Clone for Instance<T> {
    fn clone(&self) -> Self {
        Self {
            value: self.value.clone(),
        }
    }
}
