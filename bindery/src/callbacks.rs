//! Resolution and rebinding hooks.

use std::collections::HashMap;

use crate::container::Container;
use crate::instance::{ErasedInstance, Instance};
use crate::key::Abstract;
use crate::runtime::{MaybeSync, Shared};
use crate::types::{ReboundCallback, ResolvingCallback};

#[cfg(feature = "tracing")]
use tracing::trace;

#[derive(Default)]
pub(crate) struct Callbacks {
    resolving: HashMap<Abstract, Vec<ResolvingCallback>>,
    global_resolving: Vec<ResolvingCallback>,
    after_resolving: HashMap<Abstract, Vec<ResolvingCallback>>,
    global_after_resolving: Vec<ResolvingCallback>,
    rebound: HashMap<Abstract, Vec<ReboundCallback>>,
}

impl Callbacks {
    /// `None` registers a global hook.
    pub(crate) fn add_resolving(&mut self, key: Option<Abstract>, callback: ResolvingCallback) {
        match key {
            Some(key) => self.resolving.entry(key).or_default().push(callback),
            None => self.global_resolving.push(callback),
        }
    }

    pub(crate) fn add_after_resolving(
        &mut self,
        key: Option<Abstract>,
        callback: ResolvingCallback,
    ) {
        match key {
            Some(key) => self.after_resolving.entry(key).or_default().push(callback),
            None => self.global_after_resolving.push(callback),
        }
    }

    pub(crate) fn add_rebound(&mut self, key: Abstract, callback: ReboundCallback) {
        self.rebound.entry(key).or_default().push(callback);
    }

    /// Hooks to fire after `key` was built, in firing order.
    pub(crate) fn for_resolution(&self, key: &Abstract) -> Vec<ResolvingCallback> {
        let empty = Vec::new();
        self.resolving
            .get(key)
            .unwrap_or(&empty)
            .iter()
            .chain(&self.global_resolving)
            .chain(self.after_resolving.get(key).unwrap_or(&empty))
            .chain(&self.global_after_resolving)
            .cloned()
            .collect()
    }

    pub(crate) fn for_rebound(&self, key: &Abstract) -> Vec<ReboundCallback> {
        self.rebound.get(key).cloned().unwrap_or_default()
    }

    #[cfg(any(test, feature = "debug"))]
    pub(crate) fn len(&self) -> usize {
        self.resolving.values().map(Vec::len).sum::<usize>()
            + self.global_resolving.len()
            + self.after_resolving.values().map(Vec::len).sum::<usize>()
            + self.global_after_resolving.len()
            + self.rebound.values().map(Vec::len).sum::<usize>()
    }
}

/// Adapts a typed resolving hook; objects of another type are skipped.
pub(crate) fn resolving<T, F>(callback: F) -> ResolvingCallback
where
    T: ?Sized + 'static,
    F: Fn(&Shared<T>, &Container) + MaybeSync + 'static,
{
    Shared::new(
        move |key: &Abstract, object: &ErasedInstance, container: &Container| {
            match Instance::<T>::downcast(object) {
                Some(object) => callback(&object, container),
                None => {
                    #[cfg(feature = "tracing")]
                    trace!(
                        "Skipping resolving callback for {}: object is not {}",
                        key,
                        std::any::type_name::<T>()
                    );
                    #[cfg(not(feature = "tracing"))]
                    let _ = key;
                }
            }
        },
    )
}

/// Adapts a typed rebound hook; objects of another type are skipped.
pub(crate) fn rebound<T, F>(callback: F) -> ReboundCallback
where
    T: ?Sized + 'static,
    F: Fn(&Container, Shared<T>) + MaybeSync + 'static,
{
    Shared::new(move |container: &Container, object: &ErasedInstance| {
        if let Some(object) = Instance::<T>::downcast(object) {
            callback(container, object);
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn recorder(log: &Shared<Mutex<Vec<&'static str>>>, label: &'static str) -> ResolvingCallback {
        let log = log.clone();
        Shared::new(move |_: &Abstract, _: &ErasedInstance, _: &Container| {
            log.lock().unwrap().push(label);
        })
    }

    #[test]
    fn resolution_hooks_fire_in_order() {
        let log = Shared::new(Mutex::new(Vec::new()));
        let key = Abstract::named("svc");
        let mut callbacks = Callbacks::default();

        callbacks.add_after_resolving(None, recorder(&log, "global-after"));
        callbacks.add_resolving(None, recorder(&log, "global"));
        callbacks.add_after_resolving(Some(key.clone()), recorder(&log, "after"));
        callbacks.add_resolving(Some(key.clone()), recorder(&log, "resolving"));
        callbacks.add_resolving(Some(Abstract::named("other")), recorder(&log, "other"));

        let container = Container::new();
        let object = Instance::erase(Shared::new(1u8));
        for callback in callbacks.for_resolution(&key) {
            callback(&key, &object, &container);
        }

        assert_eq!(
            *log.lock().unwrap(),
            ["resolving", "global", "after", "global-after"]
        );
        assert_eq!(callbacks.len(), 5);
    }

    #[test]
    fn typed_hook_skips_other_types() {
        let hits = Shared::new(Mutex::new(0));
        let counter = hits.clone();
        let callback = resolving::<u8, _>(move |value, _| {
            *counter.lock().unwrap() += usize::from(**value);
        });

        let container = Container::new();
        let key = Abstract::named("n");
        callback(&key, &Instance::erase(Shared::new(5u8)), &container);
        callback(&key, &Instance::erase(Shared::new(String::new())), &container);

        assert_eq!(*hits.lock().unwrap(), 5);
    }
}
