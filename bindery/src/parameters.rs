//! Override parameters passed into resolution, and the argument lists handed
//! to constructors and callable bodies.
//!
//! [`Parameters`] are what a caller supplies to `make_with`, `build` or
//! `call`: values keyed by parameter name, or by position. Positional values
//! are remapped onto the declared parameter names before injection.
//!
//! [`Arguments`] are what a constructor receives once every declared
//! parameter has been satisfied from an override, the container, or a
//! default.
//!
//! ```
//! use bindery::Parameters;
//!
//! let params = Parameters::new()
//!     .with("name", String::from("Ada"))
//!     .push(3u32);
//!
//! assert_eq!(params.len(), 2);
//! assert!(params.contains("name"));
//! ```

use crate::error::Error;
use crate::instance::{ErasedInstance, Instance};
use crate::runtime::{MaybeSync, Shared};

/// Caller-supplied overrides.
#[derive(Clone, Default)]
pub struct Parameters {
    named: Vec<(String, ErasedInstance)>,
    positional: Vec<ErasedInstance>,
}

#[cfg(feature = "debug")]
impl std::fmt::Debug for Parameters {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Parameters")
            .field(
                "named",
                &self.named.iter().map(|(name, _)| name).collect::<Vec<_>>(),
            )
            .field("positional", &self.positional.len())
            .finish()
    }
}

impl Parameters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a named override. A later value for the same name replaces it.
    pub fn with<T>(self, name: impl Into<String>, value: T) -> Self
    where
        T: MaybeSync + 'static,
    {
        self.with_shared(name, Shared::new(value))
    }

    /// Adds a named override that is already shared, such as a trait object.
    pub fn with_shared<T>(mut self, name: impl Into<String>, value: Shared<T>) -> Self
    where
        T: ?Sized + MaybeSync + 'static,
    {
        self.insert(name.into(), Instance::erase(value));
        self
    }

    /// Adds a positional override.
    pub fn push<T>(self, value: T) -> Self
    where
        T: MaybeSync + 'static,
    {
        self.push_shared(Shared::new(value))
    }

    pub fn push_shared<T>(mut self, value: Shared<T>) -> Self
    where
        T: ?Sized + MaybeSync + 'static,
    {
        self.positional.push(Instance::erase(value));
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.named.iter().any(|(key, _)| key == name)
    }

    pub fn len(&self) -> usize {
        self.named.len() + self.positional.len()
    }

    pub fn is_empty(&self) -> bool {
        self.named.is_empty() && self.positional.is_empty()
    }

    fn insert(&mut self, name: String, value: ErasedInstance) {
        match self.named.iter_mut().find(|(key, _)| *key == name) {
            Some(slot) => slot.1 = value,
            None => self.named.push((name, value)),
        }
    }

    /// Moves positional overrides onto `names` in order. Positional values
    /// beyond the last name stay positional.
    pub(crate) fn rekey<'a>(&self, names: impl IntoIterator<Item = &'a str>) -> Self {
        let mut keyed = Self {
            named: self.named.clone(),
            positional: Vec::new(),
        };
        let mut positional = self.positional.iter().cloned();

        for name in names {
            match positional.next() {
                Some(value) => keyed.insert(name.to_string(), value),
                None => break,
            }
        }
        keyed.positional.extend(positional);
        keyed
    }

    pub(crate) fn take(&mut self, name: &str) -> Option<ErasedInstance> {
        let index = self.named.iter().position(|(key, _)| key == name)?;
        Some(self.named.remove(index).1)
    }

    /// Whatever was not consumed: remaining named values, then positional ones.
    pub(crate) fn into_rest(self) -> Vec<ErasedInstance> {
        self.named
            .into_iter()
            .map(|(_, value)| value)
            .chain(self.positional)
            .collect()
    }
}

/// Arguments assembled for a constructor or callable body.
///
/// Every declared parameter has a slot; optional dependencies that could
/// not be resolved hold `None`.
pub struct Arguments {
    values: Vec<(&'static str, Option<ErasedInstance>)>,
    rest: Vec<ErasedInstance>,
}

impl Arguments {
    pub(crate) fn new(
        values: Vec<(&'static str, Option<ErasedInstance>)>,
        rest: Vec<ErasedInstance>,
    ) -> Self {
        Self { values, rest }
    }

    /// A required service or value, as shared.
    pub fn service<T>(&self, name: &str) -> Result<Shared<T>, Error>
    where
        T: ?Sized + 'static,
    {
        self.optional::<T>(name)?
            .ok_or_else(|| Error::missing_argument(name))
    }

    /// An optional dependency; `None` when it fell back to its null default.
    pub fn optional<T>(&self, name: &str) -> Result<Option<Shared<T>>, Error>
    where
        T: ?Sized + 'static,
    {
        let slot = self
            .values
            .iter()
            .find(|(key, _)| *key == name)
            .and_then(|(_, value)| value.as_ref());

        match slot {
            Some(erased) => Instance::<T>::downcast(erased)
                .map(Some)
                .ok_or_else(|| Error::type_mismatch(name, std::any::type_name::<T>())),
            None => Ok(None),
        }
    }

    /// A plain value, cloned out of its shared slot.
    pub fn value<T>(&self, name: &str) -> Result<T, Error>
    where
        T: Clone + 'static,
    {
        self.service::<T>(name).map(|value| (*value).clone())
    }

    /// Overrides that matched no declared parameter, in the order supplied.
    pub fn rest(&self) -> &[ErasedInstance] {
        &self.rest
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn later_named_value_replaces_earlier() {
        let mut params = Parameters::new().with("x", 1u32).with("x", 2u32);
        assert_eq!(params.len(), 1);

        let value = params.take("x").expect("x");
        assert_eq!(Instance::<u32>::downcast(&value).as_deref(), Some(&2));
        assert!(params.is_empty());
    }

    #[test]
    fn rekey_maps_positions_to_names() {
        let params = Parameters::new()
            .with("b", String::from("named"))
            .push(String::from("first"))
            .push(String::from("second"))
            .push(String::from("third"));

        let mut keyed = params.rekey(["a", "b"]);
        let a = keyed.take("a").expect("a");
        let b = keyed.take("b").expect("b");
        assert_eq!(Instance::<String>::downcast(&a).as_deref().map(String::as_str), Some("first"));
        assert_eq!(Instance::<String>::downcast(&b).as_deref().map(String::as_str), Some("second"));

        let rest = keyed.into_rest();
        assert_eq!(rest.len(), 1);
        assert_eq!(Instance::<String>::downcast(&rest[0]).as_deref().map(String::as_str), Some("third"));
    }

    #[test]
    fn arguments_typed_access() {
        let args = Arguments::new(
            vec![
                ("name", Some(Instance::erase(Shared::new(String::from("Ada"))))),
                ("cache", None),
            ],
            Vec::new(),
        );

        assert_eq!(args.value::<String>("name").unwrap(), "Ada");
        assert!(args.optional::<u8>("cache").unwrap().is_none());

        let Err(err) = args.service::<u8>("cache") else {
            panic!("missing argument should fail");
        };
        assert_eq!(err.kind, ErrorKind::UnresolvableDependency);

        let Err(err) = args.value::<u32>("name") else {
            panic!("wrong type should fail");
        };
        assert_eq!(err.kind, ErrorKind::TypeMismatch);
    }
}
