//! Error types for the bindery service container.
//!
//! This module defines a lightweight error model used across the container to
//! describe failures that can occur while registering, resolving, extending
//! and calling services.
//!
//! # Design
//!
//! - `ErrorKind` captures the error category.
//! - `Error` stores the category and a human-readable message.
//!
//! The helpers in `Error` keep call sites concise and messages consistent.
//!
//! # Feature Flags
//!
//! - `tracing`: logs errors when they are created.
//! - `debug`: prefixes the kind in `Display`.
//!
//! # Examples
//!
//! ```
//! use bindery::error::{Error, ErrorKind};
//!
//! let err = Error::not_instantiable("dyn Mailer");
//! assert_eq!(err.kind, ErrorKind::NotInstantiable);
//! assert!(err.message.contains("dyn Mailer"));
//! ```

use core::fmt;

#[cfg(feature = "tracing")]
use tracing::{debug, warn};

/// Error categories for the container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The requested id has no binding and cannot be built on its own.
    NotInstantiable,
    /// A parameter has no override, no binding and no default value.
    UnresolvableDependency,
    /// `call` received a target it cannot turn into a method invocation.
    InvalidCallableTarget,
    /// `extend` was used on an id without a binding.
    NotBound,
    /// Resolution (or alias lookup) came back to an id already in progress.
    CircularDependency,
    /// The resolved value is not of the requested type.
    TypeMismatch,
}

impl ErrorKind {
    /// Kinds that allow a parameter's default value to be used instead.
    pub fn is_resolution_failure(self) -> bool {
        matches!(
            self,
            ErrorKind::NotInstantiable | ErrorKind::UnresolvableDependency
        )
    }
}

/// Container error structure.
///
/// `kind` enables programmatic handling, while `message` is human-readable.
#[derive(Debug, Clone)]
pub struct Error {
    pub kind: ErrorKind,
    pub message: String,
}

impl Error {
    /// Creates a new error with the given kind and message.
    ///
    /// If the `tracing` feature is enabled, the error is logged. Resolution
    /// failures go to `debug` because a caller may still fall back to a
    /// default value.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        let error = Self {
            kind,
            message: message.into(),
        };

        #[cfg(feature = "tracing")]
        {
            if kind.is_resolution_failure() {
                debug!("{}", error);
            } else {
                warn!("{}", error);
            }
        }

        error
    }

    pub fn not_instantiable(abstract_name: &str) -> Self {
        Self::new(
            ErrorKind::NotInstantiable,
            format!("Target [{}] is not instantiable", abstract_name),
        )
    }

    /// A value parameter could not be satisfied.
    pub fn unresolvable_dependency(parameter: &str, owner: &str) -> Self {
        Self::new(
            ErrorKind::UnresolvableDependency,
            format!(
                "Unresolvable dependency resolving [{}] in [{}]",
                parameter, owner
            ),
        )
    }

    /// A constructor or callable body asked for an argument that was never supplied.
    pub fn missing_argument(parameter: &str) -> Self {
        Self::new(
            ErrorKind::UnresolvableDependency,
            format!("No argument supplied for parameter [{}]", parameter),
        )
    }

    pub fn method_not_provided(target: &str) -> Self {
        Self::new(
            ErrorKind::InvalidCallableTarget,
            format!("Method not provided for call target [{}]", target),
        )
    }

    pub fn method_not_registered(class: &str, method: &str) -> Self {
        Self::new(
            ErrorKind::InvalidCallableTarget,
            format!("Method [{}@{}] is not registered", class, method),
        )
    }

    pub fn not_bound(abstract_name: &str) -> Self {
        Self::new(
            ErrorKind::NotBound,
            format!("Type [{}] is not bound", abstract_name),
        )
    }

    /// Circular dependency detected in resolution chain.
    pub fn circular_dependency(dependency_chain: &[&str]) -> Self {
        Self::new(
            ErrorKind::CircularDependency,
            format!(
                "Circular dependency detected: {}",
                dependency_chain.join(" -> ")
            ),
        )
    }

    pub fn type_mismatch(abstract_name: &str, expected: &str) -> Self {
        Self::new(
            ErrorKind::TypeMismatch,
            format!(
                "Type mismatch when resolving [{}]: expected {}",
                abstract_name, expected
            ),
        )
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        #[cfg(feature = "debug")]
        {
            write!(f, "({:?}) - {}", self.kind, self.message)
        }
        #[cfg(not(feature = "debug"))]
        {
            write!(f, "{}", self.message)
        }
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_instantiable_error() {
        let err = Error::not_instantiable("dyn Cache");
        assert_eq!(err.kind, ErrorKind::NotInstantiable);
        assert!(err.message.contains("dyn Cache"));
        assert!(err.message.contains("not instantiable"));
    }

    #[test]
    fn unresolvable_dependency_error() {
        let err = Error::unresolvable_dependency("retries", "Client");
        assert_eq!(err.kind, ErrorKind::UnresolvableDependency);
        assert!(err.message.contains("retries"));
        assert!(err.message.contains("Client"));
    }

    #[test]
    fn callable_errors_share_kind() {
        let missing = Error::method_not_provided("Greeter");
        let unknown = Error::method_not_registered("Greeter", "wave");
        assert_eq!(missing.kind, unknown.kind);
        assert!(unknown.message.contains("Greeter@wave"));
    }

    #[test]
    fn circular_dependency_error() {
        let chain = ["A", "B", "A"];
        let err = Error::circular_dependency(&chain);
        assert_eq!(err.kind, ErrorKind::CircularDependency);
        assert!(err.message.contains("A -> B -> A"));
    }

    #[test]
    fn resolution_failures_allow_fallback() {
        assert!(ErrorKind::NotInstantiable.is_resolution_failure());
        assert!(ErrorKind::UnresolvableDependency.is_resolution_failure());
        assert!(!ErrorKind::CircularDependency.is_resolution_failure());
        assert!(!ErrorKind::TypeMismatch.is_resolution_failure());
    }

    #[test]
    fn display_trait() {
        let err = Error::not_bound("cache");
        let s = format!("{}", err);
        #[cfg(feature = "debug")]
        assert!(s.contains("NotBound"));
        assert!(s.contains("cache"));
    }
}
