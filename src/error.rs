//! Error types for registration, morphisms and chained calls.
//!
//! Registration errors are raised while the method table is being built,
//! before any chain exists. Everything else surfaces from a call on a
//! [`Chain`](crate::Chain) as a [`ChainError`].

/// Why a method name was rejected by the method table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum InvalidName {
    /// The name is empty or whitespace only.
    #[error("name is empty")]
    Empty,
    /// The name is taken by a built-in chain operation (`force`).
    #[error("name is reserved")]
    Reserved,
}

/// Errors raised while populating a [`MethodTable`](crate::MethodTable).
///
/// # Examples
///
/// ```rust
/// use chainfuse::{InvalidName, MethodTable, RegistrationError, functor};
///
/// let mut table = MethodTable::<i32>::new();
/// let error = table
///     .register_functor("force", functor(|value, _| Ok(value)))
///     .unwrap_err();
///
/// assert_eq!(
///     error,
///     RegistrationError::InvalidFunctor {
///         name: "force".to_string(),
///         reason: InvalidName::Reserved,
///     }
/// );
/// assert_eq!(error.to_string(), "invalid functor `force`: name is reserved");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistrationError {
    /// A lazy functor could not be bound under the given name.
    #[error("invalid functor `{name}`: {reason}")]
    InvalidFunctor {
        /// The rejected name.
        name: String,
        /// Why it was rejected.
        reason: InvalidName,
    },
    /// An ordinary method could not be bound under the given name.
    #[error("invalid method `{name}`: {reason}")]
    InvalidMethod {
        /// The rejected name.
        name: String,
        /// Why it was rejected.
        reason: InvalidName,
    },
}

/// Failure reported by a single morphism arrow.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct MorphismFailure {
    message: String,
}

impl MorphismFailure {
    /// Creates a failure carrying the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Returns the failure message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Failure reported by an ordinary (non-lazy) method body.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct MethodFailure {
    message: String,
}

impl MethodFailure {
    /// Creates a failure carrying the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Returns the failure message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Errors surfaced by calls on a [`Chain`](crate::Chain).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChainError {
    /// No method with this name exists in the proxy's table.
    #[error("no method named `{name}` is registered")]
    UnknownMethod {
        /// The requested name.
        name: String,
    },
    /// A composed morphism failed while the chain was being flushed.
    ///
    /// Elements before `index` were already replaced. The slot at `index` and
    /// every later slot keep their old values, although arrows that ran
    /// before the failing one may have mutated a shared element in place.
    /// The chain is idle again.
    #[error("morphism {} failed on element {index}: {source}", describe(.method))]
    Morphism {
        /// Position of the element the arrow failed on.
        index: usize,
        /// Name of the lazy method that queued the failing arrow, if known.
        method: Option<String>,
        /// The arrow's own failure.
        source: MorphismFailure,
    },
    /// An ordinary method body failed.
    #[error("method `{name}` failed: {source}")]
    Method {
        /// The method that failed.
        name: String,
        /// The body's own failure.
        source: MethodFailure,
    },
}

fn describe(method: &Option<String>) -> String {
    method
        .as_deref()
        .map_or_else(|| "<anonymous>".to_string(), |name| format!("`{name}`"))
}
