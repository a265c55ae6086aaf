//! Error kinds raised by stage construction and terminal operations.
//!
//! Fallible operations return [`anyhow::Result`], the same way the rest of the
//! crate does. The concrete kind travels inside the `anyhow::Error` and can be
//! recovered with [`anyhow::Error::downcast_ref`]:
//!
//! ```
//! use jstream::*;
//!
//! let naturals = Jstream::generate(|i| i);
//! let err = naturals.to_vec().unwrap_err();
//! assert!(matches!(
//!     err.downcast_ref::<StreamError>(),
//!     Some(StreamError::NeverEnding { .. })
//! ));
//! ```

use thiserror::Error;

/// The failure taxonomy of the pipeline engine.
///
/// A failed call never corrupts the stage it was invoked on: stages are
/// immutable, so the same `Jstream` can be used again after an error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StreamError {
    /// An operation that needs the whole input was invoked on a stage whose
    /// `infinite` property is asserted.
    #[error("never-ending operation: `{operation}` cannot complete on an infinite stream")]
    NeverEnding { operation: &'static str },

    /// `reduce` without an initial value on an empty input.
    #[error("`{operation}` requires at least one item but the stream was empty")]
    EmptyInput { operation: &'static str },

    /// A numeric or shape argument that can never be satisfied.
    #[error("invalid argument `{argument}`: {reason}")]
    InvalidArgument {
        argument: &'static str,
        reason: String,
    },

    /// The smart comparator was asked to order two values of different kinds.
    #[error("cannot compare a {left} with a {right}")]
    Incomparable {
        left: &'static str,
        right: &'static str,
    },

    /// A strict merge observed an input that was not sorted by the given order.
    #[error("`{operation}` input is out of order at position {position}")]
    OutOfOrder {
        operation: &'static str,
        position: usize,
    },
}

impl StreamError {
    pub(crate) fn never_ending(operation: &'static str) -> Self {
        Self::NeverEnding { operation }
    }

    pub(crate) fn invalid(argument: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            argument,
            reason: reason.into(),
        }
    }
}
