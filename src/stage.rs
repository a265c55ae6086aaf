//! The stage abstraction behind every [`Jstream`](crate::Jstream).
//!
//! A stage is one immutable node in a deferred pipeline. It holds its
//! predecessor(s) and parameters as typed fields and knows how to produce a
//! fresh pull iterator on demand. Nothing is evaluated until [`Stage::open`]
//! is called by a terminal operation, and every terminal call opens the chain
//! exactly once.
//!
//! Implement this trait to plug a custom stage into a pipeline with
//! [`Jstream::from_stage`](crate::Jstream::from_stage).

use anyhow::Result;
use std::any::Any;

/// A pull iterator produced by opening a stage.
///
/// Items are `Result`s so that failures discovered while evaluating (for
/// example, two keys the smart comparator cannot order) surface at the
/// terminal call instead of panicking mid-iteration.
pub type Pull<T> = Box<dyn Iterator<Item = Result<T>>>;

pub trait Stage<T>: 'static {
    /// Short, stable name used in log lines.
    fn name(&self) -> &'static str;

    /// Produce a new pull iterator over this stage's output.
    fn open(&self) -> Pull<T>;

    /// The number of items this stage will produce, if it is known in O(1)
    /// without opening anything.
    fn known_len(&self) -> Option<usize> {
        None
    }

    /// Materialize into a buffer owned by the caller, when the stage builds a
    /// private buffer anyway (sort, shuffle, reverse, ...).
    ///
    /// Only consulted when the stage's properties assert `fresh_source`.
    fn open_fresh(&self) -> Option<Result<Vec<T>>> {
        None
    }

    /// Concrete-type access for container views (`as_vec`, `as_set`, `as_map`).
    fn as_any(&self) -> Option<&dyn Any> {
        None
    }
}

/// A pull iterator that yields a single error and stops.
pub(crate) fn failed<T: 'static>(err: impl Into<anyhow::Error>) -> Pull<T> {
    Box::new(std::iter::once(Err(err.into())))
}

/// A pull iterator over an owned buffer.
pub(crate) fn from_buffer<T: 'static>(items: Vec<T>) -> Pull<T> {
    Box::new(items.into_iter().map(Ok))
}

/// Drain a pull iterator, stopping at the first error.
pub(crate) fn drain<T>(pull: Pull<T>) -> Result<Vec<T>> {
    pull.collect()
}

/// A stage kind that must drain its input before producing anything
/// (sort, reverse, take-last, shuffle, ...).
pub(crate) trait Materialize<T>: 'static {
    fn name(&self) -> &'static str;

    /// Build the complete, privately owned output buffer.
    fn build(&self) -> Result<Vec<T>>;

    fn known_len(&self) -> Option<usize> {
        None
    }
}

/// Adapts a [`Materialize`] kind into a [`Stage`] whose every open builds a
/// fresh buffer.
pub(crate) struct Buffered<M>(pub(crate) M);

impl<T, M> Stage<T> for Buffered<M>
where
    T: 'static,
    M: Materialize<T>,
{
    fn name(&self) -> &'static str {
        self.0.name()
    }

    fn open(&self) -> Pull<T> {
        match self.0.build() {
            Ok(items) => from_buffer(items),
            Err(e) => failed(e),
        }
    }

    fn known_len(&self) -> Option<usize> {
        self.0.known_len()
    }

    fn open_fresh(&self) -> Option<Result<Vec<T>>> {
        Some(self.0.build())
    }
}
