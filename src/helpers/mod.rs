pub(crate) mod combine;
pub(crate) mod distinct;
pub(crate) mod extremes;
pub(crate) mod grouping;
pub(crate) mod joins;
pub(crate) mod memoize;
pub(crate) mod reshape;
pub(crate) mod slicing;
pub(crate) mod terminal;

// Only re-export files with top-level items
pub use reshape::{RandomSource, thread_random};
