//! # Jstream
//!
//! **Lazy, composable, re-iterable sequence pipelines** for Rust.
//! Jstream lets you describe a chain of transformations over a sequence
//! (map, filter, sort, group, join, dedupe, slice, ...) without running
//! anything, then evaluate it on demand with a terminal call.
//!
//! ## Key Features
//!
//! - **Deferred evaluation** - nothing runs until a terminal method is called
//! - **Immutable stages** - every transformation returns a new [`Jstream`]; clones are cheap
//! - **Re-iterable** - a pipeline over a container gives the same items on every run
//! - **Stable multi-key sorting** - [`sort_by`](Jstream::sort_by) + [`then_by`](SortedJstream::then_by)
//! - **Bounded top-k** - [`min_n`](Jstream::min_n) / [`max_n`](Jstream::max_n) in one pass with `O(k)` memory
//! - **Joins** - indexed and predicate-based inner, left and group joins
//! - **Infinite sources** - generators are supported, and operations that need the
//!   whole input refuse them up front with [`StreamError::NeverEnding`]
//!
//! ## Quick Start
//!
//! ```
//! use jstream::*;
//! # use anyhow::Result;
//!
//! # fn main() -> Result<()> {
//! let words = Jstream::of(vec!["pear", "fig", "apple", "kiwi", "fig"]);
//!
//! let sorted = words
//!     .unique()
//!     .sort_by(Order::by_key(|w: &&str| w.len()))?
//!     .then_by(Order::natural());
//!
//! assert_eq!(sorted.to_vec()?, vec!["fig", "kiwi", "pear", "apple"]);
//! // the pipeline is untouched and can run again
//! assert_eq!(sorted.first()?, Some("fig"));
//! # Ok(())
//! # }
//! ```
//!
//! ## Core Concepts
//!
//! ### Stages
//!
//! A [`Jstream<T>`] is one immutable node of a deferred pipeline. It holds a
//! [`Stage`] (which knows how to open a fresh pull iterator) and a set of
//! [`Properties`] describing the source. Sources come in two flavours:
//! - **re-iterable**: [`Jstream::of`], [`Jstream::over`], [`Jstream::from_fn`],
//!   [`Jstream::generate`], [`Jstream::over_set`], [`Jstream::over_map`]
//! - **one-shot**: [`Jstream::once`] wraps a single-use iterator; only the first
//!   terminal call sees its items. [`memoize`](Jstream::memoize) or
//!   [`collapse`](Jstream::collapse) make it re-iterable.
//!
//! ### Transformations
//!
//! #### Pass-through (lazy, pull-driven)
//! - [`map`](Jstream::map), [`filter`](Jstream::filter), [`filter_by`](Jstream::filter_by)
//! - [`skip`](Jstream::skip), [`take`](Jstream::take) and their `_while` / `_until` forms
//! - [`concat`](Jstream::concat), [`interleave`](Jstream::interleave), [`merge`](Jstream::merge)
//! - [`unique`](Jstream::unique), [`flatten`](Jstream::flatten), [`split`](Jstream::split)
//!
//! #### Materializing (drain the input when iterated)
//! - [`sort_by`](Jstream::sort_by), [`group_by`](Jstream::group_by), [`reverse`](Jstream::reverse)
//! - [`take_last`](Jstream::take_last), [`skip_last`](Jstream::skip_last),
//!   [`shuffle`](Jstream::shuffle), [`copy_within`](Jstream::copy_within)
//!
//! These return `Result` and fail immediately on a stage known to be infinite.
//!
//! ### Terminal operations
//!
//! [`to_vec`](Jstream::to_vec), [`count`](Jstream::count), [`first`](Jstream::first),
//! [`reduce`](Jstream::reduce), [`fold`](Jstream::fold), [`min`](Jstream::min), ...
//! Each opens the pipeline exactly once and returns [`anyhow::Result`].
//!
//! ## Error Handling
//!
//! Fallible calls return [`anyhow::Result`]. The concrete kind is a
//! [`StreamError`] carried inside the error; recover it with
//! `err.downcast_ref::<StreamError>()`.
//!
//! ## Feature Flags
//!
//! - `json` (default) - [`to_object`](Jstream::to_object) renders key-value
//!   pipelines as a `serde_json` object
//!
//! ## Module Overview
//!
//! - [`collection`] - Core `Jstream` type, sources and element-wise transforms
//! - [`sorted`] - Sorted stages with composable tie-break keys
//! - [`ordering`] - Comparator composition and the default smart order
//! - [`selector`] - Bounded stable top-k selection
//! - [`properties`] - Three-valued source properties
//! - [`stage`] - The stage trait for custom stages
//! - [`extensions`] - Composite transforms and `pipe`
//! - [`testing`] - Assertions and debug stages for tests

pub mod collection;
pub mod error;
pub mod extensions;
pub mod helpers;
pub mod ordering;
pub mod properties;
pub mod selector;
pub mod sorted;
mod source;
pub mod stage;
pub mod testing;

// General re-exports
pub use collection::{Comparison, JBound, Jstream};
pub use error::StreamError;
pub use extensions::CompositeTransform;
pub use helpers::*;
pub use ordering::{Order, Primitive, SmartOrd};
pub use properties::{Properties, Tri};
pub use selector::BoundedSelector;
pub use sorted::SortedJstream;
pub use stage::{Pull, Stage};
