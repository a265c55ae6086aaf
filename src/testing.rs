//! Testing utilities for jstream pipelines.
//!
//! This module provides a small testing facility for end-users to write
//! idiomatic Rust tests for their pipelines. It includes:
//!
//! - **Assertions**: Run a pipeline and compare its output with expected results
//! - **Debug utilities**: Observe items flowing through a pipeline via `log`
//!
//! # Quick Start
//!
//! ```
//! use jstream::Jstream;
//! use jstream::testing::*;
//!
//! # fn main() -> anyhow::Result<()> {
//! let doubled = Jstream::of(vec![1, 2, 3]).map(|x| x * 2);
//! assert_collections_equal(&doubled, &[2, 4, 6])?;
//! assert_reiterable(&doubled)?;
//! # Ok(())
//! # }
//! ```
//!
//! # Assertion Functions
//!
//! - [`assert_collections_equal`]: Exact order-dependent comparison
//! - [`assert_collections_unordered_equal`]: Order-independent comparison
//! - [`assert_kv_collections_equal`]: Compare key-value pairs (sorted by key)
//! - [`assert_all`]: Verify all elements match a predicate
//! - [`assert_any`]: Verify at least one element matches a predicate
//! - [`assert_none`]: Verify no elements match a predicate
//! - [`assert_reiterable`]: Verify two iterations agree
//!
//! # Debug Utilities
//!
//! ```
//! use jstream::Jstream;
//! use jstream::testing::JstreamDebugExt;
//!
//! # fn main() -> anyhow::Result<()> {
//! let evens = Jstream::of(vec![1, 2, 3, 4])
//!     .debug_inspect("after source")
//!     .filter(|x| x % 2 == 0)
//!     .debug_count("after filter")
//!     .to_vec()?;
//! assert_eq!(evens, vec![2, 4]);
//! # Ok(())
//! # }
//! ```

pub mod assertions;
pub mod debug;

// Re-export commonly used items
pub use assertions::*;
pub use debug::*;
