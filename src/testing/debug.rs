//! Debug utilities for inspecting pipelines during test execution.
//!
//! This module provides an extension trait that adds pass-through debugging
//! stages to [`Jstream`]. Items are reported through the `log` facade at
//! `debug` level, so run tests with `RUST_LOG=jstream=debug` and an
//! initialised logger to see them.

use crate::collection::{JBound, Jstream};
use crate::stage::{Pull, Stage};
use std::fmt::Debug;
use std::rc::Rc;

/// Number of items logged individually before the rest are summarised.
const LOGGED_ITEMS: usize = 10;

struct DebugInspectStage<T> {
    upstream: Jstream<T>,
    label: Rc<str>,
    inspector: Rc<dyn Fn(&T)>,
}

impl<T: JBound + Debug> Stage<T> for DebugInspectStage<T> {
    fn name(&self) -> &'static str {
        "debug_inspect"
    }

    fn open(&self) -> Pull<T> {
        let label = Rc::clone(&self.label);
        let inspector = Rc::clone(&self.inspector);
        let mut seen = 0usize;
        let inner = self.upstream.iter().inspect(move |item| {
            if let Ok(x) = item {
                inspector(x);
                if seen < LOGGED_ITEMS {
                    log::debug!("[{label}] [{seen}]: {x:?}");
                }
                seen += 1;
            }
        });
        let label = Rc::clone(&self.label);
        Box::new(Finally::new(inner, move |count| {
            if count > LOGGED_ITEMS {
                log::debug!("[{label}] ... ({} more elements)", count - LOGGED_ITEMS);
            }
        }))
    }

    fn known_len(&self) -> Option<usize> {
        self.upstream.stage.known_len()
    }
}

struct DebugCountStage<T> {
    upstream: Jstream<T>,
    label: Rc<str>,
}

impl<T: JBound> Stage<T> for DebugCountStage<T> {
    fn name(&self) -> &'static str {
        "debug_count"
    }

    fn open(&self) -> Pull<T> {
        let label = Rc::clone(&self.label);
        Box::new(Finally::new(self.upstream.iter(), move |count| {
            log::debug!("[{label}] Count: {count} elements");
        }))
    }

    fn known_len(&self) -> Option<usize> {
        self.upstream.stage.known_len()
    }
}

/// Counts the items passing through and reports the total once the inner
/// iterator is exhausted.
struct Finally<I, F: FnMut(usize)> {
    inner: I,
    count: usize,
    on_end: Option<F>,
}

impl<I, F: FnMut(usize)> Finally<I, F> {
    fn new(inner: I, on_end: F) -> Self {
        Self {
            inner,
            count: 0,
            on_end: Some(on_end),
        }
    }
}

impl<I: Iterator, F: FnMut(usize)> Iterator for Finally<I, F> {
    type Item = I::Item;

    fn next(&mut self) -> Option<Self::Item> {
        let next = self.inner.next();
        match next {
            Some(_) => self.count += 1,
            None => {
                if let Some(mut on_end) = self.on_end.take() {
                    on_end(self.count);
                }
            }
        }
        next
    }
}

/// Extension trait for adding debug stages to [`Jstream`].
///
/// These stages pass every item through unchanged; they only observe.
pub trait JstreamDebugExt<T: JBound> {
    /// Insert a debug inspection point that logs the first items.
    ///
    /// # Example
    ///
    /// ```
    /// use jstream::Jstream;
    /// use jstream::testing::JstreamDebugExt;
    ///
    /// # fn main() -> anyhow::Result<()> {
    /// let result = Jstream::of(vec![1, 2, 3])
    ///     .debug_inspect("after source")
    ///     .map(|x| x * 2)
    ///     .debug_inspect("after map")
    ///     .to_vec()?;
    /// assert_eq!(result, vec![2, 4, 6]);
    /// # Ok(())
    /// # }
    /// ```
    #[must_use]
    fn debug_inspect(&self, label: &str) -> Jstream<T>
    where
        T: Debug;

    /// Insert a debug inspection point that also calls `inspector` on every
    /// item.
    #[must_use]
    fn debug_inspect_with<F>(&self, label: &str, inspector: F) -> Jstream<T>
    where
        T: Debug,
        F: Fn(&T) + 'static;

    /// Insert a debug point that logs how many items passed once the
    /// iteration completes.
    #[must_use]
    fn debug_count(&self, label: &str) -> Jstream<T>;
}

impl<T: JBound> JstreamDebugExt<T> for Jstream<T> {
    fn debug_inspect(&self, label: &str) -> Self
    where
        T: Debug,
    {
        self.debug_inspect_with(label, |_| {})
    }

    fn debug_inspect_with<F>(&self, label: &str, inspector: F) -> Self
    where
        T: Debug,
        F: Fn(&T) + 'static,
    {
        Self::new(
            DebugInspectStage {
                upstream: self.clone(),
                label: Rc::from(label),
                inspector: Rc::new(inspector),
            },
            self.props.derived(),
        )
    }

    fn debug_count(&self, label: &str) -> Self {
        Self::new(
            DebugCountStage {
                upstream: self.clone(),
                label: Rc::from(label),
            },
            self.props.derived(),
        )
    }
}
