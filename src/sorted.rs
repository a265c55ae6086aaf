//! Sorted stages with lazily applied, composable sort keys.
//!
//! A [`SortedJstream`] remembers the *unsorted* stage it came from plus the
//! ordered list of sort keys. Appending a tie-break key with
//! [`then_by`](SortedJstream::then_by) builds a new sorted stage over the
//! original unsorted source with the extended key list, so a chain of
//! `sort_by(..).then_by(..).then_by(..)` sorts exactly once, when iterated,
//! and gives the same result as sorting by all keys up front.
//!
//! The sort is stable: items equal under every key keep their input order.

use crate::collection::{JBound, Jstream};
use crate::ordering::{Order, SmartOrd, stable_sort};
use crate::stage::Materialize;
use anyhow::Result;
use std::ops::Deref;

struct SortStage<T> {
    upstream: Jstream<T>,
    order: Order<T>,
    keys: usize,
}

impl<T: JBound> Materialize<T> for SortStage<T> {
    fn name(&self) -> &'static str {
        "sort"
    }

    fn build(&self) -> Result<Vec<T>> {
        let items = self.upstream.materialize("sort")?;
        log::debug!("sorting {} items by {} key(s)", items.len(), self.keys);
        stable_sort(items, &self.order)
    }

    fn known_len(&self) -> Option<usize> {
        self.upstream.stage.known_len()
    }
}

/// A stage sorted by one or more keys. Dereferences to [`Jstream`], so every
/// transformation and terminal operation is available on it directly.
pub struct SortedJstream<T> {
    sorted: Jstream<T>,
    unsorted: Jstream<T>,
    orders: Vec<Order<T>>,
}

impl<T> Clone for SortedJstream<T> {
    fn clone(&self) -> Self {
        Self {
            sorted: self.sorted.clone(),
            unsorted: self.unsorted.clone(),
            orders: self.orders.clone(),
        }
    }
}

impl<T: JBound> SortedJstream<T> {
    fn build(unsorted: Jstream<T>, orders: Vec<Order<T>>) -> Self {
        let stage = SortStage {
            upstream: unsorted.clone(),
            order: Order::chain(&orders),
            keys: orders.len(),
        };
        Self {
            sorted: Jstream::buffered(stage),
            unsorted,
            orders,
        }
    }

    /// Break ties of the current keys with `order`.
    #[must_use]
    pub fn then_by(&self, order: Order<T>) -> Self {
        let mut orders = self.orders.clone();
        orders.push(order);
        Self::build(self.unsorted.clone(), orders)
    }

    /// Break ties of the current keys with `order`, reversed.
    #[must_use]
    pub fn then_by_descending(&self, order: Order<T>) -> Self {
        self.then_by(order.reversed())
    }

    /// Number of sort keys registered so far.
    #[must_use]
    pub fn key_count(&self) -> usize {
        self.orders.len()
    }

    /// Drop the sorted-stage wrapper.
    #[must_use]
    pub fn into_stream(self) -> Jstream<T> {
        self.sorted
    }
}

impl<T> Deref for SortedJstream<T> {
    type Target = Jstream<T>;

    fn deref(&self) -> &Self::Target {
        &self.sorted
    }
}

impl<T> From<SortedJstream<T>> for Jstream<T> {
    fn from(sorted: SortedJstream<T>) -> Self {
        sorted.sorted
    }
}

impl<T: JBound> Jstream<T> {
    /// Sort by `order`. The sort runs on iteration, not here.
    ///
    /// # Errors
    /// Returns [`StreamError::NeverEnding`](crate::StreamError::NeverEnding)
    /// immediately if the stage is known to be infinite.
    pub fn sort_by(&self, order: Order<T>) -> Result<SortedJstream<T>> {
        self.require_finite("sort")?;
        Ok(SortedJstream::build(self.clone(), vec![order]))
    }

    /// Sort by `order`, reversed.
    ///
    /// # Errors
    /// Fails immediately on a known-infinite stage.
    pub fn sort_by_descending(&self, order: Order<T>) -> Result<SortedJstream<T>> {
        self.sort_by(order.reversed())
    }

    /// Sort by the natural smart order.
    ///
    /// # Errors
    /// Fails immediately on a known-infinite stage.
    pub fn sort(&self) -> Result<SortedJstream<T>>
    where
        T: SmartOrd,
    {
        self.sort_by(Order::natural())
    }

    /// Sort by the natural smart order, largest first.
    ///
    /// # Errors
    /// Fails immediately on a known-infinite stage.
    pub fn sort_descending(&self) -> Result<SortedJstream<T>>
    where
        T: SmartOrd,
    {
        self.sort_by_descending(Order::natural())
    }
}
