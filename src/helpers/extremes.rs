//! Smallest and largest items through the bounded stable selector.
//!
//! - `min`/`max` return one item or `None` for an empty stage.
//! - `min_n`/`max_n` return up to `k` items: ascending for `min_n`, largest
//!   first for `max_n`. Asking for more items than exist returns them all.
//! - Ties always resolve to the earliest item, for both directions.

use crate::collection::{JBound, Jstream};
use crate::ordering::{Order, SmartOrd};
use crate::selector::select;
use anyhow::Result;

impl<T: JBound> Jstream<T> {
    /// The smallest item under `order`; the first one seen on ties.
    ///
    /// # Errors
    /// Fails on a known-infinite stage and propagates comparator errors.
    pub fn min_by(&self, order: Order<T>) -> Result<Option<T>> {
        Ok(self.extremes("min", 1, order)?.pop())
    }

    /// The largest item under `order`; the first one seen on ties.
    ///
    /// # Errors
    /// Fails on a known-infinite stage and propagates comparator errors.
    pub fn max_by(&self, order: Order<T>) -> Result<Option<T>> {
        Ok(self.extremes("max", 1, order.reversed())?.pop())
    }

    /// The `k` smallest items under `order`, ascending.
    ///
    /// ```
    /// use jstream::{Jstream, Order};
    ///
    /// let digits = Jstream::of(vec![5, 3, 1, 4, 1, 5, 9, 2, 6]);
    /// assert_eq!(digits.min_n(3, Order::natural())?, vec![1, 1, 2]);
    /// assert_eq!(digits.max_n(3, Order::natural())?, vec![9, 6, 5]);
    /// # Ok::<(), anyhow::Error>(())
    /// ```
    ///
    /// # Errors
    /// [`StreamError::InvalidArgument`](crate::StreamError::InvalidArgument)
    /// when `k` is zero; also fails on a known-infinite stage and propagates
    /// comparator errors.
    pub fn min_n(&self, k: usize, order: Order<T>) -> Result<Vec<T>> {
        self.extremes("min", k, order)
    }

    /// The `k` largest items under `order`, largest first.
    ///
    /// # Errors
    /// Same as [`min_n`](Self::min_n).
    pub fn max_n(&self, k: usize, order: Order<T>) -> Result<Vec<T>> {
        self.extremes("max", k, order.reversed())
    }

    fn extremes(&self, operation: &'static str, k: usize, order: Order<T>) -> Result<Vec<T>> {
        self.require_finite(operation)?;
        select(self.iter(), k, order)
    }
}

impl<T: JBound + SmartOrd> Jstream<T> {
    /// The smallest item by natural order.
    ///
    /// # Errors
    /// Same as [`min_by`](Self::min_by).
    pub fn min(&self) -> Result<Option<T>> {
        self.min_by(Order::natural())
    }

    /// The largest item by natural order.
    ///
    /// # Errors
    /// Same as [`max_by`](Self::max_by).
    pub fn max(&self) -> Result<Option<T>> {
        self.max_by(Order::natural())
    }
}
