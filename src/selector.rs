//! Bounded stable selection of the `k` smallest items of a one-pass stream.
//!
//! The selector keeps an insertion-sorted buffer of at most `k` items, so
//! memory is bounded by `k` and each insertion costs `O(log k)` comparisons
//! plus a shift.
//!
//! - Output: the buffer in ascending order of the comparator.
//! - Stability: an item is inserted *after* every buffered item it ties
//!   with, and a full buffer only evicts its maximum for an item that is
//!   strictly smaller. Earlier-arriving equal items therefore always win.
//! - For the `k` largest, pass a reversed order; the result is then in
//!   descending order with ties still in arrival order.

use crate::error::StreamError;
use crate::ordering::Order;
use anyhow::Result;

pub struct BoundedSelector<T> {
    k: usize,
    order: Order<T>,
    buffer: Vec<T>,
}

impl<T: 'static> BoundedSelector<T> {
    /// Create a selector keeping the `k` smallest items under `order`.
    ///
    /// # Errors
    /// Returns [`StreamError::InvalidArgument`] when `k` is zero.
    pub fn new(k: usize, order: Order<T>) -> Result<Self> {
        if k == 0 {
            return Err(StreamError::invalid("count", "must be greater than zero").into());
        }
        Ok(Self {
            k,
            order,
            buffer: Vec::with_capacity(k.min(1024)),
        })
    }

    /// Offer one item.
    ///
    /// # Errors
    /// Propagates comparator failures.
    pub fn add(&mut self, item: T) -> Result<()> {
        if self.k == 1 {
            // single running minimum; strict less-than keeps the first seen
            match self.buffer.first() {
                Some(current) if self.order.compare(&item, current)?.is_lt() => {
                    self.buffer[0] = item;
                }
                Some(_) => {}
                None => self.buffer.push(item),
            }
            return Ok(());
        }

        if self.buffer.len() == self.k {
            match self.buffer.last() {
                Some(max) if self.order.compare(&item, max)?.is_lt() => {
                    self.buffer.pop();
                }
                _ => return Ok(()),
            }
        }
        let at = self.insertion_point(&item)?;
        self.buffer.insert(at, item);
        Ok(())
    }

    /// Number of items currently held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// The selected items, ascending.
    #[must_use]
    pub fn into_sorted_vec(self) -> Vec<T> {
        self.buffer
    }

    /// First position whose item is strictly greater than `item`.
    fn insertion_point(&self, item: &T) -> Result<usize> {
        let (mut lo, mut hi) = (0, self.buffer.len());
        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            if self.order.compare(item, &self.buffer[mid])?.is_lt() {
                hi = mid;
            } else {
                lo = mid + 1;
            }
        }
        Ok(lo)
    }
}

/// Feed every item of `items` through a selector of capacity `k`.
pub(crate) fn select<T, I>(items: I, k: usize, order: Order<T>) -> Result<Vec<T>>
where
    T: 'static,
    I: IntoIterator<Item = Result<T>>,
{
    let mut selector = BoundedSelector::new(k, order)?;
    for item in items {
        selector.add(item?)?;
    }
    Ok(selector.into_sorted_vec())
}
