//! Stages that change the shape of a sequence without looking at other
//! inputs: flattening, splitting, reordering and in-place copies.

use crate::collection::{JBound, Jstream};
use crate::error::StreamError;
use crate::stage::{Materialize, Pull, Stage};
use anyhow::Result;
use itertools::Either;
use rand::Rng;
use std::rc::Rc;

/// Picks a uniformly distributed index in `0..n` for [`Jstream::shuffle`].
///
/// The default source is [`rand::rng`], which is fast but **not**
/// cryptographically secure. Inject a seeded or secure generator when that
/// matters.
pub type RandomSource = Rc<dyn Fn(usize) -> usize>;

/// The default [`RandomSource`], backed by the thread-local `rand` generator.
#[must_use]
pub fn thread_random() -> RandomSource {
    Rc::new(|n| rand::rng().random_range(0..n))
}

struct FlattenStage<T> {
    upstream: Jstream<T>,
}

impl<T> Stage<T::Item> for FlattenStage<T>
where
    T: JBound + IntoIterator,
    T::Item: JBound,
    T::IntoIter: 'static,
{
    fn name(&self) -> &'static str {
        "flatten"
    }

    fn open(&self) -> Pull<T::Item> {
        Box::new(self.upstream.iter().flat_map(|item| match item {
            Ok(inner) => Either::Left(inner.into_iter().map(Ok)),
            Err(e) => Either::Right(std::iter::once(Err(e))),
        }))
    }
}

struct SplitStage<T> {
    upstream: Jstream<T>,
    delimiter: Rc<Vec<T>>,
}

impl<T: JBound + PartialEq> Stage<Vec<T>> for SplitStage<T> {
    fn name(&self) -> &'static str {
        "split"
    }

    fn open(&self) -> Pull<Vec<T>> {
        Box::new(SplitIter {
            upstream: Some(self.upstream.iter()),
            delimiter: Rc::clone(&self.delimiter),
            chunk: Vec::new(),
        })
    }
}

struct SplitIter<T> {
    upstream: Option<Pull<T>>,
    delimiter: Rc<Vec<T>>,
    chunk: Vec<T>,
}

impl<T: JBound + PartialEq> Iterator for SplitIter<T> {
    type Item = Result<Vec<T>>;

    fn next(&mut self) -> Option<Self::Item> {
        let upstream = self.upstream.as_mut()?;
        for item in upstream.by_ref() {
            match item {
                Ok(x) => self.chunk.push(x),
                Err(e) => return Some(Err(e)),
            }
            if self.chunk.ends_with(&self.delimiter) {
                let cut = self.chunk.len() - self.delimiter.len();
                self.chunk.truncate(cut);
                return Some(Ok(std::mem::take(&mut self.chunk)));
            }
        }
        // the trailing chunk is always emitted, even when empty
        self.upstream = None;
        Some(Ok(std::mem::take(&mut self.chunk)))
    }
}

struct ReverseStage<T> {
    upstream: Jstream<T>,
}

impl<T: JBound> Materialize<T> for ReverseStage<T> {
    fn name(&self) -> &'static str {
        "reverse"
    }

    fn build(&self) -> Result<Vec<T>> {
        let mut items = self.upstream.materialize("reverse")?;
        log::debug!("reversing {} items", items.len());
        items.reverse();
        Ok(items)
    }

    fn known_len(&self) -> Option<usize> {
        self.upstream.stage.known_len()
    }
}

struct ShuffleStage<T> {
    upstream: Jstream<T>,
    random: RandomSource,
}

impl<T: JBound> Materialize<T> for ShuffleStage<T> {
    fn name(&self) -> &'static str {
        "shuffle"
    }

    fn build(&self) -> Result<Vec<T>> {
        let mut items = self.upstream.materialize("shuffle")?;
        log::debug!("shuffling {} items", items.len());
        // Fisher-Yates, back to front
        for i in (1..items.len()).rev() {
            let j = (self.random)(i + 1);
            if j > i {
                return Err(StreamError::invalid(
                    "random",
                    format!("returned {j} for a bound of {}", i + 1),
                )
                .into());
            }
            items.swap(i, j);
        }
        Ok(items)
    }

    fn known_len(&self) -> Option<usize> {
        self.upstream.stage.known_len()
    }
}

struct CopyWithinStage<T> {
    upstream: Jstream<T>,
    target: isize,
    start: isize,
    end: Option<isize>,
}

/// Resolve a possibly negative index against `len`, clamped to `0..=len`.
fn clamp_index(index: isize, len: usize) -> usize {
    if index < 0 {
        len.saturating_sub(index.unsigned_abs())
    } else {
        index.unsigned_abs().min(len)
    }
}

impl<T: JBound> Materialize<T> for CopyWithinStage<T> {
    fn name(&self) -> &'static str {
        "copy_within"
    }

    fn build(&self) -> Result<Vec<T>> {
        let mut items = self.upstream.materialize("copy_within")?;
        let len = items.len();
        let to = clamp_index(self.target, len);
        let from = clamp_index(self.start, len);
        let until = self.end.map_or(len, |end| clamp_index(end, len));
        let count = until.saturating_sub(from).min(len - to);
        if count > 0 {
            let copied = items[from..from + count].to_vec();
            items[to..to + count].clone_from_slice(&copied);
        }
        Ok(items)
    }

    fn known_len(&self) -> Option<usize> {
        self.upstream.stage.known_len()
    }
}

impl<T: JBound> Jstream<T> {
    /// Pair every item with its position, counted from 0.
    #[must_use]
    pub fn indexed(&self) -> Jstream<(usize, T)> {
        self.map_indexed(|x, i| (i, x))
    }

    /// The items in reverse order.
    ///
    /// # Errors
    /// Fails immediately on a known-infinite stage.
    pub fn reverse(&self) -> Result<Self> {
        self.require_finite("reverse")?;
        Ok(Self::buffered(ReverseStage {
            upstream: self.clone(),
        }))
    }

    /// The items in a random order, using `random` or [`thread_random`].
    ///
    /// # Errors
    /// Fails immediately on a known-infinite stage. A `random` source that
    /// returns an out-of-range index fails at iteration time.
    pub fn shuffle(&self, random: Option<RandomSource>) -> Result<Self> {
        self.require_finite("shuffle")?;
        Ok(Self::buffered(ShuffleStage {
            upstream: self.clone(),
            random: random.unwrap_or_else(thread_random),
        }))
    }

    /// Copy the items in `start..end` over the items starting at `target`,
    /// keeping the length unchanged. Negative indices count from the end and
    /// every index is clamped to the sequence, as in JavaScript's
    /// `Array.prototype.copyWithin`.
    ///
    /// ```
    /// use jstream::Jstream;
    ///
    /// let copied = Jstream::of(vec![1, 2, 3, 4, 5]).copy_within(0, 3, None)?;
    /// assert_eq!(copied.to_vec()?, vec![4, 5, 3, 4, 5]);
    /// # Ok::<(), anyhow::Error>(())
    /// ```
    ///
    /// # Errors
    /// Fails immediately on a known-infinite stage.
    pub fn copy_within(&self, target: isize, start: isize, end: Option<isize>) -> Result<Self> {
        self.require_finite("copy_within")?;
        Ok(Self::buffered(CopyWithinStage {
            upstream: self.clone(),
            target,
            start,
            end,
        }))
    }
}

impl<T: JBound + PartialEq> Jstream<T> {
    /// Split into chunks at every occurrence of `delimiter`, which may span
    /// several items. Delimiters are not included; the chunk after the last
    /// delimiter is always produced, so `n` delimiters give `n + 1` chunks.
    ///
    /// # Errors
    /// Returns [`StreamError::InvalidArgument`] when `delimiter` is empty.
    pub fn split(&self, delimiter: Vec<T>) -> Result<Jstream<Vec<T>>> {
        if delimiter.is_empty() {
            return Err(StreamError::invalid("delimiter", "must not be empty").into());
        }
        Ok(Jstream::new(
            SplitStage {
                upstream: self.clone(),
                delimiter: Rc::new(delimiter),
            },
            self.props.derived(),
        ))
    }
}

impl<T> Jstream<T>
where
    T: JBound + IntoIterator,
    T::Item: JBound,
    T::IntoIter: 'static,
{
    /// Concatenate the inner sequences.
    #[must_use]
    pub fn flatten(&self) -> Jstream<T::Item> {
        Jstream::new(
            FlattenStage {
                upstream: self.clone(),
            },
            self.props.derived(),
        )
    }
}

impl<U: JBound> Jstream<Option<U>> {
    /// Drop the `None`s and unwrap the rest.
    #[must_use]
    pub fn defined(&self) -> Jstream<U> {
        self.flatten()
    }
}
