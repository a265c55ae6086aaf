//! Terminal operations: the calls that actually run a pipeline.
//!
//! # Overview
//! - Collections: [`to_vec`](Jstream::to_vec), [`to_set`](Jstream::to_set),
//!   [`to_map`](Jstream::to_map) and their `as_*` views
//! - Size: [`count`](Jstream::count), [`non_iterated_count`](Jstream::non_iterated_count),
//!   [`is_empty`](Jstream::is_empty)
//! - Lookup: [`first`](Jstream::first), [`last`](Jstream::last), [`at`](Jstream::at),
//!   [`find`](Jstream::find), [`find_last`](Jstream::find_last)
//! - Tests: [`some`](Jstream::some), [`none`](Jstream::none), [`every`](Jstream::every),
//!   [`sequence_equals`](Jstream::sequence_equals)
//! - Aggregation: [`reduce`](Jstream::reduce), [`fold`](Jstream::fold),
//!   [`make_string`](Jstream::make_string), [`for_each`](Jstream::for_each)
//!
//! Each call opens the pipeline once. Calls that must see every item fail
//! with [`StreamError::NeverEnding`] on a known-infinite stage before
//! pulling anything; calls that can stop early (`first`, `find`, `some`, ...)
//! are allowed on infinite stages.
//!
//! `to_*` always hands back a collection the caller owns. `as_*` may alias
//! the stage's own container when it already has the requested shape, so
//! treat its result as read-only.

use crate::collection::{JBound, Jstream};
use crate::error::StreamError;
use crate::source::{MapSource, SetSource, VecSource};
use anyhow::Result;
use indexmap::{IndexMap, IndexSet};
use itertools::Itertools;
use std::fmt::Display;
use std::hash::Hash;
use std::ops::ControlFlow;
use std::rc::Rc;

impl<T: JBound> Jstream<T> {
    /// Run the pipeline into a new vector.
    ///
    /// # Errors
    /// Fails on a known-infinite stage and propagates evaluation errors.
    pub fn to_vec(&self) -> Result<Vec<T>> {
        let items = self.materialize("to_vec")?;
        log::trace!("collected {} item(s) from `{}`", items.len(), self.stage.name());
        Ok(items)
    }

    /// The items as a shared vector, aliasing the source vector when this
    /// stage is one.
    ///
    /// # Errors
    /// Fails on a known-infinite stage and propagates evaluation errors.
    pub fn as_vec(&self) -> Result<Rc<Vec<T>>> {
        if let Some(source) = self
            .stage
            .as_any()
            .and_then(|any| any.downcast_ref::<VecSource<T>>())
        {
            return Ok(Rc::clone(&source.items));
        }
        self.to_vec().map(Rc::new)
    }

    /// Run the pipeline into a map keyed by `key`, valued by `value`. Later
    /// items overwrite the value of an earlier equal key, which keeps its
    /// original position.
    ///
    /// # Errors
    /// Fails on a known-infinite stage and propagates evaluation errors.
    pub fn to_map_by<K, V, KF, VF>(&self, key: KF, value: VF) -> Result<IndexMap<K, V>>
    where
        K: Eq + Hash,
        KF: Fn(&T) -> K,
        VF: Fn(T) -> V,
    {
        self.require_finite("to_map")?;
        self.iter()
            .map(|item| item.map(|x| (key(&x), value(x))))
            .collect()
    }

    /// Number of items. Known-size sources answer without iterating.
    ///
    /// # Errors
    /// Fails on a known-infinite stage and propagates evaluation errors.
    pub fn count(&self) -> Result<usize> {
        if let Some(n) = self.non_iterated_count() {
            return Ok(n);
        }
        self.require_finite("count")?;
        let mut n = 0;
        for item in self.iter() {
            item?;
            n += 1;
        }
        Ok(n)
    }

    /// Number of items if it is known without iterating.
    #[must_use]
    pub fn non_iterated_count(&self) -> Option<usize> {
        self.stage.known_len()
    }

    /// Whether the pipeline yields nothing. Pulls at most one item.
    ///
    /// # Errors
    /// Propagates evaluation errors.
    pub fn is_empty(&self) -> Result<bool> {
        if let Some(n) = self.non_iterated_count() {
            return Ok(n == 0);
        }
        Ok(self.first()?.is_none())
    }

    /// The first item, if any.
    ///
    /// # Errors
    /// Propagates evaluation errors.
    pub fn first(&self) -> Result<Option<T>> {
        self.iter().next().transpose()
    }

    /// The last item, if any.
    ///
    /// # Errors
    /// Fails on a known-infinite stage and propagates evaluation errors.
    pub fn last(&self) -> Result<Option<T>> {
        self.require_finite("last")?;
        let mut last = None;
        for item in self.iter() {
            last = Some(item?);
        }
        Ok(last)
    }

    /// The item at `index`; a negative index counts from the end.
    ///
    /// # Errors
    /// A negative index fails on a known-infinite stage; both forms
    /// propagate evaluation errors.
    pub fn at(&self, index: isize) -> Result<Option<T>> {
        if let Ok(index) = usize::try_from(index) {
            return self.iter().nth(index).transpose();
        }
        let from_end = index.unsigned_abs();
        let mut items = self.materialize("at")?;
        if from_end > items.len() {
            return Ok(None);
        }
        let at = items.len() - from_end;
        Ok(Some(items.swap_remove(at)))
    }

    /// The first item matching `pred`.
    ///
    /// # Errors
    /// Propagates evaluation errors.
    pub fn find<F>(&self, pred: F) -> Result<Option<T>>
    where
        F: Fn(&T) -> bool,
    {
        for item in self.iter() {
            let item = item?;
            if pred(&item) {
                return Ok(Some(item));
            }
        }
        Ok(None)
    }

    /// The first item matching `pred`, or `alternative`.
    ///
    /// # Errors
    /// Propagates evaluation errors.
    pub fn find_or<F>(&self, pred: F, alternative: T) -> Result<T>
    where
        F: Fn(&T) -> bool,
    {
        Ok(self.find(pred)?.unwrap_or(alternative))
    }

    /// The first item matching `pred`, or the result of `alternative`.
    ///
    /// # Errors
    /// Propagates evaluation errors.
    pub fn find_or_else<F, A>(&self, pred: F, alternative: A) -> Result<T>
    where
        F: Fn(&T) -> bool,
        A: FnOnce() -> T,
    {
        Ok(self.find(pred)?.unwrap_or_else(alternative))
    }

    /// The last item matching `pred`.
    ///
    /// # Errors
    /// Fails on a known-infinite stage and propagates evaluation errors.
    pub fn find_last<F>(&self, pred: F) -> Result<Option<T>>
    where
        F: Fn(&T) -> bool,
    {
        self.require_finite("find_last")?;
        let mut found = None;
        for item in self.iter() {
            let item = item?;
            if pred(&item) {
                found = Some(item);
            }
        }
        Ok(found)
    }

    /// Whether any item matches `pred`.
    ///
    /// # Errors
    /// Propagates evaluation errors.
    pub fn some<F>(&self, pred: F) -> Result<bool>
    where
        F: Fn(&T) -> bool,
    {
        for item in self.iter() {
            if pred(&item?) {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Whether no item matches `pred`.
    ///
    /// # Errors
    /// Propagates evaluation errors.
    pub fn none<F>(&self, pred: F) -> Result<bool>
    where
        F: Fn(&T) -> bool,
    {
        self.some(pred).map(|found| !found)
    }

    /// Whether every item matches `pred`. True for an empty stage.
    ///
    /// # Errors
    /// Propagates evaluation errors.
    pub fn every<F>(&self, pred: F) -> Result<bool>
    where
        F: Fn(&T) -> bool,
    {
        self.some(|x| !pred(x)).map(|found| !found)
    }

    /// Pairwise comparison with `other` under `eq`; sequences of different
    /// lengths are never equal.
    ///
    /// # Errors
    /// Fails when both stages are known to be infinite and propagates
    /// evaluation errors.
    pub fn sequence_equals_by<U, F>(&self, other: &Jstream<U>, eq: F) -> Result<bool>
    where
        U: JBound,
        F: Fn(&T, &U) -> bool,
    {
        if self.props.infinite.is_true() && other.props.infinite.is_true() {
            return Err(StreamError::never_ending("sequence_equals").into());
        }
        if let (Some(a), Some(b)) = (self.non_iterated_count(), other.non_iterated_count()) {
            if a != b {
                return Ok(false);
            }
        }
        let mut left = self.iter();
        let mut right = other.iter();
        loop {
            match (left.next().transpose()?, right.next().transpose()?) {
                (None, None) => return Ok(true),
                (Some(a), Some(b)) if eq(&a, &b) => {}
                _ => return Ok(false),
            }
        }
    }

    /// Call `action(item, index)` on each item until it breaks.
    ///
    /// ```
    /// use jstream::Jstream;
    /// use std::ops::ControlFlow;
    ///
    /// let mut seen = Vec::new();
    /// Jstream::generate(|i| i * i).for_each(|x, _| {
    ///     seen.push(x);
    ///     if x > 10 { ControlFlow::Break(()) } else { ControlFlow::Continue(()) }
    /// })?;
    /// assert_eq!(seen, vec![0, 1, 4, 9, 16]);
    /// # Ok::<(), anyhow::Error>(())
    /// ```
    ///
    /// # Errors
    /// Propagates evaluation errors.
    pub fn for_each<F>(&self, mut action: F) -> Result<()>
    where
        F: FnMut(T, usize) -> ControlFlow<()>,
    {
        for (i, item) in self.iter().enumerate() {
            if action(item?, i).is_break() {
                break;
            }
        }
        Ok(())
    }

    /// Combine all items left to right, seeded with the first.
    /// `f(accumulated, item, position)` sees positions from 1.
    ///
    /// # Errors
    /// [`StreamError::EmptyInput`] on an empty stage; also fails on a
    /// known-infinite stage and propagates evaluation errors.
    pub fn reduce<F>(&self, f: F) -> Result<T>
    where
        F: Fn(T, T, usize) -> T,
    {
        self.reduce_then(f, |result, _| result)
    }

    /// [`reduce`](Self::reduce), then `finalize(result, count)` where `count`
    /// includes the seed.
    ///
    /// # Errors
    /// Same as [`reduce`](Self::reduce).
    pub fn reduce_then<F, G, R>(&self, f: F, finalize: G) -> Result<R>
    where
        F: Fn(T, T, usize) -> T,
        G: FnOnce(T, usize) -> R,
    {
        self.require_finite("reduce")?;
        let mut items = self.iter();
        let Some(seed) = items.next().transpose()? else {
            return Err(StreamError::EmptyInput { operation: "reduce" }.into());
        };
        let mut acc = seed;
        let mut count = 1;
        for item in items {
            acc = f(acc, item?, count);
            count += 1;
        }
        Ok(finalize(acc, count))
    }

    /// Combine all items left to right starting from `initial`.
    /// `f(accumulated, item, position)` sees positions from 0; an empty
    /// stage returns `initial`.
    ///
    /// # Errors
    /// Fails on a known-infinite stage and propagates evaluation errors.
    pub fn fold<A, F>(&self, initial: A, f: F) -> Result<A>
    where
        F: Fn(A, T, usize) -> A,
    {
        self.fold_then(initial, f, |result, _| result)
    }

    /// [`fold`](Self::fold), then `finalize(result, count)` where `count` is
    /// the number of items folded.
    ///
    /// # Errors
    /// Same as [`fold`](Self::fold).
    pub fn fold_then<A, F, G, R>(&self, initial: A, f: F, finalize: G) -> Result<R>
    where
        F: Fn(A, T, usize) -> A,
        G: FnOnce(A, usize) -> R,
    {
        self.require_finite("fold")?;
        let mut acc = initial;
        let mut count = 0;
        for item in self.iter() {
            acc = f(acc, item?, count);
            count += 1;
        }
        Ok(finalize(acc, count))
    }
}

impl<T: JBound + PartialEq> Jstream<T> {
    /// Whether both stages yield equal items in the same order.
    ///
    /// # Errors
    /// Same as [`sequence_equals_by`](Self::sequence_equals_by).
    pub fn sequence_equals(&self, other: &Self) -> Result<bool> {
        self.sequence_equals_by(other, T::eq)
    }
}

impl<T: JBound + Display> Jstream<T> {
    /// Render every item and join them with `separator`.
    ///
    /// # Errors
    /// Fails on a known-infinite stage and propagates evaluation errors.
    pub fn make_string(&self, separator: &str) -> Result<String> {
        Ok(self.materialize("make_string")?.iter().join(separator))
    }
}

impl<T: JBound + Eq + Hash> Jstream<T> {
    /// Run the pipeline into a new insertion-ordered set.
    ///
    /// # Errors
    /// Fails on a known-infinite stage and propagates evaluation errors.
    pub fn to_set(&self) -> Result<IndexSet<T>> {
        self.require_finite("to_set")?;
        self.iter().collect()
    }

    /// The items as a shared set, aliasing the source set when this stage
    /// is one.
    ///
    /// # Errors
    /// Fails on a known-infinite stage and propagates evaluation errors.
    pub fn as_set(&self) -> Result<Rc<IndexSet<T>>> {
        if let Some(source) = self
            .stage
            .as_any()
            .and_then(|any| any.downcast_ref::<SetSource<T>>())
        {
            return Ok(Rc::clone(&source.items));
        }
        self.to_set().map(Rc::new)
    }
}

impl<K, V> Jstream<(K, V)>
where
    K: JBound + Eq + Hash,
    V: JBound,
{
    /// Run a stage of entries into a new insertion-ordered map.
    ///
    /// # Errors
    /// Fails on a known-infinite stage and propagates evaluation errors.
    pub fn to_map(&self) -> Result<IndexMap<K, V>> {
        self.require_finite("to_map")?;
        self.iter().collect()
    }

    /// The entries as a shared map, aliasing the source map when this stage
    /// is one.
    ///
    /// # Errors
    /// Fails on a known-infinite stage and propagates evaluation errors.
    pub fn as_map(&self) -> Result<Rc<IndexMap<K, V>>> {
        if let Some(source) = self
            .stage
            .as_any()
            .and_then(|any| any.downcast_ref::<MapSource<K, V>>())
        {
            return Ok(Rc::clone(&source.items));
        }
        self.to_map().map(Rc::new)
    }
}

#[cfg(feature = "json")]
impl<K, V> Jstream<(K, V)>
where
    K: JBound + Display,
    V: JBound + serde::Serialize,
{
    /// Run a stage of entries into a JSON object; keys are rendered with
    /// `Display` and later entries overwrite earlier ones.
    ///
    /// # Errors
    /// Fails on a known-infinite stage, when a value cannot be serialized,
    /// and on evaluation errors.
    pub fn to_object(&self) -> Result<serde_json::Map<String, serde_json::Value>> {
        self.require_finite("to_object")?;
        let mut object = serde_json::Map::new();
        for item in self.iter() {
            let (key, value) = item?;
            object.insert(key.to_string(), serde_json::to_value(value)?);
        }
        Ok(object)
    }
}
