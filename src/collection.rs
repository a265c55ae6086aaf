use crate::error::StreamError;
use crate::properties::Properties;
use crate::source::{
    ContainerSource, FactorySource, GenerateSource, MapSource, OneShotSource, SetSource, VecSource,
};
use crate::stage::{Buffered, Materialize, Pull, Stage, drain};
use anyhow::Result;
use indexmap::{IndexMap, IndexSet};
use std::cell::RefCell;
use std::fmt;
use std::hash::Hash;
use std::rc::Rc;

/// Bound shared by every element type flowing through a pipeline.
pub trait JBound: 'static + Clone {}
impl<T> JBound for T where T: 'static + Clone {}

/// A lazy, immutable, re-iterable pipeline stage.
///
/// Cloning a `Jstream` is cheap: it shares the stage, it does not copy data.
/// Every transformation returns a new `Jstream` and leaves `self` untouched;
/// nothing runs until a terminal method (`to_vec`, `count`, `reduce`, ...) is
/// called, and each terminal call opens the source exactly once.
///
/// `&Jstream<T>` implements [`IntoIterator`], yielding `Result<T>` items. That
/// is the hand-off point for code outside the crate, such as an async
/// adapter: each `for` loop opens a fresh pass and an error ends it.
///
/// ```
/// use jstream::Jstream;
///
/// let squares = Jstream::of(vec![1, 2, 3]).map(|n| n * n);
/// let mut total = 0;
/// for item in &squares {
///     total += item?;
/// }
/// assert_eq!(total, 14);
/// # Ok::<(), anyhow::Error>(())
/// ```
pub struct Jstream<T> {
    pub(crate) stage: Rc<dyn Stage<T>>,
    pub(crate) props: Properties,
}

impl<T> Clone for Jstream<T> {
    fn clone(&self) -> Self {
        Self {
            stage: Rc::clone(&self.stage),
            props: self.props,
        }
    }
}

impl<T: 'static> fmt::Debug for Jstream<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Jstream")
            .field("stage", &self.stage.name())
            .field("properties", &self.props)
            .finish()
    }
}

// ---- construction ----
impl<T: JBound> Jstream<T> {
    pub(crate) fn new(stage: impl Stage<T>, props: Properties) -> Self {
        Self {
            stage: Rc::new(stage),
            props,
        }
    }

    /// A stage that drains its input and owns the resulting buffer.
    pub(crate) fn buffered(stage: impl Materialize<T>) -> Self {
        Self::new(Buffered(stage), Properties::FRESH)
    }

    /// Wrap a user-defined [`Stage`] with explicit properties.
    pub fn from_stage(stage: impl Stage<T>, props: Properties) -> Self {
        Self::new(stage, props)
    }

    /// A stage over the given items. The vector is shared, never copied on
    /// iteration, and can be aliased through [`as_vec`](Self::as_vec).
    #[must_use]
    pub fn of(items: Vec<T>) -> Self {
        Self::over_shared(Rc::new(items))
    }

    /// A stage over an already shared vector.
    #[must_use]
    pub fn over_shared(items: Rc<Vec<T>>) -> Self {
        Self::new(VecSource { items }, Properties::CONTAINER)
    }

    /// A stage with no items.
    #[must_use]
    pub fn empty() -> Self {
        Self::of(Vec::new())
    }

    /// A stage over any re-iterable container (ranges, `BTreeSet`, slices of
    /// `'static` data, ...). Each open iterates a fresh clone of `container`.
    ///
    /// Finiteness is left unknown: an unbounded range is a valid container.
    #[must_use]
    pub fn over<C>(container: C) -> Self
    where
        C: IntoIterator<Item = T> + Clone + 'static,
        C::IntoIter: 'static,
    {
        Self::new(
            ContainerSource { container },
            Properties::default().fresh_source(false).expensive_source(false),
        )
    }

    /// A stage whose source is rebuilt by calling `factory` on every open.
    #[must_use]
    pub fn from_fn<I, F>(factory: F) -> Self
    where
        I: IntoIterator<Item = T>,
        I::IntoIter: 'static,
        F: Fn() -> I + 'static,
    {
        let factory = Rc::new(move || Box::new(factory().into_iter()) as Box<dyn Iterator<Item = T>>);
        Self::new(FactorySource { factory }, Properties::default().fresh_source(false))
    }

    /// A stage over a single-use iterator.
    ///
    /// The first terminal call consumes the iterator; every later call sees an
    /// exhausted source and yields nothing. Use [`memoize`](Self::memoize) or
    /// [`collapse`](Self::collapse) to make such a pipeline re-iterable.
    #[must_use]
    pub fn once<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = T>,
        I::IntoIter: 'static,
    {
        let iter: Box<dyn Iterator<Item = T>> = Box::new(iter.into_iter());
        Self::new(
            OneShotSource {
                iter: RefCell::new(Some(iter)),
            },
            Properties::default().fresh_source(false),
        )
    }

    /// An endless stage producing `f(0), f(1), ...`. Marked infinite.
    #[must_use]
    pub fn generate<F>(f: F) -> Self
    where
        F: Fn(usize) -> T + 'static,
    {
        Self::new(
            GenerateSource {
                f: Rc::new(f),
                count: None,
            },
            Properties::default()
                .fresh_source(false)
                .expensive_source(false)
                .infinite(true),
        )
    }

    /// `f(0), f(1), ..., f(count - 1)`.
    #[must_use]
    pub fn generate_n<F>(f: F, count: usize) -> Self
    where
        F: Fn(usize) -> T + 'static,
    {
        Self::new(
            GenerateSource {
                f: Rc::new(f),
                count: Some(count),
            },
            Properties::CONTAINER,
        )
    }

    /// The stage's property set.
    #[must_use]
    pub const fn properties(&self) -> Properties {
        self.props
    }

    /// The same stage with the given properties asserted by the caller.
    #[must_use]
    pub fn with_properties(&self, props: Properties) -> Self {
        Self {
            stage: Rc::clone(&self.stage),
            props,
        }
    }

    /// Open the pipeline and pull items one at a time.
    #[must_use]
    pub fn iter(&self) -> Pull<T> {
        log::trace!("opening stage `{}`", self.stage.name());
        self.stage.open()
    }

    /// Fail fast if the stage is known to never end.
    pub(crate) fn require_finite(&self, operation: &'static str) -> Result<()> {
        if self.props.infinite.is_true() {
            return Err(StreamError::never_ending(operation).into());
        }
        Ok(())
    }

    /// Fully evaluate into a buffer the caller owns, reusing the stage's own
    /// buffer when it is fresh.
    pub(crate) fn materialize(&self, operation: &'static str) -> Result<Vec<T>> {
        self.require_finite(operation)?;
        if self.props.fresh_source.is_true() {
            if let Some(buffer) = self.stage.open_fresh() {
                return buffer;
            }
        }
        drain(self.iter())
    }
}

impl Jstream<i64> {
    /// `start, start + step, ...` up to but excluding `end`.
    ///
    /// # Errors
    /// Returns [`StreamError::InvalidArgument`] when `step` is zero.
    #[allow(clippy::cast_possible_truncation)]
    pub fn range(start: i64, end: i64, step: i64) -> Result<Self> {
        if step == 0 {
            return Err(StreamError::invalid("step", "must not be zero").into());
        }
        // i128 holds every span and every partial sum without overflow
        let (start, end, step) = (i128::from(start), i128::from(end), i128::from(step));
        let span = if step > 0 { end - start } else { start - end };
        let count = if span <= 0 {
            0
        } else {
            usize::try_from(span.unsigned_abs().div_ceil(step.unsigned_abs()))?
        };
        // every produced value lies between `start` and `end`
        Ok(Self::generate_n(
            move |i| (start + step * i as i128) as i64,
            count,
        ))
    }
}

impl<T: JBound + Eq + Hash> Jstream<T> {
    /// A stage over a shared insertion-ordered set.
    #[must_use]
    pub fn over_set(items: IndexSet<T>) -> Self {
        Self::new(
            SetSource {
                items: Rc::new(items),
            },
            Properties::CONTAINER,
        )
    }
}

impl<K, V> Jstream<(K, V)>
where
    K: JBound + Eq + Hash,
    V: JBound,
{
    /// A stage over the entries of a shared insertion-ordered map.
    #[must_use]
    pub fn over_map(items: IndexMap<K, V>) -> Self {
        Self::new(
            MapSource {
                items: Rc::new(items),
            },
            Properties::CONTAINER,
        )
    }
}

impl<T: JBound> From<Vec<T>> for Jstream<T> {
    fn from(items: Vec<T>) -> Self {
        Self::of(items)
    }
}

impl<'a, T: JBound> IntoIterator for &'a Jstream<T> {
    type Item = Result<T>;
    type IntoIter = Pull<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T: JBound> IntoIterator for Jstream<T> {
    type Item = Result<T>;
    type IntoIter = Pull<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

// ---- stateless element-wise stages ----

struct MapStage<T, O> {
    upstream: Jstream<T>,
    f: Rc<dyn Fn(T, usize) -> O>,
}

impl<T: JBound, O: JBound> Stage<O> for MapStage<T, O> {
    fn name(&self) -> &'static str {
        "map"
    }

    fn open(&self) -> Pull<O> {
        let f = Rc::clone(&self.f);
        Box::new(
            self.upstream
                .iter()
                .enumerate()
                .map(move |(i, item)| item.map(|x| f(x, i))),
        )
    }

    fn known_len(&self) -> Option<usize> {
        self.upstream.stage.known_len()
    }
}

struct FilterStage<T> {
    upstream: Jstream<T>,
    pred: Rc<dyn Fn(&T, usize) -> bool>,
}

impl<T: JBound> Stage<T> for FilterStage<T> {
    fn name(&self) -> &'static str {
        "filter"
    }

    fn open(&self) -> Pull<T> {
        let pred = Rc::clone(&self.pred);
        Box::new(
            self.upstream
                .iter()
                .enumerate()
                .filter_map(move |(i, item)| match item {
                    Ok(x) => pred(&x, i).then_some(Ok(x)),
                    Err(e) => Some(Err(e)),
                }),
        )
    }
}

/// Field comparison used by [`Jstream::filter_by`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Comparison {
    Is,
    IsNot,
    LessThan,
    LessThanOrEqualTo,
    GreaterThan,
    GreaterThanOrEqualTo,
}

impl Comparison {
    fn resolve<K: PartialOrd>(self) -> fn(&K, &K) -> bool {
        match self {
            Self::Is => |a, b| a == b,
            Self::IsNot => |a, b| a != b,
            Self::LessThan => |a, b| a < b,
            Self::LessThanOrEqualTo => |a, b| a <= b,
            Self::GreaterThan => |a, b| a > b,
            Self::GreaterThanOrEqualTo => |a, b| a >= b,
        }
    }
}

impl<T: JBound> Jstream<T> {
    /// Transform each item.
    #[must_use]
    pub fn map<O, F>(&self, f: F) -> Jstream<O>
    where
        O: JBound,
        F: Fn(T) -> O + 'static,
    {
        self.map_indexed(move |x, _| f(x))
    }

    /// Transform each item together with its position in the source,
    /// counted from 0 on every iteration.
    #[must_use]
    pub fn map_indexed<O, F>(&self, f: F) -> Jstream<O>
    where
        O: JBound,
        F: Fn(T, usize) -> O + 'static,
    {
        Jstream::new(
            MapStage {
                upstream: self.clone(),
                f: Rc::new(f),
            },
            self.props.derived(),
        )
    }

    /// Keep the items matching `pred`.
    #[must_use]
    pub fn filter<F>(&self, pred: F) -> Self
    where
        F: Fn(&T) -> bool + 'static,
    {
        self.filter_indexed(move |x, _| pred(x))
    }

    /// Keep the items matching `pred`, which also receives the item's
    /// position in the source.
    #[must_use]
    pub fn filter_indexed<F>(&self, pred: F) -> Self
    where
        F: Fn(&T, usize) -> bool + 'static,
    {
        Self::new(
            FilterStage {
                upstream: self.clone(),
                pred: Rc::new(pred),
            },
            self.props.derived(),
        )
    }

    /// Keep the items whose derived field compares to `value` as requested.
    ///
    /// ```
    /// use jstream::*;
    ///
    /// let words = Jstream::of(vec!["car", "seat", "ox", "truck"]);
    /// let short = words.filter_by(|w| w.len(), Comparison::LessThan, 4);
    /// assert_eq!(short.to_vec()?, vec!["car", "ox"]);
    /// # Ok::<(), anyhow::Error>(())
    /// ```
    #[must_use]
    pub fn filter_by<K, F>(&self, field: F, comparison: Comparison, value: K) -> Self
    where
        K: PartialOrd + 'static,
        F: Fn(&T) -> K + 'static,
    {
        let test = comparison.resolve::<K>();
        self.filter(move |x| test(&field(x), &value))
    }
}
