//! Join helpers built on a single probe plan.
//!
//! Every join stage, when opened:
//! 1) drains the *other* side into a buffer,
//! 2) turns that buffer into a probe (a key index for the indexed forms, the
//!    buffer itself for the predicate forms),
//! 3) streams *this* side and asks the probe for the rows each item produces.
//!
//! Output rows follow this side's order. Only the other side is drained, so a
//! join over an infinite left side stays lazy, while a known-infinite right
//! side is refused when the join is built.
//!
//! ## Available operations
//! | Indexed (`O(n + m)`)           | Predicate (`O(n * m)`)                |
//! |--------------------------------|---------------------------------------|
//! | [`Jstream::join`]              | [`Jstream::join_where`]               |
//! | [`Jstream::left_join`]         | [`Jstream::left_join_where`]          |
//! | [`Jstream::group_join`]        | [`Jstream::group_join_where`]         |
//!
//! ### Notes
//! - The indexed inner and left joins keep **one** item per key from the other
//!   side: when keys repeat, the last one wins.
//! - The predicate inner join emits every matching pair; the predicate left
//!   join uses the first match only.
//!
//! ## Examples
//! ```
//! use jstream::Jstream;
//!
//! # fn main() -> anyhow::Result<()> {
//! let people = Jstream::of(vec![(1, "ann"), (2, "bob"), (3, "cid")]);
//! let pets = Jstream::of(vec![(1, "cat"), (3, "eel"), (3, "owl")]);
//!
//! let inner = people.join(&pets, |p| p.0, |q| q.0, |p, q| (p.1, q.1))?;
//! assert_eq!(inner.to_vec()?, vec![("ann", "cat"), ("cid", "owl")]);
//!
//! let left = people.left_join(&pets, |p| p.0, |q| q.0, |p, q| (p.1, q.map(|q| q.1)))?;
//! assert_eq!(
//!     left.to_vec()?,
//!     vec![("ann", Some("cat")), ("bob", None), ("cid", Some("owl"))]
//! );
//!
//! let all = people.join_where(&pets, |p, q| p.0 == q.0, |p, q| (p.1, q.1))?;
//! assert_eq!(all.count()?, 3);
//! # Ok(()) }
//! ```

use crate::collection::{JBound, Jstream};
use crate::properties::{Properties, Tri};
use crate::stage::{Pull, Stage, failed};
use anyhow::Result;
use std::collections::HashMap;
use std::hash::Hash;
use std::rc::Rc;

/// Rows produced by one item of this side.
type Probe<T, R> = Box<dyn Fn(T) -> Vec<R>>;

/// Turns the drained other side into a probe.
type Prepare<T, U, R> = Rc<dyn Fn(Vec<U>) -> Probe<T, R>>;

struct JoinStage<T, U, R> {
    left: Jstream<T>,
    right: Jstream<U>,
    name: &'static str,
    prepare: Prepare<T, U, R>,
}

impl<T, U, R> Stage<R> for JoinStage<T, U, R>
where
    T: JBound,
    U: JBound,
    R: JBound,
{
    fn name(&self) -> &'static str {
        self.name
    }

    fn open(&self) -> Pull<R> {
        let right = match self.right.materialize(self.name) {
            Ok(items) => items,
            Err(e) => return failed(e),
        };
        log::debug!("{}: probing against {} item(s)", self.name, right.len());
        let probe = (self.prepare)(right);
        Box::new(self.left.iter().flat_map(move |item| {
            let rows: Vec<Result<R>> = match item {
                Ok(x) => probe(x).into_iter().map(Ok).collect(),
                Err(e) => vec![Err(e)],
            };
            rows
        }))
    }
}

impl<T: JBound> Jstream<T> {
    fn joined<U, R>(
        &self,
        other: &Jstream<U>,
        name: &'static str,
        prepare: Prepare<T, U, R>,
    ) -> Result<Jstream<R>>
    where
        U: JBound,
        R: JBound,
    {
        other.require_finite(name)?;
        let props = Properties {
            fresh_source: Tri::False,
            expensive_source: Tri::True,
            infinite: self.props.infinite,
        };
        Ok(Jstream::new(
            JoinStage {
                left: self.clone(),
                right: other.clone(),
                name,
                prepare,
            },
            props,
        ))
    }

    /// Inner join through a key index over `other`.
    ///
    /// Emits `result(item, matched)` for every item of this stage whose key
    /// occurs in `other`, skipping the rest. When `other` repeats a key, the
    /// last item with that key is the match.
    ///
    /// # Errors
    /// Fails immediately if `other` is known to be infinite.
    pub fn join<U, K, R, KF, OKF, RF>(
        &self,
        other: &Jstream<U>,
        key: KF,
        other_key: OKF,
        result: RF,
    ) -> Result<Jstream<R>>
    where
        U: JBound,
        R: JBound,
        K: Eq + Hash + 'static,
        KF: Fn(&T) -> K + 'static,
        OKF: Fn(&U) -> K + 'static,
        RF: Fn(T, U) -> R + 'static,
    {
        let key = Rc::new(key);
        let result = Rc::new(result);
        let prepare: Prepare<T, U, R> = Rc::new(move |items: Vec<U>| -> Probe<T, R> {
            let index = last_by_key(items, &other_key);
            let key = Rc::clone(&key);
            let result = Rc::clone(&result);
            Box::new(move |x: T| match index.get(&key(&x)) {
                Some(u) => vec![result(x, u.clone())],
                None => Vec::new(),
            })
        });
        self.joined(other, "join", prepare)
    }

    /// Left join through a key index over `other`.
    ///
    /// Emits exactly one `result(item, matched)` per item of this stage,
    /// with `None` when nothing in `other` has the same key. When `other`
    /// repeats a key, the last item with that key is the match.
    ///
    /// # Errors
    /// Fails immediately if `other` is known to be infinite.
    pub fn left_join<U, K, R, KF, OKF, RF>(
        &self,
        other: &Jstream<U>,
        key: KF,
        other_key: OKF,
        result: RF,
    ) -> Result<Jstream<R>>
    where
        U: JBound,
        R: JBound,
        K: Eq + Hash + 'static,
        KF: Fn(&T) -> K + 'static,
        OKF: Fn(&U) -> K + 'static,
        RF: Fn(T, Option<U>) -> R + 'static,
    {
        let key = Rc::new(key);
        let result = Rc::new(result);
        let prepare: Prepare<T, U, R> = Rc::new(move |items: Vec<U>| -> Probe<T, R> {
            let index = last_by_key(items, &other_key);
            let key = Rc::clone(&key);
            let result = Rc::clone(&result);
            Box::new(move |x: T| {
                let matched = index.get(&key(&x)).cloned();
                vec![result(x, matched)]
            })
        });
        self.joined(other, "left_join", prepare)
    }

    /// Group join through a key index over `other`: one
    /// `result(item, group)` per item of this stage, where `group` holds every
    /// item of `other` with the same key, in order, possibly none.
    ///
    /// # Errors
    /// Fails immediately if `other` is known to be infinite.
    pub fn group_join<U, K, R, KF, OKF, RF>(
        &self,
        other: &Jstream<U>,
        key: KF,
        other_key: OKF,
        result: RF,
    ) -> Result<Jstream<R>>
    where
        U: JBound,
        R: JBound,
        K: Eq + Hash + 'static,
        KF: Fn(&T) -> K + 'static,
        OKF: Fn(&U) -> K + 'static,
        RF: Fn(T, &[U]) -> R + 'static,
    {
        let key = Rc::new(key);
        let result = Rc::new(result);
        let prepare: Prepare<T, U, R> = Rc::new(move |items: Vec<U>| -> Probe<T, R> {
            let mut groups: HashMap<K, Vec<U>> = HashMap::new();
            for u in items {
                groups.entry(other_key(&u)).or_default().push(u);
            }
            let key = Rc::clone(&key);
            let result = Rc::clone(&result);
            Box::new(move |x: T| {
                let group = groups.get(&key(&x)).map_or(&[][..], Vec::as_slice);
                vec![result(x, group)]
            })
        });
        self.joined(other, "group_join", prepare)
    }

    /// Inner join by nested scan: emits `result(item, matched)` for every
    /// pair satisfying `matches`.
    ///
    /// # Errors
    /// Fails immediately if `other` is known to be infinite.
    pub fn join_where<U, R, PF, RF>(
        &self,
        other: &Jstream<U>,
        matches: PF,
        result: RF,
    ) -> Result<Jstream<R>>
    where
        U: JBound,
        R: JBound,
        PF: Fn(&T, &U) -> bool + 'static,
        RF: Fn(T, U) -> R + 'static,
    {
        let matches = Rc::new(matches);
        let result = Rc::new(result);
        let prepare: Prepare<T, U, R> = Rc::new(move |items: Vec<U>| -> Probe<T, R> {
            let matches = Rc::clone(&matches);
            let result = Rc::clone(&result);
            Box::new(move |x: T| {
                items
                    .iter()
                    .filter(|u| matches(&x, *u))
                    .map(|u| result(x.clone(), u.clone()))
                    .collect()
            })
        });
        self.joined(other, "join_where", prepare)
    }

    /// Left join by nested scan: one `result(item, matched)` per item of
    /// this stage, pairing it with the first item of `other` satisfying
    /// `matches`, or `None`.
    ///
    /// # Errors
    /// Fails immediately if `other` is known to be infinite.
    pub fn left_join_where<U, R, PF, RF>(
        &self,
        other: &Jstream<U>,
        matches: PF,
        result: RF,
    ) -> Result<Jstream<R>>
    where
        U: JBound,
        R: JBound,
        PF: Fn(&T, &U) -> bool + 'static,
        RF: Fn(T, Option<U>) -> R + 'static,
    {
        let matches = Rc::new(matches);
        let result = Rc::new(result);
        let prepare: Prepare<T, U, R> = Rc::new(move |items: Vec<U>| -> Probe<T, R> {
            let matches = Rc::clone(&matches);
            let result = Rc::clone(&result);
            Box::new(move |x: T| {
                let matched = items.iter().find(|u| matches(&x, *u)).cloned();
                vec![result(x, matched)]
            })
        });
        self.joined(other, "left_join_where", prepare)
    }

    /// Group join by nested scan: one `result(item, group)` per item of this
    /// stage, where `group` holds every item of `other` satisfying `matches`.
    ///
    /// # Errors
    /// Fails immediately if `other` is known to be infinite.
    pub fn group_join_where<U, R, PF, RF>(
        &self,
        other: &Jstream<U>,
        matches: PF,
        result: RF,
    ) -> Result<Jstream<R>>
    where
        U: JBound,
        R: JBound,
        PF: Fn(&T, &U) -> bool + 'static,
        RF: Fn(T, &[U]) -> R + 'static,
    {
        let matches = Rc::new(matches);
        let result = Rc::new(result);
        let prepare: Prepare<T, U, R> = Rc::new(move |items: Vec<U>| -> Probe<T, R> {
            let matches = Rc::clone(&matches);
            let result = Rc::clone(&result);
            Box::new(move |x: T| {
                let group: Vec<U> = items.iter().filter(|u| matches(&x, *u)).cloned().collect();
                vec![result(x, &group)]
            })
        });
        self.joined(other, "group_join_where", prepare)
    }
}

/// Index `items` by key; later items overwrite earlier ones.
fn last_by_key<U, K, F>(items: Vec<U>, key: &F) -> HashMap<K, U>
where
    K: Eq + Hash,
    F: Fn(&U) -> K,
{
    items.into_iter().map(|u| (key(&u), u)).collect()
}
