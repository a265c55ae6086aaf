//! Order-preserving de-duplication.
//!
//! # Overview
//! - [`Jstream::unique`] - drop repeated items
//! - [`Jstream::unique_by`] - drop items whose derived identity was already seen
//!
//! Both are single-pass and lazy: an item is yielded the first time its
//! identity appears, so they work on infinite stages too. Identity is exact
//! `Eq + Hash` equality of the derived key, not a custom comparator.

use crate::collection::{JBound, Jstream};
use crate::stage::{Pull, Stage};
use std::collections::HashSet;
use std::hash::Hash;
use std::rc::Rc;

struct UniqueStage<T, K> {
    upstream: Jstream<T>,
    identity: Rc<dyn Fn(&T) -> K>,
}

impl<T, K> Stage<T> for UniqueStage<T, K>
where
    T: JBound,
    K: Eq + Hash + 'static,
{
    fn name(&self) -> &'static str {
        "unique"
    }

    fn open(&self) -> Pull<T> {
        let identity = Rc::clone(&self.identity);
        let mut seen = HashSet::new();
        Box::new(self.upstream.iter().filter(move |item| match item {
            Ok(x) => seen.insert(identity(x)),
            Err(_) => true,
        }))
    }
}

impl<T: JBound> Jstream<T> {
    /// Keep the first item for each distinct `identity(item)`.
    ///
    /// # Example
    /// ```
    /// use jstream::Jstream;
    ///
    /// let words = Jstream::of(vec!["apple", "avocado", "banana", "blueberry", "cherry"]);
    /// let by_letter = words.unique_by(|w| w.chars().next());
    /// assert_eq!(by_letter.to_vec()?, vec!["apple", "banana", "cherry"]);
    /// # Ok::<(), anyhow::Error>(())
    /// ```
    #[must_use]
    pub fn unique_by<K, F>(&self, identity: F) -> Self
    where
        K: Eq + Hash + 'static,
        F: Fn(&T) -> K + 'static,
    {
        Self::new(
            UniqueStage {
                upstream: self.clone(),
                identity: Rc::new(identity),
            },
            self.props.derived(),
        )
    }
}

impl<T: JBound + Eq + Hash> Jstream<T> {
    /// Keep the first occurrence of each item.
    #[must_use]
    pub fn unique(&self) -> Self {
        self.unique_by(T::clone)
    }
}
