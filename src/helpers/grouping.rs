//! Grouping by a derived key.
//!
//! Groups come out in first-seen-key order and each group keeps its items in
//! input order. Grouping drains the input, so known-infinite stages are
//! refused when the grouped stage is built.

use crate::collection::{JBound, Jstream};
use crate::stage::Materialize;
use anyhow::Result;
use indexmap::IndexMap;
use std::hash::Hash;
use std::rc::Rc;

struct GroupStage<T, K> {
    upstream: Jstream<T>,
    key: Rc<dyn Fn(&T) -> K>,
}

impl<T, K> Materialize<(K, Vec<T>)> for GroupStage<T, K>
where
    T: JBound,
    K: JBound + Eq + Hash,
{
    fn name(&self) -> &'static str {
        "group_by"
    }

    fn build(&self) -> Result<Vec<(K, Vec<T>)>> {
        Ok(index_groups(&self.upstream, &*self.key, "group_by")?
            .into_iter()
            .collect())
    }
}

fn index_groups<T, K>(
    upstream: &Jstream<T>,
    key: &dyn Fn(&T) -> K,
    operation: &'static str,
) -> Result<IndexMap<K, Vec<T>>>
where
    T: JBound,
    K: JBound + Eq + Hash,
{
    upstream.require_finite(operation)?;
    let mut groups: IndexMap<K, Vec<T>> = IndexMap::new();
    for item in upstream.iter() {
        let item = item?;
        groups.entry(key(&item)).or_default().push(item);
    }
    log::debug!("{operation}: grouped into {} key(s)", groups.len());
    Ok(groups)
}

/// Groups are complete, and every one of them transformed, before the first
/// pair is handed out.
struct GroupWithStage<T, K, G> {
    upstream: Jstream<T>,
    key: Rc<dyn Fn(&T) -> K>,
    transform: Rc<dyn Fn(&K, Jstream<T>) -> G>,
}

impl<T, K, G> Materialize<(K, G)> for GroupWithStage<T, K, G>
where
    T: JBound,
    K: JBound + Eq + Hash,
    G: JBound,
{
    fn name(&self) -> &'static str {
        "group_by_with"
    }

    fn build(&self) -> Result<Vec<(K, G)>> {
        let groups = index_groups(&self.upstream, &*self.key, "group_by_with")?;
        Ok(groups
            .into_iter()
            .map(|(k, items)| {
                let group = (self.transform)(&k, Jstream::of(items));
                (k, group)
            })
            .collect())
    }
}

impl<T: JBound> Jstream<T> {
    /// Group items by `key`.
    ///
    /// ```
    /// use jstream::Jstream;
    ///
    /// let groups = Jstream::of(vec![1, 2, 3]).group_by(|n| n % 2 == 0)?;
    /// assert_eq!(groups.to_vec()?, vec![(false, vec![1, 3]), (true, vec![2])]);
    /// # Ok::<(), anyhow::Error>(())
    /// ```
    ///
    /// # Errors
    /// Fails immediately on a known-infinite stage.
    pub fn group_by<K, F>(&self, key: F) -> Result<Jstream<(K, Vec<T>)>>
    where
        K: JBound + Eq + Hash,
        F: Fn(&T) -> K + 'static,
    {
        self.require_finite("group_by")?;
        let stage = GroupStage {
            upstream: self.clone(),
            key: Rc::new(key),
        };
        Ok(Jstream::buffered(stage))
    }

    /// Group items by `key`, then post-process every group, as its own
    /// stage, with `transform(&key, group)`.
    ///
    /// Each pass groups the whole input and then calls `transform` once per
    /// group, in first-seen-key order, before yielding the first pair.
    ///
    /// # Errors
    /// Fails immediately on a known-infinite stage.
    pub fn group_by_with<K, G, F, P>(&self, key: F, transform: P) -> Result<Jstream<(K, G)>>
    where
        K: JBound + Eq + Hash,
        G: JBound,
        F: Fn(&T) -> K + 'static,
        P: Fn(&K, Jstream<T>) -> G + 'static,
    {
        self.require_finite("group_by_with")?;
        let stage = GroupWithStage {
            upstream: self.clone(),
            key: Rc::new(key),
            transform: Rc::new(transform),
        };
        Ok(Jstream::buffered(stage))
    }
}
