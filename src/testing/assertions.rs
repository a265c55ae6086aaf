//! Assertion functions for testing pipeline outputs.
//!
//! Each assertion runs the given [`Jstream`] once, compares what it produced
//! with the expectation, and panics with a detailed message on mismatch.
//! Evaluation errors are returned rather than turned into panics, so tests
//! can use `?`.

use crate::collection::{JBound, Jstream};
use anyhow::Result;
use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;

/// Assert that a pipeline yields exactly `expected`, in order.
///
/// # Errors
/// Propagates the pipeline's evaluation errors.
///
/// # Panics
///
/// Panics if the outputs differ in length or content.
///
/// # Example
///
/// ```
/// use jstream::Jstream;
/// use jstream::testing::assert_collections_equal;
///
/// let doubled = Jstream::of(vec![1, 2, 3]).map(|x| x * 2);
/// assert_collections_equal(&doubled, &[2, 4, 6])?;
/// # Ok::<(), anyhow::Error>(())
/// ```
pub fn assert_collections_equal<T>(actual: &Jstream<T>, expected: &[T]) -> Result<()>
where
    T: JBound + Debug + PartialEq,
{
    let actual = actual.to_vec()?;
    assert_eq!(
        actual.len(),
        expected.len(),
        "Collection length mismatch:\n  Expected length: {}\n  Actual length: {}\n  Expected: {expected:?}\n  Actual: {actual:?}",
        expected.len(),
        actual.len()
    );

    for (i, (a, e)) in actual.iter().zip(expected).enumerate() {
        assert_eq!(
            a, e,
            "Collection mismatch at index {i}:\n  Expected: {e:?}\n  Actual: {a:?}\n  Full expected: {expected:?}\n  Full actual: {actual:?}"
        );
    }
    Ok(())
}

/// Assert that a pipeline yields the items of `expected` in any order,
/// counting duplicates.
///
/// # Errors
/// Propagates the pipeline's evaluation errors.
///
/// # Panics
///
/// Panics if the outputs differ as multisets.
///
/// # Example
///
/// ```
/// use jstream::Jstream;
/// use jstream::testing::assert_collections_unordered_equal;
///
/// let shuffled = Jstream::of(vec![1, 2, 2, 3]).shuffle(None)?;
/// assert_collections_unordered_equal(&shuffled, &[2, 3, 1, 2])?;
/// # Ok::<(), anyhow::Error>(())
/// ```
pub fn assert_collections_unordered_equal<T>(actual: &Jstream<T>, expected: &[T]) -> Result<()>
where
    T: JBound + Debug + Eq + Hash,
{
    let actual = actual.to_vec()?;
    assert_eq!(
        actual.len(),
        expected.len(),
        "Collection length mismatch:\n  Expected length: {}\n  Actual length: {}\n  Expected: {expected:?}\n  Actual: {actual:?}",
        expected.len(),
        actual.len()
    );

    let actual_counts = tally(&actual);
    let expected_counts = tally(expected);
    if actual_counts != expected_counts {
        let missing: Vec<_> = expected_counts
            .iter()
            .filter(|(item, n)| actual_counts.get(*item).copied().unwrap_or(0) < **n)
            .map(|(item, _)| item)
            .collect();
        let extra: Vec<_> = actual_counts
            .iter()
            .filter(|(item, n)| expected_counts.get(*item).copied().unwrap_or(0) < **n)
            .map(|(item, _)| item)
            .collect();

        panic!(
            "Collection content mismatch:\n  Missing elements: {missing:?}\n  Extra elements: {extra:?}\n  Expected: {expected:?}\n  Actual: {actual:?}"
        );
    }
    Ok(())
}

fn tally<T: Eq + Hash>(items: &[T]) -> HashMap<&T, usize> {
    let mut counts = HashMap::new();
    for item in items {
        *counts.entry(item).or_insert(0) += 1;
    }
    counts
}

/// Assert that a pipeline of key-value pairs yields `expected` after both
/// are sorted by key. Stable sorting keeps the value order within a key.
///
/// # Errors
/// Propagates the pipeline's evaluation errors.
///
/// # Panics
///
/// Panics if the pairs differ after sorting by key.
///
/// # Example
///
/// ```
/// use jstream::Jstream;
/// use jstream::testing::assert_kv_collections_equal;
///
/// let counts = Jstream::of(vec!["b", "a", "b"])
///     .group_by(|s| s.to_string())?
///     .map(|(k, v)| (k, v.len()));
/// assert_kv_collections_equal(&counts, vec![("a".to_string(), 1), ("b".to_string(), 2)])?;
/// # Ok::<(), anyhow::Error>(())
/// ```
pub fn assert_kv_collections_equal<K, V>(
    actual: &Jstream<(K, V)>,
    mut expected: Vec<(K, V)>,
) -> Result<()>
where
    K: JBound + Debug + Ord,
    V: JBound + Debug + PartialEq,
{
    let mut actual = actual.to_vec()?;
    actual.sort_by(|a, b| a.0.cmp(&b.0));
    expected.sort_by(|a, b| a.0.cmp(&b.0));

    assert_eq!(
        actual.len(),
        expected.len(),
        "Collection length mismatch:\n  Expected length: {}\n  Actual length: {}\n  Expected: {expected:?}\n  Actual: {actual:?}",
        expected.len(),
        actual.len()
    );

    for (i, ((ak, av), (ek, ev))) in actual.iter().zip(expected.iter()).enumerate() {
        assert!(
            !(ak != ek || av != ev),
            "Collection mismatch at index {i} after sorting:\n  Expected: ({ek:?}, {ev:?})\n  Actual: ({ak:?}, {av:?})\n  Full expected: {expected:?}\n  Full actual: {actual:?}"
        );
    }
    Ok(())
}

/// Assert that every item a pipeline yields satisfies `predicate`.
///
/// # Errors
/// Propagates the pipeline's evaluation errors.
///
/// # Panics
///
/// Panics at the first item that does not satisfy the predicate.
///
/// # Example
///
/// ```
/// use jstream::Jstream;
/// use jstream::testing::assert_all;
///
/// assert_all(&Jstream::of(vec![2, 4, 6, 8]), |x| x % 2 == 0)?;
/// # Ok::<(), anyhow::Error>(())
/// ```
pub fn assert_all<T>(actual: &Jstream<T>, predicate: impl Fn(&T) -> bool) -> Result<()>
where
    T: JBound + Debug,
{
    let items = actual.to_vec()?;
    for (i, item) in items.iter().enumerate() {
        assert!(
            predicate(item),
            "Predicate failed for element at index {i}:\n  Element: {item:?}\n  Collection: {items:?}"
        );
    }
    Ok(())
}

/// Assert that at least one item a pipeline yields satisfies `predicate`.
///
/// # Errors
/// Propagates the pipeline's evaluation errors.
///
/// # Panics
///
/// Panics if no item satisfies the predicate.
///
/// # Example
///
/// ```
/// use jstream::Jstream;
/// use jstream::testing::assert_any;
///
/// assert_any(&Jstream::of(vec![1, 2, 3, 4]), |x| x % 2 == 0)?;
/// # Ok::<(), anyhow::Error>(())
/// ```
pub fn assert_any<T>(actual: &Jstream<T>, predicate: impl Fn(&T) -> bool) -> Result<()>
where
    T: JBound + Debug,
{
    let items = actual.to_vec()?;
    assert!(
        items.iter().any(&predicate),
        "No elements satisfied the predicate:\n  Collection: {items:?}"
    );
    Ok(())
}

/// Assert that no item a pipeline yields satisfies `predicate`.
///
/// # Errors
/// Propagates the pipeline's evaluation errors.
///
/// # Panics
///
/// Panics at the first item that satisfies the predicate.
///
/// # Example
///
/// ```
/// use jstream::Jstream;
/// use jstream::testing::assert_none;
///
/// assert_none(&Jstream::of(vec![1, 3, 5, 7]), |x| x % 2 == 0)?;
/// # Ok::<(), anyhow::Error>(())
/// ```
pub fn assert_none<T>(actual: &Jstream<T>, predicate: impl Fn(&T) -> bool) -> Result<()>
where
    T: JBound + Debug,
{
    let items = actual.to_vec()?;
    for (i, item) in items.iter().enumerate() {
        assert!(
            !predicate(item),
            "Predicate unexpectedly succeeded for element at index {i}:\n  Element: {item:?}\n  Collection: {items:?}"
        );
    }
    Ok(())
}

/// Assert that two separate iterations of a pipeline yield the same items.
///
/// # Errors
/// Propagates the pipeline's evaluation errors.
///
/// # Panics
///
/// Panics if the second iteration differs from the first.
pub fn assert_reiterable<T>(actual: &Jstream<T>) -> Result<()>
where
    T: JBound + Debug + PartialEq,
{
    let first = actual.to_vec()?;
    let second = actual.to_vec()?;
    assert_eq!(
        first, second,
        "Second iteration differs from the first:\n  First: {first:?}\n  Second: {second:?}"
    );
    Ok(())
}
