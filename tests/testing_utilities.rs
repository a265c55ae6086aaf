//! Example tests demonstrating the testing utilities.

mod common;

use anyhow::Result;
use jstream::testing::*;
use jstream::*;
use std::cell::RefCell;
use std::rc::Rc;

#[test]
fn test_basic_pipeline_with_assertions() -> Result<()> {
    let doubled = Jstream::of(vec![1, 2, 3]).map(|x| x * 2);
    assert_collections_equal(&doubled, &[2, 4, 6])?;
    assert_reiterable(&doubled)
}

#[test]
fn test_unordered_comparison() -> Result<()> {
    let shuffled = Jstream::of(vec!["b", "a", "c", "a"]).shuffle(None)?;
    assert_collections_unordered_equal(&shuffled, &["a", "a", "b", "c"])
}

#[test]
fn test_kv_operations() -> Result<()> {
    let counts = Jstream::of(vec!["x", "y", "x", "z", "x"])
        .group_by(|s| *s)?
        .map(|(k, v)| (k, v.len()));
    assert_kv_collections_equal(&counts, vec![("z", 1), ("x", 3), ("y", 1)])
}

#[test]
fn test_predicate_assertions() -> Result<()> {
    let evens = Jstream::over(0..20).filter(|x| x % 2 == 0);
    assert_all(&evens, |x| x % 2 == 0)?;
    assert_any(&evens, |x| *x > 15)?;
    assert_none(&evens, |x| *x >= 20)
}

#[test]
#[should_panic(expected = "Collection mismatch at index 1")]
fn test_mismatch_panics_with_position() {
    let _ = assert_collections_equal(&Jstream::of(vec![1, 2, 3]), &[1, 5, 3]);
}

#[test]
#[should_panic(expected = "Second iteration differs")]
fn test_one_shot_source_is_not_reiterable() {
    let once = Jstream::once(vec![1, 2]);
    let _ = assert_reiterable(&once);
}

#[test]
fn test_debug_stages_pass_items_through() -> Result<()> {
    common::init_logging();
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    let traced = Jstream::over(0..25)
        .debug_inspect("source")
        .filter(|x| x % 5 == 0)
        .debug_inspect_with("filtered", move |x| sink.borrow_mut().push(*x))
        .debug_count("total");

    assert_eq!(traced.to_vec()?, vec![0, 5, 10, 15, 20]);
    assert_eq!(*seen.borrow(), vec![0, 5, 10, 15, 20]);
    Ok(())
}

#[test]
fn test_debug_stages_keep_known_length() {
    let traced = Jstream::of(vec![1, 2, 3]).debug_inspect("a").debug_count("b");
    assert_eq!(traced.non_iterated_count(), Some(3));
}
