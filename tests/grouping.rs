mod common;

use anyhow::Result;
use jstream::testing::*;
use jstream::*;
use std::cell::RefCell;
use std::rc::Rc;

#[test]
fn group_by_keeps_first_seen_key_order() -> Result<()> {
    common::init_logging();
    let groups = Jstream::of(vec![1, 2, 3, 4, 5]).group_by(|n| n % 2 == 0)?;
    assert_eq!(
        groups.to_vec()?,
        vec![(false, vec![1, 3, 5]), (true, vec![2, 4])]
    );
    Ok(())
}

#[test]
fn group_by_word_length() -> Result<()> {
    let words = Jstream::of(vec!["a", "bb", "cc", "d", "eee"]);
    let by_len = words.group_by(|w| w.len())?;
    assert_kv_collections_equal(
        &by_len,
        vec![(1, vec!["a", "d"]), (2, vec!["bb", "cc"]), (3, vec!["eee"])],
    )?;
    assert_eq!(by_len.properties().fresh_source, Tri::True);
    Ok(())
}

#[test]
fn group_by_with_transforms_each_group() -> Result<()> {
    let sales = Jstream::of(vec![("north", 5), ("south", 2), ("north", 7), ("south", 1)]);
    let summary = sales.group_by_with(
        |s| s.0,
        |region, group| {
            let total = group.fold(0, |acc, s, _| acc + s.1).unwrap_or(0);
            format!("{region}:{total}")
        },
    )?;
    assert_eq!(
        summary.map(|(_, line)| line).to_vec()?,
        vec!["north:12", "south:3"]
    );
    Ok(())
}

#[test]
fn group_by_with_transforms_every_group_before_the_first_pair() -> Result<()> {
    let calls = Rc::new(RefCell::new(Vec::new()));
    let log = Rc::clone(&calls);
    let sizes = Jstream::of(vec!["b1", "a1", "b2", "a2"]).group_by_with(
        |s| s.chars().next().unwrap_or(' '),
        move |key, group| {
            log.borrow_mut().push(*key);
            group.count().unwrap_or(0)
        },
    )?;
    assert!(calls.borrow().is_empty());

    assert_eq!(sizes.first()?, Some(('b', 2)));
    assert_eq!(*calls.borrow(), vec!['b', 'a']);

    assert_eq!(sizes.to_vec()?, vec![('b', 2), ('a', 2)]);
    assert_eq!(sizes.to_vec()?, vec![('b', 2), ('a', 2)]);
    // one call per group on every pass
    assert_eq!(calls.borrow().len(), 6);
    Ok(())
}

#[test]
fn group_by_with_refuses_infinite_input() {
    let err = Jstream::generate(|i| i)
        .group_by_with(|n| n % 2, |_, g| g.first().ok().flatten())
        .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<StreamError>(),
        Some(StreamError::NeverEnding { .. })
    ));
}

#[test]
fn empty_input_has_no_groups() -> Result<()> {
    let groups = Jstream::<i32>::empty().group_by(|n| *n)?;
    assert!(groups.is_empty()?);
    Ok(())
}

#[test]
fn infinite_input_is_refused() {
    let err = Jstream::generate(|i| i).group_by(|n| n % 2).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<StreamError>(),
        Some(StreamError::NeverEnding { .. })
    ));
}
