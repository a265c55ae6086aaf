mod common;

use anyhow::Result;
use jstream::testing::*;
use jstream::*;
use std::cell::Cell;
use std::rc::Rc;

#[derive(Clone, Debug, PartialEq)]
struct Purchase {
    id: u32,
    customer: u32,
    total: u32,
}

fn customers() -> Jstream<(u32, &'static str)> {
    Jstream::of(vec![(1, "ann"), (2, "bob"), (3, "cid")])
}

fn orders() -> Jstream<Purchase> {
    Jstream::of(vec![
        Purchase { id: 10, customer: 1, total: 40 },
        Purchase { id: 11, customer: 3, total: 15 },
        Purchase { id: 12, customer: 1, total: 5 },
    ])
}

#[test]
fn inner_join_keeps_left_order() -> Result<()> {
    common::init_logging();
    let joined = orders().join(&customers(), |o| o.customer, |c| c.0, |o, c| (o.id, c.1))?;
    assert_collections_equal(&joined, &[(10, "ann"), (11, "cid"), (12, "ann")])
}

#[test]
fn duplicate_keys_on_the_other_side_keep_the_last() -> Result<()> {
    let left = Jstream::of(vec![1]);
    let right = Jstream::of(vec![(1, "a"), (1, "b")]);
    let joined = left.join(&right, |x| *x, |r| r.0, |_, r| r.1)?;
    assert_eq!(joined.to_vec()?, vec!["b"]);

    let left_joined = left.left_join(&right, |x| *x, |r| r.0, |_, r| r.map(|r| r.1))?;
    assert_eq!(left_joined.to_vec()?, vec![Some("b")]);
    Ok(())
}

#[test]
fn left_join_emits_one_row_per_item() -> Result<()> {
    let spent = customers().left_join(&orders(), |c| c.0, |o| o.customer, |c, o| {
        (c.1, o.map(|o| o.id))
    })?;
    assert_eq!(
        spent.to_vec()?,
        vec![("ann", Some(12)), ("bob", None), ("cid", Some(11))]
    );
    Ok(())
}

#[test]
fn group_join_collects_every_match() -> Result<()> {
    let totals = customers().group_join(&orders(), |c| c.0, |o| o.customer, |c, os| {
        (c.1, os.iter().map(|o| o.total).sum::<u32>())
    })?;
    assert_kv_collections_equal(&totals, vec![("ann", 45), ("bob", 0), ("cid", 15)])
}

#[test]
fn predicate_joins() -> Result<()> {
    let thresholds = Jstream::of(vec![10, 20, 50]);
    let big = thresholds.join_where(&orders(), |t, o| o.total >= *t, |t, o| (t, o.id))?;
    assert_eq!(big.to_vec()?, vec![(10, 10), (10, 11), (20, 10)]);

    let first = thresholds.left_join_where(&orders(), |t, o| o.total >= *t, |t, o| {
        (t, o.map(|o| o.id))
    })?;
    assert_eq!(first.to_vec()?, vec![(10, Some(10)), (20, Some(10)), (50, None)]);

    let counted = thresholds.group_join_where(&orders(), |t, o| o.total < *t, |t, os| {
        (t, os.len())
    })?;
    assert_eq!(counted.to_vec()?, vec![(10, 1), (20, 2), (50, 3)]);
    Ok(())
}

#[test]
fn joins_run_on_iteration_and_rerun() -> Result<()> {
    let drains = Rc::new(Cell::new(0));
    let counter = Rc::clone(&drains);
    let right = Jstream::from_fn(move || {
        counter.set(counter.get() + 1);
        vec![(1, 'x'), (2, 'y')]
    });
    let joined = Jstream::of(vec![2, 1, 3]).join(&right, |x| *x, |r| r.0, |_, r| r.1)?;
    assert_eq!(drains.get(), 0);

    assert_eq!(joined.to_vec()?, vec!['y', 'x']);
    assert_eq!(joined.to_vec()?, vec!['y', 'x']);
    assert_eq!(drains.get(), 2);
    Ok(())
}

#[test]
fn infinite_sides() -> Result<()> {
    let naturals = Jstream::generate(|i| i);
    let small = Jstream::of(vec![(2, "two"), (4, "four")]);

    assert!(small.join(&naturals, |p| p.0, |n| *n, |p, _| p.1).is_err());

    let labelled = naturals.left_join(&small, |n| *n, |p| p.0, |n, p| (n, p.map(|p| p.1)))?;
    assert!(labelled.properties().infinite.is_true());
    assert_eq!(
        labelled.take(3).to_vec()?,
        vec![(0, None), (1, None), (2, Some("two"))]
    );
    Ok(())
}
