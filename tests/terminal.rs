mod common;

use anyhow::Result;
use indexmap::{IndexMap, IndexSet};
use jstream::*;
use std::cell::{Cell, RefCell};
use std::ops::ControlFlow;
use std::rc::Rc;

fn counting_source(pulls: &Rc<Cell<usize>>, items: Vec<i32>) -> Jstream<i32> {
    let pulls = Rc::clone(pulls);
    Jstream::from_fn(move || {
        let pulls = Rc::clone(&pulls);
        items.clone().into_iter().inspect(move |_| pulls.set(pulls.get() + 1))
    })
}

#[test]
fn count_answers_from_known_length() -> Result<()> {
    common::init_logging();
    let pulls = Rc::new(Cell::new(0));
    let source = counting_source(&pulls, vec![1, 2, 3]);
    assert_eq!(source.non_iterated_count(), None);
    assert_eq!(source.count()?, 3);
    assert_eq!(pulls.get(), 3);

    let known = Jstream::of(vec![1, 2, 3]).map(|x| x + 1);
    assert_eq!(known.non_iterated_count(), Some(3));
    assert_eq!(known.count()?, 3);
    assert_eq!(Jstream::of(vec![1, 2, 3]).filter(|x| *x > 1).non_iterated_count(), None);
    Ok(())
}

#[test]
fn early_exit_operations_stop_pulling() -> Result<()> {
    let pulls = Rc::new(Cell::new(0));
    let source = counting_source(&pulls, vec![1, 2, 3, 4, 5]);

    assert_eq!(source.first()?, Some(1));
    assert_eq!(pulls.get(), 1);

    pulls.set(0);
    assert_eq!(source.find(|x| *x == 3)?, Some(3));
    assert_eq!(pulls.get(), 3);

    pulls.set(0);
    assert!(!source.is_empty()?);
    assert_eq!(pulls.get(), 1);
    Ok(())
}

#[test]
fn positional_lookup() -> Result<()> {
    let letters = Jstream::of(vec!['a', 'b', 'c']);
    assert_eq!(letters.first()?, Some('a'));
    assert_eq!(letters.last()?, Some('c'));
    assert_eq!(letters.at(1)?, Some('b'));
    assert_eq!(letters.at(-1)?, Some('c'));
    assert_eq!(letters.at(-3)?, Some('a'));
    assert_eq!(letters.at(-4)?, None);
    assert_eq!(letters.at(3)?, None);

    let none = Jstream::<char>::empty();
    assert_eq!(none.first()?, None);
    assert_eq!(none.last()?, None);
    assert!(none.is_empty()?);
    Ok(())
}

#[test]
fn searching() -> Result<()> {
    let numbers = Jstream::of(vec![4, 7, 10, 13]);
    assert_eq!(numbers.find(|x| x % 2 == 1)?, Some(7));
    assert_eq!(numbers.find_last(|x| x % 2 == 1)?, Some(13));
    assert_eq!(numbers.find(|x| *x > 100)?, None);
    assert_eq!(numbers.find_or(|x| *x > 100, -1)?, -1);
    assert_eq!(numbers.find_or_else(|x| *x > 100, || 0)?, 0);
    assert_eq!(numbers.find_or(|x| *x > 8, -1)?, 10);
    Ok(())
}

#[test]
fn predicates() -> Result<()> {
    let numbers = Jstream::of(vec![2, 4, 6]);
    assert!(numbers.every(|x| x % 2 == 0)?);
    assert!(numbers.some(|x| *x == 4)?);
    assert!(numbers.none(|x| *x > 6)?);

    let none = Jstream::<i32>::empty();
    assert!(none.every(|_| false)?);
    assert!(!none.some(|_| true)?);
    assert!(none.none(|_| true)?);
    Ok(())
}

#[test]
fn sequence_equality() -> Result<()> {
    let a = Jstream::of(vec![1, 2, 3]);
    assert!(a.sequence_equals(&Jstream::of(vec![1, 2, 3]))?);
    assert!(!a.sequence_equals(&Jstream::of(vec![1, 2]))?);
    assert!(!a.sequence_equals(&Jstream::of(vec![1, 2, 4]))?);
    assert!(a.sequence_equals(&Jstream::over(1..4))?);

    let words = Jstream::of(vec!["one", "two"]);
    assert!(words.sequence_equals_by(&Jstream::of(vec![3, 3]), |w, n| w.len() == *n)?);

    // one infinite side still ends at the first mismatch
    let naturals = Jstream::generate(|i| i as i32 + 1);
    assert!(!a.sequence_equals(&naturals)?);
    assert!(naturals.sequence_equals(&naturals).is_err());
    Ok(())
}

#[test]
fn reduce_seeds_with_the_first_item() -> Result<()> {
    let numbers = Jstream::of(vec![3, 5, 7]);
    let positions = RefCell::new(Vec::new());
    let sum = numbers.reduce(|acc, x, i| {
        positions.borrow_mut().push(i);
        acc + x
    })?;
    assert_eq!(sum, 15);
    assert_eq!(positions.into_inner(), vec![1, 2]);

    let mean = numbers.reduce_then(|acc, x, _| acc + x, |total, n| total as f64 / n as f64)?;
    assert!((mean - 5.0).abs() < f64::EPSILON);
    Ok(())
}

#[test]
fn reduce_on_empty_input_fails() {
    let err = Jstream::<i32>::empty().reduce(|a, b, _| a + b).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<StreamError>(),
        Some(StreamError::EmptyInput { operation: "reduce" })
    ));
}

#[test]
fn fold_counts_positions_from_zero() -> Result<()> {
    let words = Jstream::of(vec!["a", "b", "c"]);
    let tagged = words.fold(String::new(), |mut acc, w, i| {
        acc.push_str(&format!("{i}{w}"));
        acc
    })?;
    assert_eq!(tagged, "0a1b2c");

    let empty = Jstream::<&str>::empty().fold(10, |acc, _, _| acc + 1)?;
    assert_eq!(empty, 10);

    let (len, n) = words.fold_then(0, |acc, w, _| acc + w.len(), |total, n| (total, n))?;
    assert_eq!((len, n), (3, 3));
    Ok(())
}

#[test]
fn for_each_can_stop_early() -> Result<()> {
    let mut seen = Vec::new();
    Jstream::of(vec![1, 2, 3, 4]).for_each(|x, i| {
        seen.push((i, x));
        if x == 2 {
            ControlFlow::Break(())
        } else {
            ControlFlow::Continue(())
        }
    })?;
    assert_eq!(seen, vec![(0, 1), (1, 2)]);
    Ok(())
}

#[test]
fn make_string_joins_rendered_items() -> Result<()> {
    assert_eq!(Jstream::of(vec![1, 2, 3]).make_string(", ")?, "1, 2, 3");
    assert_eq!(Jstream::<i32>::empty().make_string(", ")?, "");
    Ok(())
}

#[test]
fn vectors_sets_and_maps() -> Result<()> {
    let source = Jstream::of(vec![3, 1, 3, 2]);
    assert_eq!(source.to_set()?, IndexSet::from([3, 1, 2]));

    let shared = source.as_vec()?;
    assert!(Rc::ptr_eq(&shared, &source.as_vec()?));
    assert!(!Rc::ptr_eq(&shared, &source.map(|x| x).as_vec()?));

    let set = Jstream::over_set(IndexSet::from(["x", "y"]));
    assert!(Rc::ptr_eq(&set.as_set()?, &set.as_set()?));

    let entries = Jstream::of(vec![("a", 1), ("b", 2), ("a", 3)]);
    let map = entries.to_map()?;
    assert_eq!(map.len(), 2);
    assert_eq!(map["a"], 3);
    assert_eq!(map.get_index(0), Some((&"a", &3)));

    let shared_map = Jstream::over_map(map.clone());
    assert_eq!(shared_map.to_map()?, map);
    assert!(Rc::ptr_eq(&shared_map.as_map()?, &shared_map.as_map()?));

    let rebuilt = Jstream::of(map.clone().into_iter().collect::<Vec<_>>()).to_map()?;
    assert_eq!(rebuilt, map);
    assert!(rebuilt.iter().eq(map.iter()));

    let by_len: IndexMap<usize, &str> = Jstream::of(vec!["aa", "b", "cc"]).to_map_by(|s| s.len(), |s| s)?;
    assert_eq!(by_len, IndexMap::from([(2, "cc"), (1, "b")]));
    Ok(())
}

#[cfg(feature = "json")]
#[test]
fn entries_render_as_a_json_object() -> Result<()> {
    let entries = Jstream::of(vec![(1, "one"), (2, "two")]);
    let object = entries.to_object()?;
    assert_eq!(
        serde_json::Value::Object(object),
        serde_json::json!({ "1": "one", "2": "two" })
    );
    Ok(())
}

#[test]
fn errors_surface_from_terminals() {
    let failing = Jstream::of(vec![1, 0, 2]).sort_by(Order::try_by(|a: &i32, b: &i32| {
        if *a == 0 || *b == 0 {
            anyhow::bail!("zero is not comparable");
        }
        Ok(a.cmp(b))
    }));
    let err = failing.and_then(|s| s.to_vec()).unwrap_err();
    assert!(err.to_string().contains("zero"));
}
