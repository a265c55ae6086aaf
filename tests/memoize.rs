use anyhow::Result;
use jstream::*;
use std::cell::Cell;
use std::rc::Rc;

fn counted(pulls: &Rc<Cell<usize>>) -> Jstream<i32> {
    let counter = Rc::clone(pulls);
    Jstream::of(vec![1, 2, 3, 4]).map(move |x| {
        counter.set(counter.get() + 1);
        x
    })
}

#[test]
fn memoize_pulls_each_item_once() -> Result<()> {
    let pulls = Rc::new(Cell::new(0));
    let memo = counted(&pulls).memoize();
    assert_eq!(memo.non_iterated_count(), None);

    assert_eq!(memo.take(2).to_vec()?, vec![1, 2]);
    assert_eq!(pulls.get(), 2);

    assert_eq!(memo.to_vec()?, vec![1, 2, 3, 4]);
    assert_eq!(memo.to_vec()?, vec![1, 2, 3, 4]);
    assert_eq!(pulls.get(), 4);
    assert_eq!(memo.non_iterated_count(), Some(4));
    Ok(())
}

#[test]
fn memoize_works_over_infinite_sources() -> Result<()> {
    let pulls = Rc::new(Cell::new(0));
    let counter = Rc::clone(&pulls);
    let memo = Jstream::generate(move |i| {
        counter.set(counter.get() + 1);
        i * 2
    })
    .memoize();
    assert!(memo.properties().infinite.is_true());

    assert_eq!(memo.take(3).to_vec()?, vec![0, 2, 4]);
    assert_eq!(memo.take(5).to_vec()?, vec![0, 2, 4, 6, 8]);
    assert_eq!(pulls.get(), 5);
    Ok(())
}

#[test]
fn memoize_retries_after_a_failure() -> Result<()> {
    let attempts = Rc::new(Cell::new(0));
    let counter = Rc::clone(&attempts);
    let flaky = Jstream::of(vec![1, 2])
        .sort_by(Order::try_by(move |a: &i32, b: &i32| {
            counter.set(counter.get() + 1);
            if counter.get() == 1 {
                anyhow::bail!("transient");
            }
            Ok(a.cmp(b))
        }))?
        .memoize();

    assert!(flaky.to_vec().is_err());
    assert_eq!(flaky.to_vec()?, vec![1, 2]);
    Ok(())
}

#[test]
fn collapse_evaluates_immediately() -> Result<()> {
    let pulls = Rc::new(Cell::new(0));
    let collapsed = counted(&pulls).collapse()?;
    assert_eq!(pulls.get(), 4);
    assert_eq!(collapsed.non_iterated_count(), Some(4));
    assert_eq!(collapsed.to_vec()?, vec![1, 2, 3, 4]);
    assert_eq!(pulls.get(), 4);

    assert!(Jstream::generate(|i| i).collapse().is_err());
    Ok(())
}
