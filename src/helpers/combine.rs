//! Stages that read more than one input: concatenation, interleaving,
//! sorted merging, fallbacks and repetition.

use crate::collection::{JBound, Jstream};
use crate::error::StreamError;
use crate::ordering::Order;
use crate::properties::Tri;
use crate::stage::{Pull, Stage};
use anyhow::Result;
use std::cell::RefCell;
use std::collections::HashSet;
use std::hash::Hash;
use std::iter::Peekable;
use std::rc::Rc;

struct ChainStage<T> {
    first: Jstream<T>,
    second: Jstream<T>,
}

impl<T: JBound> Stage<T> for ChainStage<T> {
    fn name(&self) -> &'static str {
        "concat"
    }

    fn open(&self) -> Pull<T> {
        let second = self.second.clone();
        // the second side is only opened once the first runs dry
        Box::new(
            self.first
                .iter()
                .chain(std::iter::once(()).flat_map(move |()| second.iter())),
        )
    }

    fn known_len(&self) -> Option<usize> {
        let a = self.first.stage.known_len()?;
        let b = self.second.stage.known_len()?;
        a.checked_add(b)
    }
}

struct InterleaveStage<T> {
    left: Jstream<T>,
    right: Jstream<T>,
}

impl<T: JBound> Stage<T> for InterleaveStage<T> {
    fn name(&self) -> &'static str {
        "interleave"
    }

    fn open(&self) -> Pull<T> {
        Box::new(itertools::interleave(self.left.iter(), self.right.iter()))
    }

    fn known_len(&self) -> Option<usize> {
        let a = self.left.stage.known_len()?;
        let b = self.right.stage.known_len()?;
        a.checked_add(b)
    }
}

struct MergeStage<T> {
    left: Jstream<T>,
    right: Jstream<T>,
    order: Order<T>,
    strict: bool,
}

impl<T: JBound> Stage<T> for MergeStage<T> {
    fn name(&self) -> &'static str {
        if self.strict { "merge_strict" } else { "merge" }
    }

    fn open(&self) -> Pull<T> {
        Box::new(MergeIter {
            left: Side::new(self.left.iter()),
            right: Side::new(self.right.iter()),
            order: self.order.clone(),
            strict: self.strict,
            failed: false,
        })
    }

    fn known_len(&self) -> Option<usize> {
        let a = self.left.stage.known_len()?;
        let b = self.right.stage.known_len()?;
        a.checked_add(b)
    }
}

struct Side<T> {
    pull: Peekable<Pull<T>>,
    previous: Option<T>,
    position: usize,
}

impl<T> Side<T> {
    fn new(pull: Pull<T>) -> Self {
        Self {
            pull: pull.peekable(),
            previous: None,
            position: 0,
        }
    }
}

impl<T: JBound> Side<T> {
    fn advance(&mut self, order: &Order<T>, strict: bool) -> Option<Result<T>> {
        let item = match self.pull.next()? {
            Ok(item) => item,
            Err(e) => return Some(Err(e)),
        };
        if strict {
            if let Some(previous) = &self.previous {
                match order.compare(&item, previous) {
                    Ok(o) if o.is_lt() => {
                        return Some(Err(StreamError::OutOfOrder {
                            operation: "merge_strict",
                            position: self.position,
                        }
                        .into()));
                    }
                    Ok(_) => {}
                    Err(e) => return Some(Err(e)),
                }
            }
            self.previous = Some(item.clone());
        }
        self.position += 1;
        Some(Ok(item))
    }
}

struct MergeIter<T> {
    left: Side<T>,
    right: Side<T>,
    order: Order<T>,
    strict: bool,
    failed: bool,
}

impl<T: JBound> Iterator for MergeIter<T> {
    type Item = Result<T>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        // errors are emitted before comparing anything
        let take_right = match (self.left.pull.peek(), self.right.pull.peek()) {
            (None, None) => return None,
            (Some(Err(_)), _) | (Some(_), None) => false,
            (_, Some(Err(_))) | (None, Some(_)) => true,
            (Some(Ok(l)), Some(Ok(r))) => match self.order.compare(r, l) {
                // left wins ties
                Ok(o) => o.is_lt(),
                Err(e) => {
                    self.failed = true;
                    return Some(Err(e));
                }
            },
        };
        let item = if take_right {
            self.right.advance(&self.order, self.strict)
        } else {
            self.left.advance(&self.order, self.strict)
        };
        if matches!(item, Some(Err(_))) && self.strict {
            self.failed = true;
        }
        item
    }
}

struct IncludingStage<T> {
    upstream: Jstream<T>,
    extras: Rc<Vec<T>>,
}

impl<T: JBound + Eq + Hash> Stage<T> for IncludingStage<T> {
    fn name(&self) -> &'static str {
        "including"
    }

    fn open(&self) -> Pull<T> {
        let seen = Rc::new(RefCell::new(HashSet::new()));
        let record = Rc::clone(&seen);
        let extras = Rc::clone(&self.extras);
        let head = self.upstream.iter().inspect(move |item| {
            if let Ok(x) = item {
                record.borrow_mut().insert(x.clone());
            }
        });
        let tail = (0..extras.len()).filter_map(move |i| {
            let x = &extras[i];
            seen.borrow_mut().insert(x.clone()).then(|| Ok(x.clone()))
        });
        Box::new(head.chain(tail))
    }
}

struct IfEmptyStage<T> {
    upstream: Jstream<T>,
    alternative: Jstream<T>,
}

impl<T: JBound> Stage<T> for IfEmptyStage<T> {
    fn name(&self) -> &'static str {
        "if_empty"
    }

    fn open(&self) -> Pull<T> {
        let upstream = self.upstream.clone();
        let alternative = self.alternative.clone();
        // the choice waits for the first `next()`
        let mut chosen: Option<Pull<T>> = None;
        Box::new(std::iter::from_fn(move || {
            let pull = chosen.get_or_insert_with(|| {
                let mut head = upstream.iter().peekable();
                if head.peek().is_some() {
                    Box::new(head)
                } else {
                    alternative.iter()
                }
            });
            pull.next()
        }))
    }

    fn known_len(&self) -> Option<usize> {
        match self.upstream.stage.known_len()? {
            0 => self.alternative.stage.known_len(),
            n => Some(n),
        }
    }
}

struct RepeatStage<T> {
    upstream: Jstream<T>,
    times: Option<usize>,
}

impl<T: JBound> Stage<T> for RepeatStage<T> {
    fn name(&self) -> &'static str {
        "repeat"
    }

    fn open(&self) -> Pull<T> {
        let upstream = self.upstream.clone();
        match self.times {
            Some(n) => Box::new((0..n).flat_map(move |_| upstream.iter())),
            None => {
                // an empty pass would otherwise spin forever
                let produced = Rc::new(RefCell::new(true));
                let flag = Rc::clone(&produced);
                Box::new(
                    std::iter::repeat(())
                        .take_while(move |()| std::mem::replace(&mut *flag.borrow_mut(), false))
                        .flat_map(move |()| {
                            let produced = Rc::clone(&produced);
                            upstream.iter().inspect(move |_| *produced.borrow_mut() = true)
                        }),
                )
            }
        }
    }

    fn known_len(&self) -> Option<usize> {
        let len = self.upstream.stage.known_len()?;
        len.checked_mul(self.times?)
    }
}

impl<T: JBound> Jstream<T> {
    /// This stage's items followed by `other`'s.
    #[must_use]
    pub fn concat(&self, other: &Self) -> Self {
        Self::new(
            ChainStage {
                first: self.clone(),
                second: other.clone(),
            },
            self.props.combined(other.props),
        )
    }

    /// `other`'s items followed by this stage's.
    #[must_use]
    pub fn pre_concat(&self, other: &Self) -> Self {
        other.concat(self)
    }

    /// This stage's items followed by `items`.
    #[must_use]
    pub fn append(&self, items: Vec<T>) -> Self {
        self.concat(&Self::of(items))
    }

    /// `items` followed by this stage's items.
    #[must_use]
    pub fn prepend(&self, items: Vec<T>) -> Self {
        self.pre_concat(&Self::of(items))
    }

    /// Alternate items from this stage and `other`, starting with this one.
    /// Once either side runs out the rest of the other follows.
    #[must_use]
    pub fn interleave(&self, other: &Self) -> Self {
        Self::new(
            InterleaveStage {
                left: self.clone(),
                right: other.clone(),
            },
            self.props.combined(other.props),
        )
    }

    /// Merge two inputs already sorted by `order` into one sorted output.
    /// On ties this stage's item comes first. Unsorted inputs are not
    /// detected; see [`merge_strict`](Self::merge_strict).
    #[must_use]
    pub fn merge(&self, other: &Self, order: Order<T>) -> Self {
        self.with_merge(other, order, false)
    }

    /// Like [`merge`](Self::merge), but an input that is not sorted by
    /// `order` surfaces [`StreamError::OutOfOrder`] at iteration time.
    #[must_use]
    pub fn merge_strict(&self, other: &Self, order: Order<T>) -> Self {
        self.with_merge(other, order, true)
    }

    fn with_merge(&self, other: &Self, order: Order<T>, strict: bool) -> Self {
        Self::new(
            MergeStage {
                left: self.clone(),
                right: other.clone(),
                order,
                strict,
            },
            self.props.combined(other.props),
        )
    }

    /// Use `alternative` when this stage turns out to be empty.
    #[must_use]
    pub fn if_empty(&self, alternative: impl Into<Self>) -> Self {
        let alternative = alternative.into();
        let infinite = match self.props.infinite {
            // an endless stage is never empty
            Tri::True => Tri::True,
            own => own.or(alternative.props.infinite),
        };
        let props = self.props.combined(alternative.props).infinite(infinite);
        Self::new(
            IfEmptyStage {
                upstream: self.clone(),
                alternative,
            },
            props,
        )
    }

    /// The whole sequence, `times` times over.
    #[must_use]
    pub fn repeat(&self, times: usize) -> Self {
        let mut props = self.props.derived();
        if times == 0 {
            props.infinite = Tri::False;
        }
        Self::new(
            RepeatStage {
                upstream: self.clone(),
                times: Some(times),
            },
            props,
        )
    }

    /// The whole sequence over and over. Marked infinite; stops only if a
    /// complete pass produces nothing.
    #[must_use]
    pub fn repeat_forever(&self) -> Self {
        Self::new(
            RepeatStage {
                upstream: self.clone(),
                times: None,
            },
            self.props.derived().infinite(true),
        )
    }
}

impl<T: JBound + Eq + Hash> Jstream<T> {
    /// This stage's items, followed by those of `items` that it did not
    /// already produce.
    #[must_use]
    pub fn including(&self, items: Vec<T>) -> Self {
        Self::new(
            IncludingStage {
                upstream: self.clone(),
                extras: Rc::new(items),
            },
            self.props.derived(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_prefers_left_on_ties() -> Result<()> {
        let left = Jstream::of(vec![(1, 'a'), (3, 'a')]);
        let right = Jstream::of(vec![(1, 'b'), (2, 'b'), (3, 'b')]);
        let merged = left.merge(&right, Order::by_key(|p: &(i32, char)| p.0));
        assert_eq!(
            merged.to_vec()?,
            vec![(1, 'a'), (1, 'b'), (2, 'b'), (3, 'a'), (3, 'b')]
        );
        Ok(())
    }

    #[test]
    fn strict_merge_reports_position_of_unsorted_item() {
        let left = Jstream::of(vec![1, 4, 2]);
        let right = Jstream::of(vec![3]);
        let err = left
            .merge_strict(&right, Order::natural())
            .to_vec()
            .unwrap_err();
        assert_eq!(
            err.downcast_ref::<StreamError>(),
            Some(&StreamError::OutOfOrder {
                operation: "merge_strict",
                position: 2,
            })
        );
    }

    #[test]
    fn repeat_forever_over_nothing_terminates() -> Result<()> {
        let none = Jstream::<i32>::empty().repeat_forever();
        assert_eq!(none.take(5).to_vec()?, Vec::<i32>::new());
        Ok(())
    }
}
