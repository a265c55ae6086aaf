//! Caching a pipeline's output so later iterations do not re-run it.

use crate::collection::{JBound, Jstream};
use crate::stage::{Pull, Stage};
use anyhow::Result;
use std::cell::RefCell;
use std::rc::Rc;

struct MemoState<T> {
    source: Jstream<T>,
    pull: Option<Pull<T>>,
    cache: Vec<T>,
    done: bool,
}

impl<T: JBound> MemoState<T> {
    /// Make sure `cache[position]` exists if the source has that many items.
    fn fill(&mut self, position: usize) -> Result<()> {
        while self.cache.len() <= position && !self.done {
            let source = &self.source;
            let pull = self.pull.get_or_insert_with(|| source.iter());
            match pull.next() {
                Some(Ok(item)) => self.cache.push(item),
                Some(Err(e)) => {
                    // start over on the next iteration rather than serve a truncated cache
                    self.pull = None;
                    self.cache.clear();
                    return Err(e);
                }
                None => {
                    self.done = true;
                    self.pull = None;
                    log::debug!("memoized {} item(s)", self.cache.len());
                }
            }
        }
        Ok(())
    }
}

struct MemoStage<T> {
    state: Rc<RefCell<MemoState<T>>>,
}

impl<T: JBound> Stage<T> for MemoStage<T> {
    fn name(&self) -> &'static str {
        "memoize"
    }

    fn open(&self) -> Pull<T> {
        let state = Rc::clone(&self.state);
        let mut position = 0;
        Box::new(std::iter::from_fn(move || {
            let mut state = state.borrow_mut();
            if let Err(e) = state.fill(position) {
                return Some(Err(e));
            }
            let item = state.cache.get(position).cloned()?;
            position += 1;
            Some(Ok(item))
        }))
    }

    fn known_len(&self) -> Option<usize> {
        let state = self.state.borrow();
        state.done.then_some(state.cache.len())
    }
}

impl<T: JBound> Jstream<T> {
    /// Cache items as they are first pulled. Every later iteration, including
    /// ones running side by side, reads the shared cache and only pulls from
    /// the source past its end.
    ///
    /// The source is pulled at most once per item, which also makes a
    /// one-shot source re-iterable.
    #[must_use]
    pub fn memoize(&self) -> Self {
        let state = MemoState {
            source: self.clone(),
            pull: None,
            cache: Vec::new(),
            done: false,
        };
        Self::new(
            MemoStage {
                state: Rc::new(RefCell::new(state)),
            },
            self.props.derived(),
        )
    }

    /// Evaluate now and continue from a plain shared vector of the results.
    ///
    /// # Errors
    /// Fails on a known-infinite stage and propagates any evaluation error.
    pub fn collapse(&self) -> Result<Self> {
        Ok(Self::of(self.to_vec()?))
    }
}
