//! Positional slicing stages: skip and take from either end, or while a
//! predicate holds.
//!
//! - Front slicing ([`skip`](Jstream::skip), [`take`](Jstream::take) and their
//!   `_while`/`_until` forms) is single-pass and pulls no further than the
//!   consumer asks.
//! - Back slicing ([`take_last`](Jstream::take_last),
//!   [`skip_last`](Jstream::skip_last)) drains the input first and therefore
//!   refuses known-infinite stages at construction time.

use crate::collection::{JBound, Jstream};
use crate::error::StreamError;
use crate::properties::{Properties, Tri};
use crate::stage::{Materialize, Pull, Stage};
use anyhow::Result;
use std::collections::VecDeque;
use std::rc::Rc;

struct SkipStage<T> {
    upstream: Jstream<T>,
    count: usize,
}

impl<T: JBound> Stage<T> for SkipStage<T> {
    fn name(&self) -> &'static str {
        "skip"
    }

    fn open(&self) -> Pull<T> {
        Box::new(self.upstream.iter().skip(self.count))
    }

    fn known_len(&self) -> Option<usize> {
        self.upstream
            .stage
            .known_len()
            .map(|n| n.saturating_sub(self.count))
    }
}

struct TakeStage<T> {
    upstream: Jstream<T>,
    count: usize,
}

impl<T: JBound> Stage<T> for TakeStage<T> {
    fn name(&self) -> &'static str {
        "take"
    }

    fn open(&self) -> Pull<T> {
        if self.count == 0 {
            // never open the upstream for nothing
            return Box::new(std::iter::empty());
        }
        Box::new(self.upstream.iter().take(self.count))
    }

    fn known_len(&self) -> Option<usize> {
        self.upstream
            .stage
            .known_len()
            .map(|n| n.min(self.count))
    }
}

#[derive(Clone, Copy)]
enum While {
    Skip,
    Take,
}

struct WhileStage<T> {
    upstream: Jstream<T>,
    pred: Rc<dyn Fn(&T) -> bool>,
    mode: While,
}

impl<T: JBound> Stage<T> for WhileStage<T> {
    fn name(&self) -> &'static str {
        match self.mode {
            While::Skip => "skip_while",
            While::Take => "take_while",
        }
    }

    fn open(&self) -> Pull<T> {
        let pred = Rc::clone(&self.pred);
        let upstream = self.upstream.iter();
        match self.mode {
            While::Skip => Box::new(upstream.skip_while(move |item| match item {
                Ok(x) => pred(x),
                Err(_) => false,
            })),
            While::Take => Box::new(upstream.take_while(move |item| match item {
                Ok(x) => pred(x),
                Err(_) => true,
            })),
        }
    }
}

struct TakeLast<T> {
    upstream: Jstream<T>,
    count: usize,
}

impl<T: JBound> Materialize<T> for TakeLast<T> {
    fn name(&self) -> &'static str {
        "take_last"
    }

    fn build(&self) -> Result<Vec<T>> {
        let mut window: VecDeque<T> = VecDeque::with_capacity(self.count.min(1024));
        if self.count == 0 {
            // still drain so side effects upstream match a full pass
            for item in self.upstream.iter() {
                item?;
            }
            return Ok(Vec::new());
        }
        for item in self.upstream.iter() {
            if window.len() == self.count {
                window.pop_front();
            }
            window.push_back(item?);
        }
        Ok(window.into())
    }

    fn known_len(&self) -> Option<usize> {
        self.upstream
            .stage
            .known_len()
            .map(|n| n.min(self.count))
    }
}

struct SkipLast<T> {
    upstream: Jstream<T>,
    count: usize,
}

impl<T: JBound> Materialize<T> for SkipLast<T> {
    fn name(&self) -> &'static str {
        "skip_last"
    }

    fn build(&self) -> Result<Vec<T>> {
        let mut items = self.upstream.materialize("skip_last")?;
        items.truncate(items.len().saturating_sub(self.count));
        Ok(items)
    }

    fn known_len(&self) -> Option<usize> {
        self.upstream
            .stage
            .known_len()
            .map(|n| n.saturating_sub(self.count))
    }
}

impl<T: JBound> Jstream<T> {
    /// Skip the first `count` items.
    #[must_use]
    pub fn skip(&self, count: usize) -> Self {
        Self::new(
            SkipStage {
                upstream: self.clone(),
                count,
            },
            self.props.derived(),
        )
    }

    /// At most the first `count` items. Always finite.
    #[must_use]
    pub fn take(&self, count: usize) -> Self {
        let props = Properties {
            infinite: Tri::False,
            ..self.props.derived()
        };
        Self::new(
            TakeStage {
                upstream: self.clone(),
                count,
            },
            props,
        )
    }

    /// Skip items while `pred` holds, then yield everything after.
    #[must_use]
    pub fn skip_while<F>(&self, pred: F) -> Self
    where
        F: Fn(&T) -> bool + 'static,
    {
        self.with_while(Rc::new(pred), While::Skip)
    }

    /// Skip items until `pred` holds for one, then yield it and everything after.
    #[must_use]
    pub fn skip_until<F>(&self, pred: F) -> Self
    where
        F: Fn(&T) -> bool + 'static,
    {
        self.with_while(Rc::new(move |x: &T| !pred(x)), While::Skip)
    }

    /// Yield items while `pred` holds and stop at the first that fails it.
    #[must_use]
    pub fn take_while<F>(&self, pred: F) -> Self
    where
        F: Fn(&T) -> bool + 'static,
    {
        self.with_while(Rc::new(pred), While::Take)
    }

    /// Yield items until `pred` holds for one; that item is not yielded.
    #[must_use]
    pub fn take_until<F>(&self, pred: F) -> Self
    where
        F: Fn(&T) -> bool + 'static,
    {
        self.with_while(Rc::new(move |x: &T| !pred(x)), While::Take)
    }

    fn with_while(&self, pred: Rc<dyn Fn(&T) -> bool>, mode: While) -> Self {
        let mut props = self.props.derived();
        if matches!(mode, While::Take) && props.infinite.is_true() {
            // the predicate may cut an endless stream short
            props.infinite = Tri::Unknown;
        }
        Self::new(
            WhileStage {
                upstream: self.clone(),
                pred,
                mode,
            },
            props,
        )
    }

    /// The final `count` items, in their original order.
    ///
    /// # Errors
    /// Fails immediately on a known-infinite stage.
    pub fn take_last(&self, count: usize) -> Result<Self> {
        self.require_finite("take_last")?;
        Ok(Self::buffered(TakeLast {
            upstream: self.clone(),
            count,
        }))
    }

    /// Everything except the final `count` items.
    ///
    /// # Errors
    /// Fails immediately on a known-infinite stage.
    pub fn skip_last(&self, count: usize) -> Result<Self> {
        self.require_finite("skip_last")?;
        Ok(Self::buffered(SkipLast {
            upstream: self.clone(),
            count,
        }))
    }

    /// Items at positions `0, n, 2n, ...`.
    ///
    /// # Errors
    /// Returns [`StreamError::InvalidArgument`] when `n` is zero.
    pub fn take_every_nth(&self, n: usize) -> Result<Self> {
        if n == 0 {
            return Err(StreamError::invalid("n", "must be greater than zero").into());
        }
        Ok(self.filter_indexed(move |_, i| i % n == 0))
    }
}
