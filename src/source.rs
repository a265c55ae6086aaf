//! Root stages: the places a pipeline's items come from.
//!
//! A source is either **re-iterable** (a shared container, a cloneable
//! container, a factory that builds a fresh iterator per open, a generator) or
//! **one-shot** (a single-use iterator). Only re-iterable roots give the same
//! items on every terminal call; a one-shot root yields its items to the first
//! open and nothing afterwards.

use crate::collection::JBound;
use crate::stage::{Pull, Stage};
use indexmap::{IndexMap, IndexSet};
use std::any::Any;
use std::cell::RefCell;
use std::hash::Hash;
use std::rc::Rc;

/// A shared, immutable vector. `as_vec` aliases it without copying.
pub(crate) struct VecSource<T> {
    pub(crate) items: Rc<Vec<T>>,
}

impl<T: JBound> Stage<T> for VecSource<T> {
    fn name(&self) -> &'static str {
        "vec"
    }

    fn open(&self) -> Pull<T> {
        let items = Rc::clone(&self.items);
        Box::new((0..items.len()).map(move |i| Ok(items[i].clone())))
    }

    fn known_len(&self) -> Option<usize> {
        Some(self.items.len())
    }

    fn as_any(&self) -> Option<&dyn Any> {
        Some(self)
    }
}

/// A shared insertion-ordered set.
pub(crate) struct SetSource<T> {
    pub(crate) items: Rc<IndexSet<T>>,
}

impl<T: JBound + Eq + Hash> Stage<T> for SetSource<T> {
    fn name(&self) -> &'static str {
        "set"
    }

    fn open(&self) -> Pull<T> {
        let items = Rc::clone(&self.items);
        Box::new((0..items.len()).filter_map(move |i| items.get_index(i).cloned().map(Ok)))
    }

    fn known_len(&self) -> Option<usize> {
        Some(self.items.len())
    }

    fn as_any(&self) -> Option<&dyn Any> {
        Some(self)
    }
}

/// A shared insertion-ordered map, read as `(key, value)` entries.
pub(crate) struct MapSource<K, V> {
    pub(crate) items: Rc<IndexMap<K, V>>,
}

impl<K, V> Stage<(K, V)> for MapSource<K, V>
where
    K: JBound + Eq + Hash,
    V: JBound,
{
    fn name(&self) -> &'static str {
        "map"
    }

    fn open(&self) -> Pull<(K, V)> {
        let items = Rc::clone(&self.items);
        Box::new((0..items.len()).filter_map(move |i| {
            items
                .get_index(i)
                .map(|(k, v)| Ok((k.clone(), v.clone())))
        }))
    }

    fn known_len(&self) -> Option<usize> {
        Some(self.items.len())
    }

    fn as_any(&self) -> Option<&dyn Any> {
        Some(self)
    }
}

/// Any cloneable container; each open iterates a fresh clone.
pub(crate) struct ContainerSource<C> {
    pub(crate) container: C,
}

impl<C> Stage<C::Item> for ContainerSource<C>
where
    C: IntoIterator + Clone + 'static,
    C::Item: JBound,
    C::IntoIter: 'static,
{
    fn name(&self) -> &'static str {
        "container"
    }

    fn open(&self) -> Pull<C::Item> {
        Box::new(self.container.clone().into_iter().map(Ok))
    }
}

type Factory<T> = Rc<dyn Fn() -> Box<dyn Iterator<Item = T>>>;

/// A factory invoked once per open.
pub(crate) struct FactorySource<T> {
    pub(crate) factory: Factory<T>,
}

impl<T: JBound> Stage<T> for FactorySource<T> {
    fn name(&self) -> &'static str {
        "factory"
    }

    fn open(&self) -> Pull<T> {
        Box::new((self.factory)().map(Ok))
    }
}

/// A single-use iterator. The first open takes it; later opens are empty.
pub(crate) struct OneShotSource<T> {
    pub(crate) iter: RefCell<Option<Box<dyn Iterator<Item = T>>>>,
}

impl<T: JBound> Stage<T> for OneShotSource<T> {
    fn name(&self) -> &'static str {
        "once"
    }

    fn open(&self) -> Pull<T> {
        match self.iter.borrow_mut().take() {
            Some(iter) => Box::new(iter.map(Ok)),
            None => {
                log::debug!("one-shot source reopened after being consumed; yielding nothing");
                Box::new(std::iter::empty())
            }
        }
    }
}

/// `index -> item`, either unbounded or for a fixed count.
pub(crate) struct GenerateSource<T> {
    pub(crate) f: Rc<dyn Fn(usize) -> T>,
    pub(crate) count: Option<usize>,
}

impl<T: JBound> Stage<T> for GenerateSource<T> {
    fn name(&self) -> &'static str {
        "generate"
    }

    fn open(&self) -> Pull<T> {
        let f = Rc::clone(&self.f);
        match self.count {
            Some(n) => Box::new((0..n).map(move |i| Ok(f(i)))),
            None => Box::new((0..).map(move |i| Ok(f(i)))),
        }
    }

    fn known_len(&self) -> Option<usize> {
        self.count
    }
}
