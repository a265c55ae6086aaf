//! Comparator composition and the default "smart" comparison policy.
//!
//! - [`SmartOrd`] is the default total order for primitive keys: every integer
//!   width (128-bit integers stand in for bigints), floats (via
//!   `ordered-float`, so `NaN` sorts after every number), `bool`, `char`,
//!   strings, `SystemTime` and `Duration`.
//! - [`Primitive`] is a dynamically typed key for heterogeneous records.
//!   Numbers and bigints compare with each other by value; any other pair of
//!   different kinds fails at comparison time with
//!   [`StreamError::Incomparable`].
//! - [`Order`] erases a comparator, a key selector or the natural smart order
//!   into one composable value. [`Order::chain`] combines several orders
//!   left to right, each later order only breaking ties of the earlier ones.

use crate::error::StreamError;
use anyhow::Result;
use ordered_float::OrderedFloat;
use std::cmp::Ordering;
use std::rc::Rc;
use std::time::{Duration, SystemTime};

/// The default comparison policy used by key selectors.
pub trait SmartOrd {
    /// Compare two values.
    ///
    /// # Errors
    /// Fails only for dynamically typed values of different kinds.
    fn smart_cmp(&self, other: &Self) -> Result<Ordering>;
}

macro_rules! smart_ord_via_ord {
    ($($t:ty),* $(,)?) => {
        $(
            impl SmartOrd for $t {
                #[inline]
                fn smart_cmp(&self, other: &Self) -> Result<Ordering> {
                    Ok(self.cmp(other))
                }
            }
        )*
    };
}

smart_ord_via_ord!(
    i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, bool, char, str, String,
    SystemTime, Duration,
);

impl SmartOrd for f64 {
    #[inline]
    fn smart_cmp(&self, other: &Self) -> Result<Ordering> {
        Ok(OrderedFloat(*self).cmp(&OrderedFloat(*other)))
    }
}

impl SmartOrd for f32 {
    #[inline]
    fn smart_cmp(&self, other: &Self) -> Result<Ordering> {
        Ok(OrderedFloat(*self).cmp(&OrderedFloat(*other)))
    }
}

impl<T: SmartOrd + ?Sized> SmartOrd for &T {
    fn smart_cmp(&self, other: &Self) -> Result<Ordering> {
        (**self).smart_cmp(*other)
    }
}

/// `None` sorts before every `Some`.
impl<T: SmartOrd> SmartOrd for Option<T> {
    fn smart_cmp(&self, other: &Self) -> Result<Ordering> {
        match (self, other) {
            (Some(a), Some(b)) => a.smart_cmp(b),
            (None, None) => Ok(Ordering::Equal),
            (None, Some(_)) => Ok(Ordering::Less),
            (Some(_), None) => Ok(Ordering::Greater),
        }
    }
}

/// A dynamically typed comparable key.
///
/// Floats and integers up to 32 bits convert to `Number`; `i64`, `u64` and
/// `i128` convert to `BigInt` so they keep their exact value. The two numeric
/// kinds compare with each other by value, so keys read from an `i32` field
/// and an `i64` field sort together.
#[derive(Clone, Debug, PartialEq)]
pub enum Primitive {
    Number(f64),
    BigInt(i128),
    Text(String),
    Bool(bool),
    Date(SystemTime),
}

impl Primitive {
    /// Human-readable kind, used in error messages.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Number(_) => "number",
            Self::BigInt(_) => "bigint",
            Self::Text(_) => "string",
            Self::Bool(_) => "boolean",
            Self::Date(_) => "date",
        }
    }
}

impl SmartOrd for Primitive {
    fn smart_cmp(&self, other: &Self) -> Result<Ordering> {
        match (self, other) {
            (Self::Number(a), Self::Number(b)) => a.smart_cmp(b),
            (Self::BigInt(a), Self::BigInt(b)) => a.smart_cmp(b),
            (Self::Number(a), Self::BigInt(b)) => Ok(number_vs_bigint(*a, *b)),
            (Self::BigInt(a), Self::Number(b)) => Ok(number_vs_bigint(*b, *a).reverse()),
            (Self::Text(a), Self::Text(b)) => a.smart_cmp(b),
            (Self::Bool(a), Self::Bool(b)) => a.smart_cmp(b),
            (Self::Date(a), Self::Date(b)) => a.smart_cmp(b),
            (a, b) => Err(StreamError::Incomparable {
                left: a.kind(),
                right: b.kind(),
            }
            .into()),
        }
    }
}

// NaN stays above every number, as it does between two floats.
#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
fn number_vs_bigint(a: f64, b: i128) -> Ordering {
    let coarse = OrderedFloat(a).cmp(&OrderedFloat(b as f64));
    if coarse == Ordering::Equal && a.fract() == 0.0 {
        // `as` saturates at the i128 bounds
        return (a as i128).cmp(&b);
    }
    coarse
}

macro_rules! primitive_from {
    ($variant:ident: $($t:ty),*) => {
        $(
            impl From<$t> for Primitive {
                fn from(value: $t) -> Self {
                    Self::$variant(value.into())
                }
            }
        )*
    };
}

primitive_from!(Number: f64, f32, i8, i16, i32, u8, u16, u32);
primitive_from!(BigInt: i64, u64, i128);
primitive_from!(Text: String, &str);
primitive_from!(Bool: bool);
primitive_from!(Date: SystemTime);

type CompareFn<T> = dyn Fn(&T, &T) -> Result<Ordering>;

/// A composable ordering over `T`.
///
/// ```
/// use jstream::Order;
/// use std::cmp::Ordering;
///
/// let by_len = Order::by_key(|s: &&str| s.len());
/// let then_alpha = Order::natural();
/// let order = Order::chain(&[by_len, then_alpha]);
/// assert_eq!(order.compare(&"ab", &"b").unwrap(), Ordering::Greater);
/// assert_eq!(order.compare(&"ab", &"ac").unwrap(), Ordering::Less);
/// ```
pub struct Order<T> {
    cmp: Rc<CompareFn<T>>,
}

impl<T> Clone for Order<T> {
    fn clone(&self) -> Self {
        Self {
            cmp: Rc::clone(&self.cmp),
        }
    }
}

impl<T: 'static> Order<T> {
    /// A plain two-argument comparator.
    pub fn by<F>(f: F) -> Self
    where
        F: Fn(&T, &T) -> Ordering + 'static,
    {
        Self {
            cmp: Rc::new(move |a, b| Ok(f(a, b))),
        }
    }

    /// A comparator that may fail.
    pub fn try_by<F>(f: F) -> Self
    where
        F: Fn(&T, &T) -> Result<Ordering> + 'static,
    {
        Self { cmp: Rc::new(f) }
    }

    /// A key selector compared through [`SmartOrd`].
    pub fn by_key<K, F>(key: F) -> Self
    where
        K: SmartOrd,
        F: Fn(&T) -> K + 'static,
    {
        Self {
            cmp: Rc::new(move |a, b| key(a).smart_cmp(&key(b))),
        }
    }

    /// The natural smart order of `T` itself.
    #[must_use]
    pub fn natural() -> Self
    where
        T: SmartOrd,
    {
        Self {
            cmp: Rc::new(|a: &T, b: &T| a.smart_cmp(b)),
        }
    }

    /// The same order, reversed.
    #[must_use]
    pub fn reversed(&self) -> Self {
        let inner = Rc::clone(&self.cmp);
        Self {
            cmp: Rc::new(move |a, b| inner(a, b).map(Ordering::reverse)),
        }
    }

    /// This order, with ties broken by `next`.
    #[must_use]
    pub fn then(&self, next: &Self) -> Self {
        Self::chain(&[self.clone(), next.clone()])
    }

    /// Lexicographic combination: compare by the first order, then by the
    /// second on ties, and so on. An empty chain considers everything equal.
    #[must_use]
    pub fn chain(orders: &[Self]) -> Self {
        let orders: Vec<Rc<CompareFn<T>>> = orders.iter().map(|o| Rc::clone(&o.cmp)).collect();
        Self {
            cmp: Rc::new(move |a, b| {
                for cmp in &orders {
                    let ordering = cmp(a, b)?;
                    if ordering.is_ne() {
                        return Ok(ordering);
                    }
                }
                Ok(Ordering::Equal)
            }),
        }
    }

    /// Compare two items.
    ///
    /// # Errors
    /// Propagates comparator failures, such as [`StreamError::Incomparable`].
    pub fn compare(&self, a: &T, b: &T) -> Result<Ordering> {
        (self.cmp)(a, b)
    }
}

const INSERTION_THRESHOLD: usize = 16;

/// Stable merge sort that stops at the first comparator failure.
pub(crate) fn stable_sort<T>(mut items: Vec<T>, order: &Order<T>) -> Result<Vec<T>>
where
    T: 'static,
{
    if items.len() <= INSERTION_THRESHOLD {
        insertion_sort(&mut items, order)?;
        return Ok(items);
    }
    let right = items.split_off(items.len() / 2);
    let left = stable_sort(items, order)?;
    let right = stable_sort(right, order)?;
    merge_sorted(left, right, order)
}

fn insertion_sort<T: 'static>(items: &mut [T], order: &Order<T>) -> Result<()> {
    for i in 1..items.len() {
        let mut j = i;
        while j > 0 && order.compare(&items[j], &items[j - 1])?.is_lt() {
            items.swap(j, j - 1);
            j -= 1;
        }
    }
    Ok(())
}

fn merge_sorted<T: 'static>(left: Vec<T>, right: Vec<T>, order: &Order<T>) -> Result<Vec<T>> {
    let mut out = Vec::with_capacity(left.len() + right.len());
    let mut left = left.into_iter().peekable();
    let mut right = right.into_iter().peekable();
    loop {
        // left wins ties
        let take_right = match (left.peek(), right.peek()) {
            (Some(l), Some(r)) => order.compare(r, l)?.is_lt(),
            (Some(_), None) => false,
            (None, Some(_)) => true,
            (None, None) => break,
        };
        out.extend(if take_right { right.next() } else { left.next() });
    }
    Ok(out)
}
