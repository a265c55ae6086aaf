//! Cheap-to-derive facts about a stage's source.
//!
//! Every property is three-valued. [`Tri::Unknown`] is the default and is never
//! treated as `false`: an operation that must refuse infinite input only
//! refuses when `infinite` is [`Tri::True`].

/// Three-valued knowledge about a property.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Tri {
    True,
    False,
    #[default]
    Unknown,
}

impl Tri {
    #[must_use]
    pub const fn is_true(self) -> bool {
        matches!(self, Self::True)
    }

    #[must_use]
    pub const fn is_false(self) -> bool {
        matches!(self, Self::False)
    }

    /// `True` if either side is `True`, `False` only if both are `False`.
    #[must_use]
    pub const fn or(self, other: Self) -> Self {
        match (self, other) {
            (Self::True, _) | (_, Self::True) => Self::True,
            (Self::False, Self::False) => Self::False,
            _ => Self::Unknown,
        }
    }

    /// `True` only if both are `True`, `False` if either is `False`.
    #[must_use]
    pub const fn and(self, other: Self) -> Self {
        match (self, other) {
            (Self::False, _) | (_, Self::False) => Self::False,
            (Self::True, Self::True) => Self::True,
            _ => Self::Unknown,
        }
    }
}

impl From<bool> for Tri {
    fn from(value: bool) -> Self {
        if value { Self::True } else { Self::False }
    }
}

impl From<Option<bool>> for Tri {
    fn from(value: Option<bool>) -> Self {
        value.map_or(Self::Unknown, Self::from)
    }
}

/// The property set carried by every [`Jstream`](crate::Jstream).
///
/// - `fresh_source`: the buffer produced by the stage on each open is
///   privately owned by that call, so terminal operations may hand it to the
///   caller without copying. Stages that merely wrap a caller's container must
///   never claim this.
/// - `expensive_source`: producing the source does real work (sorting,
///   grouping, joining) rather than walking an existing container.
/// - `infinite`: the stage never terminates.
///
/// ```
/// use jstream::{Properties, Tri};
///
/// let props = Properties::default().infinite(true);
/// assert_eq!(props.infinite, Tri::True);
/// assert_eq!(props.fresh_source, Tri::Unknown);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Properties {
    pub fresh_source: Tri,
    pub expensive_source: Tri,
    pub infinite: Tri,
}

impl Properties {
    /// Properties of a stage that owns a freshly materialized buffer.
    pub(crate) const FRESH: Self = Self {
        fresh_source: Tri::True,
        expensive_source: Tri::True,
        infinite: Tri::False,
    };

    /// Properties of a wrapped, finite, caller-owned container.
    pub(crate) const CONTAINER: Self = Self {
        fresh_source: Tri::False,
        expensive_source: Tri::False,
        infinite: Tri::False,
    };

    #[must_use]
    pub fn fresh_source(mut self, value: impl Into<Tri>) -> Self {
        self.fresh_source = value.into();
        self
    }

    #[must_use]
    pub fn expensive_source(mut self, value: impl Into<Tri>) -> Self {
        self.expensive_source = value.into();
        self
    }

    #[must_use]
    pub fn infinite(mut self, value: impl Into<Tri>) -> Self {
        self.infinite = value.into();
        self
    }

    /// Properties of a single-pass stage derived from this one: same
    /// finiteness and cost, but the buffer is no longer private.
    pub(crate) const fn derived(self) -> Self {
        Self {
            fresh_source: Tri::False,
            expensive_source: self.expensive_source,
            infinite: self.infinite,
        }
    }

    /// Properties of a stage that reads this stage and `other` end to end.
    pub(crate) const fn combined(self, other: Self) -> Self {
        Self {
            fresh_source: Tri::False,
            expensive_source: self.expensive_source.or(other.expensive_source),
            infinite: self.infinite.or(other.infinite),
        }
    }
}
