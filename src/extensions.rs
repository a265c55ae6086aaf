//! Extension points for custom pipeline operations.
//!
//! - [`CompositeTransform`]: package several transformations into a reusable,
//!   named component
//! - [`Jstream::pipe`]: hand a stage to any function, keeping the fluent chain
//! - [`Jstream::from_stage`](crate::Jstream::from_stage): plug a hand-written
//!   [`Stage`](crate::Stage) into a pipeline
//!
//! These let you build higher-level abstractions on top of the core API
//! without modifying it.

use crate::collection::{JBound, Jstream};

/// A reusable, packaged sequence of transformations.
///
/// # Type Parameters
/// - `I`: Input element type
/// - `O`: Output element type
///
/// # Example: Email Normalization
/// ```
/// use jstream::Jstream;
/// use jstream::extensions::CompositeTransform;
///
/// struct NormalizeEmails;
///
/// impl CompositeTransform<String, String> for NormalizeEmails {
///     fn expand(&self, input: Jstream<String>) -> Jstream<String> {
///         input
///             .map(|email| email.trim().to_lowercase())
///             .filter(|email| email.contains('@'))
///             .unique()
///     }
/// }
///
/// # fn main() -> anyhow::Result<()> {
/// let emails = Jstream::of(vec![
///     "  Alice@EXAMPLE.com  ".to_string(),
///     "invalid".to_string(),
///     "alice@example.com".to_string(),
///     "bob@test.com".to_string(),
/// ]);
///
/// let normalized = emails.apply_composite(&NormalizeEmails);
/// assert_eq!(normalized.to_vec()?, vec!["alice@example.com", "bob@test.com"]);
/// # Ok(())
/// # }
/// ```
///
/// # Example: Word Lengths
/// ```
/// use jstream::Jstream;
/// use jstream::extensions::CompositeTransform;
///
/// struct LongestWords(usize);
///
/// impl CompositeTransform<&'static str, (&'static str, usize)> for LongestWords {
///     fn expand(&self, input: Jstream<&'static str>) -> Jstream<(&'static str, usize)> {
///         input
///             .map(|w| (w, w.len()))
///             .sort_by_descending(jstream::Order::by_key(|p: &(&str, usize)| p.1))
///             .map(|sorted| sorted.take(self.0))
///             .unwrap_or_else(|_| Jstream::empty())
///     }
/// }
///
/// # fn main() -> anyhow::Result<()> {
/// let words = Jstream::of(vec!["a", "abc", "ab", "abcd"]);
/// let top = words.apply_composite(&LongestWords(2));
/// assert_eq!(top.to_vec()?, vec![("abcd", 4), ("abc", 3)]);
/// # Ok(())
/// # }
/// ```
pub trait CompositeTransform<I: JBound, O: JBound> {
    /// Expand this composite transform into a sequence of operations.
    ///
    /// Receives the input stage and returns the transformed stage. Any
    /// combination of built-in transformations may be used.
    fn expand(&self, input: Jstream<I>) -> Jstream<O>;
}

impl<T: JBound> Jstream<T> {
    /// Apply a composite transform to this stage.
    #[must_use]
    pub fn apply_composite<O: JBound, CT>(&self, transform: &CT) -> Jstream<O>
    where
        CT: CompositeTransform<T, O>,
    {
        transform.expand(self.clone())
    }

    /// Pass this stage to `f` and return whatever it returns.
    ///
    /// ```
    /// use jstream::Jstream;
    ///
    /// fn evens(s: Jstream<i32>) -> Jstream<i32> {
    ///     s.filter(|x| x % 2 == 0)
    /// }
    ///
    /// let total = Jstream::of(vec![1, 2, 3, 4])
    ///     .pipe(evens)
    ///     .fold(0, |acc, x, _| acc + x)?;
    /// assert_eq!(total, 6);
    /// # Ok::<(), anyhow::Error>(())
    /// ```
    pub fn pipe<R, F>(&self, f: F) -> R
    where
        F: FnOnce(Self) -> R,
    {
        f(self.clone())
    }
}
