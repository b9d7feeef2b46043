//! Deferred per-element transformations.
//!
//! A [`Morphism<E>`] is a sequence of arrows `E -> Result<E, MorphismFailure>`
//! applied left to right. Composition appends one sequence to another, so
//! `compose` is associative and [`Morphism::identity`] (the empty sequence)
//! is neutral by construction. Applying a fused morphism visits the element
//! once and runs every queued arrow on it in registration order.
//!
//! # Examples
//!
//! ```rust
//! use chainfuse::{Morphism, apply, compose, identity};
//!
//! let trim = Morphism::new(|text: String| Ok(text.trim().to_string()));
//! let shout = Morphism::new(|text: String| Ok(text.to_uppercase()));
//!
//! let fused = compose(compose(identity(), trim), shout);
//! assert_eq!(apply(&fused, "  hello ".to_string()), Ok("HELLO".to_string()));
//! ```

use std::fmt;
use std::rc::Rc;

use smallvec::SmallVec;

use crate::algebra::{Monoid, Semigroup};
use crate::error::MorphismFailure;

/// Inline capacity of a morphism's arrow sequence.
///
/// Chains rarely queue more than a handful of lazy calls between flushes.
const INLINE_ARROWS: usize = 4;

type ArrowFunction<E> = dyn Fn(E) -> Result<E, MorphismFailure>;

struct Arrow<E> {
    label: Option<Rc<str>>,
    function: Rc<ArrowFunction<E>>,
}

impl<E> Clone for Arrow<E> {
    fn clone(&self) -> Self {
        Self {
            label: self.label.clone(),
            function: Rc::clone(&self.function),
        }
    }
}

/// The arrow that stopped an application, with the label it was queued under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ArrowFailure {
    pub(crate) label: Option<String>,
    pub(crate) source: MorphismFailure,
}

/// A composable, deferred transformation over one element.
///
/// Cloning is cheap: arrows are reference counted.
pub struct Morphism<E> {
    arrows: SmallVec<[Arrow<E>; INLINE_ARROWS]>,
}

impl<E> Morphism<E> {
    /// Returns the no-op morphism.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use chainfuse::Morphism;
    ///
    /// assert_eq!(Morphism::identity().apply(5), Ok(5));
    /// assert!(Morphism::<i32>::identity().is_identity());
    /// ```
    #[must_use]
    pub fn identity() -> Self {
        Self {
            arrows: SmallVec::new(),
        }
    }

    /// Creates a single-arrow morphism.
    pub fn new<F>(function: F) -> Self
    where
        F: Fn(E) -> Result<E, MorphismFailure> + 'static,
    {
        Self::from_arrow(None, function)
    }

    /// Creates a single-arrow morphism tagged with the method that queued it.
    ///
    /// The label shows up in [`ChainError::Morphism`](crate::ChainError::Morphism)
    /// when the arrow fails during a flush.
    pub fn labeled<F>(label: &str, function: F) -> Self
    where
        F: Fn(E) -> Result<E, MorphismFailure> + 'static,
    {
        Self::from_arrow(Some(Rc::from(label)), function)
    }

    fn from_arrow<F>(label: Option<Rc<str>>, function: F) -> Self
    where
        F: Fn(E) -> Result<E, MorphismFailure> + 'static,
    {
        let mut arrows = SmallVec::new();
        arrows.push(Arrow {
            label,
            function: Rc::new(function),
        });
        Self { arrows }
    }

    /// Returns a morphism that applies `self`, then `other`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use chainfuse::Morphism;
    ///
    /// let add_one = Morphism::new(|value: i32| Ok(value + 1));
    /// let double = Morphism::new(|value: i32| Ok(value * 2));
    /// assert_eq!(add_one.compose(double).apply(3), Ok(8));
    /// ```
    #[must_use]
    pub fn compose(mut self, other: Self) -> Self {
        self.arrows.extend(other.arrows);
        self
    }

    /// Appends one more arrow.
    #[must_use]
    pub fn then<F>(self, function: F) -> Self
    where
        F: Fn(E) -> Result<E, MorphismFailure> + 'static,
    {
        self.compose(Self::new(function))
    }

    /// Number of arrows that will run per element.
    #[must_use]
    pub fn len(&self) -> usize {
        self.arrows.len()
    }

    /// Returns `true` for the identity morphism.
    #[must_use]
    pub fn is_identity(&self) -> bool {
        self.arrows.is_empty()
    }

    /// Labels of the queued arrows, in application order.
    pub fn labels(&self) -> impl Iterator<Item = Option<&str>> {
        self.arrows.iter().map(|arrow| arrow.label.as_deref())
    }

    /// Runs every arrow against `element`, in order.
    ///
    /// Stops at the first failing arrow.
    ///
    /// # Errors
    ///
    /// Returns the [`MorphismFailure`] of the first arrow that fails.
    pub fn apply(&self, element: E) -> Result<E, MorphismFailure> {
        self.try_apply(element).map_err(|failure| failure.source)
    }

    pub(crate) fn try_apply(&self, element: E) -> Result<E, ArrowFailure> {
        self.arrows.iter().try_fold(element, |current, arrow| {
            (arrow.function)(current).map_err(|source| ArrowFailure {
                label: arrow.label.as_deref().map(str::to_owned),
                source,
            })
        })
    }
}

impl<E> Clone for Morphism<E> {
    fn clone(&self) -> Self {
        Self {
            arrows: self.arrows.clone(),
        }
    }
}

impl<E> Default for Morphism<E> {
    fn default() -> Self {
        Self::identity()
    }
}

impl<E> fmt::Debug for Morphism<E> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("Morphism")
            .field("arrows", &self.labels().collect::<Vec<_>>())
            .finish()
    }
}

impl<E> Semigroup for Morphism<E> {
    fn combine(self, other: Self) -> Self {
        self.compose(other)
    }
}

impl<E> Monoid for Morphism<E> {
    fn empty() -> Self {
        Self::identity()
    }
}

/// Returns the no-op morphism.
#[must_use]
pub fn identity<E>() -> Morphism<E> {
    Morphism::identity()
}

/// Returns "apply `first`, then `second`".
#[must_use]
pub fn compose<E>(first: Morphism<E>, second: Morphism<E>) -> Morphism<E> {
    first.compose(second)
}

/// Runs `morphism` against one element.
///
/// # Errors
///
/// Returns the [`MorphismFailure`] of the first arrow that fails.
pub fn apply<E>(morphism: &Morphism<E>, element: E) -> Result<E, MorphismFailure> {
    morphism.apply(element)
}
