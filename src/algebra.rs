//! Semigroup and Monoid type classes.
//!
//! Queued lazy calls are combined through these two traits. A
//! [`Morphism`](crate::Morphism) is the free monoid over its arrows:
//! `combine` concatenates two arrow sequences and `empty` is the identity
//! morphism. [`ChainState`](crate::ChainState) lifts that monoid the same way
//! `Option` lifts a semigroup, with `Idle` as the identity.
//!
//! # Laws
//!
//! For all `a`, `b`, `c`:
//!
//! ```text
//! (a.combine(b)).combine(c) == a.combine(b.combine(c))   // associativity
//! T::empty().combine(a) == a                             // left identity
//! a.combine(T::empty()) == a                             // right identity
//! ```
//!
//! Morphisms are functions, so "==" means "applies identically to every
//! element". The `morphism_laws` integration tests check this with proptest.

/// A type class for types with an associative binary operation.
///
/// # Examples
///
/// ```rust
/// use chainfuse::{Morphism, Semigroup};
///
/// let add_one = Morphism::new(|value: i32| Ok(value + 1));
/// let double = Morphism::new(|value: i32| Ok(value * 2));
///
/// // left to right: (3 + 1) * 2
/// assert_eq!(add_one.combine(double).apply(3), Ok(8));
/// ```
pub trait Semigroup {
    /// Combines two values into one.
    ///
    /// This operation must be associative.
    #[must_use]
    fn combine(self, other: Self) -> Self;

    /// Reduces all elements in an iterator using the semigroup operation.
    ///
    /// Returns `None` if the iterator is empty.
    fn reduce_all<I>(iterator: I) -> Option<Self>
    where
        I: IntoIterator<Item = Self>,
        Self: Sized,
    {
        iterator
            .into_iter()
            .reduce(|accumulator, element| accumulator.combine(element))
    }
}

/// A type class for semigroups with an identity element.
///
/// # Examples
///
/// ```rust
/// use chainfuse::{Monoid, Morphism};
///
/// let steps = vec![
///     Morphism::new(|value: i32| Ok(value + 1)),
///     Morphism::new(|value: i32| Ok(value * 10)),
/// ];
/// assert_eq!(Morphism::combine_all(steps).apply(1), Ok(20));
///
/// // Empty iterator returns the identity
/// assert_eq!(Morphism::<i32>::combine_all(vec![]).apply(7), Ok(7));
/// ```
pub trait Monoid: Semigroup {
    /// Returns the identity element for this monoid.
    fn empty() -> Self;

    /// Combines all elements in an iterator, starting from the identity element.
    fn combine_all<I>(iterator: I) -> Self
    where
        I: IntoIterator<Item = Self>,
        Self: Sized,
    {
        iterator
            .into_iter()
            .fold(Self::empty(), |accumulator, element| {
                accumulator.combine(element)
            })
    }
}
