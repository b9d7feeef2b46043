//! Lazy method registration.
//!
//! [`functor`] marks an element transformation as deferrable. Once
//! registered in a [`MethodTable`](crate::MethodTable), calling it on a
//! [`Chain`](crate::Chain) runs nothing. The call's arguments are captured
//! into a one-argument [`Morphism`] and composed onto the chain's pending
//! state, and the same chain is handed back.
//!
//! # Examples
//!
//! ```rust
//! use chainfuse::{LazyProxy, MethodTable, Value, args, functor};
//!
//! let mut table = MethodTable::new();
//! table.register_functor(
//!     "scale",
//!     functor(|value: i64, arguments| {
//!         let factor = arguments.first().and_then(Value::as_i64).unwrap_or(1);
//!         Ok(value * factor)
//!     }),
//! )?;
//!
//! let proxy = LazyProxy::init(table);
//! let mut chain = proxy.select([1, 2, 3]);
//! chain.call("scale", args![10])?.call("scale", args![2])?;
//!
//! // nothing ran yet
//! assert_eq!(chain.elements(), &[1, 2, 3]);
//!
//! chain.force()?;
//! assert_eq!(chain.elements(), &[20, 40, 60]);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::fmt;
use std::rc::Rc;

use crate::arguments::Arguments;
use crate::error::MorphismFailure;
use crate::morphism::Morphism;

type FunctorBody<E> = dyn Fn(E, &Arguments) -> Result<E, MorphismFailure>;

/// A registered lazy method body.
pub struct Functor<E> {
    body: Rc<FunctorBody<E>>,
}

/// Marks `body` as a lazy method.
///
/// `body` receives one element plus the call's extra arguments and returns
/// the (possibly replaced) element.
pub fn functor<E, F>(body: F) -> Functor<E>
where
    F: Fn(E, &Arguments) -> Result<E, MorphismFailure> + 'static,
{
    Functor {
        body: Rc::new(body),
    }
}

impl<E: 'static> Functor<E> {
    /// Captures `arguments` into a single-argument morphism labelled `name`.
    ///
    /// The body is not run.
    #[must_use]
    pub fn capture(&self, name: &str, arguments: Arguments) -> Morphism<E> {
        let body = Rc::clone(&self.body);
        Morphism::labeled(name, move |element| body(element, &arguments))
    }
}

impl<E> Functor<E> {
    /// Runs the body right away on one element.
    ///
    /// # Errors
    ///
    /// Returns whatever the body returns.
    pub fn run(&self, element: E, arguments: &Arguments) -> Result<E, MorphismFailure> {
        (self.body)(element, arguments)
    }
}

impl<E> Clone for Functor<E> {
    fn clone(&self) -> Self {
        Self {
            body: Rc::clone(&self.body),
        }
    }
}

impl<E> fmt::Debug for Functor<E> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("Functor(..)")
    }
}
