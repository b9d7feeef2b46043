//! The method registration table.
//!
//! A [`MethodTable`] maps method names to either a lazy [`Functor`] or an
//! ordinary [`Method`]. It is filled during setup and frozen once a
//! [`Proxy`](crate::Proxy) is initialised over it. From then on every
//! dispatch reads the same entries, whichever strategy is active.

use std::fmt;
use std::rc::Rc;

use rustc_hash::FxHashMap;

use crate::arguments::{Arguments, Value};
use crate::error::{InvalidName, MethodFailure, RegistrationError};
use crate::functor::Functor;

/// Names that belong to the chain itself and cannot be registered.
pub const RESERVED_NAMES: &[&str] = &["force"];

type MethodBody<E> = dyn Fn(&mut Vec<E>, &Arguments) -> Result<Value, MethodFailure>;

/// An ordinary (non-lazy) method body.
///
/// It receives the chain's elements after any pending composition has been
/// flushed, and returns the method's own result.
pub struct Method<E> {
    body: Rc<MethodBody<E>>,
}

/// Wraps `body` as an ordinary method.
///
/// # Examples
///
/// ```rust
/// use chainfuse::{MethodTable, Proxy, Value, args, method};
///
/// let mut table = MethodTable::new();
/// table.register_method(
///     "sum",
///     method(|elements: &mut Vec<i64>, _| Ok(Value::from(elements.iter().sum::<i64>()))),
/// )?;
///
/// let proxy = Proxy::direct(table);
/// let mut chain = proxy.select([1, 2, 3]);
/// assert_eq!(chain.invoke("sum", args![])?, Value::from(6));
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn method<E, F>(body: F) -> Method<E>
where
    F: Fn(&mut Vec<E>, &Arguments) -> Result<Value, MethodFailure> + 'static,
{
    Method {
        body: Rc::new(body),
    }
}

impl<E> Method<E> {
    /// Runs the body against `elements`.
    ///
    /// # Errors
    ///
    /// Returns whatever the body returns.
    pub fn run(&self, elements: &mut Vec<E>, arguments: &Arguments) -> Result<Value, MethodFailure> {
        (self.body)(elements, arguments)
    }
}

impl<E> Clone for Method<E> {
    fn clone(&self) -> Self {
        Self {
            body: Rc::clone(&self.body),
        }
    }
}

impl<E> fmt::Debug for Method<E> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("Method(..)")
    }
}

/// One registered implementation together with its lazy flag.
#[derive(Debug)]
pub enum MethodEntry<E> {
    /// Deferred: calls compose onto the chain's pending morphism.
    Lazy(Functor<E>),
    /// Immediate: calls flush pending work first, then run.
    Ordinary(Method<E>),
}

impl<E> MethodEntry<E> {
    /// Returns `true` for functor registrations.
    #[must_use]
    pub const fn is_lazy(&self) -> bool {
        matches!(self, Self::Lazy(_))
    }
}

impl<E> Clone for MethodEntry<E> {
    fn clone(&self) -> Self {
        match self {
            Self::Lazy(functor) => Self::Lazy(functor.clone()),
            Self::Ordinary(method) => Self::Ordinary(method.clone()),
        }
    }
}

/// Name → implementation mapping consulted by every dispatch.
///
/// Registering a name twice replaces the earlier entry.
pub struct MethodTable<E> {
    entries: FxHashMap<Rc<str>, MethodEntry<E>>,
}

impl<E> MethodTable<E> {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: FxHashMap::default(),
        }
    }

    /// Registers a lazy method.
    ///
    /// # Errors
    ///
    /// Returns [`RegistrationError::InvalidFunctor`] if `name` is empty or
    /// reserved. The table is left unchanged in that case.
    pub fn register_functor(
        &mut self,
        name: impl Into<String>,
        functor: Functor<E>,
    ) -> Result<&mut Self, RegistrationError> {
        let name = name.into();
        if let Err(reason) = validate(&name) {
            return Err(RegistrationError::InvalidFunctor { name, reason });
        }
        self.insert(name, MethodEntry::Lazy(functor));
        Ok(self)
    }

    /// Registers an ordinary method.
    ///
    /// # Errors
    ///
    /// Returns [`RegistrationError::InvalidMethod`] if `name` is empty or
    /// reserved. The table is left unchanged in that case.
    pub fn register_method(
        &mut self,
        name: impl Into<String>,
        method: Method<E>,
    ) -> Result<&mut Self, RegistrationError> {
        let name = name.into();
        if let Err(reason) = validate(&name) {
            return Err(RegistrationError::InvalidMethod { name, reason });
        }
        self.insert(name, MethodEntry::Ordinary(method));
        Ok(self)
    }

    fn insert(&mut self, name: String, entry: MethodEntry<E>) {
        if self.entries.insert(Rc::from(name.as_str()), entry).is_some() {
            tracing::debug!(method = %name, "replaced registered method");
        }
    }

    /// Looks up a method by name.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<&MethodEntry<E>> {
        self.entries.get(name)
    }

    /// Returns `true` if `name` is registered as a lazy method.
    #[must_use]
    pub fn is_lazy(&self, name: &str) -> bool {
        self.lookup(name).is_some_and(MethodEntry::is_lazy)
    }

    /// Removes a method, returning its entry.
    pub fn remove(&mut self, name: &str) -> Option<MethodEntry<E>> {
        self.entries.remove(name)
    }

    /// Drops every registration.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Registered names, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.entries.keys().map(|name| &**name).collect();
        names.sort_unstable();
        names
    }

    /// Number of registered methods.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<E> Default for MethodTable<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> Clone for MethodTable<E> {
    fn clone(&self) -> Self {
        Self {
            entries: self.entries.clone(),
        }
    }
}

impl<E> fmt::Debug for MethodTable<E> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = formatter.debug_map();
        for name in self.names() {
            let kind = if self.is_lazy(name) { "lazy" } else { "ordinary" };
            map.entry(&name, &kind);
        }
        map.finish()
    }
}

fn validate(name: &str) -> Result<(), InvalidName> {
    if name.trim().is_empty() {
        Err(InvalidName::Empty)
    } else if RESERVED_NAMES.contains(&name) {
        Err(InvalidName::Reserved)
    } else {
        Ok(())
    }
}
