//! The chainable collection handle.
//!
//! A [`Chain`] owns an ordered sequence of host elements and an explicit
//! [`ChainState`]:
//!
//! ```text
//!            lazy call                 lazy call
//!   Idle ───────────────▶ Pending(m) ─────────────▶ Pending(m ∘ m')
//!    ▲                        │
//!    └── force / ordinary ────┘   (one traversal, then Idle)
//! ```
//!
//! Every call returns the same handle, so calls chain with `?`. A flush
//! takes the pending morphism out before touching any element. That way the
//! chain is idle again whether the flush succeeds or fails.

use std::fmt;

use crate::algebra::{Monoid, Semigroup};
use crate::arguments::{Arguments, Value};
use crate::error::ChainError;
use crate::morphism::Morphism;
use crate::proxy::Proxy;
#[cfg(feature = "warning")]
use crate::warning::{LogSink, ProxyState};

/// Pending-composition state of a [`Chain`].
pub enum ChainState<E> {
    /// Nothing is queued.
    Idle,
    /// Lazy calls are queued as one fused morphism.
    Pending(Morphism<E>),
}

impl<E> ChainState<E> {
    /// Returns `true` when nothing is queued.
    #[must_use]
    pub const fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    /// Returns `true` when lazy calls are queued.
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        matches!(self, Self::Pending(_))
    }

    /// The queued morphism, if any.
    #[must_use]
    pub const fn composed(&self) -> Option<&Morphism<E>> {
        match self {
            Self::Idle => None,
            Self::Pending(morphism) => Some(morphism),
        }
    }
}

impl<E> Default for ChainState<E> {
    fn default() -> Self {
        Self::Idle
    }
}

impl<E> Clone for ChainState<E> {
    fn clone(&self) -> Self {
        match self {
            Self::Idle => Self::Idle,
            Self::Pending(morphism) => Self::Pending(morphism.clone()),
        }
    }
}

impl<E> fmt::Debug for ChainState<E> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => formatter.write_str("Idle"),
            Self::Pending(morphism) => formatter.debug_tuple("Pending").field(morphism).finish(),
        }
    }
}

/// `Idle` is the identity; two pending states fuse into one.
impl<E> Semigroup for ChainState<E> {
    fn combine(self, other: Self) -> Self {
        match (self, other) {
            (Self::Pending(first), Self::Pending(second)) => Self::Pending(first.compose(second)),
            (state, Self::Idle) | (Self::Idle, state) => state,
        }
    }
}

impl<E> Monoid for ChainState<E> {
    fn empty() -> Self {
        Self::Idle
    }
}

/// A chainable collection of host elements.
///
/// Created through [`Proxy::select`]. Method dispatch goes through the
/// proxy the chain was selected with.
pub struct Chain<E> {
    elements: Vec<E>,
    state: ChainState<E>,
    proxy: Proxy<E>,
    #[cfg(feature = "warning")]
    diagnostics: Option<ProxyState>,
    #[cfg(feature = "warning")]
    log_sink: Option<LogSink>,
}

impl<E> Chain<E> {
    pub(crate) const fn new(proxy: Proxy<E>, elements: Vec<E>) -> Self {
        Self {
            elements,
            state: ChainState::Idle,
            proxy,
            #[cfg(feature = "warning")]
            diagnostics: None,
            #[cfg(feature = "warning")]
            log_sink: None,
        }
    }

    /// The elements as they are now. Pending work is not flushed.
    #[must_use]
    pub fn elements(&self) -> &[E] {
        &self.elements
    }

    /// Number of elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Returns `true` if the chain holds no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// The pending-composition state.
    #[must_use]
    pub const fn state(&self) -> &ChainState<E> {
        &self.state
    }

    /// The queued morphism, or `None` when idle.
    #[must_use]
    pub const fn composed(&self) -> Option<&Morphism<E>> {
        self.state.composed()
    }

    /// Returns `true` when lazy calls are waiting for a flush.
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        self.state.is_pending()
    }

    /// The proxy this chain dispatches through.
    #[must_use]
    pub const fn proxy(&self) -> &Proxy<E> {
        &self.proxy
    }

    pub(crate) fn elements_mut(&mut self) -> &mut Vec<E> {
        &mut self.elements
    }

    pub(crate) fn enqueue(&mut self, name: &str, morphism: Morphism<E>) {
        let state = std::mem::take(&mut self.state);
        self.state = state.combine(ChainState::Pending(morphism));
        tracing::trace!(
            method = name,
            queued = self.composed().map_or(0, Morphism::len),
            "queued lazy call"
        );
    }
}

impl<E: Clone + 'static> Chain<E> {
    /// Calls a registered method and returns the chain for more calls.
    ///
    /// Lazy methods are queued. Ordinary methods run, after flushing pending
    /// work if the proxy forces. Their result value is dropped; use
    /// [`Chain::invoke`] to keep it.
    ///
    /// # Errors
    ///
    /// - [`ChainError::UnknownMethod`] if `name` is not registered.
    /// - [`ChainError::Morphism`] if the forced flush fails. The method is
    ///   not run then.
    /// - [`ChainError::Method`] if the method body fails.
    pub fn call(&mut self, name: &str, arguments: Arguments) -> Result<&mut Self, ChainError> {
        self.invoke(name, arguments)?;
        Ok(self)
    }

    /// Calls a registered method and returns its result.
    ///
    /// Lazy methods return [`Value::Null`].
    ///
    /// # Errors
    ///
    /// Same as [`Chain::call`].
    pub fn invoke(&mut self, name: &str, arguments: Arguments) -> Result<Value, ChainError> {
        let proxy = self.proxy.clone();
        proxy.dispatch(self, name, arguments)
    }

    /// Applies the pending morphism to every element and returns to idle.
    ///
    /// A no-op when nothing is pending. `force` flushes under every strategy,
    /// including [`Proxy::direct`].
    ///
    /// # Errors
    ///
    /// Returns [`ChainError::Morphism`] if an arrow fails. Earlier elements
    /// keep their new values and the chain is idle either way.
    pub fn force(&mut self) -> Result<&mut Self, ChainError> {
        let proxy = self.proxy.clone();
        proxy.force(self)?;
        Ok(self)
    }

    /// Visits every element in order.
    ///
    /// This counts as an ordinary call, so a forcing proxy flushes first.
    ///
    /// # Errors
    ///
    /// Returns [`ChainError::Morphism`] if the flush fails. The visitor does
    /// not run then.
    pub fn each<F>(&mut self, mut visitor: F) -> Result<&mut Self, ChainError>
    where
        F: FnMut(usize, &E),
    {
        let proxy = self.proxy.clone();
        proxy.before_ordinary(self, "each")?;
        for (index, element) in self.elements.iter().enumerate() {
            visitor(index, element);
        }
        Ok(self)
    }

    /// Flushes pending work and returns the elements.
    ///
    /// # Errors
    ///
    /// Returns [`ChainError::Morphism`] if the flush fails.
    pub fn into_elements(mut self) -> Result<Vec<E>, ChainError> {
        self.force()?;
        Ok(self.elements)
    }

    pub(crate) fn flush(&mut self) -> Result<(), ChainError> {
        let ChainState::Pending(composed) = std::mem::take(&mut self.state) else {
            return Ok(());
        };
        tracing::debug!(
            elements = self.elements.len(),
            arrows = composed.len(),
            "flushing composed morphism"
        );
        for (index, slot) in self.elements.iter_mut().enumerate() {
            match composed.try_apply(slot.clone()) {
                Ok(element) => *slot = element,
                Err(failure) => {
                    tracing::debug!(index, method = ?failure.label, "flush abandoned");
                    return Err(ChainError::Morphism {
                        index,
                        method: failure.label,
                        source: failure.source,
                    });
                }
            }
        }
        Ok(())
    }
}

#[cfg(feature = "warning")]
impl<E> Chain<E> {
    /// Diagnostics state, present once the warning proxy intercepted a call.
    #[must_use]
    pub const fn proxy_state(&self) -> Option<&ProxyState> {
        self.diagnostics.as_ref()
    }

    /// Chain count of the current (or last) segment. `0` before any call.
    #[must_use]
    pub fn chain_count(&self) -> usize {
        self.diagnostics.as_ref().map_or(0, ProxyState::chain_count)
    }

    /// Overrides the proxy's log sink for this chain only.
    pub fn set_log_sink(&mut self, sink: LogSink) -> &mut Self {
        self.log_sink = Some(sink);
        self
    }

    pub(crate) const fn log_sink(&self) -> Option<&LogSink> {
        self.log_sink.as_ref()
    }

    pub(crate) fn diagnostics_mut(&mut self) -> &mut ProxyState {
        self.diagnostics.get_or_insert_with(ProxyState::new)
    }
}

impl<E: Clone> Clone for Chain<E> {
    fn clone(&self) -> Self {
        Self {
            elements: self.elements.clone(),
            state: self.state.clone(),
            proxy: self.proxy.clone(),
            #[cfg(feature = "warning")]
            diagnostics: self.diagnostics.clone(),
            #[cfg(feature = "warning")]
            log_sink: self.log_sink.clone(),
        }
    }
}

impl<E: fmt::Debug> fmt::Debug for Chain<E> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut debug = formatter.debug_struct("Chain");
        debug
            .field("elements", &self.elements)
            .field("state", &self.state)
            .field("strategy", self.proxy.strategy());
        #[cfg(feature = "warning")]
        debug.field("diagnostics", &self.diagnostics);
        debug.finish()
    }
}
