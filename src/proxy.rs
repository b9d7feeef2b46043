//! Dispatch strategies.
//!
//! A [`Proxy`] pairs a frozen [`MethodTable`] with exactly one
//! [`Strategy`]. Every method call on a [`Chain`] goes through
//! [`Proxy::dispatch`], which reads the registered entry and decides
//! whether to queue or force. Installing a different strategy builds a new
//! proxy over the same table. The table itself is never rewritten, so
//! strategies cannot stack on top of each other.
//!
//! | Strategy  | lazy call     | ordinary call           | `force`       |
//! |-----------|---------------|-------------------------|---------------|
//! | `Direct`  | queue         | run as registered       | flush         |
//! | `Lazy`    | queue         | flush, then run         | flush         |
//! | `Warning` | count + queue | count + flush, then run | close + flush |
//!
//! # Examples
//!
//! ```rust
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! use chainfuse::{LazyProxy, MethodTable, Value, args, functor, method};
//!
//! let seen = Rc::new(RefCell::new(Vec::new()));
//!
//! let mut table = MethodTable::new();
//! let trail = Rc::clone(&seen);
//! table.register_functor(
//!     "mark",
//!     functor(move |value: i32, _| {
//!         trail.borrow_mut().push(value);
//!         Ok(value)
//!     }),
//! )?;
//! table.register_method("count", method(|elements: &mut Vec<i32>, _| Ok(Value::from(elements.len()))))?;
//!
//! let proxy = LazyProxy::init(table);
//! let mut chain = proxy.select([1, 2]);
//! chain.call("mark", args![])?.call("mark", args![])?;
//! assert!(seen.borrow().is_empty());
//!
//! // the ordinary call forces the fused composition first
//! assert_eq!(chain.invoke("count", args![])?, Value::from(2));
//! assert_eq!(*seen.borrow(), vec![1, 1, 2, 2]);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::rc::Rc;

use crate::arguments::{Arguments, Value};
use crate::chain::Chain;
use crate::error::ChainError;
use crate::registry::{MethodEntry, MethodTable};
#[cfg(feature = "warning")]
use crate::warning::{LogSink, WarningConfig};

/// Which interception behaviour a [`Proxy`] applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Strategy {
    /// No interception: ordinary methods run untouched.
    #[default]
    Direct,
    /// Ordinary methods force pending lazy work first.
    Lazy,
    /// Like `Lazy`, plus chain counting and logging.
    #[cfg(feature = "warning")]
    Warning(WarningConfig),
}

impl Strategy {
    /// Returns `true` if ordinary calls flush pending work before running.
    #[must_use]
    pub const fn forces(&self) -> bool {
        !matches!(self, Self::Direct)
    }
}

/// A method table bound to one dispatch strategy; the factory for chains.
pub struct Proxy<E> {
    table: Rc<MethodTable<E>>,
    strategy: Strategy,
    #[cfg(feature = "warning")]
    sink: LogSink,
}

impl<E> Proxy<E> {
    /// Binds `table` to `strategy`.
    pub fn new(table: impl Into<Rc<MethodTable<E>>>, strategy: Strategy) -> Self {
        let table = table.into();
        tracing::debug!(?strategy, methods = table.len(), "proxy initialised");
        Self {
            table,
            strategy,
            #[cfg(feature = "warning")]
            sink: LogSink::default(),
        }
    }

    /// A proxy with no interception installed.
    pub fn direct(table: impl Into<Rc<MethodTable<E>>>) -> Self {
        Self::new(table, Strategy::Direct)
    }

    /// Replaces the strategy over the same table.
    ///
    /// The new proxy reads the original registrations, never the previous
    /// proxy's behaviour. Chains selected earlier keep their old proxy.
    #[must_use]
    pub fn reinit(&self, strategy: Strategy) -> Self {
        let proxy = Self::new(Rc::clone(&self.table), strategy);
        #[cfg(feature = "warning")]
        let proxy = proxy.with_log_sink(self.sink.clone());
        proxy
    }

    /// Replaces the sink that receives warning-proxy messages.
    #[cfg(feature = "warning")]
    #[must_use]
    pub fn with_log_sink(mut self, sink: LogSink) -> Self {
        self.sink = sink;
        self
    }

    /// The sink that receives warning-proxy messages.
    #[cfg(feature = "warning")]
    #[must_use]
    pub const fn log_sink(&self) -> &LogSink {
        &self.sink
    }

    /// The active strategy.
    #[must_use]
    pub const fn strategy(&self) -> &Strategy {
        &self.strategy
    }

    /// The frozen method table.
    #[must_use]
    pub const fn table(&self) -> &Rc<MethodTable<E>> {
        &self.table
    }

    /// Wraps `elements` in a chain dispatching through this proxy.
    pub fn select<I>(&self, elements: I) -> Chain<E>
    where
        I: IntoIterator<Item = E>,
    {
        Chain::new(self.clone(), elements.into_iter().collect())
    }
}

impl<E: Clone + 'static> Proxy<E> {
    /// Routes one call on `chain`.
    ///
    /// # Errors
    ///
    /// See [`Chain::call`].
    pub fn dispatch(
        &self,
        chain: &mut Chain<E>,
        name: &str,
        arguments: Arguments,
    ) -> Result<Value, ChainError> {
        let entry = self
            .table
            .lookup(name)
            .ok_or_else(|| ChainError::UnknownMethod {
                name: name.to_owned(),
            })?;
        match entry {
            MethodEntry::Lazy(functor) => {
                self.observe(chain, name);
                chain.enqueue(name, functor.capture(name, arguments));
                Ok(Value::Null)
            }
            MethodEntry::Ordinary(method) => {
                self.before_ordinary(chain, name)?;
                method
                    .run(chain.elements_mut(), &arguments)
                    .map_err(|source| ChainError::Method {
                        name: name.to_owned(),
                        source,
                    })
            }
        }
    }

    pub(crate) fn force(&self, chain: &mut Chain<E>) -> Result<(), ChainError> {
        self.observe_terminal(chain, "force");
        chain.flush()
    }

    pub(crate) fn before_ordinary(&self, chain: &mut Chain<E>, name: &str) -> Result<(), ChainError> {
        self.observe(chain, name);
        if self.strategy.forces() {
            chain.flush()
        } else {
            Ok(())
        }
    }

    #[cfg(feature = "warning")]
    fn observe(&self, chain: &mut Chain<E>, name: &str) {
        let Strategy::Warning(config) = self.strategy else {
            return;
        };
        if let Some(message) = chain.diagnostics_mut().record(name, &config) {
            chain.log_sink().unwrap_or(&self.sink).log(&message);
        }
    }

    #[cfg(feature = "warning")]
    fn observe_terminal(&self, chain: &mut Chain<E>, name: &str) {
        let Strategy::Warning(config) = self.strategy else {
            return;
        };
        if let Some(message) = chain.diagnostics_mut().close(name, &config) {
            chain.log_sink().unwrap_or(&self.sink).log(&message);
        }
    }

    #[cfg(not(feature = "warning"))]
    #[allow(clippy::unused_self)]
    fn observe(&self, _chain: &mut Chain<E>, _name: &str) {}

    #[cfg(not(feature = "warning"))]
    #[allow(clippy::unused_self)]
    fn observe_terminal(&self, _chain: &mut Chain<E>, _name: &str) {}
}

impl<E> Clone for Proxy<E> {
    fn clone(&self) -> Self {
        Self {
            table: Rc::clone(&self.table),
            strategy: self.strategy,
            #[cfg(feature = "warning")]
            sink: self.sink.clone(),
        }
    }
}

impl<E> std::fmt::Debug for Proxy<E> {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("Proxy")
            .field("strategy", &self.strategy)
            .field("table", &self.table)
            .finish()
    }
}

/// Activation entry point for the lazy strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LazyProxy;

impl LazyProxy {
    /// Builds a lazy proxy over `table`.
    ///
    /// Calling it again over the same table (or over a proxy's
    /// [`Proxy::table`]) gives an identical dispatch.
    pub fn init<E>(table: impl Into<Rc<MethodTable<E>>>) -> Proxy<E> {
        Proxy::new(table, Strategy::Lazy)
    }
}
