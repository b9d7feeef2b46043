//! Chain diagnostics.
//!
//! [`WarningProxy`] dispatches exactly like [`LazyProxy`](crate::LazyProxy)
//! and also instruments every intercepted call, lazy or ordinary. A call
//! counts as chained once another call is made on the same collection, so
//! the most recent call is the terminal one and stays out of
//! [`ProxyState::chain_count`] and [`ProxyState::names`]. After each call
//! the count is checked against [`WarningConfig::warn_threshold`]. Once the
//! threshold is reached the comma-joined names go to the [`LogSink`]. An
//! explicit `force` ends the segment.
//!
//! # Examples
//!
//! ```rust
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! use chainfuse::{
//!     LogSink, MethodTable, Value, WarningConfig, WarningProxy, args, functor, method,
//! };
//!
//! let mut table = MethodTable::new();
//! table.register_functor("foo", functor(|value: u32, _| Ok(value)))?;
//! table.register_functor("bar", functor(|value: u32, _| Ok(value)))?;
//! table.register_method("baz", method(|_, _| Ok(Value::Null)))?;
//!
//! let logged = Rc::new(RefCell::new(Vec::new()));
//! let sink = {
//!     let logged = Rc::clone(&logged);
//!     LogSink::new(move |message| logged.borrow_mut().push(message.to_string()))
//! };
//!
//! let proxy = WarningProxy::init_with_sink(table, WarningConfig::default(), sink);
//! let mut chain = proxy.select([1, 2]);
//! chain.call("foo", args![])?.call("bar", args![])?.call("baz", args![])?;
//!
//! assert_eq!(*logged.borrow(), vec!["foo,bar".to_string()]);
//! assert_eq!(chain.chain_count(), 2);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::fmt;
use std::rc::Rc;

use crate::proxy::{Proxy, Strategy};
use crate::registry::MethodTable;

/// Chain length at which the default configuration starts logging.
pub const DEFAULT_WARN_THRESHOLD: usize = 2;

/// Whether the call that ends a chain segment counts as part of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum TerminalBoundary {
    /// The terminal call triggers the check but is neither counted nor listed.
    #[default]
    Exclude,
    /// The terminal call is counted and listed before the check.
    Include,
}

/// Configuration of the warning proxy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct WarningConfig {
    /// Minimum chain count that produces a log line.
    pub warn_threshold: usize,
    /// How the terminal call is treated.
    pub boundary: TerminalBoundary,
}

impl WarningConfig {
    /// Returns the configuration with a different threshold.
    #[must_use]
    pub const fn with_warn_threshold(mut self, warn_threshold: usize) -> Self {
        self.warn_threshold = warn_threshold;
        self
    }

    /// Returns the configuration with a different terminal boundary.
    #[must_use]
    pub const fn with_boundary(mut self, boundary: TerminalBoundary) -> Self {
        self.boundary = boundary;
        self
    }
}

impl Default for WarningConfig {
    fn default() -> Self {
        Self {
            warn_threshold: DEFAULT_WARN_THRESHOLD,
            boundary: TerminalBoundary::Exclude,
        }
    }
}

/// Replaceable destination for diagnostic messages.
///
/// The default sink emits a `tracing` warning on the `chainfuse::warning`
/// target.
#[derive(Clone)]
pub struct LogSink {
    write: Rc<dyn Fn(&str)>,
}

impl LogSink {
    /// Creates a sink from a callback.
    pub fn new<F>(write: F) -> Self
    where
        F: Fn(&str) + 'static,
    {
        Self {
            write: Rc::new(write),
        }
    }

    /// The default sink, backed by `tracing`.
    #[must_use]
    pub fn tracing() -> Self {
        Self::new(|message| {
            tracing::warn!(target: "chainfuse::warning", chain = message, "long method chain");
        })
    }

    /// Writes one message.
    pub fn log(&self, message: &str) {
        (self.write)(message);
    }
}

impl Default for LogSink {
    fn default() -> Self {
        Self::tracing()
    }
}

impl fmt::Debug for LogSink {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("LogSink(..)")
    }
}

/// Per-chain counters kept by the warning proxy.
///
/// A segment opens with the first intercepted call and closes at an explicit
/// `force`. The counters survive the close so they can be inspected. The
/// next call opens a fresh segment and resets them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProxyState {
    chain_count: usize,
    names: Vec<String>,
    last_call: Option<String>,
    open: bool,
}

impl ProxyState {
    /// Creates the `{0, []}` state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of calls counted in the current (or last) segment.
    #[must_use]
    pub const fn chain_count(&self) -> usize {
        self.chain_count
    }

    /// Method names of the current (or last) segment, in call order.
    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// The most recent call of the segment.
    #[must_use]
    pub fn last_call(&self) -> Option<&str> {
        self.last_call.as_deref()
    }

    /// Returns `true` while a segment is waiting for its `force`.
    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.open
    }

    /// The names rendered as a comma-joined string.
    #[must_use]
    pub fn message(&self) -> String {
        self.names.join(",")
    }

    fn open_segment(&mut self) {
        if !self.open {
            self.chain_count = 0;
            self.names.clear();
            self.last_call = None;
            self.open = true;
        }
    }

    fn count(&mut self, name: String) {
        self.chain_count += 1;
        self.names.push(name);
    }

    /// Records one intercepted call and returns the message to log, if any.
    ///
    /// Under [`TerminalBoundary::Exclude`] the call itself is held back and
    /// the call before it is counted.
    pub(crate) fn record(&mut self, name: &str, config: &WarningConfig) -> Option<String> {
        self.open_segment();
        match config.boundary {
            TerminalBoundary::Exclude => {
                if let Some(previous) = self.last_call.replace(name.to_owned()) {
                    self.count(previous);
                }
            }
            TerminalBoundary::Include => {
                self.last_call = Some(name.to_owned());
                self.count(name.to_owned());
            }
        }
        (self.chain_count >= config.warn_threshold).then(|| self.message())
    }

    /// Records `terminal` as the last call and closes the segment.
    ///
    /// A no-op when no segment is open.
    pub(crate) fn close(&mut self, terminal: &str, config: &WarningConfig) -> Option<String> {
        if !self.open {
            return None;
        }
        let message = self.record(terminal, config);
        self.open = false;
        message
    }
}

/// Activation entry point for the diagnostic strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WarningProxy;

impl WarningProxy {
    /// Builds a warning proxy over `table` that logs through `tracing`.
    pub fn init<E>(table: impl Into<Rc<MethodTable<E>>>, config: WarningConfig) -> Proxy<E> {
        Proxy::new(table, Strategy::Warning(config))
    }

    /// Builds a warning proxy over `table` that logs through `sink`.
    pub fn init_with_sink<E>(
        table: impl Into<Rc<MethodTable<E>>>,
        config: WarningConfig,
        sink: LogSink,
    ) -> Proxy<E> {
        Self::init(table, config).with_log_sink(sink)
    }
}
