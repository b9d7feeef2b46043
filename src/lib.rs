//! # chainfuse
//!
//! Lazy method chaining with call fusion for chainable element collections.
//!
//! ## Overview
//!
//! A [`Chain`] wraps an ordered set of host elements (DOM-style nodes or any
//! other handle type). Methods are looked up by name in a [`MethodTable`]:
//!
//! - **Lazy methods** ([`functor`]): a call runs nothing. It captures its
//!   arguments into a [`Morphism`] and composes it onto the chain's pending
//!   state. Consecutive lazy calls fuse into one morphism.
//! - **Ordinary methods** ([`method`]): under a forcing proxy, a call first
//!   flushes pending work, visiting each element once with all queued arrows
//!   applied in order, and then runs normally.
//! - [`Chain::force`] flushes explicitly.
//!
//! Dispatch behaviour is chosen by the [`Proxy`] a chain was selected from:
//! [`Proxy::direct`] (no interception), [`LazyProxy`] or [`WarningProxy`]
//! (lazy dispatch plus chain-length diagnostics).
//!
//! ## Feature Flags
//!
//! - `warning`: The diagnostic warning proxy (default)
//! - `serde`: Serialize/Deserialize for [`WarningConfig`]
//!
//! ## Example
//!
//! ```rust
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! use chainfuse::{LazyProxy, MethodTable, Value, args, functor, method};
//!
//! type Node = Rc<RefCell<Vec<String>>>;
//!
//! let mut table = MethodTable::<Node>::new();
//! table.register_functor(
//!     "tag",
//!     functor(|node: Node, arguments| {
//!         let tag = arguments.first().and_then(Value::as_str).unwrap_or_default();
//!         node.borrow_mut().push(tag.to_string());
//!         Ok(node)
//!     }),
//! )?;
//! table.register_method(
//!     "tags",
//!     method(|nodes: &mut Vec<Node>, _| Ok(Value::from(nodes[0].borrow().join(" ")))),
//! )?;
//!
//! let proxy = LazyProxy::init(table);
//! let mut chain = proxy.select([Node::default(), Node::default()]);
//! chain.call("tag", args!["a"])?.call("tag", args!["b"])?;
//! assert!(chain.is_pending());
//!
//! assert_eq!(chain.invoke("tags", args![])?, Value::from("a b"));
//! assert!(chain.composed().is_none());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
// Note: Disabling redundant_closure_for_method_calls due to clippy 0.1.92 panic bug
#![allow(clippy::redundant_closure_for_method_calls)]

/// Prelude module for convenient imports.
///
/// # Usage
///
/// ```rust
/// use chainfuse::prelude::*;
/// ```
pub mod prelude {
    pub use crate::algebra::{Monoid, Semigroup};
    pub use crate::arguments::{Arguments, Value};
    pub use crate::args;
    pub use crate::chain::{Chain, ChainState};
    pub use crate::error::{ChainError, MethodFailure, MorphismFailure, RegistrationError};
    pub use crate::functor::{Functor, functor};
    pub use crate::morphism::Morphism;
    pub use crate::proxy::{LazyProxy, Proxy, Strategy};
    pub use crate::registry::{Method, MethodTable, method};

    #[cfg(feature = "warning")]
    pub use crate::warning::{LogSink, WarningConfig, WarningProxy};
}

mod algebra;
mod arguments;
mod chain;
mod error;
mod functor;
mod morphism;
mod proxy;
mod registry;

#[cfg(feature = "warning")]
mod warning;

pub use algebra::{Monoid, Semigroup};
pub use arguments::{Arguments, Value};
pub use chain::{Chain, ChainState};
pub use error::{
    ChainError, InvalidName, MethodFailure, MorphismFailure, RegistrationError,
};
pub use functor::{Functor, functor};
pub use morphism::{Morphism, apply, compose, identity};
pub use proxy::{LazyProxy, Proxy, Strategy};
pub use registry::{Method, MethodEntry, MethodTable, RESERVED_NAMES, method};

#[cfg(feature = "warning")]
pub use warning::{
    DEFAULT_WARN_THRESHOLD, LogSink, ProxyState, TerminalBoundary, WarningConfig, WarningProxy,
};
