#![cfg(feature = "warning")]
//! Integration tests for the warning (diagnostic) proxy.
//!
//! Tests cover:
//! - Chain counting per collection
//! - Log messages listing chained method names
//! - Threshold and terminal-boundary configuration
//! - Replaceable log sinks
//! - Lazy dispatch still applying underneath

mod common;

use std::cell::RefCell;
use std::rc::Rc;

use chainfuse::{
    LazyProxy, LogSink, Proxy, Strategy, TerminalBoundary, Value, WarningConfig, WarningProxy,
    args, functor, method,
};
use common::{Element, divs, get_attribute, host_table, set_attribute};
use rstest::{fixture, rstest};

#[derive(Clone, Default)]
struct Captured(Rc<RefCell<Vec<String>>>);

impl Captured {
    fn sink(&self) -> LogSink {
        let messages = Rc::clone(&self.0);
        LogSink::new(move |message| messages.borrow_mut().push(message.to_string()))
    }

    fn messages(&self) -> Vec<String> {
        self.0.borrow().clone()
    }
}

fn table() -> chainfuse::MethodTable<Element> {
    let mut table = host_table();
    table
        .register_functor("foo", functor(|element: Element, _| Ok(element)))
        .unwrap();
    table
        .register_functor("bar", functor(|element: Element, _| Ok(element)))
        .unwrap();
    table
        .register_method("baz", method(|_: &mut Vec<Element>, _| Ok(Value::Null)))
        .unwrap();
    table
}

#[fixture]
fn captured() -> Captured {
    Captured::default()
}

fn proxy_with(config: WarningConfig, captured: &Captured) -> Proxy<Element> {
    WarningProxy::init_with_sink(table(), config, captured.sink())
}

// =============================================================================
// Counting
// =============================================================================

#[rstest]
fn should_increment_its_count_on_method_invocation(captured: Captured) {
    let proxy = proxy_with(WarningConfig::default(), &captured);
    let mut chain = proxy.select(divs(2));

    assert_eq!(chain.chain_count(), 0, "chainCount should init to 0");
    assert!(chain.proxy_state().is_none());

    chain.call("bar", args![]).unwrap().call("baz", args![]).unwrap();

    assert_eq!(
        chain.chain_count(),
        1,
        "chainCount should increment on chained method invocation"
    );
    assert!(captured.messages().is_empty());
}

#[rstest]
fn state_is_created_on_first_intercepted_call(captured: Captured) {
    let proxy = proxy_with(WarningConfig::default(), &captured);
    let mut chain = proxy.select(divs(1));

    chain.call("baz", args![]).unwrap();

    let state = chain.proxy_state().unwrap();
    assert_eq!(state.chain_count(), 0);
    assert!(state.names().is_empty());
}

#[rstest]
fn counters_are_per_collection(captured: Captured) {
    let proxy = proxy_with(WarningConfig::default(), &captured);
    let mut first = proxy.select(divs(1));
    let mut second = proxy.select(divs(1));

    first
        .call("foo", args![])
        .unwrap()
        .call("bar", args![])
        .unwrap()
        .call("baz", args![])
        .unwrap();
    second.call("foo", args![]).unwrap();

    assert_eq!(first.chain_count(), 2);
    assert_eq!(second.chain_count(), 0);
}

// =============================================================================
// Logging
// =============================================================================

#[rstest]
fn should_log_a_message_with_all_the_method_names(captured: Captured) {
    let proxy = proxy_with(WarningConfig::default(), &captured);
    let mut chain = proxy.select(divs(2));

    chain
        .call("foo", args![])
        .unwrap()
        .call("bar", args![])
        .unwrap()
        .call("baz", args![])
        .unwrap();

    assert_eq!(captured.messages(), vec!["foo,bar".to_string()]);
    assert_eq!(
        chain.proxy_state().map(|state| state.names().to_vec()),
        Some(vec!["foo".to_string(), "bar".to_string()])
    );
}

#[rstest]
fn per_chain_sink_overrides_proxy_sink(captured: Captured) {
    let proxy = proxy_with(WarningConfig::default(), &captured);
    let local = Captured::default();

    let mut chain = proxy.select(divs(1));
    chain.set_log_sink(local.sink());
    chain
        .call("foo", args![])
        .unwrap()
        .call("bar", args![])
        .unwrap()
        .force()
        .unwrap();

    assert!(captured.messages().is_empty());
    assert_eq!(local.messages(), vec!["foo,bar".to_string()]);
}

#[rstest]
fn force_is_a_terminal_call(captured: Captured) {
    let proxy = proxy_with(WarningConfig::default(), &captured);
    let mut chain = proxy.select(divs(1));

    chain
        .call("foo", args![])
        .unwrap()
        .call("foo", args![])
        .unwrap()
        .force()
        .unwrap();

    assert_eq!(captured.messages(), vec!["foo,foo".to_string()]);
}

#[rstest]
fn ordinary_methods_are_counted_when_chained(captured: Captured) {
    let proxy = proxy_with(WarningConfig::default(), &captured);
    let mut chain = proxy.select(divs(2));

    chain
        .call("addClass", args!["a"])
        .unwrap()
        .call("addClass", args!["b"])
        .unwrap()
        .call("baz", args![])
        .unwrap();

    assert_eq!(chain.chain_count(), 2);
    assert_eq!(captured.messages(), vec!["addClass,addClass".to_string()]);
}

#[rstest]
fn mixed_chains_list_every_chained_call(captured: Captured) {
    let proxy = proxy_with(WarningConfig::default(), &captured);
    let mut chain = proxy.select(divs(1));

    chain
        .call("foo", args![])
        .unwrap()
        .call("addClass", args!["x"])
        .unwrap()
        .call("bar", args![])
        .unwrap()
        .call("baz", args![])
        .unwrap();

    let state = chain.proxy_state().unwrap();
    assert_eq!(state.chain_count(), 3);
    assert_eq!(state.names(), &["foo", "addClass", "bar"]);
    assert_eq!(state.last_call(), Some("baz"));
    assert_eq!(
        captured.messages().last().map(String::as_str),
        Some("foo,addClass,bar")
    );
}

#[rstest]
fn each_counts_as_a_call(captured: Captured) {
    let proxy = proxy_with(WarningConfig::default(), &captured);
    let mut chain = proxy.select(divs(1));

    chain
        .call("foo", args![])
        .unwrap()
        .each(|_, _| {})
        .unwrap()
        .call("baz", args![])
        .unwrap();

    assert_eq!(captured.messages(), vec!["foo,each".to_string()]);
}

#[rstest]
fn force_closes_the_segment(captured: Captured) {
    let proxy = proxy_with(WarningConfig::default(), &captured);
    let mut chain = proxy.select(divs(1));

    chain
        .call("foo", args![])
        .unwrap()
        .call("bar", args![])
        .unwrap()
        .force()
        .unwrap()
        .force()
        .unwrap();
    assert_eq!(chain.chain_count(), 2);
    assert!(!chain.proxy_state().unwrap().is_open());

    chain
        .call("baz", args![])
        .unwrap()
        .call("baz", args![])
        .unwrap()
        .call("baz", args![])
        .unwrap();

    assert_eq!(chain.chain_count(), 2);
    assert_eq!(
        captured.messages(),
        vec!["foo,bar".to_string(), "baz,baz".to_string()]
    );
}

#[rstest]
#[case(1, vec!["bar"])]
#[case(2, vec![])]
fn threshold_is_configurable(
    captured: Captured,
    #[case] warn_threshold: usize,
    #[case] expected: Vec<&str>,
) {
    let config = WarningConfig::default().with_warn_threshold(warn_threshold);
    let proxy = proxy_with(config, &captured);
    let mut chain = proxy.select(divs(1));

    chain.call("bar", args![]).unwrap().call("baz", args![]).unwrap();

    assert_eq!(captured.messages(), expected);
}

#[rstest]
fn include_boundary_lists_the_terminal_call(captured: Captured) {
    let config = WarningConfig::default().with_boundary(TerminalBoundary::Include);
    let proxy = proxy_with(config, &captured);
    let mut chain = proxy.select(divs(1));

    chain.call("bar", args![]).unwrap().call("baz", args![]).unwrap();

    assert_eq!(chain.chain_count(), 2);
    assert_eq!(captured.messages(), vec!["bar,baz".to_string()]);
}

// =============================================================================
// Behaviour underneath the diagnostics
// =============================================================================

#[rstest]
fn lazy_dispatch_still_forces(captured: Captured) {
    let mut table = table();
    table
        .register_functor(
            "mark",
            functor(|element: Element, _| {
                set_attribute(&element, "data-foo", "bar");
                Ok(element)
            }),
        )
        .unwrap();
    let proxy = WarningProxy::init_with_sink(table, WarningConfig::default(), captured.sink());
    let mut chain = proxy.select(divs(1));

    chain.call("mark", args![]).unwrap();
    assert!(chain.is_pending());

    assert_eq!(chain.invoke("attr", args!["data-foo"]), Ok(Value::from("bar")));
    assert!(chain.composed().is_none());
}

#[rstest]
fn default_methods_behave_as_normal(captured: Captured) {
    let proxy = proxy_with(WarningConfig::default(), &captured);
    let elements = divs(3);
    let mut chain = proxy.select(elements.iter().cloned());

    chain.call("addClass", args!["normal-method-test"]).unwrap();

    for element in &elements {
        assert!(
            get_attribute(element, "class")
                .is_some_and(|class| class.contains("normal-method-test"))
        );
    }
}

#[rstest]
fn reinit_to_lazy_drops_diagnostics(captured: Captured) {
    let warning = proxy_with(WarningConfig::default(), &captured);
    let lazy = warning.reinit(Strategy::Lazy);
    let again = LazyProxy::init(Rc::clone(warning.table()));

    for proxy in [&lazy, &again] {
        let mut chain = proxy.select(divs(1));
        chain
            .call("foo", args![])
            .unwrap()
            .call("bar", args![])
            .unwrap()
            .call("baz", args![])
            .unwrap();
        assert!(chain.proxy_state().is_none());
    }
    assert!(captured.messages().is_empty());
}

#[rstest]
fn default_sink_does_not_panic() {
    let proxy = WarningProxy::init(table(), WarningConfig::default());
    let mut chain = proxy.select(divs(1));

    chain
        .call("foo", args![])
        .unwrap()
        .call("bar", args![])
        .unwrap()
        .call("baz", args![])
        .unwrap();
    assert_eq!(chain.chain_count(), 2);
}
