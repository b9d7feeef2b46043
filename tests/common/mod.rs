//! A small fake host element and host methods shared by the integration tests.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use chainfuse::{MethodFailure, MethodTable, Value, method};

/// A stand-in for a DOM node.
#[derive(Debug, Default)]
pub struct Node {
    pub id: usize,
    attributes: BTreeMap<String, String>,
}

/// Host element handle, shared like a DOM node reference.
pub type Element = Rc<RefCell<Node>>;

/// A fresh element with the given id.
pub fn node(id: usize) -> Element {
    Rc::new(RefCell::new(Node {
        id,
        ..Node::default()
    }))
}

/// `count` fresh elements with ids `0..count`.
pub fn divs(count: usize) -> Vec<Element> {
    (0..count).map(node).collect()
}

pub fn id_of(element: &Element) -> usize {
    element.borrow().id
}

pub fn set_attribute(element: &Element, name: &str, value: &str) {
    element
        .borrow_mut()
        .attributes
        .insert(name.to_string(), value.to_string());
}

pub fn get_attribute(element: &Element, name: &str) -> Option<String> {
    element.borrow().attributes.get(name).cloned()
}

/// Registers the host's own (non-lazy) methods.
///
/// - `addClass(name)`: appends a class to every element
/// - `attr(name)`: returns the attribute of the first element, or null
pub fn register_host_methods(table: &mut MethodTable<Element>) {
    table
        .register_method(
            "addClass",
            method(|elements: &mut Vec<Element>, arguments| {
                let class = arguments
                    .first()
                    .and_then(Value::as_str)
                    .ok_or_else(|| MethodFailure::new("addClass expects a class name"))?;
                for element in elements.iter() {
                    let current = get_attribute(element, "class").unwrap_or_default();
                    let updated = if current.is_empty() {
                        class.to_string()
                    } else {
                        format!("{current} {class}")
                    };
                    set_attribute(element, "class", &updated);
                }
                Ok(Value::Null)
            }),
        )
        .expect("addClass is a valid name");
    table
        .register_method(
            "attr",
            method(|elements: &mut Vec<Element>, arguments| {
                let name = arguments
                    .first()
                    .and_then(Value::as_str)
                    .ok_or_else(|| MethodFailure::new("attr expects an attribute name"))?;
                Ok(elements
                    .first()
                    .and_then(|element| get_attribute(element, name))
                    .map_or(Value::Null, Value::from))
            }),
        )
        .expect("attr is a valid name");
}

/// A table holding only the host methods.
pub fn host_table() -> MethodTable<Element> {
    let mut table = MethodTable::new();
    register_host_methods(&mut table);
    table
}

/// Shared record of element ids, in visit order.
#[derive(Clone, Default)]
pub struct Trail(Rc<RefCell<Vec<usize>>>);

impl Trail {
    pub fn push(&self, element: &Element) {
        self.0.borrow_mut().push(id_of(element));
    }

    pub fn ids(&self) -> Vec<usize> {
        self.0.borrow().clone()
    }
}
