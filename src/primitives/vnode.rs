//! Virtual nodes - Immutable descriptions of desired output.
//!
//! A [`VNode`] is built fresh on every render and never mutated once handed to
//! the renderer. The builder methods consume `self`, so a node is only
//! "editable" while it is being constructed.
//!
//! # Example
//!
//! ```
//! use spark_vdom::primitives::VNode;
//!
//! let list = VNode::element("ul").children(
//!     ["a", "b", "c"]
//!         .iter()
//!         .map(|item| VNode::element("li").key(*item).child(*item)),
//! );
//! assert_eq!(list.child_nodes().len(), 3);
//! ```

use std::fmt;
use std::rc::Rc;

use crate::types::{
    CHILDREN_PROP, EventHandler, Event, Key, PropValue, Props, STYLE_PROP, Style,
};

use super::component::Component;

// =============================================================================
// Tag
// =============================================================================

/// What a virtual node describes.
#[derive(Clone, PartialEq)]
pub enum Tag {
    /// A host element with the given name.
    Host(String),
    /// A component function, identified by its reference.
    Component(Component),
    /// A grouping marker: no host node of its own, children are flattened
    /// into the parent's host node.
    Group,
}

impl Tag {
    /// Short label for logs and errors.
    pub fn label(&self) -> &str {
        match self {
            Tag::Host(name) => name,
            Tag::Component(component) => component.name(),
            Tag::Group => "#group",
        }
    }
}

impl fmt::Debug for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tag::Host(name) => write!(f, "Host({name})"),
            Tag::Component(component) => write!(f, "Component({})", component.name()),
            Tag::Group => f.write_str("Group"),
        }
    }
}

// =============================================================================
// VNode
// =============================================================================

/// Immutable description of one node in the desired tree.
#[derive(Debug, Clone, PartialEq)]
pub struct VNode {
    tag: Tag,
    props: Props,
    key: Option<Key>,
}

impl VNode {
    /// A host element.
    pub fn element(name: impl Into<String>) -> Self {
        Self {
            tag: Tag::Host(name.into()),
            props: Props::new(),
            key: None,
        }
    }

    /// A grouping marker around `children`.
    pub fn group<C: Into<Child>>(children: impl IntoIterator<Item = C>) -> Self {
        Self {
            tag: Tag::Group,
            props: Props::new(),
            key: None,
        }
        .children(children)
    }

    /// A component invocation.
    pub fn component(component: &Component, props: Props) -> Self {
        Self {
            tag: Tag::Component(component.clone()),
            props,
            key: None,
        }
    }

    /// Builder: set a property.
    pub fn prop(mut self, name: impl Into<String>, value: impl Into<PropValue>) -> Self {
        self.props.insert(name, value);
        self
    }

    /// Builder: alias of [`VNode::prop`] that reads better for attributes.
    pub fn attr(self, name: impl Into<String>, value: impl Into<PropValue>) -> Self {
        self.prop(name, value)
    }

    /// Builder: set the composite style value.
    pub fn style(self, style: Style) -> Self {
        self.prop(STYLE_PROP, style)
    }

    /// Builder: attach a handler for `event` (stored as `on<Event>`).
    pub fn on(self, event: &str, handler: impl Fn(&Event) + 'static) -> Self {
        self.handler(handler_prop(event), EventHandler::new(handler))
    }

    /// Builder: store an existing handler under an explicit property name.
    pub fn handler(self, prop: impl Into<String>, handler: EventHandler) -> Self {
        self.prop(prop, handler)
    }

    /// Builder: set the sibling key.
    pub fn key(mut self, key: impl Into<Key>) -> Self {
        self.key = Some(key.into());
        self
    }

    /// Builder: append one child.
    pub fn child(mut self, child: impl Into<Child>) -> Self {
        let child = child.into();
        match self.props.get_mut(CHILDREN_PROP) {
            Some(PropValue::Children(children)) => children.push(child),
            _ => self.props.insert(CHILDREN_PROP, PropValue::Children(vec![child])),
        }
        self
    }

    /// Builder: append many children.
    pub fn children<C: Into<Child>>(mut self, children: impl IntoIterator<Item = C>) -> Self {
        for child in children {
            self = self.child(child);
        }
        self
    }

    pub fn tag(&self) -> &Tag {
        &self.tag
    }

    pub fn props(&self) -> &Props {
        &self.props
    }

    pub fn key_ref(&self) -> Option<&Key> {
        self.key.as_ref()
    }

    /// The nested `children` value.
    pub fn child_nodes(&self) -> &[Child] {
        self.props.children()
    }
}

/// `click` -> `onClick`.
fn handler_prop(event: &str) -> String {
    let mut chars = event.chars();
    match chars.next() {
        Some(first) => format!("on{}{}", first.to_ascii_uppercase(), chars.as_str()),
        None => "on".to_string(),
    }
}

// =============================================================================
// Child
// =============================================================================

/// Anything that can sit in a child position.
///
/// Null and booleans render nothing (a component may legitimately render
/// nothing); strings and numbers render text.
#[derive(Debug, Clone, PartialEq)]
pub enum Child {
    Null,
    Bool(bool),
    Text(String),
    Number(f64),
    Node(Rc<VNode>),
}

impl Child {
    /// Sibling key, if this is a keyed node.
    pub fn key(&self) -> Option<&Key> {
        match self {
            Child::Node(node) => node.key_ref(),
            _ => None,
        }
    }

    /// Null and booleans produce no fiber.
    pub fn is_empty(&self) -> bool {
        matches!(self, Child::Null | Child::Bool(_))
    }

    /// Text a primitive child renders as.
    pub fn text_content(&self) -> Option<String> {
        match self {
            Child::Text(s) => Some(s.clone()),
            Child::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    pub fn as_node(&self) -> Option<&VNode> {
        match self {
            Child::Node(node) => Some(node),
            _ => None,
        }
    }
}

impl From<VNode> for Child {
    fn from(value: VNode) -> Self {
        Child::Node(Rc::new(value))
    }
}

impl From<Rc<VNode>> for Child {
    fn from(value: Rc<VNode>) -> Self {
        Child::Node(value)
    }
}

impl From<&str> for Child {
    fn from(value: &str) -> Self {
        Child::Text(value.to_string())
    }
}

impl From<String> for Child {
    fn from(value: String) -> Self {
        Child::Text(value)
    }
}

impl From<f64> for Child {
    fn from(value: f64) -> Self {
        Child::Number(value)
    }
}

impl From<i64> for Child {
    fn from(value: i64) -> Self {
        Child::Number(value as f64)
    }
}

impl From<i32> for Child {
    fn from(value: i32) -> Self {
        Child::Number(value as f64)
    }
}

impl From<bool> for Child {
    fn from(value: bool) -> Self {
        Child::Bool(value)
    }
}

impl<T: Into<Child>> From<Option<T>> for Child {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Child::Null)
    }
}
