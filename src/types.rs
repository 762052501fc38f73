//! Core types for spark-vdom.
//!
//! These types define the foundation that everything builds on.
//! They flow from virtual nodes through the property patcher into the host
//! tree, and from there into the string serializers.

use std::fmt;
use std::rc::Rc;

use serde_json::{Map, Number, Value};

use crate::primitives::Child;

/// Property name that carries a node's children.
pub const CHILDREN_PROP: &str = "children";

/// Property name reserved for the sibling key.
pub const KEY_PROP: &str = "key";

/// Property name of the composite style value.
pub const STYLE_PROP: &str = "style";

// =============================================================================
// Key
// =============================================================================

/// Stable sibling identity used by the keyed diff.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Key {
    Str(String),
    Int(i64),
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Str(s) => f.write_str(s),
            Key::Int(i) => write!(f, "{i}"),
        }
    }
}

impl From<&str> for Key {
    fn from(value: &str) -> Self {
        Key::Str(value.to_string())
    }
}

impl From<String> for Key {
    fn from(value: String) -> Self {
        Key::Str(value)
    }
}

impl From<i64> for Key {
    fn from(value: i64) -> Self {
        Key::Int(value)
    }
}

impl From<i32> for Key {
    fn from(value: i32) -> Self {
        Key::Int(value as i64)
    }
}

impl From<usize> for Key {
    fn from(value: usize) -> Self {
        Key::Int(value as i64)
    }
}

// =============================================================================
// Events
// =============================================================================

/// Event delivered to handlers attached through `on*` properties.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Event {
    /// Event name without the `on` prefix, lowercase (e.g. "click").
    pub name: String,
    /// Optional payload (input value, key name, ...).
    pub detail: Option<String>,
}

impl Event {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            detail: None,
        }
    }

    pub fn with_detail(name: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            detail: Some(detail.into()),
        }
    }
}

/// Event handler value.
///
/// Handlers compare by identity (the `Rc` allocation), never by behaviour, so
/// re-rendering with the same handler is not a change and re-rendering with a
/// fresh closure always is.
#[derive(Clone)]
pub struct EventHandler(Rc<dyn Fn(&Event)>);

impl EventHandler {
    pub fn new(handler: impl Fn(&Event) + 'static) -> Self {
        Self(Rc::new(handler))
    }

    /// Invoke the handler.
    pub fn call(&self, event: &Event) {
        (self.0)(event)
    }
}

impl PartialEq for EventHandler {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for EventHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EventHandler({:p})", Rc::as_ptr(&self.0) as *const ())
    }
}

/// Map an `on*` property name to the event it listens for.
///
/// `onClick` listens for `click`. A handler stored under a name without the
/// `on` prefix listens for the lowercased name itself.
pub fn event_name(prop: &str) -> String {
    prop.strip_prefix("on")
        .filter(|rest| !rest.is_empty())
        .unwrap_or(prop)
        .to_ascii_lowercase()
}

// =============================================================================
// Style
// =============================================================================

/// Ordered style declarations. Replaced wholesale when it changes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Style {
    declarations: Vec<(String, String)>,
}

impl Style {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: add (or replace) a declaration.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(name, value);
        self
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.declarations.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.declarations.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.declarations
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.declarations
            .iter()
            .map(|(n, v)| (n.as_str(), v.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }

    /// Serialize as `name:value;name:value`.
    pub fn to_css(&self) -> String {
        self.declarations
            .iter()
            .map(|(n, v)| format!("{n}:{v}"))
            .collect::<Vec<_>>()
            .join(";")
    }
}

// =============================================================================
// Property Values
// =============================================================================

/// Value written to a host node when a property maps to an attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttrValue {
    /// Boolean attribute: present, no value.
    Bare,
    /// Ordinary string-valued attribute.
    Text(String),
}

/// A property value on a virtual node.
#[derive(Debug, Clone, PartialEq)]
pub enum PropValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Style(Style),
    Handler(EventHandler),
    Children(Vec<Child>),
}

impl PropValue {
    pub fn is_handler(&self) -> bool {
        matches!(self, PropValue::Handler(_))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropValue::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PropValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            PropValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// How this value is written as a plain attribute.
    ///
    /// `None` means the attribute must be absent: `false`, null, and the
    /// composite kinds (style, handlers, children) that are never attributes.
    pub fn attribute(&self) -> Option<AttrValue> {
        match self {
            PropValue::Null | PropValue::Bool(false) => None,
            PropValue::Bool(true) => Some(AttrValue::Bare),
            PropValue::Int(i) => Some(AttrValue::Text(i.to_string())),
            PropValue::Float(f) => Some(AttrValue::Text(f.to_string())),
            PropValue::Str(s) => Some(AttrValue::Text(s.clone())),
            PropValue::Style(_) | PropValue::Handler(_) | PropValue::Children(_) => None,
        }
    }

    /// Decode a value from a serialized placeholder payload.
    ///
    /// Objects decode to [`Style`] (the only composite a payload can carry);
    /// arrays are kept as their JSON text.
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Null => PropValue::Null,
            Value::Bool(b) => PropValue::Bool(*b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => PropValue::Int(i),
                None => PropValue::Float(n.as_f64().unwrap_or_default()),
            },
            Value::String(s) => PropValue::Str(s.clone()),
            Value::Array(_) => PropValue::Str(value.to_string()),
            Value::Object(map) => {
                let mut style = Style::new();
                for (name, v) in map {
                    match v {
                        Value::String(s) => style.set(name.clone(), s.clone()),
                        other => style.set(name.clone(), other.to_string()),
                    }
                }
                PropValue::Style(style)
            }
        }
    }

    /// Encode for a placeholder payload. Handlers and children have no
    /// serialized form.
    pub fn to_json(&self) -> Option<Value> {
        match self {
            PropValue::Null => Some(Value::Null),
            PropValue::Bool(b) => Some(Value::Bool(*b)),
            PropValue::Int(i) => Some(Value::Number((*i).into())),
            PropValue::Float(f) => Number::from_f64(*f).map(Value::Number),
            PropValue::Str(s) => Some(Value::String(s.clone())),
            PropValue::Style(style) => Some(Value::Object(
                style
                    .iter()
                    .map(|(n, v)| (n.to_string(), Value::String(v.to_string())))
                    .collect(),
            )),
            PropValue::Handler(_) | PropValue::Children(_) => None,
        }
    }
}

impl From<&str> for PropValue {
    fn from(value: &str) -> Self {
        PropValue::Str(value.to_string())
    }
}

impl From<String> for PropValue {
    fn from(value: String) -> Self {
        PropValue::Str(value)
    }
}

impl From<bool> for PropValue {
    fn from(value: bool) -> Self {
        PropValue::Bool(value)
    }
}

impl From<i64> for PropValue {
    fn from(value: i64) -> Self {
        PropValue::Int(value)
    }
}

impl From<i32> for PropValue {
    fn from(value: i32) -> Self {
        PropValue::Int(value as i64)
    }
}

impl From<f64> for PropValue {
    fn from(value: f64) -> Self {
        PropValue::Float(value)
    }
}

impl From<Style> for PropValue {
    fn from(value: Style) -> Self {
        PropValue::Style(value)
    }
}

impl From<EventHandler> for PropValue {
    fn from(value: EventHandler) -> Self {
        PropValue::Handler(value)
    }
}

// =============================================================================
// Props
// =============================================================================

/// Insertion-ordered property map.
///
/// Small maps dominate (a handful of attributes per node), so lookups are a
/// linear scan. Order is observable: attributes are written, and serialized,
/// in declaration order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Props {
    entries: Vec<(String, PropValue)>,
}

impl Props {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: insert a property.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<PropValue>) -> Self {
        self.insert(name, value);
        self
    }

    /// Insert or replace. A replaced property keeps its position.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<PropValue>) {
        let name = name.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&PropValue> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut PropValue> {
        self.entries
            .iter_mut()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    pub fn remove(&mut self, name: &str) -> Option<PropValue> {
        let pos = self.entries.iter().position(|(n, _)| n == name)?;
        Some(self.entries.remove(pos).1)
    }

    pub fn contains_key(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropValue)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v))
    }

    /// Properties that reach the host node (everything but `children`/`key`).
    pub fn host_props(&self) -> impl Iterator<Item = (&str, &PropValue)> {
        self.iter().filter(|(name, _)| !is_reserved(name))
    }

    /// The nested `children` value, or an empty slice.
    pub fn children(&self) -> &[Child] {
        match self.get(CHILDREN_PROP) {
            Some(PropValue::Children(children)) => children,
            _ => &[],
        }
    }

    /// Decode a payload object.
    pub fn from_json_map(map: &Map<String, Value>) -> Self {
        let mut props = Props::new();
        for (name, value) in map {
            props.insert(name.clone(), PropValue::from_json(value));
        }
        props
    }

    /// Encode the serializable subset as a payload object.
    pub fn to_json_map(&self) -> Map<String, Value> {
        self.host_props()
            .filter_map(|(name, value)| value.to_json().map(|v| (name.to_string(), v)))
            .collect()
    }
}

/// `children` and `key` never reach the host node.
pub fn is_reserved(name: &str) -> bool {
    name == CHILDREN_PROP || name == KEY_PROP
}
