//! Placeholder markup contract.
//!
//! A placeholder is any element carrying two attributes:
//!
//! | Attribute | Content |
//! |---|---|
//! | `data-hangar-id` | stable instance id |
//! | `data-hangar-props` | `{"component": "<registered name>", "props": {...}}` |
//!
//! Nothing else about the element is read.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::engine::{HostId, HostTree};
use crate::error::{RenderError, Result};
use crate::primitives::{Child, Tag, VNode};
use crate::types::{AttrValue, Props};

pub const ID_ATTR: &str = "data-hangar-id";
pub const PROPS_ATTR: &str = "data-hangar-props";

#[derive(Debug, Serialize, Deserialize)]
struct Payload {
    component: String,
    #[serde(default)]
    props: Map<String, Value>,
}

/// A decoded placeholder found in a host tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Placeholder {
    pub node: HostId,
    pub id: String,
    pub component: String,
    pub props: Props,
}

/// Serialize a payload attribute value.
pub fn encode_payload(component: &str, props: &Props) -> String {
    let payload = Payload {
        component: component.to_string(),
        props: props.to_json_map(),
    };
    serde_json::to_string(&payload).unwrap_or_default()
}

fn decode_payload(id: &str, raw: &str) -> Result<(String, Props)> {
    let payload: Payload = serde_json::from_str(raw).map_err(|source| RenderError::Payload {
        id: id.to_string(),
        source,
    })?;
    Ok((payload.component, Props::from_json_map(&payload.props)))
}

/// Build a placeholder element for `id` rendering `component` with `props`.
pub fn placeholder(id: &str, component: &str, props: &Props) -> VNode {
    VNode::element("div")
        .attr(ID_ATTR, id)
        .attr(PROPS_ATTR, encode_payload(component, props))
}

/// Stable id of `node`, if it is a placeholder.
pub fn placeholder_id(tree: &HostTree, node: HostId) -> Option<&str> {
    match tree.attribute(node, ID_ATTR)? {
        AttrValue::Text(id) => Some(id),
        AttrValue::Bare => None,
    }
}

/// Decode the placeholder at `node`. `None` if `node` is not a placeholder.
pub fn read_placeholder(tree: &HostTree, node: HostId) -> Option<Result<Placeholder>> {
    let id = placeholder_id(tree, node)?;
    let raw = match tree.attribute(node, PROPS_ATTR) {
        Some(AttrValue::Text(raw)) => raw.as_str(),
        _ => "{}",
    };
    Some(decode_payload(id, raw).map(|(component, props)| Placeholder {
        node,
        id: id.to_string(),
        component,
        props,
    }))
}

/// Every placeholder under `root`, in document order.
pub fn find_placeholders(tree: &HostTree, root: HostId) -> Result<Vec<Placeholder>> {
    tree.find_by_attribute(root, ID_ATTR)
        .into_iter()
        .filter_map(|node| read_placeholder(tree, node))
        .collect()
}

/// Placeholders written directly into a virtual tree, as `(id, component)`
/// pairs in document order.
///
/// Component nodes are not run, so placeholders a component renders only
/// show up once mounted.
pub fn declared_placeholders(child: &Child) -> Result<Vec<(String, String)>> {
    let mut found = Vec::new();
    collect_declared(child, &mut found)?;
    Ok(found)
}

fn collect_declared(child: &Child, found: &mut Vec<(String, String)>) -> Result<()> {
    let Child::Node(node) = child else { return Ok(()) };
    match node.tag() {
        Tag::Component(_) => return Ok(()),
        Tag::Host(_) => {
            if let Some(id) = node.props().get(ID_ATTR).and_then(|v| v.as_str()) {
                let raw = node
                    .props()
                    .get(PROPS_ATTR)
                    .and_then(|v| v.as_str())
                    .unwrap_or("{}");
                let (component, _) = decode_payload(id, raw)?;
                found.push((id.to_string(), component));
            }
        }
        Tag::Group => {}
    }
    for child in node.child_nodes() {
        collect_declared(child, found)?;
    }
    Ok(())
}
