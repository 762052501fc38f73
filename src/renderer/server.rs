//! Virtual tree to markup, without fibers or a host tree.
//!
//! Components are executed in a hook frame with no scheduler, so `use_state`
//! works but never schedules anything. Event handlers are omitted: there is
//! nothing to attach them to.

use crate::error::Result;
use crate::primitives::{Child, Tag, VNode};
use crate::state::with_hooks;
use crate::types::{PropValue, STYLE_PROP};

use super::markup::{Markup, is_void};

/// Serialize `tree` to markup.
///
/// # Example
///
/// ```
/// use spark_vdom::primitives::VNode;
/// use spark_vdom::renderer::render_to_string;
///
/// let html = render_to_string(&VNode::element("input").attr("disabled", true).into()).unwrap();
/// assert_eq!(html, "<input disabled>");
/// ```
pub fn render_to_string(tree: &Child) -> Result<String> {
    let mut out = Markup::new();
    write_child(&mut out, tree)?;
    Ok(out.finish())
}

fn write_child(out: &mut Markup, child: &Child) -> Result<()> {
    match child {
        Child::Null | Child::Bool(_) => Ok(()),
        Child::Text(_) | Child::Number(_) => {
            out.text(&child.text_content().unwrap_or_default());
            Ok(())
        }
        Child::Node(node) => write_node(out, node),
    }
}

fn write_node(out: &mut Markup, node: &VNode) -> Result<()> {
    match node.tag() {
        Tag::Group => write_children(out, node.child_nodes()),
        Tag::Component(component) => {
            let (rendered, slots) = with_hooks(Vec::new(), None, || component.render(node.props()));
            for slot in slots {
                slot.dispose();
            }
            write_child(out, &rendered?)
        }
        Tag::Host(tag) => {
            out.open_tag(tag);
            let mut style = None;
            for (name, value) in node.props().host_props() {
                match value {
                    PropValue::Style(s) if name == STYLE_PROP => style = Some(s),
                    _ => {
                        if let Some(attr) = value.attribute() {
                            out.attribute(name, &attr);
                        }
                    }
                }
            }
            // Host elements keep style apart from attributes; print it last
            // like the host serializer does.
            if let Some(style) = style {
                out.style(style);
            }
            out.close_open_tag();
            if is_void(tag) {
                return Ok(());
            }
            write_children(out, node.child_nodes())?;
            out.end_tag(tag);
            Ok(())
        }
    }
}

fn write_children(out: &mut Markup, children: &[Child]) -> Result<()> {
    for child in children {
        write_child(out, child)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives::Component;
    use crate::state::use_state;
    use crate::types::{Props, Style};

    #[test]
    fn test_render_nested_tree() {
        let tree: Child = VNode::element("ul")
            .attr("class", "list")
            .on("click", |_| {})
            .children([VNode::element("li").child("a & b"), VNode::element("li").child(2)])
            .into();
        assert_eq!(
            render_to_string(&tree).unwrap(),
            r#"<ul class="list"><li>a &amp; b</li><li>2</li></ul>"#
        );
    }

    #[test]
    fn test_style_and_false_attributes() {
        let tree: Child = VNode::element("div")
            .style(Style::new().with("color", "red").with("margin", "0"))
            .attr("hidden", false)
            .into();
        assert_eq!(
            render_to_string(&tree).unwrap(),
            r#"<div style="color:red;margin:0"></div>"#
        );
    }

    #[test]
    fn test_components_and_groups() {
        let badge = Component::new("Badge", |props| {
            let seen = use_state(|| 7i64);
            let label = props.get("label").and_then(|v| v.as_str()).unwrap_or("").to_string();
            Ok(VNode::group([Child::from(label), Child::from(seen.get())]).into())
        });
        let tree: Child = VNode::component(&badge, Props::new().with("label", "n=")).into();
        assert_eq!(render_to_string(&tree).unwrap(), "n=7");
    }

    #[test]
    fn test_void_element_drops_children() {
        let tree: Child = VNode::element("br").child("ignored").into();
        assert_eq!(render_to_string(&tree).unwrap(), "<br>");
    }
}
