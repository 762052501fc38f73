//! Mounted host subtree to markup.

use crate::engine::{HostId, HostKind, HostTree};

use super::markup::{Markup, is_void};

/// Serialize `root` and everything under it.
///
/// Listeners are not part of the output. A dead `root` serializes to the
/// empty string.
pub fn host_to_string(tree: &HostTree, root: HostId) -> String {
    let mut out = Markup::new();
    write_node(&mut out, tree, root);
    out.finish()
}

/// Serialize only the children of `root`, e.g. a render target's content.
pub fn host_children_to_string(tree: &HostTree, root: HostId) -> String {
    let mut out = Markup::new();
    for &child in tree.children(root) {
        write_node(&mut out, tree, child);
    }
    out.finish()
}

fn write_node(out: &mut Markup, tree: &HostTree, id: HostId) {
    let Some(node) = tree.node(id) else { return };
    match &node.kind {
        HostKind::Text(text) => out.text(text),
        HostKind::Element(element) => {
            out.open_tag(&element.tag);
            for (name, value) in tree.attributes(id) {
                out.attribute(name, value);
            }
            if let Some(style) = tree.style(id) {
                out.style(style);
            }
            out.close_open_tag();
            if is_void(&element.tag) {
                return;
            }
            for &child in node.children() {
                write_node(out, tree, child);
            }
            out.end_tag(&element.tag);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::AttrValue;

    #[test]
    fn test_host_serialization() {
        let mut tree = HostTree::new();
        let p = tree.create_element("p");
        let text = tree.create_text("1 < 2");
        tree.set_attribute(p, "title", AttrValue::Text("\"q\"".into()));
        tree.append_child(p, text);

        assert_eq!(host_to_string(&tree, p), r#"<p title="&quot;q&quot;">1 &lt; 2</p>"#);
        assert_eq!(host_children_to_string(&tree, p), "1 &lt; 2");
    }

    #[test]
    fn test_dead_root_is_empty() {
        let mut tree = HostTree::new();
        let p = tree.create_element("p");
        tree.release(p);
        assert_eq!(host_to_string(&tree, p), "");
    }
}
