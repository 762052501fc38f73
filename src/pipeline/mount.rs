//! Mount - Build fibers and host nodes for a new child.
//!
//! Mounting is strictly additive: it creates nodes and inserts them, it never
//! removes anything that was there before. The only removal is the rollback
//! of the fiber being built when a component inside it fails.
//!
//! | Child | Fiber | Host node |
//! |---|---|---|
//! | null / bool | none | none |
//! | text / number | `Text` | one text node |
//! | `Host(name)` | `Host` | one element, children mounted inside |
//! | `Group` | `Group` | none, children mounted in place |
//! | `Component` | `Component` | none, the rendered result mounted in place |

use std::rc::Rc;

use crate::engine::{Fiber, FiberId};
use crate::error::Result;
use crate::primitives::{Child, Tag, VNode};
use crate::strategy::ChildScope;
use crate::types::Props;

use super::reconciler::Reconciler;

impl Reconciler<'_> {
    /// Mount `child` into `scope.host_parent` before `scope.anchor`.
    pub fn mount(&mut self, child: &Child, scope: ChildScope) -> Result<Option<FiberId>> {
        match child {
            Child::Null | Child::Bool(_) => Ok(None),
            Child::Text(_) | Child::Number(_) => {
                let content = child.text_content().unwrap_or_default();
                let node = self.host.create_text(content);
                self.host.insert_before(scope.host_parent, node, scope.anchor);
                Ok(Some(self.fibers.insert(Fiber::text(node, scope.parent))))
            }
            Child::Node(vnode) => self.mount_node(vnode, scope).map(Some),
        }
    }

    fn mount_node(&mut self, vnode: &Rc<VNode>, scope: ChildScope) -> Result<FiberId> {
        match vnode.tag() {
            Tag::Host(name) => {
                let element = self.host.create_element(name.as_str());
                let fiber = self
                    .fibers
                    .insert(Fiber::node(vnode.clone(), Some(element), scope.parent));
                self.patch_props(fiber, &Props::new(), vnode.props());

                let inner = ChildScope {
                    parent: Some(fiber),
                    host_parent: element,
                    anchor: None,
                };
                match self.mount_children(inner, vnode.child_nodes()) {
                    Ok(children) => self.set_children(fiber, children),
                    Err(err) => {
                        self.remove(fiber);
                        return Err(err);
                    }
                }

                self.host.insert_before(scope.host_parent, element, scope.anchor);
                Ok(fiber)
            }
            Tag::Group => {
                let fiber = self.fibers.insert(Fiber::node(vnode.clone(), None, scope.parent));
                let inner = ChildScope {
                    parent: Some(fiber),
                    ..scope
                };
                match self.mount_children(inner, vnode.child_nodes()) {
                    Ok(children) => self.set_children(fiber, children),
                    Err(err) => {
                        self.remove(fiber);
                        return Err(err);
                    }
                }
                Ok(fiber)
            }
            Tag::Component(component) => {
                let fiber = self.fibers.insert(Fiber::node(vnode.clone(), None, scope.parent));
                let inner = ChildScope {
                    parent: Some(fiber),
                    ..scope
                };
                let mounted = self
                    .render_component(fiber, component, vnode)
                    .and_then(|rendered| self.mount(&rendered, inner));
                match mounted {
                    Ok(child) => self.set_children(fiber, child.into_iter().collect()),
                    Err(err) => {
                        self.remove(fiber);
                        return Err(err);
                    }
                }
                self.refresh_anchor(fiber);
                Ok(fiber)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{FiberArena, FiberKind, HostTree};
    use crate::error::RenderError;
    use crate::primitives::Component;
    use crate::strategy::DiffStrategy;

    fn mount_into(tree: &mut HostTree, arena: &mut FiberArena, child: Child) -> Result<Option<FiberId>> {
        let root = tree.create_element("root");
        let mut reconciler = Reconciler::new(tree, arena, DiffStrategy::Auto.as_diff());
        reconciler.mount(&child, ChildScope::root(root))
    }

    #[test]
    fn test_mount_empty_children_produce_no_fiber() {
        let mut tree = HostTree::new();
        let mut arena = FiberArena::new();
        assert_eq!(mount_into(&mut tree, &mut arena, Child::Null).unwrap(), None);
        assert_eq!(mount_into(&mut tree, &mut arena, false.into()).unwrap(), None);
        assert!(arena.is_empty());
    }

    #[test]
    fn test_mount_element_with_props_and_children() {
        let mut tree = HostTree::new();
        let mut arena = FiberArena::new();
        let root = tree.create_element("root");
        let node = VNode::element("ul")
            .attr("class", "list")
            .child(VNode::element("li").child("one"))
            .child(VNode::group(["two", "three"]));

        let fiber = {
            let mut reconciler = Reconciler::new(&mut tree, &mut arena, DiffStrategy::Auto.as_diff());
            reconciler.mount(&node.into(), ChildScope::root(root)).unwrap().unwrap()
        };

        let ul = arena.get(fiber).unwrap().host().unwrap();
        assert_eq!(tree.children(root), &[ul]);
        assert_eq!(tree.children(ul).len(), 3, "group children are flattened");
        assert_eq!(tree.text(tree.children(ul)[2]), Some("three"));
        let group = arena.get(fiber).unwrap().children()[1];
        assert_eq!(arena.get(group).unwrap().kind(), FiberKind::Group);
        assert_eq!(tree.stats().removals, 0);
    }

    #[test]
    fn test_mount_component_records_anchor() {
        let mut tree = HostTree::new();
        let mut arena = FiberArena::new();
        let label = Component::new("Label", |props| {
            let text = props.get("text").and_then(|v| v.as_str()).unwrap_or("").to_string();
            Ok(VNode::element("span").child(text).into())
        });
        let child = VNode::component(&label, Props::new().with("text", "hi")).into();

        let fiber = mount_into(&mut tree, &mut arena, child).unwrap().unwrap();
        let f = arena.get(fiber).unwrap();
        assert_eq!(f.kind(), FiberKind::Component);
        assert_eq!(f.host(), None);
        assert_eq!(f.anchor(), arena.first_host_node(fiber));
        assert!(f.anchor().is_some());
    }

    #[test]
    fn test_failed_component_rolls_back() {
        let mut tree = HostTree::new();
        let mut arena = FiberArena::new();
        let broken = Component::new("Broken", |_| Err(RenderError::component("Broken", "boom")));
        let child = VNode::element("div")
            .child("before")
            .child(VNode::component(&broken, Props::new()))
            .into();

        let err = mount_into(&mut tree, &mut arena, child).unwrap_err();
        assert_eq!(err.code(), "ERR_COMPONENT");
        assert!(arena.is_empty(), "partial fibers must be removed");
        // Only the bare root element survives.
        assert_eq!(tree.len(), 1);
    }
}
