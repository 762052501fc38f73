//! Patch - Reconcile an existing fiber against a new child.
//!
//! When the tag stays the same the fiber is patched in place and keeps its
//! host node, which is what keeps focus, scroll position and external
//! listener bindings stable across updates. A component is re-run and its
//! single result diffed against its existing children; there is no separate
//! "state changed" path.
//!
//! When the tag changes the fiber is replaced: removed, then a fresh one is
//! mounted where the old one ended.

use std::rc::Rc;

use crate::engine::{FiberEffects, FiberId, FiberKind};
use crate::error::Result;
use crate::primitives::{Child, Tag, VNode};
use crate::strategy::ChildScope;

use super::reconciler::Reconciler;

impl Reconciler<'_> {
    /// Reconcile `fiber` with `child`.
    ///
    /// `scope.anchor` is the host node after `fiber`'s range.
    pub fn patch(&mut self, fiber: FiberId, child: &Child, scope: ChildScope) -> Result<Option<FiberId>> {
        if !self.fibers.contains(fiber) {
            return self.mount(child, scope);
        }
        if child.is_empty() {
            self.remove(fiber);
            return Ok(None);
        }

        if let Some(content) = child.text_content() {
            let node = match self.fibers.get(fiber) {
                Some(f) if f.kind == FiberKind::Text => f.host,
                _ => return self.replace(fiber, child, scope),
            };
            let mut effects = FiberEffects::empty();
            if let Some(node) = node {
                if self.host.text(node) != Some(content.as_str()) {
                    self.host.set_text(node, content);
                    effects |= FiberEffects::TEXT;
                }
            }
            if let Some(f) = self.fibers.get_mut(fiber) {
                f.effects = effects;
            }
            return Ok(Some(fiber));
        }

        let Child::Node(vnode) = child else {
            return self.replace(fiber, child, scope);
        };
        let previous = self
            .fibers
            .get(fiber)
            .and_then(|f| f.vnode.as_ref())
            .filter(|old| old.tag() == vnode.tag())
            .cloned();
        let Some(previous) = previous else {
            return self.replace(fiber, child, scope);
        };

        self.patch_in_place(fiber, &previous, vnode, scope)?;
        Ok(Some(fiber))
    }

    fn patch_in_place(
        &mut self,
        fiber: FiberId,
        previous: &Rc<VNode>,
        vnode: &Rc<VNode>,
        scope: ChildScope,
    ) -> Result<()> {
        let host = match self.fibers.get_mut(fiber) {
            Some(f) => {
                f.vnode = Some(vnode.clone());
                f.key = vnode.key_ref().cloned();
                f.effects = FiberEffects::empty();
                f.host
            }
            None => return Ok(()),
        };

        match vnode.tag() {
            Tag::Host(_) => {
                let Some(element) = host else { return Ok(()) };
                self.patch_props(fiber, previous.props(), vnode.props());
                let old = self.take_children(fiber);
                let inner = ChildScope {
                    parent: Some(fiber),
                    host_parent: element,
                    anchor: None,
                };
                let children = self.diff_children(inner, old, vnode.child_nodes())?;
                self.set_children(fiber, children);
            }
            Tag::Group => {
                let old = self.take_children(fiber);
                let inner = ChildScope {
                    parent: Some(fiber),
                    ..self.trailing_scope(&old, scope)
                };
                let children = self.diff_children(inner, old, vnode.child_nodes())?;
                self.set_children(fiber, children);
            }
            Tag::Component(component) => {
                let rendered = self.render_component(fiber, component, vnode)?;
                let old = self.take_children(fiber);
                let inner = ChildScope {
                    parent: Some(fiber),
                    ..self.trailing_scope(&old, scope)
                };
                let children = self.diff_children(inner, old, std::slice::from_ref(&rendered))?;
                self.set_children(fiber, children);
                self.refresh_anchor(fiber);
            }
        }
        Ok(())
    }

    /// Scope for diffing a host-less fiber's children: anchored after the
    /// last host node they currently own, or at `scope.anchor` if none.
    fn trailing_scope(&self, children: &[FiberId], scope: ChildScope) -> ChildScope {
        let last = children
            .iter()
            .rev()
            .find_map(|&c| self.fibers.last_host_node(c));
        match last {
            Some(last) => scope.with_anchor(self.host.next_sibling(last)),
            None => scope,
        }
    }

    /// Swap `fiber` for a fresh mount of `child` at the same position.
    fn replace(&mut self, fiber: FiberId, child: &Child, scope: ChildScope) -> Result<Option<FiberId>> {
        let anchor = match self.fibers.last_host_node(fiber) {
            Some(last) => self.host.next_sibling(last),
            None => scope.anchor,
        };
        self.remove(fiber);
        self.mount(child, scope.with_anchor(anchor))
    }
}
