//! Remove - Tear a fiber subtree down.
//!
//! The top-level host nodes of the subtree are detached from their parent
//! (one structural removal each), then every fiber is released parent first:
//! listener tokens dropped, state watchers stopped, the owned host node freed.
//! Releasing parents first means descendants are already orphaned when their
//! turn comes, so no extra detach is recorded for them.
//!
//! Removal is idempotent. A dead fiber, or a host node that something else
//! already detached or released, is skipped.

use tracing::trace;

use crate::engine::FiberId;

use super::reconciler::Reconciler;

impl Reconciler<'_> {
    /// Remove `fiber` and everything it owns.
    pub fn remove(&mut self, fiber: FiberId) {
        if !self.fibers.contains(fiber) {
            return;
        }

        for node in self.fibers.collect_host_nodes(fiber) {
            self.host.detach(node);
        }

        let doomed = self.fibers.subtree(fiber);
        trace!(?fiber, fibers = doomed.len(), "removing subtree");
        for id in doomed {
            let Some(dead) = self.fibers.remove(id) else { continue };
            for token in dead.listeners.into_values() {
                self.host.remove_listener(token);
            }
            for slot in dead.hooks {
                slot.dispose();
            }
            if let Some(node) = dead.host {
                self.host.release(node);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{FiberArena, HostTree};
    use crate::primitives::{Child, VNode};
    use crate::strategy::{ChildScope, DiffStrategy};

    #[test]
    fn test_remove_releases_everything() {
        let mut tree = HostTree::new();
        let mut arena = FiberArena::new();
        let root = tree.create_element("root");
        let node: Child = VNode::element("ul")
            .on("click", |_| {})
            .child(VNode::element("li").on("click", |_| {}).child("a"))
            .child(VNode::group(["b", "c"]))
            .into();

        let mut r = Reconciler::new(&mut tree, &mut arena, DiffStrategy::Auto.as_diff());
        let fiber = r.mount(&node, ChildScope::root(root)).unwrap().unwrap();
        let before = r.host.stats();
        r.remove(fiber);
        let delta = r.host.stats().since(&before);

        assert_eq!(delta.removals, 1, "only the top-level node is detached");
        assert_eq!(delta.listeners_removed, 2);
        assert!(arena.is_empty());
        assert_eq!(tree.listener_count(), 0);
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn test_remove_is_idempotent() {
        let mut tree = HostTree::new();
        let mut arena = FiberArena::new();
        let root = tree.create_element("root");

        let mut r = Reconciler::new(&mut tree, &mut arena, DiffStrategy::Auto.as_diff());
        let fiber = r
            .mount(&VNode::element("p").child("x").into(), ChildScope::root(root))
            .unwrap()
            .unwrap();
        // Detached out from under the reconciler.
        let p = r.fibers.first_host_node(fiber).unwrap();
        r.host.detach(p);

        r.remove(fiber);
        r.remove(fiber);
        assert!(arena.is_empty());
        assert!(tree.children(root).is_empty());
    }
}
