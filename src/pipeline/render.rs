//! Renderer - The render entry point.
//!
//! A [`Renderer`] owns the host tree, the fiber arena and one root per render
//! target. `render(tree, target)` diffs `tree` against what was last rendered
//! into `target` and returns the mutations it took.
//!
//! # Example
//!
//! ```
//! use spark_vdom::pipeline::Renderer;
//! use spark_vdom::primitives::VNode;
//!
//! let mut renderer = Renderer::new();
//! let target = renderer.host_mut().create_element("main");
//!
//! let first = renderer.render(VNode::element("p").child("hello"), target).unwrap();
//! assert_eq!(first.inserts, 2);
//!
//! let again = renderer.render(VNode::element("p").child("hello"), target).unwrap();
//! assert_eq!(again.total(), 0);
//! ```
//!
//! # Deferred re-renders
//!
//! Component state never re-renders synchronously. A change enqueues the
//! target on the renderer's [`RenderQueue`]; [`Renderer::flush`] drains it.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use tracing::{debug, warn};

use crate::config::RuntimeConfig;
use crate::engine::{FiberArena, FiberId, HostId, HostTree, MutationStats};
use crate::error::{RenderError, Result};
use crate::primitives::Child;
use crate::strategy::{ChildDiff, ChildScope, DiffStrategy};
use crate::types::Event;

use super::queue::{QueueHandle, RenderQueue, Scheduler};
use super::reconciler::Reconciler;

/// Upper bound on queue drains per `flush`, in case a component keeps
/// changing its own state while rendering.
const MAX_FLUSH_PASSES: usize = 64;

/// What was last rendered into one target.
struct RootState {
    fibers: Vec<FiberId>,
    tree: Child,
    /// Strategy of the last render; `None` for a custom [`ChildDiff`].
    strategy: Option<DiffStrategy>,
}

/// Owns the trees and drives reconciliation.
pub struct Renderer {
    host: HostTree,
    fibers: FiberArena,
    roots: HashMap<HostId, RootState>,
    queue: QueueHandle,
    config: RuntimeConfig,
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer {
    pub fn new() -> Self {
        Self::with_config(RuntimeConfig::default())
    }

    pub fn with_config(config: RuntimeConfig) -> Self {
        Self {
            host: HostTree::new(),
            fibers: FiberArena::new(),
            roots: HashMap::new(),
            queue: Rc::new(RefCell::new(RenderQueue::new())),
            config,
        }
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    pub fn host(&self) -> &HostTree {
        &self.host
    }

    /// Direct host access, for creating targets and for collaborators that
    /// own host nodes of their own.
    pub fn host_mut(&mut self) -> &mut HostTree {
        &mut self.host
    }

    pub fn fibers(&self) -> &FiberArena {
        &self.fibers
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Top-level fibers rendered into `target`.
    pub fn root_fibers(&self, target: HostId) -> &[FiberId] {
        self.roots
            .get(&target)
            .map(|r| r.fibers.as_slice())
            .unwrap_or(&[])
    }

    /// Whether `target` has been rendered into and not unmounted.
    pub fn is_mounted(&self, target: HostId) -> bool {
        self.roots.contains_key(&target)
    }

    /// The tree last rendered into `target`.
    pub fn last_tree(&self, target: HostId) -> Option<&Child> {
        self.roots.get(&target).map(|r| &r.tree)
    }

    pub fn queue(&self) -> &QueueHandle {
        &self.queue
    }

    /// Fire `event` at `node`'s listeners. Returns how many ran.
    pub fn dispatch(&self, node: HostId, event: &Event) -> usize {
        self.host.dispatch(node, event)
    }

    // -------------------------------------------------------------------------
    // Rendering
    // -------------------------------------------------------------------------

    /// Render with the configured default strategy.
    pub fn render(&mut self, tree: impl Into<Child>, target: HostId) -> Result<MutationStats> {
        let strategy = self.config.resolve_strategy();
        self.render_with(tree, target, strategy)
    }

    /// Render with an explicit strategy.
    pub fn render_with(
        &mut self,
        tree: impl Into<Child>,
        target: HostId,
        strategy: DiffStrategy,
    ) -> Result<MutationStats> {
        self.reconcile(tree.into(), target, strategy.as_diff(), Some(strategy))
    }

    /// Render with a custom [`ChildDiff`] implementation.
    ///
    /// Cancels any pending deferred re-render of `target`. If a component
    /// fails, the error is returned and `target` is left empty: every fiber
    /// of the failed pass has been removed.
    pub fn render_with_diff(
        &mut self,
        tree: impl Into<Child>,
        target: HostId,
        diff: &dyn ChildDiff,
    ) -> Result<MutationStats> {
        self.reconcile(tree.into(), target, diff, None)
    }

    fn reconcile(
        &mut self,
        tree: Child,
        target: HostId,
        diff: &dyn ChildDiff,
        strategy: Option<DiffStrategy>,
    ) -> Result<MutationStats> {
        if !self.host.contains(target) {
            return Err(RenderError::UnknownTarget(target));
        }
        self.queue.borrow_mut().cancel(target);

        let before = self.host.stats();
        let old = self
            .roots
            .remove(&target)
            .map(|root| root.fibers)
            .unwrap_or_default();

        let scheduler = Scheduler::new(self.queue.clone(), target);
        let mut reconciler = Reconciler::new(&mut self.host, &mut self.fibers, diff)
            .with_scheduler(scheduler)
            .with_duplicate_key_warnings(self.config.warn_duplicate_keys);
        let fibers = reconciler.diff_children(ChildScope::root(target), old, std::slice::from_ref(&tree));

        let stats = self.host.stats().since(&before);
        match fibers {
            Ok(fibers) => {
                self.roots.insert(
                    target,
                    RootState {
                        fibers,
                        tree,
                        strategy,
                    },
                );
                debug!(
                    ?target,
                    strategy = diff.name(),
                    inserts = stats.inserts,
                    moves = stats.moves,
                    removals = stats.removals,
                    props = stats.property_mutations(),
                    text = stats.text_writes,
                    "render"
                );
                Ok(stats)
            }
            Err(err) => {
                warn!(?target, code = err.code(), error = %err, "render failed");
                Err(err)
            }
        }
    }

    /// Remove everything rendered into `target`. Returns whether anything was
    /// mounted there.
    pub fn unmount(&mut self, target: HostId) -> bool {
        self.queue.borrow_mut().cancel(target);
        let Some(root) = self.roots.remove(&target) else {
            return false;
        };
        let mut reconciler = Reconciler::new(&mut self.host, &mut self.fibers, DiffStrategy::Replace.as_diff());
        for fiber in root.fibers {
            reconciler.remove(fiber);
        }
        debug!(?target, "unmounted");
        true
    }

    // -------------------------------------------------------------------------
    // Deferred re-render
    // -------------------------------------------------------------------------

    /// Enqueue `tree` for `target`, replacing any pending tree.
    pub fn schedule(&mut self, tree: impl Into<Child>, target: HostId) {
        self.queue.borrow_mut().schedule_tree(target, tree.into());
    }

    /// Enqueue a re-render of the target `fiber` belongs to.
    ///
    /// Returns `false` if the fiber is dead or not part of any root.
    pub fn schedule_fiber(&mut self, fiber: FiberId) -> bool {
        let Some(top) = self.fibers.root_of(fiber) else {
            return false;
        };
        let target = self
            .roots
            .iter()
            .find(|(_, root)| root.fibers.contains(&top))
            .map(|(&target, _)| target);
        match target {
            Some(target) => {
                self.queue.borrow_mut().schedule(target);
                true
            }
            None => false,
        }
    }

    /// Whether any re-render is pending.
    pub fn has_pending(&self) -> bool {
        !self.queue.borrow().is_empty()
    }

    /// Run every pending re-render, including ones scheduled while flushing.
    ///
    /// Each target is re-rendered with the strategy it was last rendered
    /// with, or the configured default if it never was (or used a custom
    /// [`ChildDiff`]). Returns how many renders ran. Targets that were
    /// unmounted or released in the meantime are dropped.
    pub fn flush(&mut self) -> Result<usize> {
        let mut rendered = 0;
        for _ in 0..MAX_FLUSH_PASSES {
            let pending = self.queue.borrow_mut().drain();
            if pending.is_empty() {
                return Ok(rendered);
            }
            for (target, tree) in pending {
                let tree = match tree {
                    Some(tree) => tree,
                    None => match self.roots.get(&target) {
                        Some(root) => root.tree.clone(),
                        None => continue,
                    },
                };
                if !self.host.contains(target) {
                    continue;
                }
                let strategy = self
                    .roots
                    .get(&target)
                    .and_then(|root| root.strategy)
                    .unwrap_or_else(|| self.config.resolve_strategy());
                self.render_with(tree, target, strategy)?;
                rendered += 1;
            }
        }
        warn!(passes = MAX_FLUSH_PASSES, "render queue still busy after flush");
        Ok(rendered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives::{Component, VNode};
    use crate::state::use_state;
    use crate::types::Props;

    #[test]
    fn test_unknown_target() {
        let mut renderer = Renderer::new();
        let target = renderer.host_mut().create_element("main");
        renderer.host_mut().release(target);
        let err = renderer.render("x", target).unwrap_err();
        assert_eq!(err.code(), "ERR_UNKNOWN_TARGET");
    }

    #[test]
    fn test_unmount_clears_target() {
        let mut renderer = Renderer::new();
        let target = renderer.host_mut().create_element("main");
        renderer.render(VNode::element("p").child("x"), target).unwrap();

        assert!(renderer.unmount(target));
        assert!(!renderer.unmount(target));
        assert!(renderer.host().children(target).is_empty());
        assert!(renderer.fibers().is_empty());
    }

    fn counter() -> Component {
        Component::new("Counter", |_props: &Props| {
            let count = use_state(|| 0i64);
            let inc = count.clone();
            Ok(VNode::element("button")
                .on("click", move |_| inc.update(|n| n + 1))
                .child(count.get())
                .into())
        })
    }

    #[test]
    fn test_state_change_defers_until_flush() {
        let mut renderer = Renderer::new();
        let target = renderer.host_mut().create_element("main");
        renderer
            .render(VNode::component(&counter(), Props::new()), target)
            .unwrap();
        let button = renderer.host().children(target)[0];
        let label = renderer.host().children(button)[0];

        renderer.dispatch(button, &Event::new("click"));
        renderer.dispatch(button, &Event::new("click"));
        assert_eq!(renderer.host().text(label), Some("0"), "no synchronous render");
        assert!(renderer.has_pending());

        assert_eq!(renderer.flush().unwrap(), 1);
        assert_eq!(renderer.host().text(label), Some("2"));
        assert!(!renderer.has_pending());
    }

    #[test]
    fn test_direct_render_cancels_pending() {
        let mut renderer = Renderer::new();
        let target = renderer.host_mut().create_element("main");
        renderer.render("a", target).unwrap();
        renderer.schedule("queued", target);

        renderer.render("direct", target).unwrap();
        assert_eq!(renderer.flush().unwrap(), 0);
        let text = renderer.host().children(target)[0];
        assert_eq!(renderer.host().text(text), Some("direct"));
    }

    #[test]
    fn test_schedule_fiber_finds_root() {
        let mut renderer = Renderer::new();
        let target = renderer.host_mut().create_element("main");
        renderer
            .render(VNode::element("ul").child(VNode::element("li")), target)
            .unwrap();
        let ul = renderer.root_fibers(target)[0];
        let li = renderer.fibers().get(ul).unwrap().children()[0];

        assert!(renderer.schedule_fiber(li));
        assert!(renderer.queue().borrow().is_pending(target));
    }

    fn swapper() -> Component {
        Component::new("Swapper", |_props: &Props| {
            let flipped = use_state(|| false);
            let flip = flipped.clone();
            let order = if flipped.get() { ["b", "a"] } else { ["a", "b"] };
            Ok(VNode::element("ul")
                .on("click", move |_| flip.update(|f| !f))
                .children(order.map(|k| VNode::element("li").key(k).child(k)))
                .into())
        })
    }

    #[test]
    fn test_flush_reuses_last_strategy() {
        let mut renderer = Renderer::new();
        let target = renderer.host_mut().create_element("main");
        renderer
            .render_with(
                VNode::component(&swapper(), Props::new()),
                target,
                DiffStrategy::Sequential,
            )
            .unwrap();
        let ul = renderer.host().children(target)[0];
        let items = renderer.host().children(ul).to_vec();

        renderer.dispatch(ul, &Event::new("click"));
        assert_eq!(renderer.flush().unwrap(), 1);

        // Sequential rewrites text in place; the default would have moved.
        assert_eq!(renderer.host().children(ul), items.as_slice());
        assert_eq!(renderer.host().stats().moves, 0);
        let first = renderer.host().children(items[0])[0];
        assert_eq!(renderer.host().text(first), Some("b"));
    }

    #[test]
    fn test_flush_default_strategy_moves_keyed_items() {
        let mut renderer = Renderer::new();
        let target = renderer.host_mut().create_element("main");
        renderer
            .render(VNode::component(&swapper(), Props::new()), target)
            .unwrap();
        let ul = renderer.host().children(target)[0];
        let items = renderer.host().children(ul).to_vec();

        renderer.dispatch(ul, &Event::new("click"));
        renderer.flush().unwrap();

        assert_eq!(renderer.host().children(ul), &[items[1], items[0]]);
        assert_eq!(renderer.host().stats().moves, 1);
    }

    #[test]
    fn test_unmount_stops_state_watchers() {
        let mut renderer = Renderer::new();
        let target = renderer.host_mut().create_element("main");
        renderer
            .render(VNode::component(&counter(), Props::new()), target)
            .unwrap();
        let button = renderer.host().children(target)[0];
        let handler_count = renderer.host().listeners(button).len();
        assert_eq!(handler_count, 1);

        renderer.unmount(target);
        assert_eq!(renderer.host().listener_count(), 0);
        assert!(!renderer.has_pending());
    }
}
