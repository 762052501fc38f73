//! Reconciler - Tree surgery shared by every diff strategy.
//!
//! A [`Reconciler`] borrows the host tree and fiber arena for the length of
//! one render call. The algorithms live beside it:
//!
//! - `mount.rs` - build fibers and host nodes for new children
//! - `patch.rs` - reconcile an existing fiber in place, or replace it
//! - `remove.rs` - tear a fiber subtree down
//! - `props.rs` - host property patching
//!
//! Child lists are handed to the active [`ChildDiff`] strategy, which calls
//! back in through [`ReconcilerContext`].

use std::mem;
use std::rc::Rc;

use tracing::trace;

use crate::engine::{FiberArena, FiberEffects, FiberId, HostId, HostTree};
use crate::error::Result;
use crate::primitives::{Child, Component, VNode};
use crate::state::with_hooks;
use crate::strategy::{ChildDiff, ChildScope, ReconcilerContext};
use crate::types::Key;

use super::queue::Scheduler;

/// Mutable access to both trees for one render pass.
pub struct Reconciler<'a> {
    pub(super) host: &'a mut HostTree,
    pub(super) fibers: &'a mut FiberArena,
    strategy: &'a dyn ChildDiff,
    scheduler: Option<Scheduler>,
    warn_duplicate_keys: bool,
}

impl<'a> Reconciler<'a> {
    pub fn new(
        host: &'a mut HostTree,
        fibers: &'a mut FiberArena,
        strategy: &'a dyn ChildDiff,
    ) -> Self {
        Self {
            host,
            fibers,
            strategy,
            scheduler: None,
            warn_duplicate_keys: true,
        }
    }

    /// Components rendered in this pass get state that schedules through
    /// `scheduler`.
    pub fn with_scheduler(mut self, scheduler: Scheduler) -> Self {
        self.scheduler = Some(scheduler);
        self
    }

    pub fn with_duplicate_key_warnings(mut self, enabled: bool) -> Self {
        self.warn_duplicate_keys = enabled;
        self
    }

    /// Diff `old` against `new` with the pass's strategy.
    pub fn diff_children(
        &mut self,
        scope: ChildScope,
        old: Vec<FiberId>,
        new: &[Child],
    ) -> Result<Vec<FiberId>> {
        let strategy = self.strategy;
        strategy.diff(self, scope, old, new)
    }

    /// Mount `children` in order before `scope.anchor`.
    ///
    /// On error the children mounted so far are removed again.
    pub(super) fn mount_children(&mut self, scope: ChildScope, children: &[Child]) -> Result<Vec<FiberId>> {
        let mut out = Vec::with_capacity(children.len());
        for child in children {
            match self.mount(child, scope) {
                Ok(fiber) => out.extend(fiber),
                Err(err) => {
                    for fiber in out {
                        self.remove(fiber);
                    }
                    return Err(err);
                }
            }
        }
        Ok(out)
    }

    /// Run `component` for `fiber` inside the fiber's hook frame.
    pub(super) fn render_component(
        &mut self,
        fiber: FiberId,
        component: &Component,
        vnode: &Rc<VNode>,
    ) -> Result<Child> {
        let slots = self
            .fibers
            .get_mut(fiber)
            .map(|f| mem::take(&mut f.hooks))
            .unwrap_or_default();

        let (result, slots) = with_hooks(slots, self.scheduler.clone(), || {
            component.render(vnode.props())
        });

        if let Some(f) = self.fibers.get_mut(fiber) {
            f.hooks = slots;
            f.effects |= FiberEffects::RENDERED;
        } else {
            for slot in slots {
                slot.dispose();
            }
        }
        result
    }

    /// Record the component's first host node as its anchor.
    pub(super) fn refresh_anchor(&mut self, fiber: FiberId) {
        let first = self.fibers.first_host_node(fiber);
        if let Some(f) = self.fibers.get_mut(fiber) {
            f.anchor = first;
        }
    }

    pub(super) fn set_children(&mut self, fiber: FiberId, children: Vec<FiberId>) {
        if let Some(f) = self.fibers.get_mut(fiber) {
            f.children = children;
        }
    }

    pub(super) fn take_children(&mut self, fiber: FiberId) -> Vec<FiberId> {
        self.fibers
            .get_mut(fiber)
            .map(|f| mem::take(&mut f.children))
            .unwrap_or_default()
    }
}

impl ReconcilerContext for Reconciler<'_> {
    fn mount(&mut self, child: &Child, scope: ChildScope) -> Result<Option<FiberId>> {
        Reconciler::mount(self, child, scope)
    }

    fn patch(
        &mut self,
        fiber: FiberId,
        child: &Child,
        scope: ChildScope,
    ) -> Result<Option<FiberId>> {
        Reconciler::patch(self, fiber, child, scope)
    }

    fn remove(&mut self, fiber: FiberId) {
        Reconciler::remove(self, fiber)
    }

    fn collect_host_nodes(&self, fiber: FiberId) -> Vec<HostId> {
        self.fibers.collect_host_nodes(fiber)
    }

    fn first_host_node(&self, fiber: FiberId) -> Option<HostId> {
        self.fibers.first_host_node(fiber)
    }

    fn relocate(&mut self, fiber: FiberId, scope: ChildScope) -> usize {
        let nodes = self.fibers.collect_host_nodes(fiber);
        for &node in &nodes {
            self.host.insert_before(scope.host_parent, node, scope.anchor);
        }
        if let Some(f) = self.fibers.get_mut(fiber) {
            f.effects |= FiberEffects::MOVED;
        }
        trace!(?fiber, nodes = nodes.len(), anchor = ?scope.anchor, "relocated");
        nodes.len()
    }

    fn key_of(&self, fiber: FiberId) -> Option<Key> {
        self.fibers.get(fiber)?.key.clone()
    }

    fn warn_duplicate_keys(&self) -> bool {
        self.warn_duplicate_keys
    }
}
