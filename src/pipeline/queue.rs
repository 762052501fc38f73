//! Deferred re-render queue.
//!
//! State changes never re-render synchronously. They enqueue their render
//! target here and the owner of the [`Renderer`](super::Renderer) drains the
//! queue with `flush()`, the moral equivalent of a microtask checkpoint.
//!
//! The queue collapses by target: a target is pending at most once, an
//! explicitly scheduled tree replaces an older one (last write wins), and a
//! direct `render` call for the target cancels whatever was pending.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::engine::HostId;
use crate::primitives::Child;

/// Shared handle to a renderer's queue.
pub type QueueHandle = Rc<RefCell<RenderQueue>>;

/// Pending re-renders keyed by render target.
#[derive(Default)]
pub struct RenderQueue {
    order: Vec<HostId>,
    pending: HashMap<HostId, Option<Child>>,
}

impl RenderQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Re-render `target` with its last tree.
    ///
    /// Keeps an explicitly scheduled tree if one is already pending.
    pub fn schedule(&mut self, target: HostId) {
        if self.pending.contains_key(&target) {
            return;
        }
        self.order.push(target);
        self.pending.insert(target, None);
    }

    /// Re-render `target` with `tree`, replacing any pending tree.
    pub fn schedule_tree(&mut self, target: HostId, tree: Child) {
        if !self.pending.contains_key(&target) {
            self.order.push(target);
        }
        self.pending.insert(target, Some(tree));
    }

    /// Drop the pending entry for `target`. Returns whether one existed.
    pub fn cancel(&mut self, target: HostId) -> bool {
        if self.pending.remove(&target).is_none() {
            return false;
        }
        self.order.retain(|&t| t != target);
        true
    }

    pub fn is_pending(&self, target: HostId) -> bool {
        self.pending.contains_key(&target)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Take every pending entry in first-scheduled order.
    pub fn drain(&mut self) -> Vec<(HostId, Option<Child>)> {
        let order = std::mem::take(&mut self.order);
        order
            .into_iter()
            .filter_map(|target| self.pending.remove(&target).map(|tree| (target, tree)))
            .collect()
    }
}

/// A queue handle bound to one render target.
///
/// Handed to component state so a change can enqueue its own root.
#[derive(Clone)]
pub struct Scheduler {
    queue: QueueHandle,
    target: HostId,
}

impl Scheduler {
    pub(crate) fn new(queue: QueueHandle, target: HostId) -> Self {
        Self { queue, target }
    }

    pub fn target(&self) -> HostId {
        self.target
    }

    /// Enqueue a re-render of the bound target.
    pub fn schedule(&self) {
        self.queue.borrow_mut().schedule(self.target);
    }
}
