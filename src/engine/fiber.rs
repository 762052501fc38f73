//! Fibers - The reconciler's private shadow tree.
//!
//! Each [`Fiber`] wraps one mounted child: it remembers the virtual node that
//! produced it, owns at most one host node, owns its child fibers and the
//! listener tokens registered for its `on*` properties.
//!
//! # Ownership
//!
//! Fibers live in a [`FiberArena`]. A fiber's `children` list is the only
//! owning edge: removing a fiber removes its subtree. The `parent` field is a
//! plain back-pointer used for root finding, never for ownership, so there is
//! no reference cycle to break.
//!
//! ```text
//! Component(App)        host: None   (anchor -> first descendant host node)
//! └── Host(ul)          host: Some(ul)
//!     ├── Host(li) k=a  host: Some(li)
//!     └── Group         host: None   (children flattened into ul)
//!         └── Text      host: Some(#text)
//! ```

use std::collections::HashMap;
use std::rc::Rc;

use bitflags::bitflags;
use slotmap::{SlotMap, new_key_type};

use crate::primitives::{Tag, VNode};
use crate::state::HookSlot;
use crate::types::Key;

use super::host::{HostId, ListenerToken};

new_key_type! {
    /// Handle to a fiber in a [`FiberArena`].
    pub struct FiberId;
}

bitflags! {
    /// What happened to a fiber during the last reconciliation pass.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct FiberEffects: u8 {
        /// Mounted during the pass.
        const PLACED = 1 << 0;
        /// Host properties or listeners written.
        const PROPS = 1 << 1;
        /// Text content rewritten.
        const TEXT = 1 << 2;
        /// Host nodes relocated by the keyed diff.
        const MOVED = 1 << 3;
        /// Component function executed.
        const RENDERED = 1 << 4;
    }
}

/// Kind of node a fiber stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FiberKind {
    Text,
    Host,
    Component,
    Group,
}

impl FiberKind {
    pub fn of(tag: &Tag) -> Self {
        match tag {
            Tag::Host(_) => FiberKind::Host,
            Tag::Component(_) => FiberKind::Component,
            Tag::Group => FiberKind::Group,
        }
    }
}

/// One mounted child.
pub struct Fiber {
    pub(crate) kind: FiberKind,
    pub(crate) vnode: Option<Rc<VNode>>,
    pub(crate) host: Option<HostId>,
    pub(crate) anchor: Option<HostId>,
    pub(crate) parent: Option<FiberId>,
    pub(crate) children: Vec<FiberId>,
    pub(crate) listeners: HashMap<String, ListenerToken>,
    pub(crate) key: Option<Key>,
    pub(crate) hooks: Vec<HookSlot>,
    pub(crate) effects: FiberEffects,
}

impl Fiber {
    pub(crate) fn text(host: HostId, parent: Option<FiberId>) -> Self {
        Self {
            kind: FiberKind::Text,
            vnode: None,
            host: Some(host),
            anchor: None,
            parent,
            children: Vec::new(),
            listeners: HashMap::new(),
            key: None,
            hooks: Vec::new(),
            effects: FiberEffects::PLACED,
        }
    }

    pub(crate) fn node(vnode: Rc<VNode>, host: Option<HostId>, parent: Option<FiberId>) -> Self {
        Self {
            kind: FiberKind::of(vnode.tag()),
            key: vnode.key_ref().cloned(),
            vnode: Some(vnode),
            host,
            anchor: None,
            parent,
            children: Vec::new(),
            listeners: HashMap::new(),
            hooks: Vec::new(),
            effects: FiberEffects::PLACED,
        }
    }

    pub fn kind(&self) -> FiberKind {
        self.kind
    }

    /// The virtual node this fiber was last reconciled against.
    pub fn vnode(&self) -> Option<&Rc<VNode>> {
        self.vnode.as_ref()
    }

    /// The host node this fiber owns directly (text and host elements only).
    pub fn host(&self) -> Option<HostId> {
        self.host
    }

    /// For components: the first descendant host node, used as an insertion
    /// anchor.
    pub fn anchor(&self) -> Option<HostId> {
        self.anchor
    }

    pub fn parent(&self) -> Option<FiberId> {
        self.parent
    }

    pub fn children(&self) -> &[FiberId] {
        &self.children
    }

    pub fn key(&self) -> Option<&Key> {
        self.key.as_ref()
    }

    /// Registered listener tokens by property name.
    pub fn listeners(&self) -> &HashMap<String, ListenerToken> {
        &self.listeners
    }

    pub fn effects(&self) -> FiberEffects {
        self.effects
    }

    /// Number of state slots a component has claimed.
    pub fn hook_count(&self) -> usize {
        self.hooks.len()
    }
}

// =============================================================================
// Fiber Arena
// =============================================================================

/// Storage for every live fiber.
#[derive(Default)]
pub struct FiberArena {
    fibers: SlotMap<FiberId, Fiber>,
}

impl FiberArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert(&mut self, fiber: Fiber) -> FiberId {
        self.fibers.insert(fiber)
    }

    pub(crate) fn remove(&mut self, id: FiberId) -> Option<Fiber> {
        self.fibers.remove(id)
    }

    pub fn get(&self, id: FiberId) -> Option<&Fiber> {
        self.fibers.get(id)
    }

    pub(crate) fn get_mut(&mut self, id: FiberId) -> Option<&mut Fiber> {
        self.fibers.get_mut(id)
    }

    pub fn contains(&self, id: FiberId) -> bool {
        self.fibers.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.fibers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fibers.is_empty()
    }

    /// Walk parent pointers to the top-level fiber.
    pub fn root_of(&self, id: FiberId) -> Option<FiberId> {
        let mut current = self.get(id)?;
        let mut top = id;
        while let Some(parent) = current.parent {
            let Some(next) = self.get(parent) else { break };
            top = parent;
            current = next;
        }
        Some(top)
    }

    /// Host nodes at the top of `id`'s subtree, in document order.
    ///
    /// A fiber with its own host node contributes that node (its descendants
    /// live inside it); group and component fibers contribute their children's
    /// nodes.
    pub fn collect_host_nodes(&self, id: FiberId) -> Vec<HostId> {
        let mut out = Vec::new();
        self.collect_into(id, &mut out);
        out
    }

    fn collect_into(&self, id: FiberId, out: &mut Vec<HostId>) {
        let Some(fiber) = self.get(id) else { return };
        if let Some(host) = fiber.host {
            out.push(host);
            return;
        }
        for &child in &fiber.children {
            self.collect_into(child, out);
        }
    }

    /// First host node in `id`'s subtree.
    pub fn first_host_node(&self, id: FiberId) -> Option<HostId> {
        let fiber = self.get(id)?;
        if fiber.host.is_some() {
            return fiber.host;
        }
        fiber.children.iter().find_map(|&c| self.first_host_node(c))
    }

    /// Last host node in `id`'s subtree.
    pub fn last_host_node(&self, id: FiberId) -> Option<HostId> {
        let fiber = self.get(id)?;
        if fiber.host.is_some() {
            return fiber.host;
        }
        fiber.children.iter().rev().find_map(|&c| self.last_host_node(c))
    }

    /// Every fiber in `id`'s subtree, preorder.
    pub fn subtree(&self, id: FiberId) -> Vec<FiberId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let Some(fiber) = self.get(current) else { continue };
            out.push(current);
            stack.extend(fiber.children.iter().rev().copied());
        }
        out
    }
}
