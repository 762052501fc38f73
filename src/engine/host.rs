//! Host Tree - The rendered output the reconciler mutates.
//!
//! The runtime is headless, so the "display tree" is an arena of element and
//! text nodes. Node handles are generational: once a node is released its
//! [`HostId`] never resolves again, even if the slot is reused. That is what
//! makes a stored handle a *weak* reference - [`HostTree::contains`] is the
//! upgrade check.
//!
//! Every mutation bumps a [`MutationStats`] counter. The counters are the
//! observable cost of a render: how many nodes were inserted, moved or
//! detached, and how many attribute, style, text and listener writes happened.

use slotmap::{SlotMap, new_key_type};

use crate::types::{AttrValue, Event, EventHandler, Style};

new_key_type! {
    /// Handle to a node in the host tree.
    pub struct HostId;

    /// Handle to an attached event listener.
    pub struct ListenerToken;
}

// =============================================================================
// Nodes
// =============================================================================

/// Element payload.
#[derive(Debug, Clone, Default)]
pub struct ElementData {
    pub tag: String,
    attributes: Vec<(String, AttrValue)>,
    style: Style,
    listeners: Vec<ListenerToken>,
}

/// What a host node is.
#[derive(Debug, Clone)]
pub enum HostKind {
    Element(ElementData),
    Text(String),
}

/// One node in the host tree.
#[derive(Debug, Clone)]
pub struct HostNode {
    pub kind: HostKind,
    parent: Option<HostId>,
    children: Vec<HostId>,
}

impl HostNode {
    fn new(kind: HostKind) -> Self {
        Self {
            kind,
            parent: None,
            children: Vec::new(),
        }
    }

    pub fn parent(&self) -> Option<HostId> {
        self.parent
    }

    pub fn children(&self) -> &[HostId] {
        &self.children
    }
}

struct Listener {
    node: HostId,
    event: String,
    handler: EventHandler,
}

// =============================================================================
// Mutation Stats
// =============================================================================

/// Counters for every host-tree mutation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MutationStats {
    /// Fresh nodes attached to a parent.
    pub inserts: usize,
    /// Already-attached nodes relocated.
    pub moves: usize,
    /// Nodes detached from their parent.
    pub removals: usize,
    pub attribute_writes: usize,
    pub attribute_removals: usize,
    pub style_writes: usize,
    pub style_clears: usize,
    pub text_writes: usize,
    pub listeners_added: usize,
    pub listeners_removed: usize,
}

impl MutationStats {
    /// Field-wise difference against an earlier snapshot.
    pub fn since(&self, earlier: &MutationStats) -> MutationStats {
        MutationStats {
            inserts: self.inserts.saturating_sub(earlier.inserts),
            moves: self.moves.saturating_sub(earlier.moves),
            removals: self.removals.saturating_sub(earlier.removals),
            attribute_writes: self.attribute_writes.saturating_sub(earlier.attribute_writes),
            attribute_removals: self
                .attribute_removals
                .saturating_sub(earlier.attribute_removals),
            style_writes: self.style_writes.saturating_sub(earlier.style_writes),
            style_clears: self.style_clears.saturating_sub(earlier.style_clears),
            text_writes: self.text_writes.saturating_sub(earlier.text_writes),
            listeners_added: self.listeners_added.saturating_sub(earlier.listeners_added),
            listeners_removed: self
                .listeners_removed
                .saturating_sub(earlier.listeners_removed),
        }
    }

    /// Attribute, style and listener writes.
    pub fn property_mutations(&self) -> usize {
        self.attribute_writes
            + self.attribute_removals
            + self.style_writes
            + self.style_clears
            + self.listeners_added
            + self.listeners_removed
    }

    /// Inserts, moves and removals.
    pub fn structural_mutations(&self) -> usize {
        self.inserts + self.moves + self.removals
    }

    /// Everything.
    pub fn total(&self) -> usize {
        self.property_mutations() + self.structural_mutations() + self.text_writes
    }
}

// =============================================================================
// Host Tree
// =============================================================================

/// Arena of host nodes plus the listener table.
#[derive(Default)]
pub struct HostTree {
    nodes: SlotMap<HostId, HostNode>,
    listeners: SlotMap<ListenerToken, Listener>,
    stats: MutationStats,
}

impl HostTree {
    pub fn new() -> Self {
        Self::default()
    }

    // -------------------------------------------------------------------------
    // Creation and lookup
    // -------------------------------------------------------------------------

    /// Create a detached element.
    pub fn create_element(&mut self, tag: impl Into<String>) -> HostId {
        self.nodes.insert(HostNode::new(HostKind::Element(ElementData {
            tag: tag.into(),
            ..Default::default()
        })))
    }

    /// Create a detached text node.
    pub fn create_text(&mut self, content: impl Into<String>) -> HostId {
        self.nodes.insert(HostNode::new(HostKind::Text(content.into())))
    }

    /// Whether `id` still names a live node.
    pub fn contains(&self, id: HostId) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn node(&self, id: HostId) -> Option<&HostNode> {
        self.nodes.get(id)
    }

    /// Number of live nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn tag(&self, id: HostId) -> Option<&str> {
        match &self.nodes.get(id)?.kind {
            HostKind::Element(el) => Some(&el.tag),
            HostKind::Text(_) => None,
        }
    }

    pub fn text(&self, id: HostId) -> Option<&str> {
        match &self.nodes.get(id)?.kind {
            HostKind::Text(text) => Some(text),
            HostKind::Element(_) => None,
        }
    }

    pub fn parent(&self, id: HostId) -> Option<HostId> {
        self.nodes.get(id)?.parent
    }

    pub fn children(&self, id: HostId) -> &[HostId] {
        self.nodes.get(id).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    pub fn next_sibling(&self, id: HostId) -> Option<HostId> {
        let parent = self.parent(id)?;
        let siblings = self.children(parent);
        let pos = siblings.iter().position(|&c| c == id)?;
        siblings.get(pos + 1).copied()
    }

    /// Whether `ancestor` is `node` or one of its ancestors.
    pub fn is_ancestor(&self, ancestor: HostId, node: HostId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.parent(id);
        }
        false
    }

    /// `root` and all of its descendants, preorder.
    pub fn descendants(&self, root: HostId) -> Vec<HostId> {
        let mut out = Vec::new();
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            let Some(node) = self.nodes.get(id) else { continue };
            out.push(id);
            stack.extend(node.children.iter().rev().copied());
        }
        out
    }

    /// Elements under `root` (inclusive) carrying attribute `name`, preorder.
    pub fn find_by_attribute(&self, root: HostId, name: &str) -> Vec<HostId> {
        self.descendants(root)
            .into_iter()
            .filter(|&id| self.attribute(id, name).is_some())
            .collect()
    }

    // -------------------------------------------------------------------------
    // Structure
    // -------------------------------------------------------------------------

    /// Insert `node` into `parent` before `anchor` (append when `None` or when
    /// the anchor is not a child of `parent`).
    ///
    /// A node that is already attached somewhere is moved, not duplicated.
    pub fn insert_before(&mut self, parent: HostId, node: HostId, anchor: Option<HostId>) {
        if parent == node || anchor == Some(node) {
            return;
        }
        if !self.contains(parent) || !self.contains(node) {
            return;
        }

        let was_attached = self.unlink(node);

        let Some(parent_node) = self.nodes.get_mut(parent) else { return };
        let position = anchor
            .and_then(|a| parent_node.children.iter().position(|&c| c == a))
            .unwrap_or(parent_node.children.len());
        parent_node.children.insert(position, node);

        if let Some(n) = self.nodes.get_mut(node) {
            n.parent = Some(parent);
        }

        if was_attached {
            self.stats.moves += 1;
        } else {
            self.stats.inserts += 1;
        }
    }

    /// Append `node` as the last child of `parent`.
    pub fn append_child(&mut self, parent: HostId, node: HostId) {
        self.insert_before(parent, node, None);
    }

    /// Detach `node` from its parent. Detaching a detached node is a no-op.
    pub fn detach(&mut self, node: HostId) -> bool {
        let detached = self.unlink(node);
        if detached {
            self.stats.removals += 1;
        }
        detached
    }

    /// Remove `node` from its parent's child list without counting it.
    fn unlink(&mut self, node: HostId) -> bool {
        let Some(parent) = self.parent(node) else { return false };
        if let Some(p) = self.nodes.get_mut(parent) {
            p.children.retain(|&c| c != node);
        }
        if let Some(n) = self.nodes.get_mut(node) {
            n.parent = None;
        }
        true
    }

    /// Free `node` and every listener attached to it.
    ///
    /// Children that are not released themselves become detached orphans; they
    /// stay alive so an owner elsewhere can still adopt them.
    pub fn release(&mut self, node: HostId) {
        if !self.contains(node) {
            return;
        }
        self.detach(node);

        let tokens: Vec<ListenerToken> = match self.nodes.get(node).map(|n| &n.kind) {
            Some(HostKind::Element(el)) => el.listeners.clone(),
            _ => Vec::new(),
        };
        for token in tokens {
            self.remove_listener(token);
        }

        if let Some(removed) = self.nodes.remove(node) {
            for child in removed.children {
                if let Some(c) = self.nodes.get_mut(child) {
                    c.parent = None;
                }
            }
        }
    }

    /// Free `root` and all of its descendants.
    pub fn release_subtree(&mut self, root: HostId) {
        for id in self.descendants(root).into_iter().rev() {
            self.release(id);
        }
    }

    // -------------------------------------------------------------------------
    // Properties
    // -------------------------------------------------------------------------

    fn element_mut(&mut self, id: HostId) -> Option<&mut ElementData> {
        match &mut self.nodes.get_mut(id)?.kind {
            HostKind::Element(el) => Some(el),
            HostKind::Text(_) => None,
        }
    }

    fn element(&self, id: HostId) -> Option<&ElementData> {
        match &self.nodes.get(id)?.kind {
            HostKind::Element(el) => Some(el),
            HostKind::Text(_) => None,
        }
    }

    /// Write an attribute. An existing attribute keeps its position.
    pub fn set_attribute(&mut self, id: HostId, name: &str, value: AttrValue) {
        let Some(el) = self.element_mut(id) else { return };
        match el.attributes.iter_mut().find(|(n, _)| n == name) {
            Some(slot) => slot.1 = value,
            None => el.attributes.push((name.to_string(), value)),
        }
        self.stats.attribute_writes += 1;
    }

    /// Remove an attribute. Returns whether it was present.
    pub fn remove_attribute(&mut self, id: HostId, name: &str) -> bool {
        let Some(el) = self.element_mut(id) else { return false };
        let before = el.attributes.len();
        el.attributes.retain(|(n, _)| n != name);
        let removed = el.attributes.len() != before;
        if removed {
            self.stats.attribute_removals += 1;
        }
        removed
    }

    pub fn attribute(&self, id: HostId, name: &str) -> Option<&AttrValue> {
        self.element(id)?
            .attributes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    pub fn attributes(&self, id: HostId) -> &[(String, AttrValue)] {
        self.element(id).map(|el| el.attributes.as_slice()).unwrap_or(&[])
    }

    /// Replace the whole style.
    pub fn set_style(&mut self, id: HostId, style: Style) {
        let Some(el) = self.element_mut(id) else { return };
        el.style = style;
        self.stats.style_writes += 1;
    }

    pub fn clear_style(&mut self, id: HostId) {
        let Some(el) = self.element_mut(id) else { return };
        el.style = Style::new();
        self.stats.style_clears += 1;
    }

    pub fn style(&self, id: HostId) -> Option<&Style> {
        self.element(id).map(|el| &el.style)
    }

    /// Rewrite a text node's content.
    pub fn set_text(&mut self, id: HostId, content: impl Into<String>) {
        let Some(node) = self.nodes.get_mut(id) else { return };
        if let HostKind::Text(text) = &mut node.kind {
            *text = content.into();
            self.stats.text_writes += 1;
        }
    }

    // -------------------------------------------------------------------------
    // Listeners
    // -------------------------------------------------------------------------

    /// Attach `handler` for `event`. Returns `None` for text or dead nodes.
    pub fn add_listener(
        &mut self,
        id: HostId,
        event: &str,
        handler: EventHandler,
    ) -> Option<ListenerToken> {
        self.element(id)?;
        let token = self.listeners.insert(Listener {
            node: id,
            event: event.to_string(),
            handler,
        });
        if let Some(el) = self.element_mut(id) {
            el.listeners.push(token);
        }
        self.stats.listeners_added += 1;
        Some(token)
    }

    /// Release a listener token. Stale tokens are ignored.
    pub fn remove_listener(&mut self, token: ListenerToken) -> bool {
        let Some(listener) = self.listeners.remove(token) else { return false };
        if let Some(el) = self.element_mut(listener.node) {
            el.listeners.retain(|&t| t != token);
        }
        self.stats.listeners_removed += 1;
        true
    }

    /// Tokens attached to `id`.
    pub fn listeners(&self, id: HostId) -> &[ListenerToken] {
        self.element(id).map(|el| el.listeners.as_slice()).unwrap_or(&[])
    }

    /// Total live listeners in the tree.
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Invoke every handler on `id` listening for `event.name`.
    ///
    /// Returns how many handlers ran.
    pub fn dispatch(&self, id: HostId, event: &Event) -> usize {
        let handlers: Vec<EventHandler> = self
            .listeners(id)
            .iter()
            .filter_map(|&t| self.listeners.get(t))
            .filter(|l| l.event == event.name)
            .map(|l| l.handler.clone())
            .collect();
        for handler in &handlers {
            handler.call(event);
        }
        handlers.len()
    }

    // -------------------------------------------------------------------------
    // Stats
    // -------------------------------------------------------------------------

    pub fn stats(&self) -> MutationStats {
        self.stats
    }

    pub fn reset_stats(&mut self) {
        self.stats = MutationStats::default();
    }
}
