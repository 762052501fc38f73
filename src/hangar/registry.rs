//! Hangar - Live component instances that outlive their placeholders.
//!
//! Each persisted instance is a component rendered into a storage element the
//! hangar owns. A placeholder in the document only ever *hosts* the storage
//! element; when the document is structurally replaced, the storage element
//! is lifted out first and dropped into the matching placeholder of the new
//! document. The component's fibers, host nodes and state never notice.
//!
//! # Lifecycle
//!
//! ```text
//!            first placeholder seen
//!   (none) ─────────────────────────→ live ←──────────────┐
//!                                      │                  │ id reappears
//!                        id missing    ↓                  │
//!                     after a swap   quarantined ─────────┘
//!                                      │
//!                     policy says no   ↓
//!                                    evicted (unmounted, storage released)
//! ```
//!
//! The hangar is an explicit service handed to whoever drives navigation, not
//! ambient global state. Nothing inside a render pass can reach it.

use std::collections::{BTreeMap, HashSet};

use tracing::{debug, warn};

use crate::config::RuntimeConfig;
use crate::engine::{HostId, HostTree};
use crate::error::{RenderError, Result};
use crate::pipeline::Renderer;
use crate::primitives::{Child, Component, VNode};
use crate::types::Props;

use super::placeholder::{Placeholder, declared_placeholders, find_placeholders};

/// Tag of the storage elements the hangar creates.
pub const STORAGE_TAG: &str = "hangar-storage";

// =============================================================================
// Entries
// =============================================================================

/// One persisted component instance.
#[derive(Debug, Clone)]
pub struct PersistenceEntry {
    id: String,
    name: String,
    live_props: Props,
    storage: HostId,
    placement: Option<HostId>,
    quarantined_at: Option<u64>,
}

impl PersistenceEntry {
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Registered component name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Props the component was last rendered with.
    pub fn live_props(&self) -> &Props {
        &self.live_props
    }

    /// The storage element. Stable for the entry's whole life.
    pub fn storage(&self) -> HostId {
        self.storage
    }

    /// The placeholder currently hosting the storage element.
    ///
    /// Weak: a placeholder released by a structural swap no longer counts.
    pub fn placement(&self, tree: &HostTree) -> Option<HostId> {
        self.placement.filter(|&p| tree.contains(p))
    }

    /// Epoch at which the entry entered quarantine.
    pub fn quarantined_at(&self) -> Option<u64> {
        self.quarantined_at
    }

    pub fn is_quarantined(&self) -> bool {
        self.quarantined_at.is_some()
    }
}

// =============================================================================
// Retention Policy
// =============================================================================

/// Decides whether a quarantined entry survives garbage collection.
pub trait RetentionPolicy {
    /// `swaps` is how many swaps have completed since the entry was
    /// quarantined (0 during the swap that quarantined it).
    fn retain(&self, entry: &PersistenceEntry, swaps: u64) -> bool;
}

/// Never evict.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeepForever;

impl RetentionPolicy for KeepForever {
    fn retain(&self, _entry: &PersistenceEntry, _swaps: u64) -> bool {
        true
    }
}

/// Evict once an entry has stayed quarantined for `n` further swaps.
///
/// `KeepForSwaps(0)` evicts in the same navigation that quarantined the
/// entry; `KeepForSwaps(1)` tolerates one back/forward round trip.
#[derive(Debug, Clone, Copy)]
pub struct KeepForSwaps(pub u64);

impl RetentionPolicy for KeepForSwaps {
    fn retain(&self, _entry: &PersistenceEntry, swaps: u64) -> bool {
        swaps < self.0
    }
}

// =============================================================================
// Hangar
// =============================================================================

/// What [`Hangar::relocate`] did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Relocation {
    /// Existing entries dropped into a new placeholder.
    pub relocated: Vec<String>,
    /// Entries created for ids seen for the first time.
    pub hydrated: Vec<String>,
    /// Live entries whose id is missing from the document.
    pub quarantined: Vec<String>,
}

/// Registry of persisted component instances.
pub struct Hangar {
    live: BTreeMap<String, PersistenceEntry>,
    quarantine: BTreeMap<String, PersistenceEntry>,
    components: BTreeMap<String, Component>,
    policy: Box<dyn RetentionPolicy>,
    epoch: u64,
}

impl Default for Hangar {
    fn default() -> Self {
        Self::new()
    }
}

impl Hangar {
    /// A hangar that never evicts.
    pub fn new() -> Self {
        Self::with_policy(KeepForever)
    }

    pub fn with_policy(policy: impl RetentionPolicy + 'static) -> Self {
        Self {
            live: BTreeMap::new(),
            quarantine: BTreeMap::new(),
            components: BTreeMap::new(),
            policy: Box::new(policy),
            epoch: 0,
        }
    }

    /// Policy from `config.quarantine_swaps`.
    pub fn from_config(config: &RuntimeConfig) -> Self {
        match config.quarantine_swaps {
            Some(n) => Self::with_policy(KeepForSwaps(n)),
            None => Self::new(),
        }
    }

    /// Make `component` available to placeholders under its name.
    pub fn register(&mut self, component: Component) {
        self.components.insert(component.name().to_string(), component);
    }

    pub fn is_registered(&self, name: &str) -> bool {
        self.components.contains_key(name)
    }

    // -------------------------------------------------------------------------
    // Lookup
    // -------------------------------------------------------------------------

    /// Entry for `id`, live or quarantined.
    pub fn entry(&self, id: &str) -> Option<&PersistenceEntry> {
        self.live.get(id).or_else(|| self.quarantine.get(id))
    }

    pub fn is_live(&self, id: &str) -> bool {
        self.live.contains_key(id)
    }

    pub fn is_quarantined(&self, id: &str) -> bool {
        self.quarantine.contains_key(id)
    }

    pub fn live_ids(&self) -> impl Iterator<Item = &str> {
        self.live.keys().map(String::as_str)
    }

    pub fn quarantined_ids(&self) -> impl Iterator<Item = &str> {
        self.quarantine.keys().map(String::as_str)
    }

    /// Live plus quarantined entries.
    pub fn len(&self) -> usize {
        self.live.len() + self.quarantine.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of completed [`Hangar::relocate`] passes.
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    // -------------------------------------------------------------------------
    // Swap protocol
    // -------------------------------------------------------------------------

    /// Ids under `root` that have a live entry: the instances a structural
    /// swap of `root` must carry over.
    pub fn collect_candidates(&self, tree: &HostTree, root: HostId) -> Vec<String> {
        tree.find_by_attribute(root, super::placeholder::ID_ATTR)
            .into_iter()
            .filter_map(|node| super::placeholder::placeholder_id(tree, node))
            .filter(|id| self.live.contains_key(*id))
            .map(str::to_string)
            .collect()
    }

    /// Lift the storage elements of `ids` out of their placeholders.
    pub fn detach(&mut self, tree: &mut HostTree, ids: &[String]) {
        for id in ids {
            if let Some(entry) = self.live.get_mut(id) {
                tree.detach(entry.storage);
                entry.placement = None;
            }
        }
    }

    /// Attach every placeholder under `root` to its instance and quarantine
    /// live instances that have no placeholder there any more.
    ///
    /// - known id (live or quarantined): the same storage element moves into
    ///   the placeholder; if the payload props changed the component is
    ///   re-rendered with them, keeping its state
    /// - new id: the component is rendered into a fresh storage element
    ///
    /// A repeated id in one document is attached to its first placeholder
    /// only.
    ///
    /// On error, entries already attached stay live and every live entry left
    /// without a placement is quarantined, so no instance is stranded
    /// detached but live.
    pub fn relocate(&mut self, renderer: &mut Renderer, root: HostId) -> Result<Relocation> {
        self.epoch += 1;
        match self.attach_all(renderer, root) {
            Ok(report) => Ok(report),
            Err(err) => {
                let stranded: Vec<String> = self
                    .live
                    .values()
                    .filter(|entry| entry.placement(renderer.host()).is_none())
                    .map(|entry| entry.id.clone())
                    .collect();
                for id in &stranded {
                    self.quarantine_entry(renderer, id);
                }
                warn!(code = err.code(), quarantined = stranded.len(), "relocation failed");
                Err(err)
            }
        }
    }

    /// Reject `replacement` before anything is detached: every placeholder it
    /// declares must decode and name a registered component.
    pub fn check(&self, replacement: &Child) -> Result<()> {
        for (_, component) in declared_placeholders(replacement)? {
            if !self.is_registered(&component) {
                return Err(RenderError::UnknownComponent(component));
            }
        }
        Ok(())
    }

    fn attach_all(&mut self, renderer: &mut Renderer, root: HostId) -> Result<Relocation> {
        let placeholders = find_placeholders(renderer.host(), root)?;

        let mut report = Relocation::default();
        let mut seen: HashSet<String> = HashSet::new();
        for placeholder in placeholders {
            if !seen.insert(placeholder.id.clone()) {
                warn!(id = %placeholder.id, "placeholder id appears more than once");
                continue;
            }
            if self.live.contains_key(&placeholder.id) || self.quarantine.contains_key(&placeholder.id) {
                self.reattach(renderer, &placeholder)?;
                report.relocated.push(placeholder.id);
            } else {
                self.hydrate(renderer, &placeholder)?;
                report.hydrated.push(placeholder.id);
            }
        }

        let missing: Vec<String> = self
            .live
            .keys()
            .filter(|id| !seen.contains(*id))
            .cloned()
            .collect();
        for id in missing {
            if self.quarantine_entry(renderer, &id) {
                report.quarantined.push(id);
            }
        }

        Ok(report)
    }

    fn quarantine_entry(&mut self, renderer: &mut Renderer, id: &str) -> bool {
        let Some(mut entry) = self.live.remove(id) else {
            return false;
        };
        renderer.host_mut().detach(entry.storage);
        entry.placement = None;
        entry.quarantined_at = Some(self.epoch);
        debug!(id = %id, epoch = self.epoch, "quarantined");
        self.quarantine.insert(id.to_string(), entry);
        true
    }

    fn reattach(&mut self, renderer: &mut Renderer, placeholder: &Placeholder) -> Result<()> {
        let entry = match self.quarantine.remove(&placeholder.id) {
            Some(mut entry) => {
                entry.quarantined_at = None;
                entry
            }
            None => match self.live.remove(&placeholder.id) {
                Some(entry) => entry,
                None => return Ok(()),
            },
        };
        let id = placeholder.id.clone();
        let entry = self.live.entry(id).or_insert(entry);

        renderer.host_mut().append_child(placeholder.node, entry.storage);
        entry.placement = Some(placeholder.node);

        if entry.live_props != placeholder.props || entry.name != placeholder.component {
            let component = self
                .components
                .get(&placeholder.component)
                .ok_or_else(|| RenderError::UnknownComponent(placeholder.component.clone()))?;
            renderer.render(VNode::component(component, placeholder.props.clone()), entry.storage)?;
            entry.live_props = placeholder.props.clone();
            entry.name = placeholder.component.clone();
        }
        Ok(())
    }

    fn hydrate(&mut self, renderer: &mut Renderer, placeholder: &Placeholder) -> Result<()> {
        let component = self
            .components
            .get(&placeholder.component)
            .ok_or_else(|| RenderError::UnknownComponent(placeholder.component.clone()))?;

        let storage = renderer.host_mut().create_element(STORAGE_TAG);
        if let Err(err) = renderer.render(VNode::component(component, placeholder.props.clone()), storage) {
            renderer.host_mut().release(storage);
            return Err(err);
        }
        renderer.host_mut().append_child(placeholder.node, storage);

        debug!(id = %placeholder.id, component = %placeholder.component, "hydrated");
        self.live.insert(
            placeholder.id.clone(),
            PersistenceEntry {
                id: placeholder.id.clone(),
                name: placeholder.component.clone(),
                live_props: placeholder.props.clone(),
                storage,
                placement: Some(placeholder.node),
                quarantined_at: None,
            },
        );
        Ok(())
    }

    /// Evict quarantined entries the policy no longer retains.
    ///
    /// Eviction unmounts the component and releases its storage element.
    /// Returns the evicted ids.
    pub fn collect_garbage(&mut self, renderer: &mut Renderer) -> Vec<String> {
        let epoch = self.epoch;
        let doomed: Vec<String> = self
            .quarantine
            .values()
            .filter(|entry| {
                let swaps = epoch.saturating_sub(entry.quarantined_at.unwrap_or(epoch));
                !self.policy.retain(entry, swaps)
            })
            .map(|entry| entry.id.clone())
            .collect();

        for id in &doomed {
            if let Some(entry) = self.quarantine.remove(id) {
                renderer.unmount(entry.storage);
                renderer.host_mut().release_subtree(entry.storage);
                debug!(id = %id, "evicted");
            }
        }
        doomed
    }
}
