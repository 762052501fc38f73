//! Diff strategies - How a list of old fibers becomes a list of new ones.
//!
//! A strategy decides *which* old fiber is paired with *which* new child and
//! where fresh and relocated host nodes go. It never touches the host tree or
//! the fiber arena itself: all tree surgery goes through the
//! [`ReconcilerContext`] it is handed, so every strategy shares one
//! implementation of mount, patch and remove.
//!
//! # Strategies
//!
//! | Strategy | Pairing | Moves |
//! |---|---|---|
//! | [`Sequential`] | by index | never |
//! | [`Keyed`] | by key | minimal (longest increasing subsequence) |
//! | [`Replace`] | none | n/a, everything is remounted |
//!
//! [`DiffStrategy::Auto`] picks `Keyed` when any old or new sibling carries a
//! key and `Sequential` otherwise. The choice is made per sibling list.
//!
//! A strategy chosen for a render applies to every child list in the pass,
//! not just the top one. `Keyed` therefore pairs a list with no keys on
//! either side by position: the text inside an `li`, a component's single
//! result and an unkeyed root keep their fibers and host nodes.
//!
//! # Example
//!
//! ```ignore
//! renderer.render_with(list, target, DiffStrategy::Keyed)?;
//! ```

mod keyed;
mod lis;
mod replace;
mod sequential;

use serde::{Deserialize, Serialize};

use crate::engine::{FiberId, HostId};
use crate::error::Result;
use crate::primitives::Child;
use crate::types::Key;

pub use keyed::Keyed;
pub use lis::longest_increasing_subsequence;
pub use replace::Replace;
pub use sequential::Sequential;

// =============================================================================
// Scope and Context
// =============================================================================

/// Where a sibling list lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChildScope {
    /// Fiber owning the list (`None` for a render root).
    pub parent: Option<FiberId>,
    /// Host node the list's host nodes are children of.
    pub host_parent: HostId,
    /// Host node right after the list's range; `None` appends.
    pub anchor: Option<HostId>,
}

impl ChildScope {
    /// Top-level list of a render target.
    pub fn root(target: HostId) -> Self {
        Self {
            parent: None,
            host_parent: target,
            anchor: None,
        }
    }

    /// Same list, different insertion point.
    pub fn with_anchor(self, anchor: Option<HostId>) -> Self {
        Self { anchor, ..self }
    }
}

/// Tree surgery available to a strategy.
pub trait ReconcilerContext {
    /// Mount `child` before `scope.anchor`. Empty children produce no fiber.
    fn mount(&mut self, child: &Child, scope: ChildScope) -> Result<Option<FiberId>>;

    /// Reconcile `fiber` against `child`. Returns the fiber now standing for
    /// `child`: the same one when patched in place, a fresh one when replaced,
    /// `None` when `child` is empty.
    ///
    /// `scope.anchor` must be the host node following `fiber`'s range; it is
    /// where new host nodes go when `fiber` owns none yet.
    fn patch(&mut self, fiber: FiberId, child: &Child, scope: ChildScope)
    -> Result<Option<FiberId>>;

    /// Tear down `fiber` and its subtree. Removing a dead fiber is a no-op.
    fn remove(&mut self, fiber: FiberId);

    /// Top-level host nodes of `fiber`'s subtree, in order.
    fn collect_host_nodes(&self, fiber: FiberId) -> Vec<HostId>;

    fn first_host_node(&self, fiber: FiberId) -> Option<HostId>;

    /// Move `fiber`'s host nodes before `scope.anchor`. Returns how many host
    /// nodes moved.
    fn relocate(&mut self, fiber: FiberId, scope: ChildScope) -> usize;

    fn key_of(&self, fiber: FiberId) -> Option<Key>;

    /// Whether duplicate sibling keys should be reported.
    fn warn_duplicate_keys(&self) -> bool {
        true
    }
}

/// A child-list diff algorithm.
pub trait ChildDiff {
    /// Name for logs.
    fn name(&self) -> &'static str;

    /// Turn `old` into fibers for `new`, returning the new fiber list in
    /// order.
    ///
    /// On error every fiber the strategy held (old or freshly mounted) has
    /// been removed, so the caller is left with an empty list rather than a
    /// half-built one.
    fn diff(
        &self,
        ctx: &mut dyn ReconcilerContext,
        scope: ChildScope,
        old: Vec<FiberId>,
        new: &[Child],
    ) -> Result<Vec<FiberId>>;
}

/// Remove everything in `held` and hand back `err`.
pub(crate) fn unwind<T>(
    ctx: &mut dyn ReconcilerContext,
    held: impl IntoIterator<Item = FiberId>,
    err: crate::error::RenderError,
) -> Result<T> {
    for fiber in held {
        ctx.remove(fiber);
    }
    Err(err)
}

/// Whether any sibling, old or new, carries a key.
pub(crate) fn any_keyed(ctx: &dyn ReconcilerContext, old: &[FiberId], new: &[Child]) -> bool {
    new.iter().any(|c| c.key().is_some()) || old.iter().any(|&f| ctx.key_of(f).is_some())
}

/// First host node among `fibers`, skipping fibers that render nothing.
pub(crate) fn first_host_among(ctx: &dyn ReconcilerContext, fibers: &[FiberId]) -> Option<HostId> {
    fibers.iter().find_map(|&f| ctx.first_host_node(f))
}

// =============================================================================
// Strategy Selection
// =============================================================================

/// Strategy selector passed to the render entry points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiffStrategy {
    /// Keyed when any sibling has a key, sequential otherwise.
    #[default]
    Auto,
    Sequential,
    Keyed,
    Replace,
}

impl DiffStrategy {
    /// Resolve to an implementation. Resolved once per render call.
    pub fn as_diff(self) -> &'static dyn ChildDiff {
        match self {
            DiffStrategy::Auto => &Auto,
            DiffStrategy::Sequential => &Sequential,
            DiffStrategy::Keyed => &Keyed,
            DiffStrategy::Replace => &Replace,
        }
    }
}

/// Dispatches per sibling list on the presence of keys.
#[derive(Debug, Clone, Copy, Default)]
pub struct Auto;

impl ChildDiff for Auto {
    fn name(&self) -> &'static str {
        "auto"
    }

    fn diff(
        &self,
        ctx: &mut dyn ReconcilerContext,
        scope: ChildScope,
        old: Vec<FiberId>,
        new: &[Child],
    ) -> Result<Vec<FiberId>> {
        if any_keyed(ctx, &old, new) {
            Keyed.diff(ctx, scope, old, new)
        } else {
            Sequential.diff(ctx, scope, old, new)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strategy_names() {
        assert_eq!(DiffStrategy::Auto.as_diff().name(), "auto");
        assert_eq!(DiffStrategy::Sequential.as_diff().name(), "sequential");
        assert_eq!(DiffStrategy::Keyed.as_diff().name(), "keyed");
        assert_eq!(DiffStrategy::Replace.as_diff().name(), "replace");
    }

    #[test]
    fn test_strategy_serde() {
        let parsed: DiffStrategy = serde_json::from_str("\"keyed\"").unwrap();
        assert_eq!(parsed, DiffStrategy::Keyed);
        assert_eq!(serde_json::to_string(&DiffStrategy::Replace).unwrap(), "\"replace\"");
        assert_eq!(DiffStrategy::default(), DiffStrategy::Auto);
    }
}
