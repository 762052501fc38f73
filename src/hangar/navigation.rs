//! Navigation - The structural swap protocol.
//!
//! Fetching the replacement document is the caller's business; by the time
//! [`Navigator::navigate`] runs, the replacement is a virtual tree. What this
//! module guarantees is the order of the swap and that the whole swap happens
//! inside one synchronous [`ViewTransition`] callback, so an external
//! animation layer can snapshot the "before" and "after" states.
//!
//! # Swap order
//!
//! ```text
//! ViewTransition::run(|| {
//!     0. check replacement       declared placeholders decode and are registered
//!     1. collect candidates      live instances placed in the current document
//!     2. before_swap hooks
//!     3. detach candidates       storage elements lifted out of placeholders
//!     4. structural replace      Replace strategy, old document torn down
//!     5. relocate                storage elements dropped into new placeholders,
//!                                new ids hydrated, missing ids quarantined
//!     6. after_swap hooks
//! })
//! garbage collection            retention policy consulted
//! ```
//!
//! A replacement that fails the check leaves the current document and the
//! hangar untouched. A failure after the structural replace (for example a
//! placeholder rendered by a component naming an unregistered component)
//! quarantines every instance that was lifted out and not yet placed.

use tracing::info;

use crate::engine::{HostId, HostTree, MutationStats};
use crate::error::{RenderError, Result};
use crate::pipeline::Renderer;
use crate::primitives::Child;
use crate::strategy::DiffStrategy;

use super::registry::{Hangar, Relocation};

/// Hook run right before or right after the structural swap.
///
/// Receives the host tree and the document root.
pub type SwapHook = Box<dyn FnMut(&HostTree, HostId)>;

/// A visual transition wrapper.
///
/// Implementations must call `update` exactly once, synchronously, before
/// returning. Deferring it (e.g. to a later frame) breaks the snapshot
/// contract; returning without calling it fails the navigation.
pub trait ViewTransition {
    fn run(&mut self, update: &mut dyn FnMut());
}

/// No animation: runs the update immediately.
#[derive(Debug, Clone, Copy, Default)]
pub struct Immediate;

impl ViewTransition for Immediate {
    fn run(&mut self, update: &mut dyn FnMut()) {
        update();
    }
}

/// Outcome of one navigation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NavigationReport {
    pub relocated: Vec<String>,
    pub hydrated: Vec<String>,
    pub quarantined: Vec<String>,
    pub evicted: Vec<String>,
    /// Host mutations of the structural replace.
    pub stats: MutationStats,
}

/// Drives a [`Hangar`] through document swaps.
#[derive(Default)]
pub struct Navigator {
    before_swap: Vec<SwapHook>,
    after_swap: Vec<SwapHook>,
    navigations: u64,
}

impl Navigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_before_swap(&mut self, hook: impl FnMut(&HostTree, HostId) + 'static) {
        self.before_swap.push(Box::new(hook));
    }

    pub fn on_after_swap(&mut self, hook: impl FnMut(&HostTree, HostId) + 'static) {
        self.after_swap.push(Box::new(hook));
    }

    /// Completed navigations.
    pub fn navigations(&self) -> u64 {
        self.navigations
    }

    /// Replace the content of `document` with `replacement`, carrying live
    /// persisted instances across.
    pub fn navigate(
        &mut self,
        renderer: &mut Renderer,
        hangar: &mut Hangar,
        document: HostId,
        replacement: impl Into<Child>,
        transition: &mut dyn ViewTransition,
    ) -> Result<NavigationReport> {
        let replacement = replacement.into();
        let before_swap = &mut self.before_swap;
        let after_swap = &mut self.after_swap;

        let mut outcome: Option<Result<(MutationStats, Relocation)>> = None;
        {
            let mut update = || {
                outcome = Some(swap(
                    renderer,
                    hangar,
                    document,
                    &replacement,
                    before_swap,
                    after_swap,
                ));
            };
            transition.run(&mut update);
        }

        let (stats, relocation) = outcome.ok_or(RenderError::TransitionSkipped)??;
        let evicted = hangar.collect_garbage(renderer);
        self.navigations += 1;

        info!(
            ?document,
            relocated = relocation.relocated.len(),
            hydrated = relocation.hydrated.len(),
            quarantined = relocation.quarantined.len(),
            evicted = evicted.len(),
            "navigated"
        );

        Ok(NavigationReport {
            relocated: relocation.relocated,
            hydrated: relocation.hydrated,
            quarantined: relocation.quarantined,
            evicted,
            stats,
        })
    }
}

/// Steps 1 to 6, run inside the transition callback.
fn swap(
    renderer: &mut Renderer,
    hangar: &mut Hangar,
    document: HostId,
    replacement: &Child,
    before_swap: &mut [SwapHook],
    after_swap: &mut [SwapHook],
) -> Result<(MutationStats, Relocation)> {
    hangar.check(replacement)?;
    let candidates = hangar.collect_candidates(renderer.host(), document);

    for hook in before_swap.iter_mut() {
        hook(renderer.host(), document);
    }

    hangar.detach(renderer.host_mut(), &candidates);
    let stats = renderer.render_with(replacement.clone(), document, DiffStrategy::Replace)?;
    let relocation = hangar.relocate(renderer, document)?;

    for hook in after_swap.iter_mut() {
        hook(renderer.host(), document);
    }

    Ok((stats, relocation))
}
