//! Key-matched diff with minimal moves.
//!
//! 1. Index old fibers by key (first occurrence wins).
//! 2. Pair each keyed new child with the unconsumed old fiber of that key.
//! 3. Remove unpaired old fibers; patch paired ones where they stand.
//! 4. Walk the new list right to left with a running anchor: mount fresh
//!    children before it, and relocate paired fibers that are not on the
//!    longest increasing subsequence of their old positions.
//!
//! Fibers on the subsequence are already in the right relative order, so the
//! number of relocations is `paired - LIS`, the minimum for the reorder.
//!
//! Duplicate keys: the first old fiber with a key is the one that can be
//! paired; later old duplicates are removed. The first new child with a key
//! claims it; later new duplicates are mounted fresh.
//!
//! Unkeyed children in a keyed list are always mounted fresh. A list with no
//! keys on either side has nothing to match by and is paired by position
//! instead.

use std::collections::{HashMap, HashSet};

use tracing::warn;

use crate::engine::FiberId;
use crate::error::Result;
use crate::primitives::Child;
use crate::types::Key;

use super::lis::longest_increasing_subsequence;
use super::{
    ChildDiff, ChildScope, ReconcilerContext, Sequential, any_keyed, first_host_among, unwind,
};

/// Pairs old and new by key.
#[derive(Debug, Clone, Copy, Default)]
pub struct Keyed;

impl ChildDiff for Keyed {
    fn name(&self) -> &'static str {
        "keyed"
    }

    fn diff(
        &self,
        ctx: &mut dyn ReconcilerContext,
        scope: ChildScope,
        old: Vec<FiberId>,
        new: &[Child],
    ) -> Result<Vec<FiberId>> {
        if !any_keyed(ctx, &old, new) {
            return Sequential.diff(ctx, scope, old, new);
        }
        let warn_duplicates = ctx.warn_duplicate_keys();

        // 1. Old keys, first occurrence wins.
        let mut old_by_key: HashMap<Key, usize> = HashMap::new();
        for (i, &fiber) in old.iter().enumerate() {
            let Some(key) = ctx.key_of(fiber) else { continue };
            if old_by_key.contains_key(&key) {
                if warn_duplicates {
                    warn!(key = %key, "duplicate key among previous siblings");
                }
                continue;
            }
            old_by_key.insert(key, i);
        }

        // 2. Pair new children with old fibers.
        let mut source: Vec<Option<usize>> = vec![None; new.len()];
        let mut target_of_old: Vec<Option<usize>> = vec![None; old.len()];
        let mut seen: HashSet<&Key> = HashSet::new();
        for (j, child) in new.iter().enumerate() {
            let Some(key) = child.key() else { continue };
            if !seen.insert(key) {
                if warn_duplicates {
                    warn!(key = %key, "duplicate key among siblings, mounting fresh");
                }
                continue;
            }
            if let Some(&i) = old_by_key.get(key) {
                source[j] = Some(i);
                target_of_old[i] = Some(j);
            }
        }

        // 3. Remove the unpaired, patch the paired in their current place.
        for (i, &fiber) in old.iter().enumerate() {
            if target_of_old[i].is_none() {
                ctx.remove(fiber);
            }
        }

        let survivors: Vec<FiberId> = old
            .iter()
            .enumerate()
            .filter(|(i, _)| target_of_old[*i].is_some())
            .map(|(_, &f)| f)
            .collect();

        let mut slots: Vec<Option<FiberId>> = vec![None; new.len()];
        let mut pos = 0;
        for (i, &fiber) in old.iter().enumerate() {
            let Some(j) = target_of_old[i] else { continue };
            pos += 1;
            let anchor = first_host_among(ctx, &survivors[pos..]).or(scope.anchor);
            match ctx.patch(fiber, &new[j], scope.with_anchor(anchor)) {
                Ok(patched) => slots[j] = patched,
                Err(err) => {
                    let held = slots.iter().flatten().copied().chain(survivors.iter().copied());
                    let held: Vec<FiberId> = held.collect();
                    return unwind(ctx, held, err);
                }
            }
        }

        // 4. Place right to left.
        let paired: Vec<usize> = (0..new.len()).filter(|&j| source[j].is_some()).collect();
        let positions: Vec<usize> = paired.iter().filter_map(|&j| source[j]).collect();
        let mut stable = vec![false; new.len()];
        for idx in longest_increasing_subsequence(&positions) {
            stable[paired[idx]] = true;
        }

        let mut anchor = scope.anchor;
        for j in (0..new.len()).rev() {
            if source[j].is_none() {
                match ctx.mount(&new[j], scope.with_anchor(anchor)) {
                    Ok(fiber) => slots[j] = fiber,
                    Err(err) => {
                        let held: Vec<FiberId> = slots.iter().flatten().copied().collect();
                        return unwind(ctx, held, err);
                    }
                }
            } else if !stable[j] {
                if let Some(fiber) = slots[j] {
                    ctx.relocate(fiber, scope.with_anchor(anchor));
                }
            }

            if let Some(first) = slots[j].and_then(|f| ctx.first_host_node(f)) {
                anchor = Some(first);
            }
        }

        Ok(slots.into_iter().flatten().collect())
    }
}
