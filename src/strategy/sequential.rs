//! Index-aligned diff.

use crate::engine::FiberId;
use crate::error::Result;
use crate::primitives::Child;

use super::{ChildDiff, ChildScope, ReconcilerContext, first_host_among, unwind};

/// Pairs old and new by position.
///
/// O(n). A reordered item is seen as different content at its index and is
/// patched or replaced there, so the final content is right but reusable
/// host nodes may be rewritten.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sequential;

impl ChildDiff for Sequential {
    fn name(&self) -> &'static str {
        "sequential"
    }

    fn diff(
        &self,
        ctx: &mut dyn ReconcilerContext,
        scope: ChildScope,
        old: Vec<FiberId>,
        new: &[Child],
    ) -> Result<Vec<FiberId>> {
        let common = old.len().min(new.len());
        let mut out = Vec::with_capacity(new.len());

        for i in 0..common {
            let anchor = first_host_among(ctx, &old[i + 1..]).or(scope.anchor);
            match ctx.patch(old[i], &new[i], scope.with_anchor(anchor)) {
                Ok(fiber) => out.extend(fiber),
                Err(err) => return unwind(ctx, out.into_iter().chain(old[i..].iter().copied()), err),
            }
        }

        for &fiber in &old[common..] {
            ctx.remove(fiber);
        }

        for child in &new[common..] {
            match ctx.mount(child, scope) {
                Ok(fiber) => out.extend(fiber),
                Err(err) => return unwind(ctx, out, err),
            }
        }

        Ok(out)
    }
}
