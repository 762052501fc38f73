//! Remove-everything, mount-everything diff.

use crate::engine::FiberId;
use crate::error::Result;
use crate::primitives::Child;

use super::{ChildDiff, ChildScope, ReconcilerContext, unwind};

/// No matching at all: every old fiber is removed, every new child mounted.
///
/// For callers that want a guaranteed-clean subtree, e.g. when the old nodes
/// carry uncontrolled state that must be destroyed.
#[derive(Debug, Clone, Copy, Default)]
pub struct Replace;

impl ChildDiff for Replace {
    fn name(&self) -> &'static str {
        "replace"
    }

    fn diff(
        &self,
        ctx: &mut dyn ReconcilerContext,
        scope: ChildScope,
        old: Vec<FiberId>,
        new: &[Child],
    ) -> Result<Vec<FiberId>> {
        for fiber in old {
            ctx.remove(fiber);
        }

        let mut out = Vec::with_capacity(new.len());
        for child in new {
            match ctx.mount(child, scope) {
                Ok(fiber) => out.extend(fiber),
                Err(err) => return unwind(ctx, out, err),
            }
        }
        Ok(out)
    }
}
