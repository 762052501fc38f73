//! Reconciliation Pipeline
//!
//! This module turns virtual trees into host tree mutations.
//!
//! # Pipeline Architecture
//!
//! ```text
//! render(tree, target) → Reconciler → ChildDiff strategy → mount / patch / remove → HostTree
//!                            ↑                                    │
//!                      RenderQueue ←── use_state watcher ←── component render
//! ```
//!
//! ## Data Flow
//!
//! 1. **Renderer** - Resolves the strategy once, cancels pending re-renders of
//!    the target, diffs the new tree against the target's root fibers
//! 2. **Reconciler** - Mount, patch and remove; property patching; exposes
//!    them to strategies as a [`ReconcilerContext`](crate::strategy::ReconcilerContext)
//! 3. **RenderQueue** - Collects deferred re-renders, drained by
//!    [`Renderer::flush`]
//!
//! ## Key Design Principles
//!
//! - **Synchronous**: a render call runs to completion; nothing inside a diff
//!   waits or re-enters the renderer
//! - **Identity**: a patch with an unchanged tag keeps the host node
//! - **Accounting**: every host mutation is counted and returned per render

mod mount;
mod patch;
mod props;
mod queue;
mod reconciler;
mod remove;
mod render;

pub use queue::{QueueHandle, RenderQueue, Scheduler};
pub use reconciler::Reconciler;
pub use render::Renderer;
