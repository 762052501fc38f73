//! Component state.
//!
//! - [`use_state`] - Signal-backed state slots stored on component fibers

mod hooks;

pub use hooks::{HookSlot, State, use_state};
pub(crate) use hooks::with_hooks;
