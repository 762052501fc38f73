//! Persistence - Component instances that survive document swaps.
//!
//! - [`Hangar`] - registry of persisted instances, quarantine, retention
//! - [`placeholder`] - the two-attribute markup contract
//! - [`Navigator`] - the swap protocol inside a [`ViewTransition`]
//!
//! # Example
//!
//! ```ignore
//! let mut hangar = Hangar::new();
//! hangar.register(player);
//!
//! let mut nav = Navigator::new();
//! let report = nav.navigate(&mut renderer, &mut hangar, body, next_page, &mut Immediate)?;
//! assert!(report.relocated.contains(&"player-1".to_string()));
//! ```

mod navigation;
pub mod placeholder;
mod registry;

pub use navigation::{Immediate, NavigationReport, Navigator, SwapHook, ViewTransition};
pub use placeholder::{Placeholder, find_placeholders, placeholder};
pub use registry::{
    Hangar, KeepForSwaps, KeepForever, PersistenceEntry, Relocation, RetentionPolicy, STORAGE_TAG,
};
