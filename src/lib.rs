//! # spark-vdom
//!
//! Headless virtual-tree reconciliation for Rust.
//!
//! Built on [spark-signals](https://github.com/RLabs-Inc/spark-signals) for
//! component state.
//!
//! ## Architecture
//!
//! Application code builds an immutable [`VNode`] tree on every render and
//! hands it to a [`Renderer`]. The renderer keeps a private fiber tree per
//! render target and diffs the new tree against it, mutating an in-memory
//! [`HostTree`] as little as it can:
//!
//! ```text
//! VNode tree → Renderer → ChildDiff strategy → mount / patch / remove → HostTree
//! ```
//!
//! Alongside the reconciler, the [`hangar`] keeps live component instances
//! alive across full document swaps: a [`Navigator`] lifts them out of the old
//! document and drops them into the new one instead of re-creating them.
//!
//! ## Modules
//!
//! - [`types`] - Keys, property values, styles, event handlers
//! - [`primitives`] - Virtual nodes and components
//! - [`engine`] - Host tree and fiber arena
//! - [`pipeline`] - Reconciler, renderer, deferred re-render queue
//! - [`strategy`] - Diff strategies (sequential, keyed, replace, auto)
//! - [`state`] - Component state
//! - [`renderer`] - Markup serializers
//! - [`hangar`] - Instance persistence and navigation
//! - [`config`] - Runtime configuration
//! - [`logging`] - Subscriber setup
//!
//! ## Example
//!
//! ```
//! use spark_vdom::{Renderer, VNode, host_children_to_string};
//!
//! let mut renderer = Renderer::new();
//! let target = renderer.host_mut().create_element("main");
//!
//! fn list(items: &[&str]) -> VNode {
//!     VNode::element("ul").children(items.iter().map(|i| VNode::element("li").key(*i).child(*i)))
//! }
//!
//! renderer.render(list(&["a", "b", "c"]), target).unwrap();
//! // Auto: the keyed `li` list is diffed by key, one move.
//! let stats = renderer.render(list(&["c", "a", "b"]), target).unwrap();
//!
//! assert_eq!(stats.moves, 1);
//! assert_eq!(
//!     host_children_to_string(renderer.host(), target),
//!     "<ul><li>c</li><li>a</li><li>b</li></ul>"
//! );
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod hangar;
pub mod logging;
pub mod pipeline;
pub mod primitives;
pub mod renderer;
pub mod state;
pub mod strategy;
pub mod types;

// Re-export commonly used items
pub use types::*;

pub use config::{RuntimeConfig, default_strategy, set_default_strategy};

pub use engine::{FiberArena, FiberEffects, FiberId, FiberKind, HostId, HostTree, MutationStats};

pub use error::{RenderError, Result};

pub use hangar::{
    Hangar, Immediate, KeepForSwaps, KeepForever, NavigationReport, Navigator, PersistenceEntry,
    RetentionPolicy, ViewTransition,
};

pub use pipeline::{Reconciler, RenderQueue, Renderer};

pub use primitives::{Child, Component, Tag, VNode};

pub use renderer::{host_children_to_string, host_to_string, render_to_string};

pub use state::{State, use_state};

pub use strategy::{ChildDiff, ChildScope, DiffStrategy, ReconcilerContext};
