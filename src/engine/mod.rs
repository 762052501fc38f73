//! Engine - Host tree and fiber storage.
//!
//! The engine holds the two arenas the reconciler works on:
//! - [`HostTree`]: the rendered output (elements, text, listeners)
//! - [`FiberArena`]: the shadow tree mapping mounted virtual nodes to host nodes
//!
//! # Architecture
//!
//! Both trees are arenas of generational handles rather than pointer graphs:
//!
//! ```text
//! FiberArena                      HostTree
//! f0 Component(App)  host: -      h0 <div> (render target)
//! f1 Host(ul)        host: h1 ->  h1   <ul>
//! f2 Host(li)        host: h2 ->  h2     <li>
//! ```
//!
//! A released handle never resolves again, so stale references are detected
//! instead of silently aliasing a newer node.

mod fiber;
mod host;

pub use fiber::{Fiber, FiberArena, FiberEffects, FiberId, FiberKind};
pub use host::{ElementData, HostId, HostKind, HostNode, HostTree, ListenerToken, MutationStats};
