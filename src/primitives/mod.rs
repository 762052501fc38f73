//! Virtual-node primitives - What components return.
//!
//! This module provides the immutable description layer:
//! - [`VNode`] - One node: a [`Tag`], a [`Props`](crate::types::Props) map
//!   (children travel inside it), an optional [`Key`](crate::types::Key)
//! - [`Child`] - Anything that can sit in a child slot (null, bool, text,
//!   number, node)
//! - [`Component`] - A named render function, compared by reference
//!
//! # Tags
//!
//! ```text
//! Host("li")          -> one host element, props become attributes/listeners
//! Component(Counter)  -> no host node, renders to zero or one child
//! Group               -> no host node, children flattened into the parent
//! ```

mod component;
mod vnode;

pub use component::{Component, RenderFn};
pub use vnode::{Child, Tag, VNode};
