//! Markup Renderers
//!
//! Two serializers with one set of rules:
//!
//! - [`render_to_string`] - virtual tree to markup (server side)
//! - [`host_to_string`] - mounted host subtree to markup
//!
//! For the same tree both agree on every attribute except event handlers,
//! which only the mounted tree carries (and neither prints).

mod host;
mod markup;
mod server;

pub use host::{host_children_to_string, host_to_string};
pub use markup::{Markup, VOID_ELEMENTS, escape_attr, escape_text, is_void};
pub use server::render_to_string;
