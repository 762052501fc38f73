//! Markup rules shared by both serializers.
//!
//! Both the virtual-tree serializer and the host-tree serializer go through
//! [`Markup`], so escaping, boolean attributes and void elements can never
//! drift apart between them.

use crate::types::{AttrValue, Style};

/// Elements that never have children or a closing tag.
pub const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

pub fn is_void(tag: &str) -> bool {
    VOID_ELEMENTS.contains(&tag)
}

/// Escape text content: `&`, `<`, `>`.
pub fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Escape an attribute value: text escapes plus `"`.
pub fn escape_attr(value: &str) -> String {
    escape_text(value).replace('"', "&quot;")
}

/// Output buffer for one serialization.
#[derive(Debug, Default)]
pub struct Markup {
    buf: String,
}

impl Markup {
    pub fn new() -> Self {
        Self::default()
    }

    /// `<tag` - attributes follow, then [`Markup::close_open_tag`].
    pub fn open_tag(&mut self, tag: &str) {
        self.buf.push('<');
        self.buf.push_str(tag);
    }

    pub fn attribute(&mut self, name: &str, value: &AttrValue) {
        self.buf.push(' ');
        self.buf.push_str(name);
        if let AttrValue::Text(text) = value {
            self.buf.push_str("=\"");
            self.buf.push_str(&escape_attr(text));
            self.buf.push('"');
        }
    }

    /// `style="..."`, skipped when empty.
    pub fn style(&mut self, style: &Style) {
        if !style.is_empty() {
            self.attribute("style", &AttrValue::Text(style.to_css()));
        }
    }

    pub fn close_open_tag(&mut self) {
        self.buf.push('>');
    }

    pub fn end_tag(&mut self, tag: &str) {
        self.buf.push_str("</");
        self.buf.push_str(tag);
        self.buf.push('>');
    }

    pub fn text(&mut self, text: &str) {
        self.buf.push_str(&escape_text(text));
    }

    pub fn finish(self) -> String {
        self.buf
    }
}
