//! Error type for rendering, persistence and navigation.
//!
//! Every failure the runtime can report is a [`RenderError`]. Each variant
//! maps to a stable code (see [`RenderError::code`]) for programmatic matching
//! in tests and in callers that forward errors across a boundary.

use thiserror::Error;

use crate::engine::HostId;

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, RenderError>;

/// Errors raised by the reconciler, the hangar and the navigator.
#[derive(Debug, Error)]
pub enum RenderError {
    /// A component render function reported a failure.
    ///
    /// The reconciler never swallows this: it rolls back the fiber it was
    /// building and hands the error to the caller of `render`.
    #[error("component `{component}` failed to render: {message}")]
    Component { component: String, message: String },

    /// The render target is not a live node in the host tree.
    #[error("render target {0:?} is not a live host node")]
    UnknownTarget(HostId),

    /// A placeholder named a component the hangar has no registration for.
    #[error("persisted component `{0}` is not registered with the hangar")]
    UnknownComponent(String),

    /// A placeholder's serialized property payload could not be decoded.
    #[error("invalid placeholder payload for `{id}`: {source}")]
    Payload {
        id: String,
        #[source]
        source: serde_json::Error,
    },

    /// A view transition returned without running the swap callback.
    #[error("view transition finished without running the document swap")]
    TransitionSkipped,

    /// Runtime configuration could not be parsed.
    #[error("invalid runtime configuration: {0}")]
    Config(#[from] serde_json::Error),
}

impl RenderError {
    /// Shorthand for [`RenderError::Component`].
    pub fn component(component: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Component {
            component: component.into(),
            message: message.into(),
        }
    }

    /// Stable error code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            RenderError::Component { .. } => "ERR_COMPONENT",
            RenderError::UnknownTarget(_) => "ERR_UNKNOWN_TARGET",
            RenderError::UnknownComponent(_) => "ERR_UNKNOWN_COMPONENT",
            RenderError::Payload { .. } => "ERR_PLACEHOLDER_PAYLOAD",
            RenderError::TransitionSkipped => "ERR_TRANSITION_SKIPPED",
            RenderError::Config(_) => "ERR_CONFIG",
        }
    }
}
