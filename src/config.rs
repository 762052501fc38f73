//! Runtime configuration.
//!
//! [`RuntimeConfig`] is plain data a host application can load from JSON. The
//! process-wide default diff strategy lives in a signal so it can be changed
//! at runtime and read reactively, the same way render-wide settings are
//! held elsewhere in the crate.
//!
//! Strategy resolution for a render call, first match wins:
//!
//! 1. the strategy passed to `render_with`
//! 2. `RuntimeConfig::default_strategy` of the renderer
//! 3. [`default_strategy()`]

use std::cell::RefCell;

use serde::{Deserialize, Serialize};
use spark_signals::{Signal, signal};

use crate::error::Result;
use crate::strategy::DiffStrategy;

// =============================================================================
// Runtime Config
// =============================================================================

/// Knobs for a [`Renderer`](crate::pipeline::Renderer) and a
/// [`Hangar`](crate::hangar::Hangar).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Strategy for `render` calls that don't name one. `None` defers to the
    /// process-wide default.
    pub default_strategy: Option<DiffStrategy>,
    /// How many swaps a quarantined persistence entry survives. `None` keeps
    /// entries forever.
    pub quarantine_swaps: Option<u64>,
    /// Log a warning when siblings share a key.
    pub warn_duplicate_keys: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            default_strategy: None,
            quarantine_swaps: None,
            warn_duplicate_keys: true,
        }
    }
}

impl RuntimeConfig {
    /// Parse from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// The strategy a render call without an explicit one uses.
    pub fn resolve_strategy(&self) -> DiffStrategy {
        self.default_strategy.unwrap_or_else(default_strategy)
    }
}

// =============================================================================
// Process-wide Default
// =============================================================================

thread_local! {
    static DEFAULT_STRATEGY: RefCell<Signal<DiffStrategy>> = RefCell::new(signal(DiffStrategy::Auto));
}

/// The process-wide default diff strategy.
pub fn default_strategy() -> DiffStrategy {
    DEFAULT_STRATEGY.with(|s| s.borrow().get())
}

/// Set the process-wide default diff strategy.
pub fn set_default_strategy(strategy: DiffStrategy) {
    DEFAULT_STRATEGY.with(|s| s.borrow().set(strategy));
}

/// The default strategy signal, for reactive tracking.
pub fn default_strategy_signal() -> Signal<DiffStrategy> {
    DEFAULT_STRATEGY.with(|s| s.borrow().clone())
}
