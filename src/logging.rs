//! Logging initialization.
//!
//! The crate only emits `tracing` events; installing a subscriber is the
//! application's call. [`init`] is a convenience for applications and tests
//! that have no subscriber setup of their own.
//!
//! | Event | Level |
//! |---|---|
//! | render finished (mutation counts) | `debug` |
//! | keyed relocation, subtree removal | `trace` |
//! | duplicate sibling keys, failed render | `warn` |
//! | navigation finished | `info` |

use std::sync::Once;

use tracing_subscriber::{EnvFilter, util::SubscriberInitExt};

/// Logging profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Profile {
    /// Human-readable output at debug level.
    Development,
    /// JSON output at info level.
    Production,
    /// Bare registry, nothing printed.
    Test,
}

static INIT_ONCE: Once = Once::new();

/// Install a global subscriber for `profile`.
///
/// Only the first call has an effect. `RUST_LOG` overrides the profile's
/// default filter. If another subscriber is already installed this does
/// nothing.
///
/// # Example
///
/// ```
/// use spark_vdom::logging::{init, Profile};
///
/// init(Profile::Test);
/// ```
pub fn init(profile: Profile) {
    INIT_ONCE.call_once(|| {
        let _ = match profile {
            Profile::Development => tracing_subscriber::fmt()
                .with_env_filter(
                    EnvFilter::try_from_default_env()
                        .unwrap_or_else(|_| EnvFilter::new("spark_vdom=debug")),
                )
                .finish()
                .try_init(),
            Profile::Production => tracing_subscriber::fmt()
                .json()
                .with_env_filter(
                    EnvFilter::try_from_default_env()
                        .unwrap_or_else(|_| EnvFilter::new("spark_vdom=info")),
                )
                .finish()
                .try_init(),
            Profile::Test => tracing_subscriber::registry().try_init(),
        };
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_idempotent() {
        init(Profile::Test);
        init(Profile::Test);
        init(Profile::Development);
    }
}
