//! Process-wide subscriber setup.

use std::sync::Once;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Output profile of the global subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Profile {
    /// Human-readable lines on stderr, `japi=debug`
    Development,
    /// JSON lines on stderr, `japi=info`
    Production,
    /// Bare registry; tests install their own layer via `init_test_capture`
    Test,
}

impl Profile {
    /// Filter used when `RUST_LOG` is unset or invalid.
    pub fn default_directive(self) -> &'static str {
        match self {
            Profile::Development => "japi=debug",
            Profile::Production => "japi=info",
            Profile::Test => "off",
        }
    }
}

static INIT: Once = Once::new();

/// Install the global subscriber for `profile`.
///
/// Only the first call in a process has any effect. If another global
/// subscriber is already installed (for example the test capture layer),
/// that one stays in place.
pub fn init(profile: Profile) {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(profile.default_directive()));
        let fmt = tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_env_filter(filter);

        let installed = match profile {
            Profile::Development => fmt.try_init().map_err(|e| e.to_string()),
            Profile::Production => fmt.json().try_init().map_err(|e| e.to_string()),
            Profile::Test => tracing_subscriber::registry()
                .try_init()
                .map_err(|e| e.to_string()),
        };
        if let Err(reason) = installed {
            tracing::debug!(profile = ?profile, "keeping existing subscriber: {}", reason);
        }
    });
}
