//! Process-wide tracing setup for plugins.
//!
//! The plugin lives inside someone else's process, so the subscriber is only
//! installed if nobody has installed one yet.

use std::sync::Once;

use tracing_subscriber::EnvFilter;

/// Environment variable holding the filter directive.
pub const LOG_ENV: &str = "TOP_LOG";

const DEFAULT_DIRECTIVE: &str = "warn";

static LOG_INIT_ONCE: Once = Once::new();

/// Install the fmt subscriber, once.
pub fn init() {
    LOG_INIT_ONCE.call_once(|| {
        let filter = EnvFilter::try_from_env(LOG_ENV)
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE));

        // Fails when the host already set a global subscriber; keep theirs.
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .with_ansi(false)
            .try_init();
    });
}

#[cfg(test)]
mod tests {
    #[test]
    fn init_is_idempotent() {
        super::init();
        super::init();
        tracing::debug!("still alive");
    }
}
