//! Test logging initialization, shared by unit and integration tests.

use std::sync::Once;

use tracing_subscriber::{fmt, EnvFilter};

static INIT: Once = Once::new();

/// Install a quiet, test-captured subscriber. Safe to call from every test.
///
/// Filter precedence: `TEST_LOG`, then `RUST_LOG`, then `warn`.
pub fn init() {
    INIT.call_once(|| {
        let filter = std::env::var("TEST_LOG")
            .or_else(|_| std::env::var("RUST_LOG"))
            .map(EnvFilter::new)
            .unwrap_or_else(|_| EnvFilter::new("warn"));

        // Something else may have installed a global subscriber first.
        let _ = fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .without_time()
            .try_init();
    });
}
