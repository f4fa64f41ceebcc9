//! Log output for tests.

use tracing_subscriber::EnvFilter;

/// Installs a test-friendly subscriber once per process.
///
/// Verbosity comes from `RUST_LOG` and defaults to `warn`. Output goes
/// through the test harness capture, so it only shows for failing tests.
pub fn init_test_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    // A subscriber may already be installed by another test.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_is_idempotent() {
        init_test_logging();
        init_test_logging();
    }
}
