//! Diagnostic logging
//!
//! Log lines go to stderr so they never mix with command output.
//! `RUST_LOG` takes precedence over `--verbose`.

use tracing_subscriber::{fmt, EnvFilter};

/// Install the global subscriber
///
/// Default level is `warn`; `verbose` raises it to `debug`.
pub fn init(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    let _ = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(verbose)
        .without_time()
        .try_init();
}

/// Subscriber for unit tests, routed through the test harness
pub fn init_test() {
    let _ = fmt()
        .with_env_filter(EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}
