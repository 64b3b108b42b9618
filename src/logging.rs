//! Log output for the Deckodecko binaries.
//!
//! Logs go to stderr; stdout belongs to the RPC frames.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Installs the global subscriber at `level` (e.g. `"info"`, `"deckodecko=debug"`).
///
/// `RUST_LOG` wins over `level` when set. An unparsable `level` falls back
/// to `info`. Returns false when a subscriber was already installed, in
/// which case nothing changes.
pub fn init_logging(level: &str) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true),
        )
        .try_init()
        .is_ok()
}
