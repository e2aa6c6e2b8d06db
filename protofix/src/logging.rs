//! Diagnostic tracing shared by the `fix-proto-imports` and `gazelle-wrapper` binaries.
//!
//! Tracing is for debugging only: it reads `RUST_LOG` and writes to stderr.
//! The product output (`Fixed: <path>`, `Step N: ...`) goes to stdout and is
//! unaffected by the filter.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the tracing subscriber.
///
/// Reads `RUST_LOG` env var. Defaults to `warn` if unset.
/// Output: stderr, compact format.
///
/// # Example
/// ```bash
/// RUST_LOG=protofix=debug fix-proto-imports path/to/workspace
/// RUST_LOG=gazelle_wrapper=debug,protofix=info bazel run //tools:gazelle_wrapper
/// ```
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .init();
}
