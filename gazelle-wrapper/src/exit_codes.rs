//! Exit codes the wrapper produces on its own.
//!
//! When a Gazelle step fails, its exit code is passed through unchanged;
//! these values cover the failures that have no child exit code.

/// All three steps succeeded.
pub const OK: i32 = 0;
/// Fixing BUILD files failed, a child was killed by a signal, or the
/// wrapper itself could not start (bad config, `bazel` not spawnable).
pub const FAILURE: i32 = 1;
/// A step exceeded `step_timeout_secs` and was killed.
pub const TIMED_OUT: i32 = 124;
