//! Cleanup of Gazelle-generated BUILD files for Bazel 8.
//!
//! Gazelle still emits `load("@rules_proto//proto:defs.bzl", ...)` for
//! `proto_library` targets, but Bazel 8 provides the rule natively and the
//! load breaks the build. This crate strips those declarations:
//!
//! - **[`core`]**: Pure text rewriting. No I/O, fully testable in isolation.
//! - **[`io`]**: Filesystem side of the fixer (single files and whole trees).
//!
//! The `fix-proto-imports` binary wraps [`fix_tree`]; the `gazelle-wrapper`
//! binary calls it in-process between two Gazelle runs.

pub mod core;
pub mod io;
pub mod logging;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use crate::core::rewrite::{Rewrite, rewrite_content};
pub use crate::io::error::FixError;
pub use crate::io::fixer::{fix_file, fix_tree};
