//! Test-only helpers for building scratch Bazel workspaces.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tempfile::TempDir;

/// BUILD content with a proto load that must be stripped.
pub const PROTO_BUILD: &str = r#"load("@rules_proto//proto:defs.bzl", "proto_library")

proto_library(
    name = "user_proto",
    srcs = ["user.proto"],
    visibility = ["//visibility:public"],
)
"#;

/// [`PROTO_BUILD`] after fixing.
pub const PROTO_BUILD_FIXED: &str = r#"proto_library(
    name = "user_proto",
    srcs = ["user.proto"],
    visibility = ["//visibility:public"],
)
"#;

/// BUILD content that needs no fixing.
pub const CLEAN_BUILD: &str = r#"load("@rules_go//go:def.bzl", "go_library")

go_library(
    name = "user",
    srcs = ["user.go"],
)
"#;

/// Temporary directory tree that is removed on drop.
pub struct BuildTree {
    dir: TempDir,
}

impl BuildTree {
    pub fn new() -> Result<Self> {
        let dir = tempfile::tempdir().context("create temp dir")?;
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write `contents` to `rel` (creating parent directories) and return the full path.
    pub fn write(&self, rel: &str, contents: &str) -> Result<PathBuf> {
        let path = self.dir.path().join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("create directory {}", parent.display()))?;
        }
        fs::write(&path, contents).with_context(|| format!("write {}", path.display()))?;
        Ok(path)
    }

    pub fn read(&self, rel: &str) -> Result<String> {
        let path = self.dir.path().join(rel);
        fs::read_to_string(&path).with_context(|| format!("read {}", path.display()))
    }
}
