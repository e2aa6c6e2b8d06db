//! Naming rules for BUILD files and Bazel output directories.

/// File names Bazel reads package definitions from.
pub const BUILD_FILE_NAMES: [&str; 2] = ["BUILD", "BUILD.bazel"];

/// Prefix of the convenience symlinks Bazel creates in the workspace root
/// (`bazel-bin`, `bazel-out`, `bazel-<workspace>`, ...).
pub const OUTPUT_DIR_PREFIX: &str = "bazel-";

/// True if `name` is exactly one of [`BUILD_FILE_NAMES`].
pub fn is_build_file_name(name: &str) -> bool {
    BUILD_FILE_NAMES.contains(&name)
}

/// True if `name` denotes a Bazel output/cache directory that must not be scanned.
pub fn is_output_dir_name(name: &str) -> bool {
    name.starts_with(OUTPUT_DIR_PREFIX)
}
