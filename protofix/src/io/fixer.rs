//! In-place fixing of BUILD files, one at a time or across a workspace tree.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument};
use walkdir::{DirEntry, WalkDir};

use crate::core::build_file::{is_build_file_name, is_output_dir_name};
use crate::core::rewrite::rewrite_content;
use crate::io::error::FixError;

/// Remove proto load declarations from the file at `path`.
///
/// Returns `Ok(true)` if the file was rewritten. A path that does not exist
/// is a no-op and returns `Ok(false)`; unchanged files are never written.
///
/// A rewrite is reported as an `info` tracing event only. Nothing is printed
/// to stdout here; the `Fixed: <path>` line is up to the caller.
pub fn fix_file(path: &Path) -> Result<bool, FixError> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(err) if err.kind() == ErrorKind::NotFound => {
            debug!(path = %path.display(), "build file missing, skipping");
            return Ok(false);
        }
        Err(source) => {
            return Err(FixError::Read {
                path: path.to_path_buf(),
                source,
            });
        }
    };

    let rewrite = rewrite_content(&content);
    if !rewrite.is_changed() {
        return Ok(false);
    }

    fs::write(path, &rewrite.content).map_err(|source| FixError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    info!(path = %path.display(), removed = rewrite.removed, "fixed build file");
    Ok(true)
}

/// Fix every `BUILD` / `BUILD.bazel` file below `root`.
///
/// Directories whose name starts with `bazel-` are pruned at every level.
/// Entries are visited in file-name order, so the returned list of changed
/// paths is stable for an unchanged tree. The first filesystem error aborts
/// the scan.
#[instrument(skip_all, fields(root = %root.display()))]
pub fn fix_tree(root: &Path) -> Result<Vec<PathBuf>, FixError> {
    let mut changed = Vec::new();
    let walker = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| !is_pruned(entry));

    for entry in walker {
        let entry = entry.map_err(|source| FixError::Walk {
            path: source
                .path()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| root.to_path_buf()),
            source,
        })?;
        if !is_build_file(&entry) {
            continue;
        }
        debug!(path = %entry.path().display(), "checking build file");
        if fix_file(entry.path())? {
            changed.push(entry.into_path());
        }
    }

    debug!(changed = changed.len(), "scan finished");
    Ok(changed)
}

fn is_pruned(entry: &DirEntry) -> bool {
    entry.depth() > 0 && is_output_dir_name(&entry.file_name().to_string_lossy())
}

fn is_build_file(entry: &DirEntry) -> bool {
    if !is_build_file_name(&entry.file_name().to_string_lossy()) {
        return false;
    }
    if entry.path_is_symlink() {
        return entry.path().is_file();
    }
    entry.file_type().is_file()
}
