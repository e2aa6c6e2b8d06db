//! Error type for BUILD file fixing.
//!
//! A missing file is not an error (see [`crate::fix_file`]); everything else
//! the filesystem reports aborts the operation and carries the offending path.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FixError {
    /// Reading a BUILD file failed for a reason other than it being absent.
    #[error("read {}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Writing the rewritten content back failed.
    #[error("write {}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Directory traversal failed (unreadable directory, missing root, ...).
    #[error("walk {}", .path.display())]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },
}

impl FixError {
    /// Path the failing operation was working on.
    pub fn path(&self) -> &std::path::Path {
        match self {
            FixError::Read { path, .. }
            | FixError::Write { path, .. }
            | FixError::Walk { path, .. } => path,
        }
    }
}
