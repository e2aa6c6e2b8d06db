//! Filesystem side of the fixer.

pub mod error;
pub mod fixer;
