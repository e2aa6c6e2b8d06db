//! Test-only fakes for the pipeline.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};

use anyhow::{Result, anyhow};

use crate::process::{CommandResult, CommandSpec, ProcessRunner};

/// Runner that returns queued exit codes and records every invocation.
///
/// Running out of queued codes is an error, so an unexpected extra step fails the test.
pub struct ScriptedRunner {
    exit_codes: RefCell<VecDeque<i32>>,
    calls: RefCell<Vec<(CommandSpec, PathBuf)>>,
}

impl ScriptedRunner {
    pub fn new(exit_codes: impl IntoIterator<Item = i32>) -> Self {
        Self {
            exit_codes: RefCell::new(exit_codes.into_iter().collect()),
            calls: RefCell::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<(CommandSpec, PathBuf)> {
        self.calls.borrow().clone()
    }
}

impl ProcessRunner for ScriptedRunner {
    fn execute(&self, command: &CommandSpec, workdir: &Path) -> Result<CommandResult> {
        self.calls
            .borrow_mut()
            .push((command.clone(), workdir.to_path_buf()));
        let exit_code = self
            .exit_codes
            .borrow_mut()
            .pop_front()
            .ok_or_else(|| anyhow!("unexpected command {command}"))?;
        Ok(CommandResult {
            exit_code,
            stdout: String::new(),
            stderr: String::new(),
            timed_out: false,
        })
    }
}
