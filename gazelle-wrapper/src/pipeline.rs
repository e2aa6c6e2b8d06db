//! The three-step Gazelle pipeline.
//!
//! 1. `bazel run //:gazelle`
//! 2. strip `@rules_proto` loads from every BUILD file (in-process)
//! 3. `bazel run //:gazelle -- -lang=<extension>`
//!
//! The first failing step ends the run; its exit code becomes the result.

use std::path::{Path, PathBuf};

use anyhow::Result;
use tracing::{debug, error, info, instrument, warn};

use crate::config::PipelineConfig;
use crate::exit_codes;
use crate::process::{CommandSpec, ProcessRunner};

/// A pipeline stage, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Gazelle,
    FixImports,
    Extension,
}

impl Step {
    pub fn number(self) -> u8 {
        match self {
            Step::Gazelle => 1,
            Step::FixImports => 2,
            Step::Extension => 3,
        }
    }
}

/// How a pipeline run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineReport {
    /// The step whose result decided the run (the last one attempted).
    pub last_step: Step,
    /// Process exit code for the whole run.
    pub exit_code: i32,
    /// BUILD files rewritten in step 2.
    pub fixed: Vec<PathBuf>,
}

impl PipelineReport {
    pub fn success(&self) -> bool {
        self.exit_code == exit_codes::OK
    }
}

/// `bazel run //:gazelle`
pub fn gazelle_command(cfg: &PipelineConfig) -> CommandSpec {
    CommandSpec::new(cfg.bazel.clone(), ["run".to_string(), cfg.gazelle_target.clone()])
}

/// `bazel run //:gazelle -- -lang=<extension>`
pub fn extension_command(cfg: &PipelineConfig) -> CommandSpec {
    CommandSpec::new(
        cfg.bazel.clone(),
        [
            "run".to_string(),
            cfg.gazelle_target.clone(),
            "--".to_string(),
            format!("-lang={}", cfg.extension_lang),
        ],
    )
}

/// Run the pipeline in `root`.
///
/// Returns `Err` only when a step could not be started at all (for example
/// `bazel` is not on `PATH`). A failing step yields a report carrying its exit
/// code; a BUILD fix failure is reported with [`exit_codes::FAILURE`].
#[instrument(skip_all, fields(root = %root.display()))]
pub fn run_pipeline<R: ProcessRunner>(
    root: &Path,
    cfg: &PipelineConfig,
    runner: &R,
) -> Result<PipelineReport> {
    println!("Step 1: Running standard Gazelle...");
    let result = runner.execute(&gazelle_command(cfg), root)?;
    if !result.success() {
        warn!(
            exit_code = result.exit_code,
            timed_out = result.timed_out,
            stderr = result.stderr_tail(),
            "gazelle failed"
        );
        return Ok(PipelineReport {
            last_step: Step::Gazelle,
            exit_code: result.exit_code,
            fixed: Vec::new(),
        });
    }
    debug!(stdout_bytes = result.stdout.len(), "gazelle finished");

    println!("\nStep 2: Fixing proto imports...");
    let fixed = match protofix::fix_tree(root) {
        Ok(fixed) => fixed,
        Err(err) => {
            error!(path = %err.path().display(), "fixing proto imports failed");
            eprintln!("{:#}", anyhow::Error::new(err).context("fix proto imports"));
            return Ok(PipelineReport {
                last_step: Step::FixImports,
                exit_code: exit_codes::FAILURE,
                fixed: Vec::new(),
            });
        }
    };
    for path in &fixed {
        println!("Fixed: {}", path.display());
    }
    info!(fixed = fixed.len(), "proto imports fixed");

    println!(
        "\nStep 3: Running Gazelle with {} extension...",
        cfg.extension_lang
    );
    let result = runner.execute(&extension_command(cfg), root)?;
    if !result.success() {
        warn!(
            exit_code = result.exit_code,
            timed_out = result.timed_out,
            stderr = result.stderr_tail(),
            lang = %cfg.extension_lang,
            "gazelle extension failed"
        );
    }
    Ok(PipelineReport {
        last_step: Step::Extension,
        exit_code: result.exit_code,
        fixed,
    })
}
