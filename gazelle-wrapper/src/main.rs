//! Run Gazelle, strip obsolete `@rules_proto` loads, then run Gazelle again
//! with the protolake extension.
//!
//! Meant to be launched through `bazel run`, which sets
//! `BUILD_WORKSPACE_DIRECTORY` to the workspace being edited.

mod config;
mod exit_codes;
mod pipeline;
mod process;
#[cfg(test)]
mod test_support;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::debug;

use crate::config::{CONFIG_FILE_NAME, load_config};
use crate::pipeline::run_pipeline;
use crate::process::SystemProcessRunner;

#[derive(Parser)]
#[command(
    name = "gazelle-wrapper",
    version,
    about = "Run Gazelle with proto import fixes for Bazel 8"
)]
struct Cli {
    /// Workspace to regenerate BUILD files in.
    #[arg(long, env = "BUILD_WORKSPACE_DIRECTORY", default_value = ".")]
    workspace: PathBuf,

    /// Config file (default: `<workspace>/.gazelle-wrapper.toml`).
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() {
    protofix::logging::init();
    match run() {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("{:#}", err);
            std::process::exit(exit_codes::FAILURE);
        }
    }
}

fn run() -> Result<i32> {
    let cli = Cli::parse();
    let config_path = cli
        .config
        .unwrap_or_else(|| cli.workspace.join(CONFIG_FILE_NAME));
    let cfg = load_config(&config_path).context("load config")?;
    debug!(workspace = %cli.workspace.display(), ?cfg, "configuration loaded");

    let runner = SystemProcessRunner::from_config(&cfg);
    let report = run_pipeline(&cli.workspace, &cfg, &runner)?;
    debug!(
        step = report.last_step.number(),
        exit_code = report.exit_code,
        success = report.success(),
        fixed = report.fixed.len(),
        "pipeline finished"
    );
    Ok(report.exit_code)
}
