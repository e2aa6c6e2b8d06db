//! Wrapper configuration stored in `.gazelle-wrapper.toml` at the workspace root.

use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use serde::Deserialize;

/// File name looked up in the workspace root when `--config` is not given.
pub const CONFIG_FILE_NAME: &str = ".gazelle-wrapper.toml";

/// Pipeline configuration (TOML).
///
/// Every field is optional in the file; missing fields take the values used
/// by a stock protolake workspace.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PipelineConfig {
    /// Program used to run Gazelle (steps 1 and 3).
    pub bazel: String,

    /// Gazelle target passed to `bazel run`.
    pub gazelle_target: String,

    /// Language extension selected with `-lang=` in step 3.
    pub extension_lang: String,

    /// Keep at most this many bytes of each captured stream. Relayed output is not truncated.
    pub output_limit_bytes: usize,

    /// Kill a step after this many seconds. Unset waits indefinitely.
    pub step_timeout_secs: Option<u64>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            bazel: "bazel".to_string(),
            gazelle_target: "//:gazelle".to_string(),
            extension_lang: "protolake".to_string(),
            output_limit_bytes: 1_000_000,
            step_timeout_secs: None,
        }
    }
}

impl PipelineConfig {
    pub fn validate(&self) -> Result<()> {
        if self.bazel.trim().is_empty() {
            return Err(anyhow!("bazel must be a non-empty string"));
        }
        if self.gazelle_target.trim().is_empty() {
            return Err(anyhow!("gazelle_target must be a non-empty string"));
        }
        if self.extension_lang.trim().is_empty() {
            return Err(anyhow!("extension_lang must be a non-empty string"));
        }
        if self.output_limit_bytes == 0 {
            return Err(anyhow!("output_limit_bytes must be > 0"));
        }
        if self.step_timeout_secs == Some(0) {
            return Err(anyhow!("step_timeout_secs must be > 0 when set"));
        }
        Ok(())
    }

    pub fn step_timeout(&self) -> Option<Duration> {
        self.step_timeout_secs.map(Duration::from_secs)
    }
}

/// Load config from a TOML file.
///
/// If the file is missing, returns `PipelineConfig::default()`.
pub fn load_config(path: &Path) -> Result<PipelineConfig> {
    if !path.exists() {
        let cfg = PipelineConfig::default();
        cfg.validate()?;
        return Ok(cfg);
    }
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: PipelineConfig =
        toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    cfg.validate()
        .with_context(|| format!("invalid config {}", path.display()))?;
    Ok(cfg)
}
