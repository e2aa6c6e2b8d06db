//! Running external commands with their output relayed to the terminal.
//!
//! The [`ProcessRunner`] trait decouples the pipeline from real `bazel`
//! invocations. Tests use a scripted runner that returns queued exit codes
//! without spawning processes.

use std::fmt;
use std::io::{self, BufRead, BufReader, Read, Write};
use std::path::Path;
use std::process::{Command, Stdio};
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use tracing::{debug, error, instrument, warn};
use wait_timeout::ChildExt;

use crate::config::PipelineConfig;
use crate::exit_codes;

/// A program and its arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
}

impl CommandSpec {
    pub fn new<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// Outcome of one external invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandResult {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
    pub timed_out: bool,
}

impl CommandResult {
    pub fn success(&self) -> bool {
        self.exit_code == exit_codes::OK
    }

    /// Last non-blank line of stderr, for a one-line failure summary.
    pub fn stderr_tail(&self) -> &str {
        self.stderr
            .lines()
            .rev()
            .find(|line| !line.trim().is_empty())
            .unwrap_or("")
    }
}

/// Capability to run an external command to completion.
pub trait ProcessRunner {
    /// Run `command` in `workdir`. An `Err` means the command could not be
    /// run at all; a failing command is an `Ok` with a non-zero exit code.
    fn execute(&self, command: &CommandSpec, workdir: &Path) -> Result<CommandResult>;
}

/// Runner that spawns real processes and relays their output as it arrives.
#[derive(Debug, Clone)]
pub struct SystemProcessRunner {
    pub timeout: Option<Duration>,
    pub output_limit_bytes: usize,
}

impl SystemProcessRunner {
    pub fn from_config(cfg: &PipelineConfig) -> Self {
        Self {
            timeout: cfg.step_timeout(),
            output_limit_bytes: cfg.output_limit_bytes,
        }
    }
}

impl ProcessRunner for SystemProcessRunner {
    #[instrument(skip_all, fields(command = %command, workdir = %workdir.display()))]
    fn execute(&self, command: &CommandSpec, workdir: &Path) -> Result<CommandResult> {
        println!("Running: {command}");
        let mut cmd = Command::new(&command.program);
        cmd.args(&command.args).current_dir(workdir);

        let output = run_command_relayed(cmd, self.timeout, self.output_limit_bytes)
            .with_context(|| format!("run {command}"))?;

        if output.stdout_truncated > 0 || output.stderr_truncated > 0 {
            debug!(
                stdout_truncated = output.stdout_truncated,
                stderr_truncated = output.stderr_truncated,
                "captured output truncated"
            );
        }
        let exit_code = if output.timed_out {
            exit_codes::TIMED_OUT
        } else {
            match output.exit_code {
                Some(code) => code,
                None => {
                    warn!("command terminated by signal");
                    exit_codes::FAILURE
                }
            }
        };
        Ok(CommandResult {
            exit_code,
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            timed_out: output.timed_out,
        })
    }
}

/// Raw output of [`run_command_relayed`].
#[derive(Debug)]
pub struct RelayedOutput {
    /// `None` if the child was terminated by a signal.
    pub exit_code: Option<i32>,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
    pub stdout_truncated: usize,
    pub stderr_truncated: usize,
    pub timed_out: bool,
}

/// Run a command, copying its stdout/stderr line by line to ours while also capturing them.
///
/// Both pipes are drained concurrently so the child cannot block on a full pipe.
/// `output_limit_bytes` bounds what is kept in memory per stream; the relayed
/// copy is always complete. With `timeout = None` this waits indefinitely.
#[instrument(skip_all, fields(timeout_secs = timeout.map(|t| t.as_secs()), output_limit_bytes))]
pub fn run_command_relayed(
    mut cmd: Command,
    timeout: Option<Duration>,
    output_limit_bytes: usize,
) -> Result<RelayedOutput> {
    cmd.stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    debug!("spawning child process");
    let mut child = match cmd.spawn() {
        Ok(c) => c,
        Err(e) => {
            error!(err = %e, "failed to spawn command");
            return Err(e).context("spawn command");
        }
    };

    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| anyhow!("stdout was not piped"))?;
    let stderr = child
        .stderr
        .take()
        .ok_or_else(|| anyhow!("stderr was not piped"))?;

    let stdout_handle =
        thread::spawn(move || read_stream_relayed(stdout, io::stdout(), output_limit_bytes));
    let stderr_handle =
        thread::spawn(move || read_stream_relayed(stderr, io::stderr(), output_limit_bytes));

    let mut timed_out = false;
    let status = match timeout {
        None => child.wait().context("wait for command")?,
        Some(timeout) => match child.wait_timeout(timeout).context("wait for command")? {
            Some(status) => status,
            None => {
                warn!(
                    timeout_secs = timeout.as_secs(),
                    "command timed out, killing"
                );
                timed_out = true;
                child.kill().context("kill command")?;
                child.wait().context("wait command after kill")?
            }
        },
    };

    let (stdout, stdout_truncated) = join_output(stdout_handle).context("join stdout")?;
    let (stderr, stderr_truncated) = join_output(stderr_handle).context("join stderr")?;

    debug!(exit_code = ?status.code(), timed_out, "command finished");
    Ok(RelayedOutput {
        exit_code: status.code(),
        stdout,
        stderr,
        stdout_truncated,
        stderr_truncated,
        timed_out,
    })
}

fn join_output(handle: thread::JoinHandle<Result<(Vec<u8>, usize)>>) -> Result<(Vec<u8>, usize)> {
    match handle.join() {
        Ok(result) => result,
        Err(_) => Err(anyhow!("output reader thread panicked")),
    }
}

/// Copy `reader` to `relay` line by line, keeping up to `limit` bytes of it.
///
/// Returns the kept bytes and the number of bytes dropped from the capture.
/// A failing relay is logged and otherwise ignored so the pipe keeps draining.
fn read_stream_relayed<R: Read, W: Write>(
    reader: R,
    mut relay: W,
    limit: usize,
) -> Result<(Vec<u8>, usize)> {
    let mut buf_reader = BufReader::new(reader);
    let mut collected = Vec::new();
    let mut truncated = 0usize;
    let mut relay_ok = true;

    loop {
        let mut line = Vec::new();
        let n = buf_reader
            .read_until(b'\n', &mut line)
            .context("read line")?;
        if n == 0 {
            break;
        }

        if relay_ok && let Err(e) = relay.write_all(&line).and_then(|()| relay.flush()) {
            warn!(err = %e, "failed to relay child output");
            relay_ok = false;
        }

        let remaining = limit.saturating_sub(collected.len());
        if remaining > 0 {
            let keep = n.min(remaining);
            collected.extend_from_slice(&line[..keep]);
            truncated += n.saturating_sub(keep);
        } else {
            truncated += n;
        }
    }

    Ok((collected, truncated))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn command_spec_displays_like_a_shell_line() {
        let spec = CommandSpec::new("bazel", ["run", "//:gazelle", "--", "-lang=protolake"]);
        assert_eq!(spec.to_string(), "bazel run //:gazelle -- -lang=protolake");
    }

    #[test]
    fn stderr_tail_skips_trailing_blank_lines() {
        let result = CommandResult {
            exit_code: 1,
            stdout: String::new(),
            stderr: "INFO: loading\nERROR: no such target '//:gazelle'\n\n".to_string(),
            timed_out: false,
        };
        assert_eq!(result.stderr_tail(), "ERROR: no such target '//:gazelle'");
    }

    #[test]
    fn relays_everything_and_caps_capture() {
        let input = b"first line\nsecond line\nno newline".to_vec();
        let mut relayed = Vec::new();
        let (kept, truncated) =
            read_stream_relayed(Cursor::new(input.clone()), &mut relayed, 15).expect("read");

        assert_eq!(relayed, input);
        assert_eq!(kept, b"first line\nseco".to_vec());
        assert_eq!(truncated, input.len() - 15);
    }

    #[test]
    fn empty_stream_captures_nothing() {
        let mut relayed = Vec::new();
        let (kept, truncated) =
            read_stream_relayed(Cursor::new(Vec::new()), &mut relayed, 10).expect("read");
        assert!(kept.is_empty());
        assert!(relayed.is_empty());
        assert_eq!(truncated, 0);
    }

    #[test]
    fn spawn_failure_is_an_error() {
        let runner = SystemProcessRunner {
            timeout: None,
            output_limit_bytes: 1000,
        };
        let temp = tempfile::tempdir().expect("tempdir");
        let spec = CommandSpec::new("definitely-not-a-real-bazel-binary", ["run"]);
        let err = runner.execute(&spec, temp.path()).unwrap_err();
        assert!(format!("{err:#}").contains("spawn command"));
    }

    #[cfg(unix)]
    #[test]
    fn captures_output_and_exit_code() {
        let runner = SystemProcessRunner {
            timeout: None,
            output_limit_bytes: 1000,
        };
        let temp = tempfile::tempdir().expect("tempdir");
        let spec = CommandSpec::new("sh", ["-c", "pwd -P; echo oops >&2; exit 3"]);
        let result = runner.execute(&spec, temp.path()).expect("execute");

        assert_eq!(result.exit_code, 3);
        assert!(!result.success());
        assert!(!result.timed_out);
        let workdir = temp.path().canonicalize().expect("canonicalize");
        assert_eq!(result.stdout.trim_end(), workdir.display().to_string());
        assert_eq!(result.stderr, "oops\n");
    }

    #[cfg(unix)]
    #[test]
    fn timeout_kills_the_child() {
        let runner = SystemProcessRunner {
            timeout: Some(Duration::from_millis(200)),
            output_limit_bytes: 1000,
        };
        let temp = tempfile::tempdir().expect("tempdir");
        let spec = CommandSpec::new("sh", ["-c", "exec sleep 30"]);
        let result = runner.execute(&spec, temp.path()).expect("execute");

        assert!(result.timed_out);
        assert_eq!(result.exit_code, exit_codes::TIMED_OUT);
    }
}
