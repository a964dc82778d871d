//! Thin wrapper for spawning an external tool.
//!
//! Every adapter (`kops`, `kubectl`, `aws`, clipboard, browser) goes through
//! [`Tool`] so that spawn failures and non-zero exits are reported the same
//! way and every invocation shows up in the trace log.

use std::io::Write;
use std::process::{Command, Output, Stdio};

use anyhow::{Context, Result, anyhow};
use tracing::{debug, error, instrument, warn};

use crate::error::ConsoleError;

/// A program plus any fixed leading arguments (e.g. `xclip -selection clipboard`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tool {
    program: String,
    base_args: Vec<String>,
}

impl Tool {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            base_args: Vec::new(),
        }
    }

    /// Build from a configured argv; the first element is the program.
    pub fn from_argv(argv: &[String]) -> Result<Self> {
        let (program, rest) = argv
            .split_first()
            .ok_or_else(|| anyhow!("empty command"))?;
        Ok(Self {
            program: program.clone(),
            base_args: rest.to_vec(),
        })
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Run to completion, capturing stdout/stderr. Exit status is not checked.
    #[instrument(skip_all, fields(program = %self.program))]
    pub fn capture(&self, args: &[&str]) -> Result<Output> {
        debug!(args = %args.join(" "), "running");
        let output = self
            .command(args)
            .stdin(Stdio::null())
            .output()
            .map_err(|err| {
                error!(err = %err, "failed to spawn");
                err
            })
            .with_context(|| format!("spawn {}", self.display(args)))?;
        debug!(exit_code = ?output.status.code(), "finished");
        Ok(output)
    }

    /// Run and return stdout, failing on a non-zero exit.
    pub fn capture_checked(&self, args: &[&str]) -> Result<String> {
        let output = self.capture(args)?;
        if !output.status.success() {
            return Err(self
                .failure(args, output.status.code(), &output.stderr)
                .into());
        }
        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }

    /// Run with the terminal attached so the operator sees tool output live.
    #[instrument(skip_all, fields(program = %self.program))]
    pub fn attached(&self, args: &[&str]) -> Result<()> {
        debug!(args = %args.join(" "), "running attached");
        let status = self
            .command(args)
            .status()
            .with_context(|| format!("spawn {}", self.display(args)))?;
        debug!(exit_code = ?status.code(), "finished");
        if !status.success() {
            return Err(self.failure(args, status.code(), b"see output above").into());
        }
        Ok(())
    }

    /// Feed `input` on stdin and wait, failing on a non-zero exit.
    #[instrument(skip_all, fields(program = %self.program))]
    pub fn pipe_in(&self, args: &[&str], input: &[u8]) -> Result<()> {
        let mut child = self
            .command(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .with_context(|| format!("spawn {}", self.display(args)))?;
        {
            let mut stdin = child
                .stdin
                .take()
                .ok_or_else(|| anyhow!("stdin was not piped"))?;
            stdin.write_all(input).context("write stdin")?;
        }
        let output = child
            .wait_with_output()
            .with_context(|| format!("wait for {}", self.display(args)))?;
        if !output.status.success() {
            return Err(self
                .failure(args, output.status.code(), &output.stderr)
                .into());
        }
        Ok(())
    }

    /// Start the process and return immediately. No handle is kept; the
    /// process outlives this call and is never waited on or stopped.
    #[instrument(skip_all, fields(program = %self.program))]
    pub fn spawn_detached(&self, args: &[&str]) -> Result<()> {
        let child = self
            .command(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .with_context(|| format!("spawn {}", self.display(args)))?;
        debug!(pid = child.id(), "started detached");
        Ok(())
    }

    fn command(&self, args: &[&str]) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.base_args).args(args);
        cmd
    }

    fn display(&self, args: &[&str]) -> String {
        let mut parts = vec![self.program.as_str()];
        parts.extend(self.base_args.iter().map(String::as_str));
        parts.extend_from_slice(args);
        parts.join(" ")
    }

    fn failure(&self, args: &[&str], code: Option<i32>, stderr: &[u8]) -> ConsoleError {
        let stderr = String::from_utf8_lossy(stderr).trim().to_string();
        warn!(exit_code = ?code, "tool exited unsuccessfully");
        ConsoleError::ExternalToolFailure {
            tool: self.program.clone(),
            args: args.join(" "),
            code,
            stderr,
        }
    }
}
