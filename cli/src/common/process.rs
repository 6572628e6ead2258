//! # zfpack Process Execution Utilities (`common::process`)
//!
//! File: cli/src/common/process.rs
//!
//! ## Overview
//!
//! Runs external programs (the dependency installer and the PHP interpreter)
//! and returns a structured `CommandOutput` with the exit code and both output
//! streams. Success is decided by the exit code alone; an empty stdout is not
//! treated as failure.
//!
//! Commands are run with `tokio::process::Command`. The working directory is
//! set on the child process, never on the zfpack process itself, so a failing
//! command cannot leave zfpack in the wrong directory.
//!
//! No timeout is applied: the call waits until the child exits.
//!
//! ## Usage
//!
//! ```rust
//! use crate::common::process;
//!
//! let output = process::run_capture("composer", &["install", "--no-dev"], Some(&staging)).await?;
//! if !output.success() {
//!     eprintln!("{}", output.combined());
//! }
//! ```
//!
use crate::core::error::Result;
use anyhow::Context;
use std::path::Path;
use std::process::Stdio; // Null stdin, piped stdout and stderr
use tracing::{debug, info};

/// Exit status and captured output of a finished command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit code; `None` when the process was terminated by a signal.
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }

    /// Exit code as text, `?` when there is none.
    pub fn status_text(&self) -> String {
        self.code.map_or("?".to_string(), |c| c.to_string())
    }

    /// stdout followed by stderr, for diagnostics.
    pub fn combined(&self) -> String {
        match (self.stdout.trim_end(), self.stderr.trim_end()) {
            (out, "") => out.to_string(),
            ("", err) => err.to_string(),
            (out, err) => format!("{}\n{}", out, err),
        }
    }
}

/// Renders `program` and `args` as a single command line for messages.
pub fn display_command(program: &str, args: &[&str]) -> String {
    std::iter::once(program)
        .chain(args.iter().copied())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Runs `program` with `args`, optionally inside `cwd`, and captures its output.
///
/// # Errors
///
/// Returns an `Err` only when the program cannot be started. A non-zero exit
/// is reported through `CommandOutput::code`.
pub async fn run_capture(program: &str, args: &[&str], cwd: Option<&Path>) -> Result<CommandOutput> {
    info!("Executing command: {}", display_command(program, args));
    let mut command = tokio::process::Command::new(program);
    command.args(args);
    if let Some(dir) = cwd {
        command.current_dir(dir);
        debug!("Setting CWD for command to {}", dir.display());
    }
    command.stdin(Stdio::null());
    command.stdout(Stdio::piped());
    command.stderr(Stdio::piped());

    let output = command
        .output()
        .await
        .with_context(|| format!("Failed to execute command '{}'", program))?;

    let result = CommandOutput {
        code: output.status.code(),
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    };
    debug!(
        "Command '{}' exited with {}",
        program,
        result.status_text()
    );
    Ok(result)
}
