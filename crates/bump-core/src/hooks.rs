//! Pre-hook execution.
//!
//! The pre-hook is a list of user-configured commands that run after the
//! next version is known and before anything is committed or tagged, e.g. to
//! write the version into a manifest. Each command is handed to the
//! configured shell (`/bin/bash -c` unless overridden) with `VERSION` and
//! `PREVIOUS_VERSION` added to its environment.
//!
//! Commands run one after another in the repository root. The first failure
//! stops the sequence; commands that already ran are not undone.

use std::process::Command;
use std::time::{Duration, Instant};

use camino::{Utf8Path, Utf8PathBuf};
use thiserror::Error;
use tracing::{debug, instrument};

/// Errors from hook execution.
#[derive(Error, Debug)]
pub enum HookError {
    /// A hook command exited with a non-zero status.
    #[error("pre-hook command failed: {command}")]
    CommandFailed {
        /// The command that failed.
        command: String,
        /// The exit code, if available.
        exit_code: Option<i32>,
        /// Captured stderr.
        stderr: String,
    },

    /// The configured shell string names no program.
    #[error("no shell configured for pre-hook commands")]
    EmptyShell,

    /// Failed to spawn a hook command.
    #[error("failed to execute pre-hook: {0}")]
    Exec(#[from] std::io::Error),
}

/// Result alias for hook operations.
pub type HookResult<T> = Result<T, HookError>;

/// Versions exposed to hook commands as environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HookEnv {
    /// The tag about to be created, exported as `VERSION`.
    pub version: String,
    /// The latest existing tag, exported as `PREVIOUS_VERSION`.
    pub previous_version: String,
}

impl HookEnv {
    /// Variable names paired with their values.
    pub fn vars(&self) -> [(&'static str, &str); 2] {
        [
            ("VERSION", self.version.as_str()),
            ("PREVIOUS_VERSION", self.previous_version.as_str()),
        ]
    }
}

/// Result of running a single hook command.
#[derive(Debug, Clone)]
pub struct HookOutput {
    /// The command as configured.
    pub command: String,
    /// Captured stdout.
    pub stdout: String,
    /// Captured stderr.
    pub stderr: String,
    /// How long the command took to run.
    pub duration: Duration,
}

/// Something that can run hook commands through a shell.
pub trait ShellRunner {
    /// Run `commands` in order through `shell`.
    ///
    /// Returns one [`HookOutput`] per command. Stops at the first command
    /// that exits non-zero and reports it as [`HookError::CommandFailed`].
    fn run(&self, shell: &str, commands: &[String], env: &HookEnv) -> HookResult<Vec<HookOutput>>;
}

/// Runs hook commands as child processes in a fixed working directory.
#[derive(Debug, Clone)]
pub struct SystemShell {
    working_dir: Utf8PathBuf,
}

impl SystemShell {
    /// Run commands from inside `working_dir`.
    pub fn new(working_dir: impl AsRef<Utf8Path>) -> Self {
        Self {
            working_dir: working_dir.as_ref().to_path_buf(),
        }
    }
}

impl ShellRunner for SystemShell {
    #[instrument(skip_all, fields(%shell, count = commands.len()))]
    fn run(&self, shell: &str, commands: &[String], env: &HookEnv) -> HookResult<Vec<HookOutput>> {
        let mut words = shell.split_whitespace();
        let program = words.next().ok_or(HookError::EmptyShell)?;
        let leading: Vec<&str> = words.collect();

        let mut results = Vec::with_capacity(commands.len());
        for command in commands {
            debug!(%command, "running hook");

            let start = Instant::now();
            let output = Command::new(program)
                .args(&leading)
                .arg(command)
                .envs(env.vars())
                .current_dir(self.working_dir.as_std_path())
                .output()?;
            let duration = start.elapsed();

            let stderr = String::from_utf8_lossy(&output.stderr).to_string();
            if !output.status.success() {
                return Err(HookError::CommandFailed {
                    command: command.clone(),
                    exit_code: output.status.code(),
                    stderr: stderr.trim().to_string(),
                });
            }

            debug!(%command, ?duration, "hook finished");
            results.push(HookOutput {
                command: command.clone(),
                stdout: String::from_utf8_lossy(&output.stdout).to_string(),
                stderr,
                duration,
            });
        }

        Ok(results)
    }
}
