//! External command execution
//!
//! Every repository query and mutation goes through [`GitExecutor`], which
//! spawns `git` with an argument vector and a working directory and hands back
//! the exit code plus the captured stdout/stderr split into lines. Nothing is
//! retried: a failed invocation is reported to the caller as-is.

use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;
use tokio::process::Command;

use super::error::ExternalCommandError;

/// Program name every argument vector starts with
pub const GIT_PROGRAM: &str = "git";

/// Structured result of one external command
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub exit_code: i32,
    pub stdout: Vec<String>,
    pub stderr: Vec<String>,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// First line of stdout, if the command printed anything
    pub fn first_line(&self) -> Option<&str> {
        self.stdout.first().map(String::as_str)
    }

    /// Turns an unexpected exit code of `git <args>` into an error
    pub fn into_failure(self, args: &[&str]) -> ExternalCommandError {
        ExternalCommandError::Failed {
            argv: std::iter::once(GIT_PROGRAM)
                .chain(args.iter().copied())
                .map(str::to_string)
                .collect(),
            exit_code: self.exit_code,
            stdout: self.stdout,
            stderr: self.stderr,
        }
    }
}

/// Seam between the repository layer and process spawning
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Runs `argv` (program first) in `cwd`, or the process working directory
    /// when `cwd` is `None`. Only fails when the process cannot be started.
    async fn execute(
        &self,
        argv: &[String],
        cwd: Option<&Path>,
    ) -> Result<CommandOutput, ExternalCommandError>;
}

/// Spawns real processes with `tokio::process`
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessRunner;

#[async_trait]
impl CommandRunner for ProcessRunner {
    async fn execute(
        &self,
        argv: &[String],
        cwd: Option<&Path>,
    ) -> Result<CommandOutput, ExternalCommandError> {
        let Some((program, args)) = argv.split_first() else {
            return Err(ExternalCommandError::Spawn {
                command: String::new(),
                source: std::io::Error::new(std::io::ErrorKind::InvalidInput, "empty command"),
            });
        };

        let mut command = Command::new(program);
        command.args(args);
        if let Some(cwd) = cwd {
            command.current_dir(cwd);
        }

        let output = command
            .output()
            .await
            .map_err(|source| ExternalCommandError::Spawn {
                command: argv.join(" "),
                source,
            })?;

        Ok(CommandOutput {
            // Killed by a signal: no exit code
            exit_code: output.status.code().unwrap_or(-1),
            stdout: split_lines(&output.stdout),
            stderr: split_lines(&output.stderr),
        })
    }
}

fn split_lines(bytes: &[u8]) -> Vec<String> {
    String::from_utf8_lossy(bytes)
        .lines()
        .map(str::to_string)
        .collect()
}

/// Runs `git` commands through a [`CommandRunner`]
///
/// Cheap to clone; one instance is created at startup and shared by the
/// topology and every repository handle.
#[derive(Clone)]
pub struct GitExecutor {
    runner: Arc<dyn CommandRunner>,
}

impl GitExecutor {
    pub fn new(runner: Arc<dyn CommandRunner>) -> Self {
        Self { runner }
    }

    /// Executor backed by real `git` processes
    pub fn system() -> Self {
        Self::new(Arc::new(ProcessRunner))
    }

    /// Runs `git <args>` in `cwd`.
    ///
    /// With `must_succeed`, a non-zero exit becomes
    /// [`ExternalCommandError::Failed`]; otherwise the output is returned
    /// whatever the exit code.
    pub async fn run(
        &self,
        args: &[&str],
        cwd: Option<&Path>,
        must_succeed: bool,
    ) -> Result<CommandOutput, ExternalCommandError> {
        let argv: Vec<String> = std::iter::once(GIT_PROGRAM)
            .chain(args.iter().copied())
            .map(str::to_string)
            .collect();

        let output = self.runner.execute(&argv, cwd).await?;

        let location = cwd.map_or_else(|| ".".to_string(), |p| p.display().to_string());
        tracing::debug!(
            command = %argv.join(" "),
            cwd = %location,
            exit_code = output.exit_code,
            "git"
        );
        for line in &output.stdout {
            tracing::trace!("STDOUT| {line}");
        }
        for line in &output.stderr {
            tracing::trace!("STDERR| {line}");
        }

        if must_succeed && !output.success() {
            return Err(output.into_failure(args));
        }
        Ok(output)
    }

    /// Runs a command whose failure is an answer, not an error
    pub async fn query(
        &self,
        args: &[&str],
        cwd: Option<&Path>,
    ) -> Result<CommandOutput, ExternalCommandError> {
        self.run(args, cwd, false).await
    }

    /// Runs a command that must exit with zero
    pub async fn run_checked(
        &self,
        args: &[&str],
        cwd: Option<&Path>,
    ) -> Result<CommandOutput, ExternalCommandError> {
        self.run(args, cwd, true).await
    }

    /// The `git version ...` line of the installed tool
    pub async fn version(&self) -> Result<String, ExternalCommandError> {
        let output = self.run_checked(&["version"], None).await?;
        Ok(output.first_line().unwrap_or_default().to_string())
    }
}
