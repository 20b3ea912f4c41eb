//! Error types for external command execution and repository operations

use std::fmt;

/// An external command could not be started, or exited with a non-zero code
/// when the caller required success.
#[derive(Debug, thiserror::Error)]
pub enum ExternalCommandError {
    #[error("Command '{command}' could not be started: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{}", render_failure(.argv, .exit_code, .stdout, .stderr))]
    Failed {
        argv: Vec<String>,
        exit_code: i32,
        stdout: Vec<String>,
        stderr: Vec<String>,
    },
}

impl ExternalCommandError {
    /// Exit code of the failed command, `None` when it never started
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            ExternalCommandError::Spawn { .. } => None,
            ExternalCommandError::Failed { exit_code, .. } => Some(*exit_code),
        }
    }
}

/// Renders `Command 'git a b' returned N.` followed by the captured output
fn render_failure(argv: &[String], exit_code: &i32, stdout: &[String], stderr: &[String]) -> String {
    let mut message = format!("Command '{}' returned {}.", argv.join(" "), exit_code);
    if !stdout.is_empty() {
        message.push_str(&format!("\nSTDOUT: {}", stdout.join("\n").trim_end()));
    }
    if !stderr.is_empty() {
        message.push_str(&format!("\nSTDERR: {}", stderr.join("\n").trim_end()));
    }
    message
}

/// Failure of an operation expected to succeed against a well-formed repository
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error(transparent)]
    Command(#[from] ExternalCommandError),

    /// A precondition of the operation did not hold (e.g. detached HEAD on pull)
    #[error("{0}")]
    Precondition(String),
}

impl RepositoryError {
    pub fn precondition(message: impl fmt::Display) -> Self {
        RepositoryError::Precondition(message.to_string())
    }
}

pub type RepoResult<T> = std::result::Result<T, RepositoryError>;
