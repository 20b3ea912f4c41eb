//! Structural errors that abort a whole command

use crate::git::ExternalCommandError;

use super::config::{NOT_AT_BASE_MESSAGE, SUBMODULE_MANIFEST};

/// The super-repository layout does not allow the command to run
#[derive(Debug, thiserror::Error)]
pub enum TopologyError {
    #[error("{NOT_AT_BASE_MESSAGE}")]
    NotAtBase,

    #[error("Not inside a git repository.")]
    NoRepository,

    #[error("No {SUBMODULE_MANIFEST} found at the top level repository.")]
    MissingManifest,

    #[error("Could not read {SUBMODULE_MANIFEST}: {0}")]
    ManifestUnreadable(#[source] ExternalCommandError),
}

/// The command line was well-formed for clap but not for the command
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct ArgumentError {
    message: String,
}

impl ArgumentError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
