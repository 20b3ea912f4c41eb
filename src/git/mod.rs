//! Git command execution and single-repository operations

pub(crate) mod error;
pub(crate) mod executor;
pub(crate) mod refs;
pub(crate) mod repository;

pub use error::{ExternalCommandError, RepoResult, RepositoryError};
pub use executor::{CommandOutput, CommandRunner, GitExecutor, ProcessRunner, GIT_PROGRAM};
pub use refs::{Ref, RefKind, RemoteBranchMap};
pub use repository::{parse_branch_remotes, RepositoryHandle};
