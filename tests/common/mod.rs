//! Common test utilities and helpers
#![allow(dead_code, unused_imports)]

pub mod fixtures;
pub mod git;

pub use self::fixtures::{capture_context, SuperRepo, SuperRepoBuilder};
pub use self::git::{
    add_git_remote, create_test_commit, git, git_output, is_git_available, setup_git_repo,
};

/// Prints the skip notice and returns true when git is missing
pub fn skip_without_git() -> bool {
    if is_git_available() {
        return false;
    }
    eprintln!("Git not available, skipping test");
    true
}
