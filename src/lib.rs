//! # superrepo
//!
//! `superrepo` drives `git` across a super-repository and the sub-repositories
//! declared in its `.gitmodules`. It powers the `superrepo` CLI.
//!
//! ## Core Features
//!
//! - **Topology**: locates the super-repository root and reads the manifest.
//! - **Concurrent Operations**: init, pull, fetch, clean and checkout across
//!   every sub-repository with a bounded worker pool.
//! - **Status**: ahead/behind counts against each repository's destination
//!   branch, plus dirty, push and rebase flags.
//! - **Branch Pruning**: deletes branches locally, on remotes, or once their
//!   upstream is gone.
//!
//! ## Example
//!
//! ```rust,no_run
//! use superrepo::core::Topology;
//! use superrepo::git::GitExecutor;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let topology = Topology::new(GitExecutor::system(), std::env::current_dir()?);
//!     for repo in topology.discover_sub_repositories().await? {
//!         println!("{}: {:?}", repo.label(), repo.default_branch());
//!     }
//!     Ok(())
//! }
//! ```

pub mod commands;
pub mod core;
pub mod git;
pub mod prune;
pub mod status;
pub mod utils;
