//! Public API for the core module.
//!
//! This module provides the stable public API for core functionality including:
//! - Super-repository topology
//! - Concurrent fan-out and output serialization
//! - Run statistics
//! - Configuration utilities
//!
//! Internal implementation details are not exposed through this API.

// Topology
pub use super::topology::{parse_manifest, ManifestEntry, Topology};

// Run state
pub use super::context::RunContext;
pub use super::fanout::fan_out;
pub use super::outcome::{Outcome, RepoReport};
pub use super::output::OutputSink;
pub use super::stats::RunStatistics;

// Errors
pub use super::error::{ArgumentError, TopologyError};

// Configuration
pub use super::config::get_concurrency;
pub use super::config::{
    DEFAULT_BRANCH, DEFAULT_REMOTE, DEFAULT_WORKERS, JOBS_ENV_VAR, NULL_HASH,
    RELEASE_BRANCH_PREFIX,
};
