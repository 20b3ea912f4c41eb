//! Configuration constants and settings

// Concurrency Configuration
//
// Every repository task spends nearly all of its time waiting on `git`, so the
// pool is sized for I/O rather than CPU cores.

/// Default number of repositories processed at the same time
pub const DEFAULT_WORKERS: usize = 8;

/// Environment variable overriding the worker count
pub const JOBS_ENV_VAR: &str = "SUPERREPO_JOBS";

/// Determines the worker count for the fan-out based on CLI args and environment
///
/// Priority order:
/// 1. --sequential flag → 1
/// 2. --jobs N flag → N
/// 3. SUPERREPO_JOBS env var → N
/// 4. Default → 8
pub fn get_concurrency(jobs: Option<usize>, sequential: bool) -> usize {
    if sequential {
        return 1;
    }

    if let Some(n) = jobs {
        return n.max(1);
    }

    if let Ok(value) = std::env::var(JOBS_ENV_VAR) {
        match value.parse::<usize>() {
            Ok(n) if n > 0 => return n,
            _ => tracing::warn!("ignoring invalid {JOBS_ENV_VAR}={value}"),
        }
    }

    DEFAULT_WORKERS
}

// Repository conventions
pub const DEFAULT_BRANCH: &str = "master";
pub const DEFAULT_REMOTE: &str = "origin";
pub const RELEASE_BRANCH_PREFIX: &str = "release/";
pub const BASE_LABEL: &str = "base";
pub const SUBMODULE_MANIFEST: &str = ".gitmodules";
pub const SUBMODULE_INIT_JOBS: &str = "8";

/// Reported as the current hash of a branch that has no commits yet
pub const NULL_HASH: &str = "0000000000000000000000000000000000000000";

// Status display widths (short / long output)
pub const SHORT_HASH_WIDTH: usize = 11;
pub const SHORT_LABEL_WIDTH: usize = 30;
pub const LONG_LABEL_WIDTH: usize = 40;

// UI Constants
pub const NOT_AT_BASE_MESSAGE: &str = "Not at the top level repository.";
pub const PROGRESS_TEMPLATE: &str = "{spinner} {pos}/{len} {wide_msg}";
