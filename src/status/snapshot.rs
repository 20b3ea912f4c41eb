//! Per-repository synchronization status

use serde::Serialize;

use super::destination::{resolve_destination, Destination};
use crate::core::config::NULL_HASH;
use crate::git::{RepoResult, RepositoryHandle};

/// What is checked out
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Current {
    /// [`NULL_HASH`] on a branch without commits
    pub hash: String,
    /// `None` on a detached HEAD
    pub branch: Option<String>,
}

impl Current {
    pub fn is_unborn(&self) -> bool {
        self.hash == NULL_HASH
    }
}

/// HEAD's upstream
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Tracking {
    /// Short name, `remote/branch`
    pub branch: String,
    /// `None` when the upstream ref no longer exists
    pub hash: Option<String>,
}

/// Divergence between the current commit and its upstream
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PushState {
    /// Commits only on the local branch
    pub local_ahead: Option<u32>,
    /// Commits only on the tracking branch
    pub local_behind: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusSnapshot {
    pub label: String,
    /// `None` only for a detached HEAD without any commit
    pub current: Option<Current>,
    /// `None` (unknown) when there is no commit to compare against
    pub dirty: Option<bool>,
    pub default_branch: Option<String>,
    pub destination: Option<Destination>,
    pub merge_base: Option<String>,
    /// Only meaningful with a destination
    pub ahead: Option<u32>,
    pub behind: Option<u32>,
    pub rebase_needed: bool,
    pub tracking: Option<Tracking>,
    /// Present when the current commit differs from a resolvable upstream
    pub push: Option<PushState>,
}

impl StatusSnapshot {
    pub fn push_required(&self) -> bool {
        self.push.is_some()
    }

    pub fn current_hash(&self) -> Option<&str> {
        self.current.as_ref().map(|c| c.hash.as_str())
    }

    pub fn current_branch(&self) -> Option<&str> {
        self.current.as_ref().and_then(|c| c.branch.as_deref())
    }
}

async fn current_of(repo: &RepositoryHandle) -> RepoResult<Option<Current>> {
    let branch = repo.current_branch().await?;
    let hash = repo.current_hash().await?;
    Ok(match (hash, branch) {
        (None, None) => None,
        (hash, branch) => Some(Current {
            hash: hash.unwrap_or_else(|| NULL_HASH.to_string()),
            branch,
        }),
    })
}

/// Computes the status of `repo`, reported under `label`
pub async fn resolve(repo: &RepositoryHandle, label: &str) -> RepoResult<StatusSnapshot> {
    let current = current_of(repo).await?;
    let dirty = match &current {
        Some(current) if !current.is_unborn() => Some(repo.is_dirty().await?),
        _ => None,
    };
    let current_hash = current.as_ref().map(|c| c.hash.as_str());

    let destination = resolve_destination(repo).await?;
    let (merge_base, ahead, behind, rebase_needed) = match &destination {
        None => (None, None, None, false),
        Some(dest) => {
            let base = repo.merge_base(current_hash, Some(&dest.hash)).await?;
            let ahead = repo.count_commits(current_hash, base.as_deref()).await?;
            let behind = repo.count_commits(Some(&dest.hash), base.as_deref()).await?;
            let rebase = base.as_deref() != Some(dest.hash.as_str());
            (base, ahead, behind, rebase)
        }
    };

    let tracking = match repo.tracking_branch_of_head().await? {
        Some(branch) => {
            let hash = repo.ref_hash(&branch).await?;
            Some(Tracking { branch, hash })
        }
        None => None,
    };

    let push = match tracking.as_ref().and_then(|t| t.hash.as_deref()) {
        Some(upstream) if Some(upstream) != current_hash => {
            let base = repo.merge_base(current_hash, Some(upstream)).await?;
            Some(PushState {
                local_ahead: repo.count_commits(current_hash, base.as_deref()).await?,
                local_behind: repo.count_commits(Some(upstream), base.as_deref()).await?,
            })
        }
        _ => None,
    };

    Ok(StatusSnapshot {
        label: label.to_string(),
        current,
        dirty,
        default_branch: repo.default_branch().map(str::to_string),
        destination,
        merge_base,
        ahead,
        behind,
        rebase_needed,
        tracking,
        push,
    })
}
