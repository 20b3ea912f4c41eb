//! Which ref a repository's current branch is compared against

use serde::Serialize;

use crate::core::config::DEFAULT_REMOTE;
use crate::git::{Ref, RefKind, RepoResult, RepositoryHandle};

/// The commit (and its display name) used as the comparison base
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Destination {
    pub hash: String,
    /// `branch` for a local ref, `remote/branch` for a remote one
    pub label: String,
}

impl Destination {
    fn new(hash: &str, label: impl Into<String>) -> Self {
        Self {
            hash: hash.to_string(),
            label: label.into(),
        }
    }
}

/// Picks the destination among the refs named after `default_branch`.
///
/// With a configured remote for the local default branch only that remote's
/// copy is considered. Without one, any remote publishing the branch will do,
/// unless several do and none of them is [`DEFAULT_REMOTE`]: that case is
/// ambiguous and yields no remote candidate. A local branch without a usable
/// remote candidate is its own destination.
pub fn select_destination(
    refs: &[Ref],
    default_branch: &str,
    default_remote: Option<&str>,
) -> Option<Destination> {
    let mut local = None;
    let mut remote: Option<Destination> = None;
    let mut multiple = false;
    let mut canonical_found = false;

    for r in refs {
        match r.kind() {
            RefKind::Local(branch) if branch == default_branch => {
                local = Some(Destination::new(&r.hash, branch));
            }
            RefKind::Remote {
                remote: name,
                branch,
            } if branch == default_branch => {
                let label = format!("{name}/{branch}");
                match default_remote {
                    Some(configured) => {
                        if name == configured {
                            remote = Some(Destination::new(&r.hash, label));
                        }
                    }
                    None => {
                        let is_canonical = name == DEFAULT_REMOTE;
                        if remote.is_none() {
                            remote = Some(Destination::new(&r.hash, label));
                            canonical_found |= is_canonical;
                        } else {
                            multiple = true;
                            if is_canonical {
                                remote = Some(Destination::new(&r.hash, label));
                                canonical_found = true;
                            }
                        }
                    }
                }
            }
            _ => {}
        }
    }

    if multiple && !canonical_found {
        remote = None;
    }

    match (local, remote) {
        (None, remote) => remote,
        (Some(local), None) => Some(local),
        (Some(local), Some(remote)) => {
            if default_remote.is_none() {
                Some(local)
            } else {
                Some(remote)
            }
        }
    }
}

/// Resolves the destination of `repo` from its default branch refs
pub async fn resolve_destination(repo: &RepositoryHandle) -> RepoResult<Option<Destination>> {
    let Some(default_branch) = repo.default_branch() else {
        return Ok(None);
    };
    let Some(refs) = repo.all_refs(Some(default_branch)).await? else {
        return Ok(None);
    };
    let default_remote = repo.branch_default_remote(default_branch).await?;
    Ok(select_destination(
        &refs,
        default_branch,
        default_remote.as_deref(),
    ))
}
