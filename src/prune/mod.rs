//! Selection and deletion of branches under local/remote/prune modes
//!
//! Planning is a pure function of the repository's branch map, its
//! configured branch remotes and the protected branches, so every rule can be
//! checked without a repository on disk.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::core::outcome::{header_line, Outcome, RepoReport};
use crate::core::ArgumentError;
use crate::git::{RemoteBranchMap, RepoResult, RepositoryHandle};

/// Branches that are never deleted besides the current and default ones
const ALWAYS_SAFE: &[&str] = &["HEAD", "FETCH_HEAD"];

/// What the user asked to delete
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PruneRequest {
    pub local: bool,
    pub remote: bool,
    pub prune: bool,
    pub branches: Vec<String>,
}

impl PruneRequest {
    /// Validates the mode flags. No mode means `local`; `local` and `remote`
    /// need explicit branch names.
    pub fn new(
        local: bool,
        remote: bool,
        prune: bool,
        branches: Vec<String>,
    ) -> Result<Self, ArgumentError> {
        let local = local || !(remote || prune);
        if (local || remote) && branches.is_empty() {
            return Err(ArgumentError::new(
                "Must specify at least one branch when using option --local or --remote",
            ));
        }
        Ok(Self {
            local,
            remote,
            prune,
            branches,
        })
    }

    /// Branches restricting the orphan scan; `None` scans every local branch
    fn prune_filter(&self) -> Option<&[String]> {
        if self.remote || self.branches.is_empty() {
            None
        } else {
            Some(&self.branches)
        }
    }
}

/// Remote (`None` for local) → branches to delete
pub type BranchSet = BTreeMap<Option<String>, BTreeSet<String>>;

/// Protected branch names of one repository
pub struct SafeBranches<'a> {
    pub current: Option<&'a str>,
    pub default: Option<&'a str>,
}

impl SafeBranches<'_> {
    pub fn contains(&self, branch: &str) -> bool {
        self.current == Some(branch)
            || self.default == Some(branch)
            || ALWAYS_SAFE.contains(&branch)
    }
}

fn add(plan: &mut BranchSet, remote: Option<&str>, branch: &str) {
    plan.entry(remote.map(str::to_string))
        .or_default()
        .insert(branch.to_string());
}

/// Computes the deletions for one repository.
///
/// - `local`: requested branches that exist locally.
/// - `remote`: requested branches on every remote publishing them, plus
///   their local copies when `prune` is also set.
/// - `prune`: local branches with a configured remote that no longer has
///   them (or no longer exists).
///
/// Protected branches are never part of the plan.
pub fn plan(
    request: &PruneRequest,
    refs: &RemoteBranchMap,
    branch_remotes: &HashMap<String, String>,
    safe: &SafeBranches<'_>,
) -> BranchSet {
    let mut plan = BranchSet::new();
    let add_existing = |plan: &mut BranchSet, remote: Option<&str>, branch: &str| {
        if refs.contains(remote, branch) && !safe.contains(branch) {
            add(plan, remote, branch);
        }
    };

    for (remote, present) in refs.iter() {
        match remote {
            None => {
                if request.local {
                    for branch in &request.branches {
                        add_existing(&mut plan, None, branch.as_str());
                    }
                }
                if request.prune {
                    let filter = request.prune_filter();
                    for branch in present {
                        let Some(configured) = branch_remotes.get(branch) else {
                            continue;
                        };
                        let orphaned = !refs.contains(Some(configured.as_str()), branch);
                        let wanted = filter.map_or(true, |names| names.contains(branch));
                        if orphaned && wanted && !safe.contains(branch) {
                            add(&mut plan, None, branch);
                        }
                    }
                }
            }
            Some(name) => {
                if request.remote {
                    for branch in &request.branches {
                        add_existing(&mut plan, Some(name), branch.as_str());
                        if request.prune {
                            add_existing(&mut plan, None, branch.as_str());
                        }
                    }
                }
            }
        }
    }
    plan
}

/// Result of executing a plan
#[derive(Debug, Default, PartialEq, Eq)]
pub struct PruneResult {
    pub deleted: BranchSet,
    /// Remote (`None` for local) → branch → error rendering
    pub failed: BTreeMap<Option<String>, BTreeMap<String, String>>,
}

impl PruneResult {
    pub fn outcome(&self) -> Outcome {
        if !self.failed.is_empty() {
            Outcome::Failed
        } else if !self.deleted.is_empty() {
            Outcome::Done
        } else {
            Outcome::Nothing
        }
    }

    /// `FAILED:` block then `Deleted:` block; nothing when nothing happened
    pub fn render(&self, label: &str) -> RepoReport {
        let mut lines = Vec::new();
        if !self.failed.is_empty() {
            lines.push(header_line(Outcome::Failed.symbol(), label, "FAILED:", None));
            for branches in self.failed.values() {
                for (branch, error) in branches {
                    let mut error_lines = error.lines();
                    let first = error_lines.next().unwrap_or_default();
                    lines.push(format!("  {branch}: {first}"));
                    lines.extend(error_lines.map(|l| format!("    {l}")));
                }
            }
        }
        if !self.deleted.is_empty() {
            lines.push(header_line(Outcome::Done.symbol(), label, "Deleted:", None));
            for (remote, branches) in &self.deleted {
                let names = branches.iter().cloned().collect::<Vec<_>>().join(" ");
                match remote {
                    None => lines.push(format!("  (local) => {names}")),
                    Some(remote) => lines.push(format!("  {remote} => {names}")),
                }
            }
        }
        RepoReport::new(self.outcome(), lines)
    }
}

/// Deletes every planned branch; each deletion succeeds or fails on its own
pub async fn execute(repo: &RepositoryHandle, plan: &BranchSet) -> PruneResult {
    let mut result = PruneResult::default();
    for (remote, branches) in plan {
        for branch in branches {
            match repo.delete_branch(branch, remote.as_deref()).await {
                Ok(()) => {
                    result
                        .deleted
                        .entry(remote.clone())
                        .or_default()
                        .insert(branch.clone());
                }
                Err(e) => {
                    tracing::debug!(repo = repo.label(), branch = %branch, "delete failed: {e}");
                    result
                        .failed
                        .entry(remote.clone())
                        .or_default()
                        .insert(branch.clone(), e.to_string());
                }
            }
        }
    }
    result
}

/// Gathers the repository state, plans and executes
pub async fn prune_repository(
    repo: &RepositoryHandle,
    request: &PruneRequest,
) -> RepoResult<PruneResult> {
    let refs = repo.branches_by_remote().await?;
    let branch_remotes = repo.default_remotes_map().await?;
    let current = repo.current_branch().await?;
    let safe = SafeBranches {
        current: current.as_deref(),
        default: repo.default_branch(),
    };
    let plan = plan(request, &refs, &branch_remotes, &safe);
    Ok(execute(repo, &plan).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(entries: &[(Option<&str>, &[&str])]) -> RemoteBranchMap {
        let mut map = RemoteBranchMap::default();
        for (remote, branches) in entries {
            for branch in *branches {
                map.insert(*remote, branch);
            }
        }
        map
    }

    fn remotes(entries: &[(&str, &str)]) -> HashMap<String, String> {
        entries
            .iter()
            .map(|(b, r)| (b.to_string(), r.to_string()))
            .collect()
    }

    fn request(local: bool, remote: bool, prune: bool, branches: &[&str]) -> PruneRequest {
        PruneRequest::new(
            local,
            remote,
            prune,
            branches.iter().map(|b| b.to_string()).collect(),
        )
        .unwrap()
    }

    fn planned(plan: &BranchSet, remote: Option<&str>) -> Vec<String> {
        plan.get(&remote.map(str::to_string))
            .map(|s| s.iter().cloned().collect())
            .unwrap_or_default()
    }

    const SAFE: SafeBranches<'static> = SafeBranches {
        current: Some("topic"),
        default: Some("main"),
    };

    #[test]
    fn test_local_is_implied_and_needs_branches() {
        let req = PruneRequest::new(false, false, false, vec!["x".into()]).unwrap();
        assert!(req.local);
        assert!(PruneRequest::new(false, false, false, vec![]).is_err());
        assert!(PruneRequest::new(false, true, false, vec![]).is_err());

        let req = PruneRequest::new(false, false, true, vec![]).unwrap();
        assert!(!req.local);
        assert!(req.prune);
    }

    #[test]
    fn test_local_mode_deletes_existing_unprotected_branches() {
        let refs = map(&[(None, &["main", "topic", "old", "HEAD"])]);
        let req = request(true, false, false, &["old", "main", "topic", "HEAD", "missing"]);

        let plan = plan(&req, &refs, &HashMap::new(), &SAFE);
        assert_eq!(planned(&plan, None), vec!["old"]);
        assert_eq!(plan.len(), 1);
    }

    #[test]
    fn test_remote_mode_deletes_on_every_publishing_remote() {
        let refs = map(&[
            (None, &["old"]),
            (Some("origin"), &["old", "main"]),
            (Some("fork"), &["old"]),
            (Some("backup"), &["main"]),
        ]);
        let req = request(false, true, false, &["old", "main"]);

        let plan = plan(&req, &refs, &HashMap::new(), &SAFE);
        assert_eq!(planned(&plan, Some("origin")), vec!["old"]);
        assert_eq!(planned(&plan, Some("fork")), vec!["old"]);
        assert!(planned(&plan, Some("backup")).is_empty());
        assert!(planned(&plan, None).is_empty());
    }

    #[test]
    fn test_remote_prune_also_removes_local_copy() {
        let refs = map(&[(None, &["old"]), (Some("origin"), &["old"])]);
        let req = request(false, true, true, &["old"]);

        let plan = plan(&req, &refs, &HashMap::new(), &SAFE);
        assert_eq!(planned(&plan, Some("origin")), vec!["old"]);
        assert_eq!(planned(&plan, None), vec!["old"]);
    }

    #[test]
    fn test_remote_prune_of_current_branch_deletes_nothing() {
        let refs = map(&[(None, &["topic"]), (Some("origin"), &["topic"])]);
        let req = request(false, true, true, &["topic"]);

        let plan = plan(&req, &refs, &remotes(&[("topic", "origin")]), &SAFE);
        assert!(plan.is_empty());
    }

    #[test]
    fn test_prune_marks_only_orphaned_tracking_branches() {
        let refs = map(&[
            (None, &["main", "topic", "gone", "kept", "unpushed", "lost-remote"]),
            (Some("origin"), &["main", "kept"]),
        ]);
        let branch_remotes = remotes(&[
            ("main", "origin"),
            ("topic", "origin"),
            ("gone", "origin"),
            ("kept", "origin"),
            ("lost-remote", "vanished"),
        ]);
        let req = request(false, false, true, &[]);

        let plan = plan(&req, &refs, &branch_remotes, &SAFE);
        assert_eq!(planned(&plan, None), vec!["gone", "lost-remote"]);
    }

    #[test]
    fn test_prune_with_names_only_considers_those() {
        let refs = map(&[(None, &["a", "b"]), (Some("origin"), &["main"])]);
        let branch_remotes = remotes(&[("a", "origin"), ("b", "origin")]);
        let req = request(false, false, true, &["b"]);

        let plan = plan(&req, &refs, &branch_remotes, &SAFE);
        assert_eq!(planned(&plan, None), vec!["b"]);
    }

    #[test]
    fn test_remote_prune_scans_all_orphans() {
        let refs = map(&[(None, &["a", "b"]), (Some("origin"), &["b"])]);
        let branch_remotes = remotes(&[("a", "origin"), ("b", "origin")]);
        let req = request(false, true, true, &["b"]);

        let plan = plan(&req, &refs, &branch_remotes, &SAFE);
        assert_eq!(planned(&plan, Some("origin")), vec!["b"]);
        assert_eq!(planned(&plan, None), vec!["a", "b"]);
    }

    #[test]
    fn test_protected_branches_never_planned() {
        let all = ["main", "topic", "HEAD", "FETCH_HEAD"];
        let refs = map(&[(None, &all), (Some("origin"), &["x"])]);
        let branch_remotes: HashMap<String, String> =
            all.iter().map(|b| (b.to_string(), "origin".to_string())).collect();

        for (local, remote, prune) in [
            (true, false, false),
            (false, true, true),
            (true, true, true),
            (false, false, true),
        ] {
            let req = request(local, remote, prune, &all);
            let plan = plan(&req, &refs, &branch_remotes, &SAFE);
            assert!(plan.is_empty(), "mode ({local}, {remote}, {prune})");
        }
    }

    #[test]
    fn test_render_blocks() {
        let mut result = PruneResult::default();
        result
            .deleted
            .entry(None)
            .or_default()
            .extend(["a".to_string(), "b".to_string()]);
        result
            .deleted
            .entry(Some("origin".to_string()))
            .or_default()
            .insert("a".to_string());
        result
            .failed
            .entry(Some("fork".to_string()))
            .or_default()
            .insert("c".to_string(), "Command 'git push fork :c' returned 1.".to_string());

        let report = result.render("libs/core");
        assert_eq!(report.outcome, Outcome::Failed);
        assert_eq!(
            report.lines,
            vec![
                "🔴 libs/core... FAILED:",
                "  c: Command 'git push fork :c' returned 1.",
                "🟢 libs/core... Deleted:",
                "  (local) => a b",
                "  origin => a",
            ]
        );
    }

    #[test]
    fn test_nothing_to_report_is_silent() {
        let report = PruneResult::default().render("lib");
        assert_eq!(report.outcome, Outcome::Nothing);
        assert!(report.lines.is_empty());
    }
}
