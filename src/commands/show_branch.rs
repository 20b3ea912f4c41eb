//! `show-branch`: every branch of every repository, grouped by remote

use anyhow::Result;
use dashmap::DashMap;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use super::Workspace;
use crate::core::{fan_out, Outcome, RepoReport, RunContext, RunStatistics};
use crate::core::{DEFAULT_REMOTE, RELEASE_BRANCH_PREFIX};
use crate::git::Ref;

const REMOTES_ERROR_MESSAGE: &str = "An error was seen getting remotes...";

/// Branch names collected concurrently from all repositories
#[derive(Debug, Default)]
pub struct BranchIndex {
    /// Remote (`None` for local) → branches
    remotes: DashMap<Option<String>, BTreeSet<String>>,
    /// Branch → remotes publishing it
    branches: DashMap<String, BTreeSet<String>>,
}

impl BranchIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds local and remote branches; `release/` branches only when asked
    pub fn add_refs(&self, refs: &[Ref], show_release: bool) {
        for r in refs {
            let Some((remote, branch)) = r.kind().remote_branch() else {
                continue;
            };
            if !show_release && branch.starts_with(RELEASE_BRANCH_PREFIX) {
                continue;
            }
            self.remotes
                .entry(remote.map(str::to_string))
                .or_default()
                .insert(branch.to_string());
            if let Some(remote) = remote {
                self.branches
                    .entry(branch.to_string())
                    .or_default()
                    .insert(remote.to_string());
            }
        }
    }

    /// `Local:` first (with the remotes also publishing each branch), then
    /// the canonical remote, then the other remotes by name
    pub fn render(&self) -> Vec<String> {
        let remotes: BTreeMap<Option<String>, BTreeSet<String>> = self
            .remotes
            .iter()
            .map(|e| (e.key().clone(), e.value().clone()))
            .collect();
        let published: BTreeMap<String, BTreeSet<String>> = self
            .branches
            .iter()
            .map(|e| (e.key().clone(), e.value().clone()))
            .collect();

        let mut lines = Vec::new();
        if let Some(local) = remotes.get(&None) {
            lines.push("Local:".to_string());
            for branch in local {
                match published.get(branch) {
                    Some(names) => {
                        let names: Vec<&str> = names.iter().map(String::as_str).collect();
                        lines.push(format!("  {branch} ({})", names.join(" ")));
                    }
                    None => lines.push(format!("  {branch}")),
                }
            }
        }

        let canonical = Some(DEFAULT_REMOTE.to_string());
        let others = remotes
            .iter()
            .filter(|(name, _)| name.is_some() && **name != canonical);
        for (name, branches) in remotes.get_key_value(&canonical).into_iter().chain(others) {
            lines.push(format!("Remote: {}", name.as_deref().unwrap_or_default()));
            lines.extend(branches.iter().map(|b| format!("  {b}")));
        }
        lines
    }
}

/// Lists branches of the base and all sub-repositories
pub async fn handle_show_branch_command(ctx: &RunContext, show_release: bool) -> Result<()> {
    let workspace = Workspace::open(ctx).await?;
    let mut repos = vec![Arc::clone(&workspace.base)];
    repos.extend(workspace.sub_repositories().await?);

    let index = Arc::new(BranchIndex::new());
    let error = Arc::new(AtomicBool::new(false));
    let stats = RunStatistics::new();

    fan_out(ctx, &stats, repos, |repo| {
        let index = Arc::clone(&index);
        let error = Arc::clone(&error);
        async move {
            match repo.all_refs(None).await {
                Ok(refs) => {
                    index.add_refs(&refs.unwrap_or_default(), show_release);
                    RepoReport::silent()
                }
                Err(e) => {
                    tracing::warn!(repo = repo.label(), "listing refs failed: {e}");
                    error.store(true, Ordering::Relaxed);
                    RepoReport::new(Outcome::Failed, Vec::new())
                }
            }
        }
    })
    .await;

    if error.load(Ordering::Relaxed) {
        ctx.output.line(REMOTES_ERROR_MESSAGE);
    }
    ctx.output.emit(&index.render());
    Ok(())
}
