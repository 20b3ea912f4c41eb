//! `checkout-branch`: switch every repository to a branch, with fallbacks

use anyhow::Result;
use std::sync::Arc;

use super::Workspace;
use crate::core::{fan_out, Outcome, RepoReport, RunContext, RunStatistics, DEFAULT_BRANCH};
use crate::git::RepositoryHandle;

#[derive(Debug, Clone, Default)]
pub struct CheckoutOptions {
    /// Branch to switch to; each repository's default branch otherwise
    pub branch: Option<String>,
    /// Discard local modifications
    pub force: bool,
    /// Pull once checked out
    pub pull: bool,
}

/// Branches to try in order: the requested one, then (only for a repository
/// declaring a default branch) that default and the fallback default.
pub fn candidates<'a>(requested: Option<&'a str>, default: Option<&'a str>) -> Vec<&'a str> {
    let mut branches = Vec::new();
    branches.extend(requested);
    if let Some(default) = default {
        branches.push(default);
        branches.push(DEFAULT_BRANCH);
    }
    let mut seen = std::collections::HashSet::new();
    branches.retain(|b| seen.insert(*b));
    branches
}

/// The base repository is switched only when a branch is named, and never
/// falls back; sub-repositories fall back on their default branches
pub async fn handle_checkout_command(ctx: &RunContext, options: CheckoutOptions) -> Result<()> {
    let workspace = Workspace::open(ctx).await?;
    let stats = RunStatistics::new();
    let options = Arc::new(options);

    if options.branch.is_some() {
        let report = checkout_repository(&workspace.base, None, &options, false).await;
        ctx.report(&stats, report);
    }

    let repos = workspace.sub_repositories().await?;
    fan_out(ctx, &stats, repos, |repo| {
        let options = Arc::clone(&options);
        async move {
            let default = repo.default_branch().map(str::to_string);
            checkout_repository(&repo, default.as_deref(), &options, true).await
        }
    })
    .await;

    ctx.print_summary(&stats);
    Ok(())
}

async fn checkout_repository(
    repo: &RepositoryHandle,
    default: Option<&str>,
    options: &CheckoutOptions,
    recurse: bool,
) -> RepoReport {
    let label = repo.label();

    let mut actual = None;
    for branch in candidates(options.branch.as_deref(), default) {
        match repo.checkout(branch, options.force).await {
            Ok(()) => {
                actual = Some(branch.to_string());
                break;
            }
            Err(e) => tracing::debug!(repo = label, branch, "checkout failed: {e}"),
        }
    }

    if options.pull {
        if let Err(e) = repo.pull(false, options.force, recurse).await {
            let branch = match &actual {
                Some(branch) => Some(branch.clone()),
                None => repo.current_branch().await.ok().flatten(),
            };
            let text = format!("Pull FAILED. {}", branch.as_deref().unwrap_or("-"));
            return RepoReport::failed_with(label, &text, &e);
        }
    }

    match actual {
        Some(branch) => RepoReport::header(Outcome::Done, label, Some(&branch)),
        None => RepoReport::header(Outcome::Nothing, label, None),
    }
}
