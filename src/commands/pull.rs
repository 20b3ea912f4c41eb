//! `pull`: pull every repository on its tracking branch

use anyhow::Result;

use super::Workspace;
use crate::core::{fan_out, RepoReport, RunContext, RunStatistics};
use crate::git::{RepoResult, RepositoryError, RepositoryHandle};

const NOT_TRACKING_MESSAGE: &str = "Not on a tracking branch, can't pull";
const NO_BRANCH_MESSAGE: &str = "No branch to pull / reset to";

/// Pulls the base repository first (without recursing into submodules),
/// then every sub-repository concurrently
pub async fn handle_pull_command(ctx: &RunContext, force: bool) -> Result<()> {
    let workspace = Workspace::open(ctx).await?;
    let stats = RunStatistics::new();

    ctx.report(&stats, pull_repository(&workspace.base, force, false).await);

    let repos = workspace.sub_repositories().await?;
    fan_out(ctx, &stats, repos, move |repo| async move {
        pull_repository(&repo, force, true).await
    })
    .await;

    ctx.print_summary(&stats);
    Ok(())
}

async fn pull_repository(repo: &RepositoryHandle, force: bool, recurse: bool) -> RepoReport {
    match pull_tracking_branch(repo, force, recurse).await {
        Ok(()) => RepoReport::done(repo.label()),
        Err(e) => RepoReport::failed(repo.label(), &e),
    }
}

/// With `force`, local modifications are discarded by a forced checkout of
/// the current branch before pulling
async fn pull_tracking_branch(repo: &RepositoryHandle, force: bool, recurse: bool) -> RepoResult<()> {
    if repo.tracking_branch_of_head().await?.is_none() {
        return Err(RepositoryError::precondition(NOT_TRACKING_MESSAGE));
    }
    if force {
        let Some(branch) = repo.current_branch().await? else {
            return Err(RepositoryError::precondition(NO_BRANCH_MESSAGE));
        };
        repo.checkout(&branch, true).await?;
    }
    repo.pull(false, false, recurse).await
}
