//! `fetch`: fetch all remotes of every repository

use anyhow::Result;

use super::Workspace;
use crate::core::{fan_out, RepoReport, RunContext, RunStatistics};
use crate::git::RepositoryHandle;

/// Fetches the base repository (without recursing into submodules), then
/// every sub-repository concurrently
pub async fn handle_fetch_command(ctx: &RunContext, force: bool) -> Result<()> {
    let workspace = Workspace::open(ctx).await?;
    let stats = RunStatistics::new();

    ctx.report(&stats, fetch_repository(&workspace.base, force, false).await);

    let repos = workspace.sub_repositories().await?;
    fan_out(ctx, &stats, repos, move |repo| async move {
        fetch_repository(&repo, force, true).await
    })
    .await;

    ctx.print_summary(&stats);
    Ok(())
}

async fn fetch_repository(repo: &RepositoryHandle, force: bool, recurse: bool) -> RepoReport {
    match repo.fetch(force, recurse).await {
        Ok(()) => RepoReport::done(repo.label()),
        Err(e) => RepoReport::failed(repo.label(), &e),
    }
}
