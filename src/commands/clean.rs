//! `clean`: remove untracked and ignored files

use anyhow::Result;

use super::Workspace;
use crate::core::{fan_out, RepoReport, RunContext, RunStatistics};
use crate::git::RepositoryHandle;

/// Cleans every sub-repository, and the base repository too with `all`
pub async fn handle_clean_command(ctx: &RunContext, all: bool) -> Result<()> {
    let workspace = Workspace::open(ctx).await?;
    let stats = RunStatistics::new();

    if all {
        ctx.report(&stats, clean_repository(&workspace.base).await);
    }

    let repos = workspace.sub_repositories().await?;
    fan_out(ctx, &stats, repos, |repo| async move {
        clean_repository(&repo).await
    })
    .await;

    ctx.print_summary(&stats);
    Ok(())
}

async fn clean_repository(repo: &RepositoryHandle) -> RepoReport {
    match repo.clean().await {
        Ok(()) => RepoReport::done(repo.label()),
        Err(e) => RepoReport::failed(repo.label(), &e),
    }
}
