//! `remove-branch`: delete branches locally, on remotes, or prune orphans

use anyhow::Result;
use std::sync::Arc;

use super::Workspace;
use crate::core::{fan_out, RepoReport, RunContext, RunStatistics};
use crate::prune::{prune_repository, PruneRequest};

/// Runs the same request on the base and every sub-repository concurrently
pub async fn handle_remove_branch_command(ctx: &RunContext, request: PruneRequest) -> Result<()> {
    let workspace = Workspace::open(ctx).await?;
    let mut repos = vec![Arc::clone(&workspace.base)];
    repos.extend(workspace.sub_repositories().await?);

    let request = Arc::new(request);
    let stats = RunStatistics::new();

    fan_out(ctx, &stats, repos, |repo| {
        let request = Arc::clone(&request);
        async move {
            match prune_repository(&repo, &request).await {
                Ok(result) => result.render(repo.label()),
                Err(e) => RepoReport::failed(repo.label(), &e),
            }
        }
    })
    .await;

    ctx.print_summary(&stats);
    Ok(())
}
