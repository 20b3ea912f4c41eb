//! `status`: one line per repository

use anyhow::Result;

use super::Workspace;
use crate::core::{fan_out, Outcome, RepoReport, RunContext, RunStatistics};
use crate::git::RepositoryHandle;
use crate::status::{self, label_width};

/// Prints the base repository's status, then every sub-repository's
pub async fn handle_status_command(ctx: &RunContext, long: bool, json: bool) -> Result<()> {
    let workspace = Workspace::open(ctx).await?;
    let stats = RunStatistics::new();

    ctx.report(&stats, status_report(&workspace.base, long, json).await);

    let repos = workspace.sub_repositories().await?;
    fan_out(ctx, &stats, repos, move |repo| async move {
        status_report(&repo, long, json).await
    })
    .await;

    // Keep the JSON stream machine readable
    if !json {
        ctx.print_summary(&stats);
    }
    Ok(())
}

async fn status_report(repo: &RepositoryHandle, long: bool, json: bool) -> RepoReport {
    let label = if json {
        repo.label().to_string()
    } else {
        repo.display_label(label_width(long))
    };

    let snapshot = match status::resolve(repo, &label).await {
        Ok(snapshot) => snapshot,
        Err(e) if json => {
            let line = serde_json::json!({ "label": label, "error": e.to_string() });
            return RepoReport::new(Outcome::Failed, vec![line.to_string()]);
        }
        Err(e) => return RepoReport::failed(&label, &e),
    };

    if !json {
        return RepoReport::new(Outcome::Done, status::render(&snapshot, long));
    }
    match serde_json::to_string(&snapshot) {
        Ok(line) => RepoReport::new(Outcome::Done, vec![line]),
        Err(e) => RepoReport::failed(&label, &e),
    }
}
