//! `init`: prepare a fresh clone of the super-repository for work

use anyhow::Result;

use super::Workspace;
use crate::core::{fan_out, Outcome, RepoReport, RunContext, RunStatistics};
use crate::git::{RepoResult, RepositoryHandle};

const MISSING_IDENTITY_MESSAGE: &str =
    "Please set the user name and email in the super project top level repository.";

/// Steps of `init`; none selected means all of them
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InitOptions {
    /// `git submodule update --init` at the root
    pub init: bool,
    /// Copy the base identity and apply the standard configuration
    pub config: bool,
    /// Check out each sub-repository's default branch
    pub checkout: bool,
    /// Fast-forward pull each sub-repository
    pub pull: bool,
    /// Forced checkout, and forced submodule update
    pub force: bool,
}

impl InitOptions {
    pub fn new(init: bool, config: bool, checkout: bool, pull: bool, force: bool) -> Self {
        let all = !(init || config || checkout || pull);
        Self {
            init: init || all,
            config: config || all,
            checkout: checkout || all,
            pull: pull || all,
            force,
        }
    }
}

#[derive(Debug, Clone)]
struct Identity {
    name: String,
    email: String,
}

/// Configures the base repository and initializes submodules, then
/// configures, checks out and pulls every sub-repository concurrently
pub async fn handle_init_command(ctx: &RunContext, options: InitOptions) -> Result<()> {
    let workspace = Workspace::open(ctx).await?;
    if options.init {
        workspace.topology.require_manifest().await?;
    }

    let identity = if options.config {
        let name = workspace.base.user_name().await?;
        let email = workspace.base.user_email().await?;
        match (name, email) {
            (Some(name), Some(email)) => Some(Identity { name, email }),
            _ => anyhow::bail!(MISSING_IDENTITY_MESSAGE),
        }
    } else {
        None
    };

    let stats = RunStatistics::new();
    let mut base = RepoReport::new(
        Outcome::Done,
        vec![format!("Initialising: {}", workspace.base.label())],
    );

    if let Some(identity) = &identity {
        base.push(format!("  Using {} <{}>", identity.name, identity.email));
        match workspace.base.set_standard_config(false).await {
            Ok(()) => base.push("  Setting Config... DONE."),
            Err(e) => {
                base.outcome = Outcome::Failed;
                base.push("  Setting Config... FAILED.");
                base.lines.extend(indent(&e));
            }
        }
    }

    if options.init {
        match workspace.topology.init_submodules(options.force).await {
            Ok(()) => base.push("  Submodule Init... DONE."),
            Err(e) => {
                base.outcome = Outcome::Failed;
                base.push("  Submodule Init... FAILED.");
                base.lines.extend(indent(&e));
                ctx.report(&stats, base);
                return Ok(());
            }
        }
    }
    ctx.report(&stats, base);

    let repos = workspace.sub_repositories().await?;
    fan_out(ctx, &stats, repos, |repo| {
        let identity = identity.clone();
        async move {
            match init_repository(&repo, options, identity.as_ref()).await {
                Ok(()) => RepoReport::done(repo.label()),
                Err(e) => RepoReport::failed(repo.label(), &e),
            }
        }
    })
    .await;

    ctx.print_summary(&stats);
    Ok(())
}

async fn init_repository(
    repo: &RepositoryHandle,
    options: InitOptions,
    identity: Option<&Identity>,
) -> RepoResult<()> {
    if let Some(identity) = identity {
        repo.set_user_identity(&identity.name, &identity.email).await?;
        repo.set_standard_config(true).await?;
    }
    if options.checkout {
        repo.checkout_default(options.force).await?;
    }
    if options.pull {
        repo.pull(true, true, true).await?;
    }
    Ok(())
}

fn indent(error: &dyn std::fmt::Display) -> Vec<String> {
    error
        .to_string()
        .lines()
        .map(|line| format!("    {line}"))
        .collect()
}
