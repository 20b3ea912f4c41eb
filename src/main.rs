//! superrepo: keep a super-repository and all of its submodules in step
//!
//! Every command runs from the top level of the super-repository, handles the
//! base repository first and then works through the sub-repositories
//! concurrently.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use superrepo::commands::checkout::{handle_checkout_command, CheckoutOptions};
use superrepo::commands::clean::handle_clean_command;
use superrepo::commands::fetch::handle_fetch_command;
use superrepo::commands::init::{handle_init_command, InitOptions};
use superrepo::commands::pull::handle_pull_command;
use superrepo::commands::remove_branch::handle_remove_branch_command;
use superrepo::commands::show_branch::handle_show_branch_command;
use superrepo::commands::status::handle_status_command;
use superrepo::commands::version::handle_version_command;
use superrepo::core::{get_concurrency, ArgumentError, OutputSink, RunContext};
use superrepo::git::GitExecutor;
use superrepo::prune::PruneRequest;

#[derive(Parser)]
#[command(name = "superrepo", version, about = "Manage a super-repository and its submodules")]
struct Cli {
    /// Number of repositories processed at the same time
    #[arg(short, long, global = true)]
    jobs: Option<usize>,

    /// Process one repository at a time
    #[arg(long, global = true)]
    sequential: bool,

    /// Debug logging on stderr (disables the progress bar)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the tool and git versions
    Version,
    /// Prepare a fresh clone: submodules, config, checkout and pull
    Init {
        /// Initialise submodules
        #[arg(short, long)]
        init: bool,
        /// Copy the user identity and standard settings into every repository
        #[arg(short, long)]
        config: bool,
        /// Check out each sub-repository's default branch
        #[arg(short = 'b', long)]
        checkout: bool,
        /// Pull every sub-repository
        #[arg(short, long)]
        pull: bool,
        /// Force checkout and submodule update
        #[arg(short, long)]
        force: bool,
    },
    /// Pull the base repository, then every sub-repository
    Pull {
        /// Reset the working tree to the current branch before pulling
        #[arg(short, long)]
        force: bool,
    },
    /// Fetch all remotes of every repository
    Fetch {
        /// Allow non-fast-forward ref updates
        #[arg(short, long)]
        force: bool,
    },
    /// Remove untracked and ignored files from the sub-repositories
    Clean {
        /// Clean the base repository as well
        #[arg(short, long)]
        all: bool,
    },
    /// Show how every repository relates to its destination branch
    Status {
        /// Full hashes and a wider label column
        #[arg(short, long)]
        long: bool,
        /// One JSON object per repository
        #[arg(long)]
        json: bool,
    },
    /// Check out a branch, or each repository's default branch
    #[command(visible_alias = "cobr")]
    CheckoutBranch {
        /// Branch to check out everywhere
        branch: Option<String>,
        /// Discard local changes
        #[arg(short, long)]
        force: bool,
        /// Pull after the checkout
        #[arg(short, long)]
        pull: bool,
    },
    /// List the branches of all repositories by remote
    #[command(visible_alias = "shbr")]
    ShowBranch {
        /// Include release branches
        #[arg(short = 'r', long)]
        show_release: bool,
    },
    /// Delete branches locally, on remotes, or prune merged tracking branches
    #[command(visible_alias = "rmbr")]
    RemoveBranch {
        /// Delete the local branches
        #[arg(short, long)]
        local: bool,
        /// Delete the branches on every remote publishing them
        #[arg(short, long)]
        remote: bool,
        /// Delete branches whose upstream no longer exists
        #[arg(short, long)]
        prune: bool,
        branches: Vec<String>,
    },
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    let cwd = std::env::current_dir()?;
    let workers = get_concurrency(cli.jobs, cli.sequential);
    let output = Arc::new(OutputSink::stdout(!cli.verbose));
    let ctx = RunContext::new(GitExecutor::system(), workers, output, cwd);
    tracing::debug!(workers, cwd = %ctx.cwd.display(), "starting");

    match cli.command {
        Commands::Version => handle_version_command(&ctx).await,
        Commands::Init {
            init,
            config,
            checkout,
            pull,
            force,
        } => {
            let options = InitOptions::new(init, config, checkout, pull, force);
            handle_init_command(&ctx, options).await
        }
        Commands::Pull { force } => handle_pull_command(&ctx, force).await,
        Commands::Fetch { force } => handle_fetch_command(&ctx, force).await,
        Commands::Clean { all } => handle_clean_command(&ctx, all).await,
        Commands::Status { long, json } => handle_status_command(&ctx, long, json).await,
        Commands::CheckoutBranch {
            branch,
            force,
            pull,
        } => {
            let options = CheckoutOptions {
                branch,
                force,
                pull,
            };
            handle_checkout_command(&ctx, options).await
        }
        Commands::ShowBranch { show_release } => {
            handle_show_branch_command(&ctx, show_release).await
        }
        Commands::RemoveBranch {
            local,
            remote,
            prune,
            branches,
        } => {
            let request = PruneRequest::new(local, remote, prune, branches)?;
            handle_remove_branch_command(&ctx, request).await
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            if e.downcast_ref::<ArgumentError>().is_some() {
                ExitCode::from(2)
            } else {
                ExitCode::FAILURE
            }
        }
    }
}
