//! High-level operations on a single repository

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tokio::sync::OnceCell;

use super::error::{RepoResult, RepositoryError};
use super::executor::{CommandOutput, GitExecutor};
use super::refs::{Ref, RemoteBranchMap};
use crate::core::config::{DEFAULT_BRANCH, DEFAULT_REMOTE};
use crate::utils::shorten_path;

// Git command arguments
const GIT_TOPLEVEL_ARGS: &[&str] = &["rev-parse", "--show-toplevel"];
const GIT_CURRENT_BRANCH_ARGS: &[&str] = &["symbolic-ref", "-q", "--short", "HEAD"];
const GIT_HEAD_REF_ARGS: &[&str] = &["symbolic-ref", "-q", "HEAD"];
const GIT_CURRENT_HASH_ARGS: &[&str] = &["rev-parse", "HEAD"];
const GIT_REFRESH_INDEX_ARGS: &[&str] = &["update-index", "-q", "--refresh"];
const GIT_DIFF_WORKTREE_ARGS: &[&str] = &["diff-index", "--quiet", "HEAD", "--"];
const GIT_DIFF_STAGED_ARGS: &[&str] = &["diff-index", "--quiet", "--cached", "HEAD", "--"];
const GIT_LOCAL_CONFIG_LIST_ARGS: &[&str] = &["config", "--local", "--list"];
const GIT_CLEAN_ARGS: &[&str] = &["clean", "-xfd"];

/// `core.autocrlf` value for the host platform
#[cfg(windows)]
const AUTOCRLF: &str = "true";
#[cfg(not(windows))]
const AUTOCRLF: &str = "input";

/// One repository's working directory and the queries/mutations on it
///
/// Created once per repository per command; cached values (top level, user
/// identity) are never invalidated during a run.
pub struct RepositoryHandle {
    git: GitExecutor,
    relative_path: String,
    path: PathBuf,
    label: Option<String>,
    default_branch: Option<String>,
    origin_url: Option<String>,
    top_level: OnceCell<PathBuf>,
    user_name: Mutex<Option<String>>,
    user_email: Mutex<Option<String>>,
}

impl std::fmt::Debug for RepositoryHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RepositoryHandle")
            .field("relative_path", &self.relative_path)
            .field("path", &self.path)
            .field("default_branch", &self.default_branch)
            .field("origin_url", &self.origin_url)
            .finish()
    }
}

impl RepositoryHandle {
    /// Handle for `relative_path` resolved against `base`, with the fallback
    /// default branch
    pub fn new(git: GitExecutor, relative_path: impl Into<String>, base: &Path) -> Self {
        let relative_path = relative_path.into();
        let path = base.join(&relative_path);
        Self {
            git,
            relative_path,
            path,
            label: None,
            default_branch: Some(DEFAULT_BRANCH.to_string()),
            origin_url: None,
            top_level: OnceCell::new(),
            user_name: Mutex::new(None),
            user_email: Mutex::new(None),
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_default_branch(mut self, branch: Option<String>) -> Self {
        self.default_branch = branch;
        self
    }

    pub fn with_origin_url(mut self, url: Option<String>) -> Self {
        self.origin_url = url;
        self
    }

    pub fn relative_path(&self) -> &str {
        &self.relative_path
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn default_branch(&self) -> Option<&str> {
        self.default_branch.as_deref()
    }

    pub fn origin_url(&self) -> Option<&str> {
        self.origin_url.as_deref()
    }

    /// Explicit label, or the relative path
    pub fn label(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.relative_path)
    }

    /// Label shortened to fit `width` columns
    pub fn display_label(&self, width: usize) -> String {
        match &self.label {
            Some(label) => label.clone(),
            None => shorten_path(&self.relative_path, width),
        }
    }

    /// Absolute top level directory of this repository (cached)
    ///
    /// Must be the handle's own directory. An uninitialised submodule is an
    /// empty directory whose top level is the enclosing repository, and no
    /// command may run there on its behalf.
    pub async fn top_level(&self) -> RepoResult<&Path> {
        let top = self
            .top_level
            .get_or_try_init(|| async {
                let output = self
                    .git
                    .run_checked(GIT_TOPLEVEL_ARGS, Some(&self.path))
                    .await?;
                let top = output.first_line().ok_or_else(|| {
                    RepositoryError::precondition(format!(
                        "{} is not inside a repository",
                        self.path.display()
                    ))
                })?;
                let top = canonical(Path::new(top)).await;
                if top != canonical(&self.path).await {
                    return Err(RepositoryError::precondition(format!(
                        "{} is not an initialised repository",
                        self.path.display()
                    )));
                }
                Ok::<_, RepositoryError>(top)
            })
            .await?;
        Ok(top.as_path())
    }

    /// Runs a command that must succeed in the top level directory
    async fn git(&self, args: &[&str]) -> RepoResult<CommandOutput> {
        let top = self.top_level().await?;
        Ok(self.git.run_checked(args, Some(top)).await?)
    }

    /// Runs a command whose exit code is part of the answer
    async fn git_query(&self, args: &[&str]) -> RepoResult<CommandOutput> {
        let top = self.top_level().await?;
        Ok(self.git.query(args, Some(top)).await?)
    }

    /// First stdout line of a successful query, `None` otherwise
    async fn query_line(&self, args: &[&str]) -> RepoResult<Option<String>> {
        let output = self.git_query(args).await?;
        if !output.success() {
            return Ok(None);
        }
        Ok(output
            .first_line()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string))
    }

    /// Configured `user.name`, `None` when unset
    pub async fn user_name(&self) -> RepoResult<Option<String>> {
        if let Some(name) = self.cached(&self.user_name) {
            return Ok(Some(name));
        }
        let name = self.query_line(&["config", "user.name"]).await?;
        self.store(&self.user_name, name.clone());
        Ok(name)
    }

    /// Configured `user.email`, `None` when unset
    pub async fn user_email(&self) -> RepoResult<Option<String>> {
        if let Some(email) = self.cached(&self.user_email) {
            return Ok(Some(email));
        }
        let email = self.query_line(&["config", "user.email"]).await?;
        self.store(&self.user_email, email.clone());
        Ok(email)
    }

    fn cached(&self, slot: &Mutex<Option<String>>) -> Option<String> {
        slot.lock().ok().and_then(|guard| guard.clone())
    }

    fn store(&self, slot: &Mutex<Option<String>>, value: Option<String>) {
        if let Ok(mut guard) = slot.lock() {
            *guard = value;
        }
    }

    /// Writes `user.name` and `user.email`; both are attempted, the first
    /// failure is returned
    pub async fn set_user_identity(&self, name: &str, email: &str) -> RepoResult<()> {
        let name_result = self.git(&["config", "user.name", name]).await;
        if name_result.is_ok() {
            self.store(&self.user_name, Some(name.to_string()));
        }
        let email_result = self.git(&["config", "user.email", email]).await;
        if email_result.is_ok() {
            self.store(&self.user_email, Some(email.to_string()));
        }
        name_result?;
        email_result?;
        Ok(())
    }

    /// Applies line ending, pull strategy, fetch pruning and push defaults.
    ///
    /// Every setting is attempted even if an earlier one fails; the first
    /// failure is returned afterwards.
    pub async fn set_standard_config(&self, prefer_rebase: bool) -> RepoResult<()> {
        let pull_rebase = if prefer_rebase { "true" } else { "false" };
        let prune_key = format!("remote.{DEFAULT_REMOTE}.prune");
        let settings: [(&str, &str); 4] = [
            ("core.autocrlf", AUTOCRLF),
            ("pull.rebase", pull_rebase),
            (&prune_key, "true"),
            ("push.default", "simple"),
        ];

        let mut first_error = None;
        for (key, value) in settings {
            if let Err(e) = self.git(&["config", key, value]).await {
                tracing::debug!(repo = self.label(), key, "config write failed: {e}");
                first_error.get_or_insert(e);
            }
        }
        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Checked out branch; `None` on a detached HEAD
    pub async fn current_branch(&self) -> RepoResult<Option<String>> {
        self.query_line(GIT_CURRENT_BRANCH_ARGS).await
    }

    /// Commit of HEAD; `None` when the repository has no commits yet
    pub async fn current_hash(&self) -> RepoResult<Option<String>> {
        self.query_line(GIT_CURRENT_HASH_ARGS).await
    }

    /// True when the working tree or the index differs from HEAD
    pub async fn is_dirty(&self) -> RepoResult<bool> {
        // Stale stat info in the index reports unchanged files as modified
        let _ = self.git_query(GIT_REFRESH_INDEX_ARGS).await?;

        for args in [GIT_DIFF_WORKTREE_ARGS, GIT_DIFF_STAGED_ARGS] {
            let output = self.git_query(args).await?;
            match output.exit_code {
                0 => {}
                1 => return Ok(true),
                _ => return Err(output.into_failure(args).into()),
            }
        }
        Ok(false)
    }

    /// Checks out `branch`. Without `force` nothing happens when the branch
    /// is already checked out, so local changes are never touched needlessly.
    pub async fn checkout(&self, branch: &str, force: bool) -> RepoResult<()> {
        if force {
            self.git(&["checkout", "-f", branch]).await?;
            return Ok(());
        }
        let current = self.current_branch().await?;
        if current.as_deref() != Some(branch) {
            self.git(&["checkout", branch]).await?;
        }
        Ok(())
    }

    /// Checks out the declared default branch; `false` when there is none
    pub async fn checkout_default(&self, force: bool) -> RepoResult<bool> {
        match self.default_branch.as_deref() {
            Some(branch) => {
                self.checkout(branch, force).await?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Commit the reference resolves to, `None` if it doesn't exist
    pub async fn ref_hash(&self, reference: &str) -> RepoResult<Option<String>> {
        self.query_line(&["rev-parse", "--verify", "--quiet", reference])
            .await
    }

    /// All refs, or those matching `pattern` (`git show-ref` semantics).
    /// `None` when nothing matches.
    pub async fn all_refs(&self, pattern: Option<&str>) -> RepoResult<Option<Vec<Ref>>> {
        let mut args = vec!["show-ref"];
        args.extend(pattern);
        let output = self.git_query(&args).await?;
        if !output.success() {
            return Ok(None);
        }
        let refs: Vec<Ref> = output
            .stdout
            .iter()
            .filter_map(|line| Ref::parse_show_ref_line(line))
            .collect();
        Ok(if refs.is_empty() { None } else { Some(refs) })
    }

    /// Remote configured as `branch.<branch>.remote`
    pub async fn branch_default_remote(&self, branch: &str) -> RepoResult<Option<String>> {
        let key = format!("branch.{branch}.remote");
        self.query_line(&["config", "--local", &key]).await
    }

    /// Short name (`remote/branch`) of HEAD's upstream
    pub async fn tracking_branch_of_head(&self) -> RepoResult<Option<String>> {
        let Some(head_ref) = self.query_line(GIT_HEAD_REF_ARGS).await? else {
            return Ok(None);
        };
        self.query_line(&["for-each-ref", "--format=%(upstream:short)", &head_ref])
            .await
    }

    /// Local (`None` key) and remote branches present in this repository
    pub async fn branches_by_remote(&self) -> RepoResult<RemoteBranchMap> {
        let refs = self.all_refs(None).await?.unwrap_or_default();
        Ok(RemoteBranchMap::from_refs(&refs))
    }

    /// Branch → configured default remote, from the local configuration
    pub async fn default_remotes_map(&self) -> RepoResult<HashMap<String, String>> {
        let output = self.git(GIT_LOCAL_CONFIG_LIST_ARGS).await?;
        Ok(parse_branch_remotes(&output.stdout))
    }

    /// Best common ancestor of `a` and `b`
    pub async fn merge_base(&self, a: Option<&str>, b: Option<&str>) -> RepoResult<Option<String>> {
        let (Some(a), Some(b)) = (a, b) else {
            return Ok(None);
        };
        self.query_line(&["merge-base", a, b]).await
    }

    /// Number of commits reachable from `from` but not from `excluding`
    pub async fn count_commits(
        &self,
        from: Option<&str>,
        excluding: Option<&str>,
    ) -> RepoResult<Option<u32>> {
        let (Some(from), Some(excluding)) = (from, excluding) else {
            return Ok(None);
        };
        let exclude = format!("^{excluding}");
        let count = self
            .query_line(&["rev-list", "--count", from, &exclude])
            .await?;
        Ok(count.and_then(|c| c.parse().ok()))
    }

    pub async fn pull(&self, ff_only: bool, force: bool, recurse: bool) -> RepoResult<()> {
        let mut args = vec!["pull"];
        if ff_only {
            args.push("--ff-only");
        }
        if force {
            args.push("--force");
        }
        args.push(recurse_flag(recurse));
        self.git(&args).await?;
        Ok(())
    }

    /// Fetches all remotes, pruning deleted remote branches
    pub async fn fetch(&self, force: bool, recurse: bool) -> RepoResult<()> {
        let mut args = vec!["fetch", "--all", "--prune"];
        if force {
            args.push("--force");
        }
        args.push(recurse_flag(recurse));
        self.git(&args).await?;
        Ok(())
    }

    /// Removes untracked and ignored files and directories
    pub async fn clean(&self) -> RepoResult<()> {
        self.git(GIT_CLEAN_ARGS).await?;
        Ok(())
    }

    /// Deletes `branch` on `remote` by pushing an empty ref, or force-deletes
    /// the local branch when `remote` is `None`
    pub async fn delete_branch(&self, branch: &str, remote: Option<&str>) -> RepoResult<()> {
        match remote {
            None => self.git(&["branch", "-D", branch]).await?,
            Some(remote) => {
                let refspec = format!(":{branch}");
                self.git(&["push", remote, &refspec]).await?
            }
        };
        Ok(())
    }
}

fn recurse_flag(recurse: bool) -> &'static str {
    if recurse {
        "--recurse-submodules"
    } else {
        "--no-recurse-submodules"
    }
}

async fn canonical(path: &Path) -> PathBuf {
    tokio::fs::canonicalize(path)
        .await
        .unwrap_or_else(|_| path.to_path_buf())
}

/// Parses `branch.<name>.remote=<remote>` lines of a config listing
pub fn parse_branch_remotes(lines: &[String]) -> HashMap<String, String> {
    lines
        .iter()
        .filter_map(|line| {
            let (key, value) = line.split_once('=')?;
            let branch = key.strip_prefix("branch.")?.strip_suffix(".remote")?;
            let value = value.trim();
            if branch.is_empty() || value.is_empty() {
                return None;
            }
            Some((branch.to_string(), value.to_string()))
        })
        .collect()
}
