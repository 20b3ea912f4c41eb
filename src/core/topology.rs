//! Super-repository root detection and sub-repository discovery

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::OnceCell;

use super::config::{BASE_LABEL, SUBMODULE_INIT_JOBS, SUBMODULE_MANIFEST};
use super::error::TopologyError;
use crate::git::{ExternalCommandError, GitExecutor, RepositoryHandle};

const GIT_SUPERPROJECT_ARGS: &[&str] = &["rev-parse", "--show-superproject-working-tree"];
const GIT_TOPLEVEL_ARGS: &[&str] = &["rev-parse", "--show-toplevel"];
const GIT_MANIFEST_LIST_ARGS: &[&str] = &["config", "--file", SUBMODULE_MANIFEST, "--list"];

/// One `submodule.<name>.*` group of the manifest
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ManifestEntry {
    pub name: String,
    pub path: Option<String>,
    pub branch: Option<String>,
    pub url: Option<String>,
}

/// Parses `submodule.<name>.<field>=<value>` lines, sorted by name.
///
/// The name may itself contain dots, so the field is whatever follows the
/// last dot of the key. Unknown fields and other sections are ignored.
pub fn parse_manifest<S: AsRef<str>>(lines: &[S]) -> Vec<ManifestEntry> {
    let mut entries: BTreeMap<String, ManifestEntry> = BTreeMap::new();

    for line in lines {
        let Some((key, value)) = line.as_ref().split_once('=') else {
            continue;
        };
        let Some(key) = key.strip_prefix("submodule.") else {
            continue;
        };
        let Some((name, field)) = key.rsplit_once('.') else {
            continue;
        };
        if name.is_empty() || value.is_empty() {
            continue;
        }

        let entry = entries.entry(name.to_string()).or_insert_with(|| ManifestEntry {
            name: name.to_string(),
            ..ManifestEntry::default()
        });
        match field {
            "path" => entry.path = Some(value.to_string()),
            "branch" => entry.branch = Some(value.to_string()),
            "url" => entry.url = Some(value.to_string()),
            _ => {}
        }
    }

    entries.into_values().collect()
}

/// Where the super-repository is, and what it declares
///
/// Built once per command from the process working directory. The root and
/// the sub-repository list are resolved lazily and cached.
pub struct Topology {
    git: GitExecutor,
    cwd: PathBuf,
    top_level: OnceCell<Option<PathBuf>>,
    sub_repositories: OnceCell<Vec<Arc<RepositoryHandle>>>,
}

impl Topology {
    pub fn new(git: GitExecutor, cwd: impl Into<PathBuf>) -> Self {
        Self {
            git,
            cwd: cwd.into(),
            top_level: OnceCell::new(),
            sub_repositories: OnceCell::new(),
        }
    }

    /// Root of the super-project: the superproject of the submodule we are
    /// in, otherwise the repository containing the working directory.
    pub async fn top_level(&self) -> Option<&Path> {
        self.top_level
            .get_or_init(|| async {
                let superproject = self.first_line(GIT_SUPERPROJECT_ARGS).await;
                let top = match superproject {
                    Some(top) => Some(top),
                    None => self.first_line(GIT_TOPLEVEL_ARGS).await,
                };
                match top {
                    Some(top) => Some(canonical(Path::new(&top)).await),
                    None => None,
                }
            })
            .await
            .as_deref()
    }

    async fn first_line(&self, args: &[&str]) -> Option<String> {
        match self.git.run_checked(args, Some(&self.cwd)).await {
            Ok(output) => output
                .first_line()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(str::to_string),
            Err(e) => {
                tracing::debug!("topology query failed: {e}");
                None
            }
        }
    }

    /// True when the working directory is the super-project root itself
    pub async fn is_at_base(&self) -> bool {
        match self.top_level().await {
            Some(top) => canonical(&self.cwd).await == top,
            None => false,
        }
    }

    /// The root, provided the working directory is exactly that root
    pub async fn require_base(&self) -> Result<&Path, TopologyError> {
        let top = self.top_level().await.ok_or(TopologyError::NoRepository)?;
        if canonical(&self.cwd).await != top {
            return Err(TopologyError::NotAtBase);
        }
        Ok(top)
    }

    pub async fn manifest_path(&self) -> Option<PathBuf> {
        let path = self.top_level().await?.join(SUBMODULE_MANIFEST);
        let is_file = tokio::fs::metadata(&path)
            .await
            .is_ok_and(|meta| meta.is_file());
        is_file.then_some(path)
    }

    pub async fn require_manifest(&self) -> Result<PathBuf, TopologyError> {
        self.manifest_path()
            .await
            .ok_or(TopologyError::MissingManifest)
    }

    /// Handle on the root repository, labelled `base`, with the fallback
    /// default branch
    pub async fn base_repository(&self) -> Result<Arc<RepositoryHandle>, TopologyError> {
        let top = self.top_level().await.ok_or(TopologyError::NoRepository)?;
        Ok(Arc::new(
            RepositoryHandle::new(self.git.clone(), ".", top).with_label(BASE_LABEL),
        ))
    }

    /// One handle per manifest entry, sorted by submodule name. No manifest
    /// means no sub-repositories.
    pub async fn discover_sub_repositories(
        &self,
    ) -> Result<Vec<Arc<RepositoryHandle>>, TopologyError> {
        let repos = self
            .sub_repositories
            .get_or_try_init(|| async { self.read_sub_repositories().await })
            .await?;
        Ok(repos.clone())
    }

    async fn read_sub_repositories(&self) -> Result<Vec<Arc<RepositoryHandle>>, TopologyError> {
        let top = self.top_level().await.ok_or(TopologyError::NoRepository)?;
        if self.manifest_path().await.is_none() {
            return Ok(Vec::new());
        }

        let output = self
            .git
            .run_checked(GIT_MANIFEST_LIST_ARGS, Some(top))
            .await
            .map_err(TopologyError::ManifestUnreadable)?;

        let mut repos = Vec::new();
        for entry in parse_manifest(&output.stdout) {
            let Some(path) = entry.path else {
                tracing::warn!("submodule '{}' has no path, skipping", entry.name);
                continue;
            };
            let handle = RepositoryHandle::new(self.git.clone(), path, top)
                .with_default_branch(entry.branch)
                .with_origin_url(entry.url);
            repos.push(Arc::new(handle));
        }
        tracing::debug!(count = repos.len(), "discovered sub-repositories");
        Ok(repos)
    }

    /// `git submodule update --init` at the root
    pub async fn init_submodules(&self, force: bool) -> Result<(), ExternalCommandError> {
        let mut args = vec!["submodule", "update", "--init", "--jobs", SUBMODULE_INIT_JOBS];
        if force {
            args.push("--force");
        }
        let cwd = self.top_level().await.unwrap_or(self.cwd.as_path());
        self.git.run_checked(&args, Some(cwd)).await?;
        Ok(())
    }
}

async fn canonical(path: &Path) -> PathBuf {
    tokio::fs::canonicalize(path)
        .await
        .unwrap_or_else(|_| path.to_path_buf())
}
