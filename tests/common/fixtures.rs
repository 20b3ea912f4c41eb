//! Test fixtures and builders

use anyhow::Result;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

use superrepo::core::{OutputSink, RunContext};
use superrepo::git::GitExecutor;

use super::git::{configure_identity, create_test_commit, git, setup_git_repo};

/// A super-repository with submodules, each backed by a bare remote
pub struct SuperRepo {
    pub temp_dir: TempDir,
}

impl SuperRepo {
    /// Scratch area holding `super/`, `remotes/` and `seeds/`
    pub fn scratch(&self) -> &Path {
        self.temp_dir.path()
    }

    /// The super-repository root
    pub fn root(&self) -> PathBuf {
        self.scratch().join("super")
    }

    /// Working copy of a submodule
    pub fn sub(&self, path: &str) -> PathBuf {
        self.root().join(path)
    }

    /// The bare repository a submodule was cloned from
    pub fn remote(&self, name: &str) -> PathBuf {
        self.scratch().join("remotes").join(format!("{name}.git"))
    }

    /// Pushes a new commit to a submodule's remote through a second clone
    pub fn push_upstream_commit(&self, name: &str, file_name: &str) -> Result<()> {
        let clone = self.scratch().join(format!("upstream-{name}-{file_name}"));
        let remote = self.remote(name);
        git(
            self.scratch(),
            &[
                "clone",
                "-q",
                &remote.to_string_lossy(),
                &clone.to_string_lossy(),
            ],
        )?;
        configure_identity(&clone)?;
        create_test_commit(&clone, file_name, "upstream", "Upstream change")?;
        git(&clone, &["push", "-q", "origin", "HEAD"])?;
        Ok(())
    }
}

struct SubmoduleSpec {
    name: String,
    path: String,
    branch: Option<String>,
}

/// Builder for a [`SuperRepo`]
pub struct SuperRepoBuilder {
    submodules: Vec<SubmoduleSpec>,
}

impl SuperRepoBuilder {
    pub fn new() -> Self {
        Self {
            submodules: Vec::new(),
        }
    }

    /// Adds a submodule at `path` whose remote is called `name`; with a
    /// branch the manifest records it as the default branch
    pub fn with_submodule(mut self, name: &str, path: &str, branch: Option<&str>) -> Self {
        self.submodules.push(SubmoduleSpec {
            name: name.to_string(),
            path: path.to_string(),
            branch: branch.map(str::to_string),
        });
        self
    }

    pub fn build(self) -> Result<SuperRepo> {
        let temp_dir = TempDir::new()?;
        for dir in ["super", "remotes", "seeds"] {
            std::fs::create_dir(temp_dir.path().join(dir))?;
        }
        let repo = SuperRepo { temp_dir };
        let scratch = repo.scratch();

        let root = repo.root();
        setup_git_repo(&root)?;
        create_test_commit(&root, "README.md", "# Super", "Initial commit")?;

        for spec in &self.submodules {
            let seed = scratch.join("seeds").join(&spec.name);
            std::fs::create_dir(&seed)?;
            setup_git_repo(&seed)?;
            create_test_commit(&seed, "lib.txt", &spec.name, "Initial commit")?;

            let remote = repo.remote(&spec.name);
            git(
                scratch,
                &[
                    "clone",
                    "-q",
                    "--bare",
                    &seed.to_string_lossy(),
                    &remote.to_string_lossy(),
                ],
            )?;

            let remote = remote.to_string_lossy().to_string();
            let mut args = vec!["-c", "protocol.file.allow=always", "submodule", "add", "-q"];
            if let Some(branch) = &spec.branch {
                args.extend(["-b", branch.as_str()]);
            }
            args.extend(["--name", spec.name.as_str(), remote.as_str(), spec.path.as_str()]);
            git(&root, &args)?;
            configure_identity(&repo.sub(&spec.path))?;
        }

        if !self.submodules.is_empty() {
            git(&root, &["commit", "-q", "-m", "Add submodules"])?;
        }
        Ok(repo)
    }
}

/// A run context rooted at `cwd` that collects output instead of printing it
pub fn capture_context(cwd: &Path) -> RunContext {
    RunContext::new(
        GitExecutor::system(),
        4,
        Arc::new(OutputSink::capture()),
        cwd.to_path_buf(),
    )
}
