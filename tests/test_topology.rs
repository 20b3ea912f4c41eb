//! Integration tests for locating the super-repository and its manifest

mod common;
use common::{skip_without_git, SuperRepoBuilder};

use superrepo::core::{Topology, TopologyError};
use superrepo::git::GitExecutor;
use tempfile::TempDir;

#[tokio::test]
async fn test_discovers_submodules_from_the_root() {
    if skip_without_git() {
        return;
    }
    let repo = SuperRepoBuilder::new()
        .with_submodule("core", "libs/core", Some("main"))
        .with_submodule("tools", "tools", None)
        .build()
        .expect("Failed to build super repository");

    let topology = Topology::new(GitExecutor::system(), repo.root());
    assert!(topology.is_at_base().await);
    assert!(topology.manifest_path().await.is_some());

    let subs = topology.discover_sub_repositories().await.unwrap();
    let labels: Vec<_> = subs.iter().map(|r| r.label()).collect();
    assert_eq!(labels, vec!["libs/core", "tools"]);
    assert_eq!(subs[0].default_branch(), Some("main"));
    assert_eq!(subs[1].default_branch(), None);
    assert!(subs[0].origin_url().unwrap().ends_with("core.git"));

    let base = topology.base_repository().await.unwrap();
    assert_eq!(base.label(), "base");
    assert_eq!(base.default_branch(), Some("master"));
}

#[tokio::test]
async fn test_inside_a_submodule_is_not_at_base() {
    if skip_without_git() {
        return;
    }
    let repo = SuperRepoBuilder::new()
        .with_submodule("core", "libs/core", Some("main"))
        .build()
        .expect("Failed to build super repository");

    let topology = Topology::new(GitExecutor::system(), repo.sub("libs/core"));
    let root = std::fs::canonicalize(repo.root()).unwrap();
    assert_eq!(topology.top_level().await, Some(root.as_path()));
    assert!(!topology.is_at_base().await);
    assert!(matches!(
        topology.require_base().await,
        Err(TopologyError::NotAtBase)
    ));
}

#[tokio::test]
async fn test_subdirectory_of_the_base_is_not_at_base() {
    if skip_without_git() {
        return;
    }
    let repo = SuperRepoBuilder::new().build().unwrap();
    let docs = repo.root().join("docs");
    std::fs::create_dir(&docs).unwrap();

    let topology = Topology::new(GitExecutor::system(), &docs);
    assert!(!topology.is_at_base().await);
}

#[tokio::test]
async fn test_no_manifest_means_no_sub_repositories() {
    if skip_without_git() {
        return;
    }
    let repo = SuperRepoBuilder::new().build().unwrap();

    let topology = Topology::new(GitExecutor::system(), repo.root());
    assert!(topology.is_at_base().await);
    assert!(topology.discover_sub_repositories().await.unwrap().is_empty());
    assert!(matches!(
        topology.require_manifest().await,
        Err(TopologyError::MissingManifest)
    ));
}

#[tokio::test]
async fn test_outside_any_repository() {
    if skip_without_git() {
        return;
    }
    let dir = TempDir::new().unwrap();

    let topology = Topology::new(GitExecutor::system(), dir.path());
    if topology.top_level().await.is_some() {
        eprintln!("Temporary directory is inside a git repository, skipping test");
        return;
    }
    assert!(!topology.is_at_base().await);
    assert!(matches!(
        topology.require_base().await,
        Err(TopologyError::NoRepository)
    ));
}
