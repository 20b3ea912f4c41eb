//! Integration tests for the status resolver against real repositories

mod common;
use common::{create_test_commit, git, skip_without_git, SuperRepo, SuperRepoBuilder};

use std::sync::Arc;
use superrepo::core::Topology;
use superrepo::git::{GitExecutor, RepositoryHandle};
use superrepo::status::{flags, resolve};

fn build() -> SuperRepo {
    SuperRepoBuilder::new()
        .with_submodule("core", "libs/core", Some("main"))
        .build()
        .expect("Failed to build super repository")
}

async fn core_handle(repo: &SuperRepo) -> Arc<RepositoryHandle> {
    let topology = Topology::new(GitExecutor::system(), repo.root());
    let subs = topology.discover_sub_repositories().await.unwrap();
    Arc::clone(&subs[0])
}

#[tokio::test]
async fn test_fresh_submodule_is_in_sync() {
    if skip_without_git() {
        return;
    }
    let repo = build();
    let core = core_handle(&repo).await;

    let snapshot = resolve(&core, core.label()).await.unwrap();
    assert_eq!(snapshot.current_branch(), Some("main"));
    assert_eq!(snapshot.dirty, Some(false));
    assert_eq!(snapshot.destination.as_ref().unwrap().label, "origin/main");
    assert_eq!(snapshot.ahead, Some(0));
    assert_eq!(snapshot.behind, Some(0));
    assert!(!snapshot.rebase_needed);
    assert_eq!(snapshot.tracking.as_ref().unwrap().branch, "origin/main");
    assert!(!snapshot.push_required());
    assert_eq!(flags(&snapshot), "-T--");
}

#[tokio::test]
async fn test_local_commit_requires_push() {
    if skip_without_git() {
        return;
    }
    let repo = build();
    create_test_commit(&repo.sub("libs/core"), "new.txt", "new", "Local change").unwrap();
    let core = core_handle(&repo).await;

    let snapshot = resolve(&core, core.label()).await.unwrap();
    assert_eq!(snapshot.ahead, Some(1));
    assert_eq!(snapshot.behind, Some(0));
    assert!(!snapshot.rebase_needed);
    let push = snapshot.push.as_ref().expect("push should be required");
    assert_eq!(push.local_ahead, Some(1));
    assert_eq!(push.local_behind, Some(0));
    assert_eq!(flags(&snapshot), "-TP-");
}

#[tokio::test]
async fn test_upstream_commit_needs_rebase() {
    if skip_without_git() {
        return;
    }
    let repo = build();
    repo.push_upstream_commit("core", "upstream.txt").unwrap();
    git(&repo.sub("libs/core"), &["fetch", "-q", "origin"]).unwrap();
    let core = core_handle(&repo).await;

    let snapshot = resolve(&core, core.label()).await.unwrap();
    assert_eq!(snapshot.ahead, Some(0));
    assert_eq!(snapshot.behind, Some(1));
    assert!(snapshot.rebase_needed);
    assert_eq!(snapshot.push.as_ref().unwrap().local_behind, Some(1));
}

#[tokio::test]
async fn test_modified_file_is_dirty() {
    if skip_without_git() {
        return;
    }
    let repo = build();
    std::fs::write(repo.sub("libs/core").join("lib.txt"), "changed").unwrap();
    let core = core_handle(&repo).await;

    let snapshot = resolve(&core, core.label()).await.unwrap();
    assert_eq!(snapshot.dirty, Some(true));
    assert!(flags(&snapshot).starts_with('M'));
}

#[tokio::test]
async fn test_staged_change_is_dirty() {
    if skip_without_git() {
        return;
    }
    let repo = build();
    let sub = repo.sub("libs/core");
    std::fs::write(sub.join("staged.txt"), "staged").unwrap();
    git(&sub, &["add", "staged.txt"]).unwrap();
    let core = core_handle(&repo).await;

    assert!(core.is_dirty().await.unwrap());
}

#[tokio::test]
async fn test_detached_head_has_no_branch() {
    if skip_without_git() {
        return;
    }
    let repo = build();
    git(&repo.sub("libs/core"), &["checkout", "-q", "--detach"]).unwrap();
    let core = core_handle(&repo).await;

    let snapshot = resolve(&core, core.label()).await.unwrap();
    assert_eq!(snapshot.current_branch(), None);
    assert!(snapshot.current_hash().is_some());
    assert_eq!(snapshot.tracking, None);
    assert_eq!(snapshot.behind, Some(0));
}

#[tokio::test]
async fn test_commit_count_against_itself_is_zero() {
    if skip_without_git() {
        return;
    }
    let repo = build();
    let core = core_handle(&repo).await;

    let head = core.current_hash().await.unwrap().unwrap();
    assert_eq!(core.count_commits(Some(&head), Some(&head)).await.unwrap(), Some(0));
}
