//! Bounded concurrent execution of one operation per repository

use futures::stream::{FuturesUnordered, StreamExt};
use std::future::Future;
use std::sync::Arc;
use tokio::sync::Semaphore;

use super::context::RunContext;
use super::outcome::RepoReport;
use super::stats::RunStatistics;
use crate::git::RepositoryHandle;

/// Runs `op` for every repository, at most `ctx.workers` at a time.
///
/// The future returned by `op` must not start work before it is polled: it
/// is awaited only once a worker permit is held. Reports are printed through
/// the output sink as repositories finish, in completion order. A panicking
/// task is reported as a failure of that repository and the others carry on.
pub async fn fan_out<F, Fut>(
    ctx: &RunContext,
    stats: &RunStatistics,
    repos: Vec<Arc<RepositoryHandle>>,
    op: F,
) where
    F: Fn(Arc<RepositoryHandle>) -> Fut,
    Fut: Future<Output = RepoReport> + Send + 'static,
{
    let semaphore = Arc::new(Semaphore::new(ctx.workers));
    ctx.output.start_progress(repos.len() as u64);

    let mut pending = FuturesUnordered::new();
    for repo in repos {
        let label = repo.label().to_string();
        let task = op(Arc::clone(&repo));
        let semaphore = Arc::clone(&semaphore);
        let task_label = label.clone();

        let handle = tokio::spawn(async move {
            let _permit = match semaphore.acquire_owned().await {
                Ok(permit) => permit,
                Err(e) => return RepoReport::failed(&task_label, &e),
            };
            task.await
        });
        pending.push(async move { (label, handle.await) });
    }

    while let Some((label, joined)) = pending.next().await {
        let report = match joined {
            Ok(report) => report,
            Err(e) => {
                tracing::error!(repo = %label, "task failed: {e}");
                let reason = if e.is_panic() {
                    "task panicked"
                } else {
                    "task was cancelled"
                };
                RepoReport::failed(&label, &reason)
            }
        };
        ctx.report(stats, report);
        ctx.output.advance(&label);
    }

    ctx.output.finish_progress();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::outcome::Outcome;
    use crate::core::output::OutputSink;
    use crate::git::executor::fake::ScriptedRunner;
    use std::path::Path;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn context(workers: usize) -> RunContext {
        let (git, _) = ScriptedRunner::new().executor();
        RunContext::new(
            git,
            workers,
            Arc::new(OutputSink::capture()),
            Path::new("/tmp").to_path_buf(),
        )
    }

    fn repos(ctx: &RunContext, count: usize) -> Vec<Arc<RepositoryHandle>> {
        (0..count)
            .map(|i| {
                Arc::new(RepositoryHandle::new(
                    ctx.git.clone(),
                    format!("lib{i}"),
                    Path::new("/nonexistent"),
                ))
            })
            .collect()
    }

    #[tokio::test]
    async fn test_every_repository_is_reported() {
        let ctx = context(4);
        let stats = RunStatistics::new();
        let repos = repos(&ctx, 10);

        fan_out(&ctx, &stats, repos, |repo| async move {
            RepoReport::done(repo.label())
        })
        .await;

        let lines = ctx.output.captured();
        assert_eq!(lines.len(), 10);
        assert_eq!(stats.total(), 10);
        for i in 0..10 {
            assert!(lines.contains(&format!("🟢 lib{i}... DONE.")));
        }
    }

    #[tokio::test]
    async fn test_worker_bound_is_respected() {
        let ctx = context(3);
        let stats = RunStatistics::new();
        let running = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        fan_out(&ctx, &stats, repos(&ctx, 12), |repo| {
            let running = Arc::clone(&running);
            let peak = Arc::clone(&peak);
            async move {
                let now = running.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(10)).await;
                running.fetch_sub(1, Ordering::SeqCst);
                RepoReport::done(repo.label())
            }
        })
        .await;

        assert!(peak.load(Ordering::SeqCst) <= 3);
        assert_eq!(stats.total(), 12);
    }

    #[tokio::test]
    async fn test_panic_is_isolated() {
        let ctx = context(2);
        let stats = RunStatistics::new();

        fan_out(&ctx, &stats, repos(&ctx, 3), |repo| async move {
            if repo.label() == "lib1" {
                panic!("boom");
            }
            RepoReport::done(repo.label())
        })
        .await;

        assert_eq!(stats.failures(), 1);
        assert_eq!(stats.total(), 3);
        let lines = ctx.output.captured();
        assert!(lines.contains(&"🔴 lib1... FAILED.".to_string()));
        assert!(lines.contains(&"task panicked".to_string()));
    }

    #[tokio::test]
    async fn test_multi_line_blocks_stay_together() {
        let ctx = context(8);
        let stats = RunStatistics::new();

        fan_out(&ctx, &stats, repos(&ctx, 6), |repo| async move {
            let label = repo.label().to_string();
            let mut report = RepoReport::header(Outcome::Done, &label, None);
            for n in 0..5 {
                tokio::task::yield_now().await;
                report.push(format!("{label}:{n}"));
            }
            report
        })
        .await;

        let lines = ctx.output.captured();
        assert_eq!(lines.len(), 36);
        for block in lines.chunks(6) {
            let label = block[0].trim_start_matches("🟢 ").trim_end_matches("... DONE.");
            assert!(block[1..].iter().all(|l| l.starts_with(&format!("{label}:"))));
        }
    }
}
