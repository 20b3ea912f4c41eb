//! Process-wide state threaded through every command

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use super::outcome::RepoReport;
use super::output::OutputSink;
use super::stats::RunStatistics;
use super::topology::Topology;
use crate::git::GitExecutor;

/// Everything a command handler needs, built once in `main`
pub struct RunContext {
    pub git: GitExecutor,
    /// Upper bound on repositories processed at the same time
    pub workers: usize,
    pub output: Arc<OutputSink>,
    pub cwd: PathBuf,
    started: Instant,
}

impl RunContext {
    pub fn new(git: GitExecutor, workers: usize, output: Arc<OutputSink>, cwd: PathBuf) -> Self {
        Self {
            git,
            workers: workers.max(1),
            output,
            cwd,
            started: Instant::now(),
        }
    }

    /// Fresh topology for the working directory
    pub fn topology(&self) -> Topology {
        Topology::new(self.git.clone(), self.cwd.clone())
    }

    /// Prints a report and counts its outcome
    pub fn report(&self, stats: &RunStatistics, report: RepoReport) {
        self.output.emit(&report.lines);
        stats.record(report.outcome);
    }

    pub fn print_summary(&self, stats: &RunStatistics) {
        self.output
            .line(stats.generate_summary(self.started.elapsed()));
    }
}
