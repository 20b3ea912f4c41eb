//! Serialized console output and the run progress bar

use indicatif::{ProgressBar, ProgressStyle};
use std::io::Write;
use std::sync::{Mutex, MutexGuard};

use super::config::PROGRESS_TEMPLATE;

enum Target {
    Stdout,
    Capture(Vec<String>),
}

/// The only path to stdout while repositories are processed concurrently
///
/// Each [`emit`](OutputSink::emit) writes one repository's block while holding
/// the lock, so blocks of different repositories never interleave. The
/// optional progress bar lives on stderr and is suspended during writes.
pub struct OutputSink {
    target: Mutex<Target>,
    show_progress: bool,
    progress: Mutex<Option<ProgressBar>>,
}

impl OutputSink {
    pub fn stdout(show_progress: bool) -> Self {
        Self {
            target: Mutex::new(Target::Stdout),
            show_progress,
            progress: Mutex::new(None),
        }
    }

    /// Collects lines in memory instead of printing them
    pub fn capture() -> Self {
        Self {
            target: Mutex::new(Target::Capture(Vec::new())),
            show_progress: false,
            progress: Mutex::new(None),
        }
    }

    /// Writes a block of lines atomically. Empty blocks are skipped.
    pub fn emit(&self, lines: &[String]) {
        if lines.is_empty() {
            return;
        }
        let mut target = lock(&self.target);
        match &mut *target {
            Target::Capture(buffer) => buffer.extend(lines.iter().cloned()),
            Target::Stdout => {
                let write = || {
                    let mut stdout = std::io::stdout().lock();
                    for line in lines {
                        // A closed pipe (`| head`) is not worth a panic
                        if writeln!(stdout, "{line}").is_err() {
                            break;
                        }
                    }
                    let _ = stdout.flush();
                };
                match &*lock(&self.progress) {
                    Some(bar) => bar.suspend(write),
                    None => write(),
                }
            }
        }
    }

    pub fn line(&self, line: impl Into<String>) {
        self.emit(&[line.into()]);
    }

    /// Everything emitted so far on a capturing sink
    pub fn captured(&self) -> Vec<String> {
        match &*lock(&self.target) {
            Target::Capture(buffer) => buffer.clone(),
            Target::Stdout => Vec::new(),
        }
    }

    /// Shows a spinner counting `len` repositories
    pub fn start_progress(&self, len: u64) {
        if !self.show_progress || len == 0 {
            return;
        }
        let style = ProgressStyle::with_template(PROGRESS_TEMPLATE)
            .unwrap_or_else(|_| ProgressStyle::default_spinner());
        let bar = ProgressBar::new(len);
        bar.set_style(style);
        *lock(&self.progress) = Some(bar);
    }

    pub fn advance(&self, label: &str) {
        if let Some(bar) = &*lock(&self.progress) {
            bar.set_message(label.to_string());
            bar.inc(1);
        }
    }

    pub fn finish_progress(&self) {
        if let Some(bar) = lock(&self.progress).take() {
            bar.finish_and_clear();
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    // A panic while printing leaves the data usable
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
