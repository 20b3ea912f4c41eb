//! Per-repository outcome of a command

/// Result of running one command against one repository
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// The operation was carried out
    Done,
    /// There was nothing to do (no branch to check out, nothing to delete)
    Nothing,
    /// The operation failed; the report carries the error
    Failed,
}

impl Outcome {
    /// Returns the emoji symbol for this outcome
    pub fn symbol(&self) -> &'static str {
        match self {
            Outcome::Done => "🟢",
            Outcome::Nothing => "🟠",
            Outcome::Failed => "🔴",
        }
    }

    /// Returns the text representation of this outcome
    pub fn text(&self) -> &'static str {
        match self {
            Outcome::Done => "DONE.",
            Outcome::Nothing => "NONE.",
            Outcome::Failed => "FAILED.",
        }
    }
}

/// The block of console lines and the outcome for one repository
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RepoReport {
    pub outcome: Outcome,
    pub lines: Vec<String>,
}

impl RepoReport {
    pub fn new(outcome: Outcome, lines: Vec<String>) -> Self {
        Self { outcome, lines }
    }

    /// `🟢 label... DONE.`, optionally followed by a detail on the same line
    pub fn header(outcome: Outcome, label: &str, detail: Option<&str>) -> Self {
        Self::new(outcome, vec![header_line(outcome.symbol(), label, outcome.text(), detail)])
    }

    pub fn done(label: &str) -> Self {
        Self::header(Outcome::Done, label, None)
    }

    /// Header line followed by the error rendering
    pub fn failed(label: &str, error: &dyn std::fmt::Display) -> Self {
        Self::failed_with(label, Outcome::Failed.text(), error)
    }

    /// Failure with a custom status text, e.g. `Pull FAILED. main`
    pub fn failed_with(label: &str, text: &str, error: &dyn std::fmt::Display) -> Self {
        let mut lines = vec![header_line(Outcome::Failed.symbol(), label, text, None)];
        lines.extend(error.to_string().lines().map(str::to_string));
        Self::new(Outcome::Failed, lines)
    }

    /// Nothing happened and nothing is printed
    pub fn silent() -> Self {
        Self::new(Outcome::Nothing, Vec::new())
    }

    pub fn push(&mut self, line: impl Into<String>) {
        self.lines.push(line.into());
    }
}

pub(crate) fn header_line(symbol: &str, label: &str, text: &str, detail: Option<&str>) -> String {
    match detail {
        Some(detail) => format!("{symbol} {label}... {text} {detail}"),
        None => format!("{symbol} {label}... {text}"),
    }
}
