//! Synchronization status of a repository against its destination branch
//!
//! [`resolve`] gathers a [`StatusSnapshot`] through a repository handle;
//! [`render`] turns it into the one-line `[MTPR]` summary (plus the push
//! details when the branch diverged from its upstream).

mod destination;
mod snapshot;

pub use destination::{resolve_destination, select_destination, Destination};
pub use snapshot::{resolve, Current, PushState, StatusSnapshot, Tracking};

use crate::core::config::{LONG_LABEL_WIDTH, SHORT_HASH_WIDTH, SHORT_LABEL_WIDTH};

/// Label column width for short or long output
pub fn label_width(long: bool) -> usize {
    if long {
        LONG_LABEL_WIDTH
    } else {
        SHORT_LABEL_WIDTH
    }
}

/// The four flag characters: dirty, tracking, push, rebase
pub fn flags(snapshot: &StatusSnapshot) -> String {
    let dirty = if snapshot.dirty == Some(true) { 'M' } else { '-' };
    let tracking = match &snapshot.tracking {
        None => '-',
        Some(t) if t.hash.is_none() => 't',
        Some(_) => 'T',
    };
    let push = if snapshot.push_required() { 'P' } else { '-' };
    let rebase = if snapshot.rebase_needed { 'R' } else { '-' };
    [dirty, tracking, push, rebase].iter().collect()
}

fn count(value: Option<u32>) -> String {
    value.map_or_else(|| "-".to_string(), |n| n.to_string())
}

fn commits(value: Option<u32>) -> String {
    match value {
        Some(1) => "1 commit".to_string(),
        other => format!("{} commits", count(other)),
    }
}

/// Console lines for one snapshot
///
/// `[MTPR] label hash (commits: ahead / behind) [current -> destination]`
pub fn render(snapshot: &StatusSnapshot, long: bool) -> Vec<String> {
    let width = label_width(long);
    let hash = match snapshot.current_hash() {
        None => "-".to_string(),
        Some(hash) if long => hash.to_string(),
        Some(hash) => hash.chars().take(SHORT_HASH_WIDTH).collect(),
    };
    let destination = snapshot
        .destination
        .as_ref()
        .map(|d| d.label.as_str())
        .or(snapshot.default_branch.as_deref())
        .unwrap_or("-");

    let mut lines = vec![format!(
        "[{}] {:<width$} {} (commits: {} / {}) [{} -> {}]",
        flags(snapshot),
        snapshot.label,
        hash,
        count(snapshot.ahead),
        count(snapshot.behind),
        snapshot.current_branch().unwrap_or("-"),
        destination,
    )];

    if let (Some(push), Some(tracking)) = (&snapshot.push, &snapshot.tracking) {
        lines.push(format!(
            "   Local Branch: {} (by {})",
            snapshot.current_branch().unwrap_or("-"),
            commits(push.local_ahead)
        ));
        lines.push(format!(
            "   Tracking Branch: {} (by {})",
            tracking.branch,
            commits(push.local_behind)
        ));
    }
    lines
}
