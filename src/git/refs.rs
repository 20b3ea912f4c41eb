//! Typed references and the remote → branches map

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

const HEADS_PREFIX: &str = "refs/heads/";
const REMOTES_PREFIX: &str = "refs/remotes/";

/// A `(hash, name)` pair as listed by `git show-ref`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Ref {
    pub hash: String,
    pub name: String,
}

impl Ref {
    pub fn new(hash: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            hash: hash.into(),
            name: name.into(),
        }
    }

    pub fn kind(&self) -> RefKind<'_> {
        RefKind::parse(&self.name)
    }

    /// Parses one `show-ref` line: `<hex hash> <refname>`
    pub fn parse_show_ref_line(line: &str) -> Option<Ref> {
        let mut parts = line.split_whitespace();
        let hash = parts.next()?;
        let name = parts.next()?;
        if parts.next().is_some() || !hash.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        Some(Ref::new(hash, name))
    }
}

/// What a full reference name points at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefKind<'a> {
    /// `refs/heads/<branch>`
    Local(&'a str),
    /// `refs/remotes/<remote>/<branch>`
    Remote { remote: &'a str, branch: &'a str },
    /// Tags, notes, stash, malformed remote refs...
    Other,
}

impl<'a> RefKind<'a> {
    pub fn parse(name: &'a str) -> Self {
        if let Some(branch) = name.strip_prefix(HEADS_PREFIX) {
            if !branch.is_empty() {
                return RefKind::Local(branch);
            }
        } else if let Some(rest) = name.strip_prefix(REMOTES_PREFIX) {
            if let Some((remote, branch)) = rest.split_once('/') {
                if !remote.is_empty() && !branch.is_empty() {
                    return RefKind::Remote { remote, branch };
                }
            }
        }
        RefKind::Other
    }

    /// `(remote, branch)` with `None` as the remote for local branches
    pub fn remote_branch(&self) -> Option<(Option<&'a str>, &'a str)> {
        match *self {
            RefKind::Local(branch) => Some((None, branch)),
            RefKind::Remote { remote, branch } => Some((Some(remote), branch)),
            RefKind::Other => None,
        }
    }
}

/// Branches present per remote; the `None` key holds the local branches
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemoteBranchMap {
    remotes: BTreeMap<Option<String>, BTreeSet<String>>,
}

impl RemoteBranchMap {
    pub fn from_refs<'r>(refs: impl IntoIterator<Item = &'r Ref>) -> Self {
        let mut map = Self::default();
        for r in refs {
            if let Some((remote, branch)) = r.kind().remote_branch() {
                map.insert(remote, branch);
            }
        }
        map
    }

    pub fn insert(&mut self, remote: Option<&str>, branch: &str) {
        self.remotes
            .entry(remote.map(str::to_string))
            .or_default()
            .insert(branch.to_string());
    }

    /// Branch set of `remote` (`None` for local), if that key exists at all
    pub fn branches(&self, remote: Option<&str>) -> Option<&BTreeSet<String>> {
        self.remotes.get(&remote.map(str::to_string))
    }

    pub fn has_remote(&self, remote: &str) -> bool {
        self.branches(Some(remote)).is_some()
    }

    pub fn contains(&self, remote: Option<&str>, branch: &str) -> bool {
        self.branches(remote).is_some_and(|set| set.contains(branch))
    }

    /// Named remotes, sorted
    pub fn remote_names(&self) -> impl Iterator<Item = &str> {
        self.remotes.keys().filter_map(|k| k.as_deref())
    }

    pub fn iter(&self) -> impl Iterator<Item = (Option<&str>, &BTreeSet<String>)> {
        self.remotes.iter().map(|(k, v)| (k.as_deref(), v))
    }
}
