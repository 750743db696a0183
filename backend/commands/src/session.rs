//! Invocation session: the per-message record of which providers still own
//! each path prefix.
//!
//! A session is created by the dispatcher for one message, passed down the
//! call stack by `&mut`, and dropped when the cycle ends. Nothing shared ever
//! holds one, so no message outlives its dispatch through the session.
use std::collections::{BTreeSet, HashMap};

use crate::path::CommandPath;

/// Index of a provider in the registry snapshot taken for the current cycle.
pub type ProviderId = usize;

/// What the session knows about one path.
#[derive(Debug, Clone, Default)]
pub struct PathEntry {
    /// Providers alive at this path.
    pub alive: Vec<ProviderId>,
    /// The option set each alive provider declared for this path. Queried once.
    pub offered: Vec<(ProviderId, BTreeSet<String>)>,
}

impl PathEntry {
    /// Union of all alive providers' options.
    pub fn union(&self) -> BTreeSet<String> {
        self.offered
            .iter()
            .flat_map(|(_, options)| options.iter().cloned())
            .collect()
    }

    /// Providers alive at `path.child(token)`: those that offered `token` here.
    pub fn owners_of(&self, token: &str) -> Vec<ProviderId> {
        self.offered
            .iter()
            .filter(|(_, options)| options.contains(token))
            .map(|(id, _)| *id)
            .collect()
    }
}

#[derive(Debug, Default)]
pub struct InvocationSession {
    entries: HashMap<CommandPath, PathEntry>,
}

impl InvocationSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entry(&self, path: &CommandPath) -> Option<&PathEntry> {
        self.entries.get(path)
    }

    pub fn contains(&self, path: &CommandPath) -> bool {
        self.entries.contains_key(path)
    }

    pub fn insert(&mut self, path: CommandPath, entry: PathEntry) {
        self.entries.insert(path, entry);
    }

    /// Providers alive at `path`, if the path has been visited.
    pub fn survivors(&self, path: &CommandPath) -> Option<&[ProviderId]> {
        self.entries.get(path).map(|e| e.alive.as_slice())
    }

    /// Providers that offered `token` at `path`, i.e. those alive at
    /// `path.child(token)`. Empty if `path` was never visited.
    pub fn owners_after(&self, path: &CommandPath, token: &str) -> Vec<ProviderId> {
        self.entries.get(path).map(|e| e.owners_of(token)).unwrap_or_default()
    }

    /// Union of options offered at `path`; empty if never visited.
    pub fn union_offered(&self, path: &CommandPath) -> BTreeSet<String> {
        self.entries.get(path).map(PathEntry::union).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn paths(&self) -> impl Iterator<Item = &CommandPath> {
        self.entries.keys()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn union_merges_duplicates_across_providers() {
        let entry = PathEntry {
            alive: vec![0, 1],
            offered: vec![(0, set(&["filter", "help"])), (1, set(&["filter", "role"]))],
        };
        assert_eq!(entry.union(), set(&["filter", "help", "role"]));
        assert_eq!(entry.owners_of("filter"), vec![0, 1]);
        assert_eq!(entry.owners_of("role"), vec![1]);
        assert!(entry.owners_of("quit").is_empty());
    }

    #[test]
    fn unvisited_paths_have_no_survivors() {
        let mut session = InvocationSession::new();
        let path = CommandPath::root().child("filter");
        assert!(session.survivors(&path).is_none());
        assert!(session.union_offered(&path).is_empty());

        session.insert(path.clone(), PathEntry { alive: vec![2], offered: vec![(2, set(&["add"]))] });
        assert_eq!(session.survivors(&path), Some(&[2][..]));
        assert_eq!(session.union_offered(&path), set(&["add"]));
        assert_eq!(session.owners_after(&path, "add"), vec![2]);
        assert!(session.owners_after(&CommandPath::root(), "filter").is_empty());
        assert_eq!(session.len(), 1);
    }
}
