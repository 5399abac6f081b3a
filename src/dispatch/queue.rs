//! Work queue
//!
//! The queue is the only shared mutable state in the dispatcher. It is built
//! once from a directory scan and then only ever shrinks: the accessor pops
//! the last element under a mutex held for just the check-and-remove, so each
//! script is handed out at most once no matter how many sessions call in
//! concurrently. Once an item is removed the dispatcher keeps no record of
//! who received it.

use crate::config::ScanPattern;
use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Mutex;

/// Result of asking the queue for work
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    /// Path of the next script to run
    Item(String),
    /// Queue is empty; nothing to hand out
    Wait,
}

/// Ordered collection of not-yet-dispatched script paths
///
/// Items are removed from the end (LIFO). The ordering is a deliberate
/// carry-over from the system this replaces, not an accident.
pub struct WorkQueue {
    items: Mutex<Vec<String>>,
}

impl WorkQueue {
    /// Build a queue from an explicit item list, in the given order
    pub fn new(items: Vec<String>) -> Self {
        Self {
            items: Mutex::new(items),
        }
    }

    /// Build a queue by scanning a directory once
    ///
    /// File names are filtered by `pattern` and queued as full paths in scan
    /// order. Zero matches is valid (an empty queue); an unreadable directory
    /// is an error. The directory is never rescanned.
    pub fn from_dir(dir: &Path, pattern: &ScanPattern) -> Result<Self> {
        let entries = std::fs::read_dir(dir)
            .with_context(|| format!("Failed to scan test directory: {}", dir.display()))?;

        let mut items = Vec::new();
        for entry in entries {
            let entry = entry
                .with_context(|| format!("Failed to read entry in {}", dir.display()))?;
            let name = entry.file_name();
            let name = name.to_string_lossy();
            if pattern.matches(&name) {
                items.push(entry.path().display().to_string());
            }
        }

        Ok(Self::new(items))
    }

    /// Hand out the next item, or `Wait` if the queue is empty
    ///
    /// The critical section is exactly the check-and-remove, so concurrent
    /// callers observe a total order of removals: no item is returned twice
    /// and none is skipped. Never blocks on anything but the lock.
    pub fn next_item(&self) -> Dispatch {
        let mut items = self.items.lock().unwrap_or_else(|e| e.into_inner());
        match items.pop() {
            Some(path) => Dispatch::Item(path),
            None => Dispatch::Wait,
        }
    }

    /// Number of items not yet dispatched
    pub fn len(&self) -> usize {
        self.items.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;

    fn queue_of(items: &[&str]) -> WorkQueue {
        WorkQueue::new(items.iter().map(|s| s.to_string()).collect())
    }

    #[test]
    fn test_pops_from_the_end() {
        let queue = queue_of(&["A", "B", "C"]);
        assert_eq!(queue.next_item(), Dispatch::Item("C".into()));
        assert_eq!(queue.next_item(), Dispatch::Item("B".into()));
        assert_eq!(queue.next_item(), Dispatch::Item("A".into()));
        assert_eq!(queue.next_item(), Dispatch::Wait);
    }

    #[test]
    fn test_empty_queue_waits_forever() {
        let queue = WorkQueue::new(Vec::new());
        for _ in 0..100 {
            assert_eq!(queue.next_item(), Dispatch::Wait);
        }
    }

    #[test]
    fn test_concurrent_pops_are_exclusive() {
        // 8 threads racing over 3 items: each item goes to exactly one
        // caller, everyone else sees Wait.
        let queue = Arc::new(queue_of(&["A", "B", "C"]));
        let mut handles = Vec::new();
        for _ in 0..8 {
            let queue = queue.clone();
            handles.push(std::thread::spawn(move || queue.next_item()));
        }

        let results: Vec<Dispatch> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        let items: Vec<&String> = results
            .iter()
            .filter_map(|d| match d {
                Dispatch::Item(path) => Some(path),
                Dispatch::Wait => None,
            })
            .collect();

        let distinct: HashSet<&String> = items.iter().copied().collect();
        assert_eq!(items.len(), 3);
        assert_eq!(distinct.len(), 3);
        assert_eq!(queue.next_item(), Dispatch::Wait);
    }

    #[test]
    fn test_n_poppers_m_items() {
        // min(N, M) distinct results, no repeats, for N < M
        let items: Vec<String> = (0..50).map(|i| format!("tests/Run_{}.py", i)).collect();
        let queue = Arc::new(WorkQueue::new(items));

        let mut handles = Vec::new();
        for _ in 0..12 {
            let queue = queue.clone();
            handles.push(std::thread::spawn(move || {
                let mut got = Vec::new();
                for _ in 0..2 {
                    if let Dispatch::Item(path) = queue.next_item() {
                        got.push(path);
                    }
                }
                got
            }));
        }

        let all: Vec<String> = handles
            .into_iter()
            .flat_map(|h| h.join().unwrap())
            .collect();
        let distinct: HashSet<&String> = all.iter().collect();
        assert_eq!(all.len(), 24);
        assert_eq!(distinct.len(), 24);
        assert_eq!(queue.len(), 50 - 24);
    }

    #[test]
    fn test_from_dir_filters_by_pattern() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["Run_1.py", "Run_2.py", "Template.py", "Run_3.sh", "notes.txt"] {
            std::fs::write(dir.path().join(name), "").unwrap();
        }

        let queue = WorkQueue::from_dir(dir.path(), &ScanPattern::new("Run", ".py")).unwrap();
        assert_eq!(queue.len(), 2);

        let mut paths = Vec::new();
        while let Dispatch::Item(path) = queue.next_item() {
            paths.push(path);
        }
        assert!(paths.iter().all(|p| p.starts_with(dir.path().to_str().unwrap())));
        assert!(paths.iter().any(|p| p.ends_with("Run_1.py")));
        assert!(paths.iter().any(|p| p.ends_with("Run_2.py")));
    }

    #[test]
    fn test_from_dir_empty_match_is_valid() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("README"), "").unwrap();

        let queue = WorkQueue::from_dir(dir.path(), &ScanPattern::new("Run", ".py")).unwrap();
        assert!(queue.is_empty());
        assert_eq!(queue.next_item(), Dispatch::Wait);
    }

    #[test]
    fn test_from_dir_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent");
        assert!(WorkQueue::from_dir(&missing, &ScanPattern::new("Run", ".py")).is_err());
    }
}
