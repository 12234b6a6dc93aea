//! Fan-in point for concurrently produced entries
//!
//! Workers finish in any order; the aggregator slots each entry by the
//! discovery index of its path so the final set is deterministic. It is owned
//! by the pipeline task alone and is never shared with workers.

use std::collections::HashMap;
use tracing::warn;

use crate::types::{DocumentationEntry, DocumentationSet};

#[derive(Debug)]
pub struct Aggregator {
    index: HashMap<String, usize>,
    slots: Vec<Option<DocumentationEntry>>,
}

impl Aggregator {
    /// `discovery_order` lists every path an entry may arrive for
    pub fn new<I, S>(discovery_order: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut index = HashMap::new();
        for path in discovery_order {
            let next = index.len();
            index.entry(path.into()).or_insert(next);
        }
        let slots = (0..index.len()).map(|_| None).collect();
        Self { index, slots }
    }

    /// Record the entry for `path`. Returns false when the path is unknown
    /// or already has an entry.
    pub fn add(&mut self, path: &str, entry: DocumentationEntry) -> bool {
        let Some(&position) = self.index.get(path) else {
            warn!("Ignoring entry for undiscovered path: {}", path);
            return false;
        };

        let slot = &mut self.slots[position];
        if slot.is_some() {
            warn!("Ignoring duplicate entry for {}", path);
            return false;
        }
        *slot = Some(entry);
        true
    }

    pub fn received(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    /// Entries in discovery order; paths that never produced one are absent
    pub fn finalize(self) -> DocumentationSet {
        let mut set = DocumentationSet::new();
        for entry in self.slots.into_iter().flatten() {
            set.insert(entry);
        }
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SourceFile;

    fn entry(path: &str) -> DocumentationEntry {
        DocumentationEntry::success(&SourceFile::new(path, "x"), format!("doc {}", path))
    }

    #[test]
    fn test_reorders_into_discovery_order() {
        let mut aggregator = Aggregator::new(["a.py", "b.py", "c.py"]);
        assert!(aggregator.add("c.py", entry("c.py")));
        assert!(aggregator.add("a.py", entry("a.py")));
        assert!(aggregator.add("b.py", entry("b.py")));

        let set = aggregator.finalize();
        assert_eq!(set.paths(), vec!["a.py", "b.py", "c.py"]);
    }

    #[test]
    fn test_missing_entries_leave_gaps_closed() {
        let mut aggregator = Aggregator::new(["a.py", "b.py", "c.py"]);
        aggregator.add("c.py", entry("c.py"));
        aggregator.add("a.py", entry("a.py"));

        assert_eq!(aggregator.received(), 2);
        assert_eq!(aggregator.finalize().paths(), vec!["a.py", "c.py"]);
    }

    #[test]
    fn test_rejects_unknown_and_duplicate_paths() {
        let mut aggregator = Aggregator::new(["a.py"]);
        assert!(!aggregator.add("zzz.py", entry("zzz.py")));
        assert!(aggregator.add("a.py", entry("a.py")));
        assert!(!aggregator.add("a.py", entry("a.py")));
        assert_eq!(aggregator.finalize().len(), 1);
    }

    #[test]
    fn test_empty_discovery() {
        let aggregator = Aggregator::new(Vec::<String>::new());
        assert!(aggregator.finalize().is_empty());
    }
}
