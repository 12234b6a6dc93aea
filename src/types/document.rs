//! Documentation data model
//!
//! `SourceFile` is what a content source yields, `DocumentationEntry` is what
//! the generator produces for it, and `DocumentationSet` keeps entries in
//! discovery order so the index is deterministic.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;

/// A fetched, eligible file. Identity is its path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub path: String,
    pub content: String,
}

impl SourceFile {
    pub fn new(path: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
        }
    }

    /// SHA-256 hex digest of the content
    pub fn content_hash(&self) -> String {
        let digest = Sha256::digest(self.content.as_bytes());
        digest.iter().map(|b| format!("{:02x}", b)).collect()
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EntryStatus {
    Success,
    Failed,
}

impl std::fmt::Display for EntryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntryStatus::Success => write!(f, "success"),
            EntryStatus::Failed => write!(f, "failed"),
        }
    }
}

/// Generated documentation for one file, or the reason it could not be made
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DocumentationEntry {
    pub path: String,
    pub status: EntryStatus,
    /// Documentation text, or the error description for failed entries
    pub body: String,
    pub content_hash: String,
}

impl DocumentationEntry {
    pub fn success(file: &SourceFile, body: impl Into<String>) -> Self {
        Self {
            path: file.path.clone(),
            status: EntryStatus::Success,
            body: body.into(),
            content_hash: file.content_hash(),
        }
    }

    pub fn failed(file: &SourceFile, reason: impl Into<String>) -> Self {
        Self {
            path: file.path.clone(),
            status: EntryStatus::Failed,
            body: reason.into(),
            content_hash: file.content_hash(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == EntryStatus::Success
    }
}

/// A file that was eligible but could not be retrieved
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FetchFailure {
    pub path: String,
    pub reason: String,
}

/// Ordered path → entry mapping; iteration follows insertion order
#[derive(Debug, Clone, Default, Serialize)]
pub struct DocumentationSet {
    entries: Vec<DocumentationEntry>,
    #[serde(skip)]
    positions: HashMap<String, usize>,
}

impl DocumentationSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry. Returns `false` and keeps the existing entry when the
    /// path is already present.
    pub fn insert(&mut self, entry: DocumentationEntry) -> bool {
        if self.positions.contains_key(&entry.path) {
            return false;
        }
        self.positions.insert(entry.path.clone(), self.entries.len());
        self.entries.push(entry);
        true
    }

    pub fn get(&self, path: &str) -> Option<&DocumentationEntry> {
        self.positions.get(path).map(|&idx| &self.entries[idx])
    }

    pub fn contains(&self, path: &str) -> bool {
        self.positions.contains_key(path)
    }

    pub fn iter(&self) -> impl Iterator<Item = &DocumentationEntry> {
        self.entries.iter()
    }

    pub fn paths(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.path.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn success_count(&self) -> usize {
        self.entries.iter().filter(|e| e.is_success()).count()
    }

    pub fn failed_count(&self) -> usize {
        self.entries.len() - self.success_count()
    }
}

impl<'a> IntoIterator for &'a DocumentationSet {
    type Item = &'a DocumentationEntry;
    type IntoIter = std::slice::Iter<'a, DocumentationEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(path: &str, content: &str) -> SourceFile {
        SourceFile::new(path, content)
    }

    #[test]
    fn test_set_preserves_insertion_order() {
        let mut set = DocumentationSet::new();
        set.insert(DocumentationEntry::success(&file("b.py", "y"), "doc b"));
        set.insert(DocumentationEntry::success(&file("a.py", "x"), "doc a"));

        assert_eq!(set.paths(), vec!["b.py", "a.py"]);
        assert_eq!(set.get("a.py").map(|e| e.body.as_str()), Some("doc a"));
    }

    #[test]
    fn test_set_rejects_duplicate_path() {
        let mut set = DocumentationSet::new();
        assert!(set.insert(DocumentationEntry::success(&file("a.py", "x"), "first")));
        assert!(!set.insert(DocumentationEntry::success(&file("a.py", "x"), "second")));

        assert_eq!(set.len(), 1);
        assert_eq!(set.get("a.py").unwrap().body, "first");
    }

    #[test]
    fn test_set_counts() {
        let mut set = DocumentationSet::new();
        set.insert(DocumentationEntry::success(&file("a.py", "x"), "ok"));
        set.insert(DocumentationEntry::failed(&file("b.py", "y"), "boom"));

        assert_eq!(set.success_count(), 1);
        assert_eq!(set.failed_count(), 1);
        assert!(!set.get("b.py").unwrap().is_success());
    }

    #[test]
    fn test_content_hash_is_sha256_hex() {
        let hash = file("a.py", "").content_hash();
        assert_eq!(
            hash,
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }
}
