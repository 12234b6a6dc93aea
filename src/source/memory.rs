//! In-memory content source

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};

use super::ContentSource;
use crate::types::{DocError, Result};

/// Ordered `(path, content)` pairs held in memory.
///
/// Paths marked with [`MemorySource::fail_on`] are listed but their fetch
/// fails, which makes partial-failure runs reproducible.
#[derive(Debug, Default, Clone)]
pub struct MemorySource {
    order: Vec<String>,
    files: HashMap<String, String>,
    failing: HashSet<String>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_files<I, P, C>(files: I) -> Self
    where
        I: IntoIterator<Item = (P, C)>,
        P: Into<String>,
        C: Into<String>,
    {
        files
            .into_iter()
            .fold(Self::new(), |source, (path, content)| source.with_file(path, content))
    }

    pub fn with_file(mut self, path: impl Into<String>, content: impl Into<String>) -> Self {
        let path = path.into();
        if self.files.insert(path.clone(), content.into()).is_none() {
            self.order.push(path);
        }
        self
    }

    /// Make fetching `path` fail
    pub fn fail_on(mut self, path: impl Into<String>) -> Self {
        let path = path.into();
        if !self.files.contains_key(&path) {
            self.order.push(path.clone());
        }
        self.failing.insert(path);
        self
    }
}

#[async_trait]
impl ContentSource for MemorySource {
    async fn list_files(&self) -> Result<Vec<String>> {
        Ok(self.order.clone())
    }

    async fn fetch_content(&self, path: &str) -> Result<String> {
        if self.failing.contains(path) {
            return Err(DocError::fetch(path, "simulated fetch failure"));
        }
        self.files
            .get(path)
            .cloned()
            .ok_or_else(|| DocError::fetch(path, "not found"))
    }

    fn describe(&self) -> String {
        format!("memory ({} files)", self.order.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_listing_keeps_insertion_order() {
        let source = MemorySource::from_files([("b.py", "b"), ("a.py", "a")]);
        assert_eq!(source.list_files().await.unwrap(), vec!["b.py", "a.py"]);
    }

    #[tokio::test]
    async fn test_failing_path_is_listed_but_unfetchable() {
        let source = MemorySource::new().with_file("a.py", "x").fail_on("b.py");

        assert_eq!(source.list_files().await.unwrap(), vec!["a.py", "b.py"]);
        assert_eq!(source.fetch_content("a.py").await.unwrap(), "x");
        assert!(matches!(
            source.fetch_content("b.py").await,
            Err(DocError::Fetch { .. })
        ));
    }

    #[tokio::test]
    async fn test_unknown_path_is_fetch_error() {
        let source = MemorySource::new();
        assert!(matches!(
            source.fetch_content("missing.py").await,
            Err(DocError::Fetch { .. })
        ));
    }
}
