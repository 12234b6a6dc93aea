//! Local directory source
//!
//! Walks a directory honoring `.gitignore`, without following symlinks.
//! Listing is sorted so that discovery order does not depend on the
//! filesystem's directory iteration order.

use async_trait::async_trait;
use ignore::WalkBuilder;
use std::path::{Component, Path, PathBuf};
use tracing::debug;

use super::ContentSource;
use crate::constants::filter::MAX_FILE_SIZE;
use crate::types::{DocError, Result};

#[derive(Debug, Clone)]
pub struct LocalSource {
    root: PathBuf,
    max_file_size: u64,
}

impl LocalSource {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            max_file_size: MAX_FILE_SIZE,
        }
    }

    pub fn with_max_file_size(mut self, size: u64) -> Self {
        self.max_file_size = size;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn scan(&self) -> Result<Vec<String>> {
        if !self.root.is_dir() {
            return Err(DocError::Discovery(format!(
                "{} is not a directory",
                self.root.display()
            )));
        }

        let walker = WalkBuilder::new(&self.root)
            .hidden(false)
            .git_ignore(true)
            .git_global(true)
            .git_exclude(true)
            .follow_links(false)
            .filter_entry(|entry| entry.file_name() != ".git")
            .build();

        let mut paths = Vec::new();
        for entry in walker.filter_map(|e| e.ok()) {
            let path = entry.path();
            if !entry.file_type().is_some_and(|t| t.is_file()) {
                continue;
            }

            match path.metadata() {
                Ok(metadata) if metadata.len() > self.max_file_size => {
                    debug!("Skipping oversized file: {}", path.display());
                    continue;
                }
                Ok(_) => {}
                Err(_) => continue,
            }

            if let Ok(relative) = path.strip_prefix(&self.root) {
                paths.push(to_slash_path(relative));
            }
        }

        paths.sort();
        Ok(paths)
    }

    /// Resolve a listed path under the root, refusing anything that escapes it
    fn resolve(&self, path: &str) -> Result<PathBuf> {
        let relative = Path::new(path);
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if escapes {
            return Err(DocError::fetch(path, "path escapes the source root"));
        }
        Ok(self.root.join(relative))
    }
}

fn to_slash_path(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

#[async_trait]
impl ContentSource for LocalSource {
    async fn list_files(&self) -> Result<Vec<String>> {
        let source = self.clone();
        tokio::task::spawn_blocking(move || source.scan())
            .await
            .map_err(|e| DocError::Discovery(format!("directory walk aborted: {}", e)))?
    }

    async fn fetch_content(&self, path: &str) -> Result<String> {
        let full_path = self.resolve(path)?;
        tokio::fs::read_to_string(&full_path)
            .await
            .map_err(|e| DocError::fetch(path, e))
    }

    fn describe(&self) -> String {
        self.root.display().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write(root: &Path, path: &str, content: &[u8]) {
        let full = root.join(path);
        fs::create_dir_all(full.parent().unwrap()).unwrap();
        fs::write(full, content).unwrap();
    }

    #[tokio::test]
    async fn test_lists_sorted_relative_paths() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "src/z.py", b"z");
        write(dir.path(), "b.py", b"b");
        write(dir.path(), "src/a/m.js", b"m");

        let source = LocalSource::new(dir.path());
        let files = source.list_files().await.unwrap();
        assert_eq!(files, vec!["b.py", "src/a/m.js", "src/z.py"]);
    }

    #[tokio::test]
    async fn test_skips_oversized_files() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "small.py", b"x");
        write(dir.path(), "big.py", &[b'x'; 64]);

        let source = LocalSource::new(dir.path()).with_max_file_size(16);
        assert_eq!(source.list_files().await.unwrap(), vec!["small.py"]);
    }

    #[tokio::test]
    async fn test_fetch_reads_content() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "pkg/app.py", b"print('hi')\n");

        let source = LocalSource::new(dir.path());
        assert_eq!(
            source.fetch_content("pkg/app.py").await.unwrap(),
            "print('hi')\n"
        );
    }

    #[tokio::test]
    async fn test_fetch_failures() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "binary.py", &[0xff, 0xfe, 0x00]);

        let source = LocalSource::new(dir.path());
        assert!(matches!(
            source.fetch_content("binary.py").await,
            Err(DocError::Fetch { .. })
        ));
        assert!(matches!(
            source.fetch_content("missing.py").await,
            Err(DocError::Fetch { .. })
        ));
        assert!(matches!(
            source.fetch_content("../outside.py").await,
            Err(DocError::Fetch { .. })
        ));
    }

    #[tokio::test]
    async fn test_missing_root_is_discovery_error() {
        let dir = TempDir::new().unwrap();
        let source = LocalSource::new(dir.path().join("nope"));
        assert!(matches!(
            source.list_files().await,
            Err(DocError::Discovery(_))
        ));
    }
}
