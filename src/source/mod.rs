//! Content Sources
//!
//! A content source answers two questions: which files exist (in a stable
//! discovery order) and what a given file contains. Fetch failures are
//! reported per path and never affect other paths.

pub mod filter;
pub mod github;
pub mod local;
pub mod memory;

use async_trait::async_trait;
use std::sync::Arc;

use crate::types::Result;

pub use filter::EligibilityFilter;
pub use github::{GitHubClient, GitHubSource};
pub use local::LocalSource;
pub use memory::MemorySource;

/// Shared content source for concurrent fetches
pub type SharedSource = Arc<dyn ContentSource + Send + Sync>;

#[async_trait]
pub trait ContentSource: Send + Sync {
    /// All file paths, `/`-separated, in discovery order
    async fn list_files(&self) -> Result<Vec<String>>;

    /// Full text content of one file
    async fn fetch_content(&self, path: &str) -> Result<String>;

    /// Human-readable origin used in logs and reports
    fn describe(&self) -> String;
}
