//! Local documentation layout
//!
//! ```text
//! {dir}/index.md        links to every document, in discovery order
//! {dir}/{slug}.md       one per entry, failed entries included
//! {dir}/manifest.json   path, slug, status and content hash per entry
//! ```

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::constants::output::{DOC_EXTENSION, INDEX_FILE, MANIFEST_FILE};
use crate::types::{DocError, DocumentationSet, EntryStatus, Result};

/// File-name-safe form of a repository path
pub fn slug(path: &str) -> String {
    path.replace(['/', '\\'], "_")
}

/// One slug per entry, in set order. A slug already taken by an earlier
/// entry (`a/b.py` vs `a_b.py`) gets a numeric suffix.
fn assign_slugs(set: &DocumentationSet) -> Vec<String> {
    let mut taken = HashSet::new();
    set.iter()
        .map(|entry| {
            let base = slug(&entry.path);
            let mut candidate = base.clone();
            let mut n = 2;
            while !taken.insert(candidate.clone()) {
                candidate = format!("{}-{}", base, n);
                n += 1;
            }
            candidate
        })
        .collect()
}

#[derive(Debug, Serialize)]
pub struct Manifest {
    pub generated_at: DateTime<Utc>,
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub entries: Vec<ManifestEntry>,
}

#[derive(Debug, Serialize)]
pub struct ManifestEntry {
    pub path: String,
    pub slug: String,
    pub file: String,
    pub status: EntryStatus,
    pub content_hash: String,
}

/// A rendered output file, relative to the documentation root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedFile {
    pub relative_path: String,
    pub content: String,
}

/// Render index, per-file documents and manifest for `set`
pub fn render(set: &DocumentationSet, generated_at: DateTime<Utc>) -> Result<Vec<RenderedFile>> {
    let slugs = assign_slugs(set);
    let mut files = Vec::with_capacity(set.len() + 2);

    let mut index = String::from("# Project Documentation\n\n## Files\n\n");
    for (entry, slug) in set.iter().zip(&slugs) {
        index.push_str(&format!("- [{}]({}.{})", entry.path, slug, DOC_EXTENSION));
        if !entry.is_success() {
            index.push_str(" (failed)");
        }
        index.push('\n');
    }
    files.push(RenderedFile {
        relative_path: INDEX_FILE.to_string(),
        content: index,
    });

    for (entry, slug) in set.iter().zip(&slugs) {
        files.push(RenderedFile {
            relative_path: format!("{}.{}", slug, DOC_EXTENSION),
            content: format!("# Documentation for {}\n\n{}", entry.path, entry.body),
        });
    }

    let manifest = Manifest {
        generated_at,
        total: set.len(),
        succeeded: set.success_count(),
        failed: set.failed_count(),
        entries: set
            .iter()
            .zip(&slugs)
            .map(|(entry, slug)| ManifestEntry {
                path: entry.path.clone(),
                slug: slug.clone(),
                file: format!("{}.{}", slug, DOC_EXTENSION),
                status: entry.status,
                content_hash: entry.content_hash.clone(),
            })
            .collect(),
    };
    files.push(RenderedFile {
        relative_path: MANIFEST_FILE.to_string(),
        content: serde_json::to_string_pretty(&manifest)?,
    });

    Ok(files)
}

#[derive(Debug, Clone, Serialize)]
pub struct PersistReport {
    pub dir: PathBuf,
    pub index: PathBuf,
    pub documents: usize,
}

/// Writes the rendered layout to a local directory
#[derive(Debug, Default, Clone, Copy)]
pub struct Persister;

impl Persister {
    pub fn new() -> Self {
        Self
    }

    pub fn persist(&self, set: &DocumentationSet, target_dir: &Path) -> Result<PersistReport> {
        fs::create_dir_all(target_dir).map_err(|e| DocError::persist(target_dir, e))?;

        let files = render(set, Utc::now())?;
        for file in &files {
            let path = target_dir.join(&file.relative_path);
            fs::write(&path, &file.content).map_err(|e| DocError::persist(&path, e))?;
            debug!("Wrote {}", path.display());
        }

        info!(
            "Persisted {} documents to {}",
            set.len(),
            target_dir.display()
        );

        Ok(PersistReport {
            dir: target_dir.to_path_buf(),
            index: target_dir.join(INDEX_FILE),
            documents: set.len(),
        })
    }
}
