//! `repodoc local [PATH]`

use std::path::Path;
use std::sync::Arc;

use super::generate::{self, GenerateOptions, JobTarget};
use crate::config::ConfigLoader;
use crate::source::LocalSource;
use crate::types::{DocError, JobOutcome, Result};

pub fn run(path: &Path, options: &GenerateOptions) -> Result<JobOutcome> {
    if options.publish {
        return Err(DocError::Config(
            "Publishing is only available for GitHub repositories".to_string(),
        ));
    }

    let mut config = ConfigLoader::load()?;
    options.apply(&mut config)?;

    let root = path.canonicalize().map_err(|e| {
        DocError::Discovery(format!("Cannot open {}: {}", path.display(), e))
    })?;
    let repo = root
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("project")
        .to_string();

    let source = LocalSource::new(&root).with_max_file_size(config.filter.max_file_size);

    generate::run(
        JobTarget {
            owner: "local".to_string(),
            repo,
            credential: None,
            source: Arc::new(source),
        },
        &config,
    )
}
