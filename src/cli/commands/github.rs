//! `repodoc github <owner> <repo>`

use secrecy::SecretString;
use std::sync::Arc;

use super::generate::{self, GenerateOptions, JobTarget};
use crate::config::ConfigLoader;
use crate::source::GitHubSource;
use crate::types::{DocError, JobOutcome, Result};

pub fn run(
    owner: &str,
    repo: &str,
    token: Option<String>,
    git_ref: Option<String>,
    options: &GenerateOptions,
) -> Result<JobOutcome> {
    let mut config = ConfigLoader::load()?;
    if let Some(git_ref) = git_ref {
        config.github.git_ref = git_ref;
    }
    options.apply(&mut config)?;

    let credential = token.filter(|t| !t.is_empty()).map(SecretString::from);
    if config.output.publish && credential.is_none() {
        return Err(DocError::Config(
            "--publish requires a token (--token or GITHUB_TOKEN)".to_string(),
        ));
    }

    let source = GitHubSource::new(owner, repo, credential.as_ref(), &config.github)?;

    generate::run(
        JobTarget {
            owner: owner.to_string(),
            repo: repo.to_string(),
            credential,
            source: Arc::new(source),
        },
        &config,
    )
}
