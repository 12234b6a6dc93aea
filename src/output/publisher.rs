//! Publishing generated documentation back to the repository
//!
//! [`NoopPublisher`] is the default. [`GitHubPublisher`] creates a branch off
//! the documented ref, commits every rendered file under the publish path
//! through the contents API and optionally opens a pull request.

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::{DateTime, Utc};
use reqwest::Method;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, instrument};

use super::persister::{RenderedFile, render};
use crate::config::Config;
use crate::source::GitHubClient;
use crate::source::github::describe_failure;
use crate::types::{DocError, DocumentationSet, Result};

#[derive(Debug, Clone, Default, Serialize)]
pub struct PublishReceipt {
    pub published: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
    pub files: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pull_request_url: Option<String>,
}

pub type SharedPublisher = Arc<dyn Publisher + Send + Sync>;

#[async_trait]
pub trait Publisher: Send + Sync {
    async fn publish(
        &self,
        owner: &str,
        repo: &str,
        credential: Option<&SecretString>,
        set: &DocumentationSet,
    ) -> Result<PublishReceipt>;
}

/// Leaves the repository untouched
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopPublisher;

#[async_trait]
impl Publisher for NoopPublisher {
    async fn publish(
        &self,
        _owner: &str,
        _repo: &str,
        _credential: Option<&SecretString>,
        _set: &DocumentationSet,
    ) -> Result<PublishReceipt> {
        Ok(PublishReceipt::default())
    }
}

#[derive(Debug, Clone)]
pub struct GitHubPublisher {
    api_base: String,
    base_ref: String,
    publish_path: String,
    branch_prefix: String,
    open_pull_request: bool,
}

#[derive(Debug, Deserialize)]
struct RefResponse {
    object: RefObject,
}

#[derive(Debug, Deserialize)]
struct RefObject {
    sha: String,
}

#[derive(Debug, Deserialize)]
struct ExistingContent {
    sha: String,
}

#[derive(Debug, Serialize)]
struct PutContentRequest<'a> {
    message: String,
    content: String,
    branch: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    sha: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PullResponse {
    html_url: String,
}

impl GitHubPublisher {
    pub fn from_config(config: &Config) -> Self {
        Self {
            api_base: config.github.api_base.clone(),
            base_ref: config.github.git_ref.clone(),
            publish_path: config.output.publish_path.trim_matches('/').to_string(),
            branch_prefix: config.output.branch_prefix.clone(),
            open_pull_request: config.output.open_pull_request,
        }
    }

    fn branch_name(&self, at: DateTime<Utc>) -> String {
        format!("{}-{}", self.branch_prefix, at.format("%Y%m%d%H%M%S"))
    }

    fn repo_path(&self, file: &RenderedFile) -> String {
        if self.publish_path.is_empty() {
            file.relative_path.clone()
        } else {
            format!("{}/{}", self.publish_path, file.relative_path)
        }
    }

    async fn base_sha(&self, client: &GitHubClient, owner: &str, repo: &str) -> Result<String> {
        let url = client.repo_url(owner, repo, &["git", "ref", "heads", &self.base_ref])?;
        let response = client
            .request(Method::GET, url)
            .send()
            .await
            .map_err(|e| DocError::Publish(format!("Reading {} failed: {}", self.base_ref, e)))?;

        if !response.status().is_success() {
            return Err(DocError::Publish(format!(
                "Reading {} failed: {}",
                self.base_ref,
                describe_failure(response).await
            )));
        }

        let body: RefResponse = response
            .json()
            .await
            .map_err(|e| DocError::Publish(format!("Unexpected ref payload: {}", e)))?;
        Ok(body.object.sha)
    }

    async fn create_branch(
        &self,
        client: &GitHubClient,
        owner: &str,
        repo: &str,
        branch: &str,
        sha: &str,
    ) -> Result<()> {
        let url = client.repo_url(owner, repo, &["git", "refs"])?;
        let response = client
            .request(Method::POST, url)
            .json(&serde_json::json!({
                "ref": format!("refs/heads/{}", branch),
                "sha": sha,
            }))
            .send()
            .await
            .map_err(|e| DocError::Publish(format!("Creating branch {} failed: {}", branch, e)))?;

        if !response.status().is_success() {
            return Err(DocError::Publish(format!(
                "Creating branch {} failed: {}",
                branch,
                describe_failure(response).await
            )));
        }
        Ok(())
    }

    /// Blob SHA of a file already on the branch; required to overwrite it
    async fn existing_sha(
        &self,
        client: &GitHubClient,
        owner: &str,
        repo: &str,
        path: &str,
        branch: &str,
    ) -> Result<Option<String>> {
        let mut url = client.repo_url(owner, repo, &["contents", path])?;
        url.query_pairs_mut().append_pair("ref", branch);

        let response = client
            .request(Method::GET, url)
            .send()
            .await
            .map_err(|e| DocError::Publish(format!("Checking {} failed: {}", path, e)))?;

        if !response.status().is_success() {
            return Ok(None);
        }
        Ok(response.json::<ExistingContent>().await.ok().map(|c| c.sha))
    }

    async fn put_file(
        &self,
        client: &GitHubClient,
        owner: &str,
        repo: &str,
        branch: &str,
        file: &RenderedFile,
    ) -> Result<()> {
        let path = self.repo_path(file);
        let sha = self.existing_sha(client, owner, repo, &path, branch).await?;
        let request = PutContentRequest {
            message: format!("docs: update {}", path),
            content: STANDARD.encode(&file.content),
            branch,
            sha,
        };

        let url = client.repo_url(owner, repo, &["contents", &path])?;
        let response = client
            .request(Method::PUT, url)
            .json(&request)
            .send()
            .await
            .map_err(|e| DocError::Publish(format!("Writing {} failed: {}", path, e)))?;

        if !response.status().is_success() {
            return Err(DocError::Publish(format!(
                "Writing {} failed: {}",
                path,
                describe_failure(response).await
            )));
        }
        debug!("Published {}", path);
        Ok(())
    }

    async fn create_pull_request(
        &self,
        client: &GitHubClient,
        owner: &str,
        repo: &str,
        branch: &str,
        set: &DocumentationSet,
    ) -> Result<String> {
        let url = client.repo_url(owner, repo, &["pulls"])?;
        let response = client
            .request(Method::POST, url)
            .json(&serde_json::json!({
                "title": "Add generated documentation",
                "head": branch,
                "base": self.base_ref,
                "body": format!(
                    "Generated documentation for {} files ({} failed).",
                    set.len(),
                    set.failed_count()
                ),
            }))
            .send()
            .await
            .map_err(|e| DocError::Publish(format!("Opening pull request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(DocError::Publish(format!(
                "Opening pull request failed: {}",
                describe_failure(response).await
            )));
        }

        let pull: PullResponse = response
            .json()
            .await
            .map_err(|e| DocError::Publish(format!("Unexpected pull request payload: {}", e)))?;
        Ok(pull.html_url)
    }
}

#[async_trait]
impl Publisher for GitHubPublisher {
    #[instrument(skip(self, credential, set), fields(files = set.len()))]
    async fn publish(
        &self,
        owner: &str,
        repo: &str,
        credential: Option<&SecretString>,
        set: &DocumentationSet,
    ) -> Result<PublishReceipt> {
        let Some(credential) = credential else {
            return Err(DocError::Publish(
                "Publishing requires a GitHub token".to_string(),
            ));
        };

        let client = GitHubClient::new(&self.api_base, Some(credential))?;
        let now = Utc::now();
        let files = render(set, now)?;
        let branch = self.branch_name(now);

        let sha = self.base_sha(&client, owner, repo).await?;
        self.create_branch(&client, owner, repo, &branch, &sha).await?;
        info!("Created branch {} from {}", branch, self.base_ref);

        // Sequential: concurrent writes to one branch conflict on the head commit
        for file in &files {
            self.put_file(&client, owner, repo, &branch, file).await?;
        }

        let pull_request_url = if self.open_pull_request {
            let url = self
                .create_pull_request(&client, owner, repo, &branch, set)
                .await?;
            info!("Opened pull request {}", url);
            Some(url)
        } else {
            None
        };

        Ok(PublishReceipt {
            published: true,
            branch: Some(branch),
            files: files.len(),
            pull_request_url,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn publisher() -> GitHubPublisher {
        GitHubPublisher::from_config(&Config::default())
    }

    #[tokio::test]
    async fn test_noop_publisher() {
        let receipt = NoopPublisher
            .publish("o", "r", None, &DocumentationSet::new())
            .await
            .unwrap();
        assert!(!receipt.published);
        assert!(receipt.branch.is_none());
    }

    #[tokio::test]
    async fn test_github_publisher_requires_credential() {
        let result = publisher()
            .publish("o", "r", None, &DocumentationSet::new())
            .await;
        assert!(matches!(result, Err(DocError::Publish(_))));
    }

    #[test]
    fn test_branch_name() {
        let at = Utc.with_ymd_and_hms(2024, 3, 5, 14, 7, 9).unwrap();
        assert_eq!(publisher().branch_name(at), "docs/generated-20240305140709");
    }

    #[test]
    fn test_repo_path_under_publish_path() {
        let file = RenderedFile {
            relative_path: "src_a.py.md".to_string(),
            content: String::new(),
        };
        assert_eq!(publisher().repo_path(&file), "docs/src_a.py.md");

        let mut config = Config::default();
        config.output.publish_path = "/".to_string();
        let root = GitHubPublisher::from_config(&config);
        assert_eq!(root.repo_path(&file), "src_a.py.md");
    }

    #[test]
    fn test_put_request_shape() {
        let request = PutContentRequest {
            message: "docs: update docs/index.md".to_string(),
            content: STANDARD.encode("# Project Documentation\n"),
            branch: "docs/generated-1",
            sha: None,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["branch"], "docs/generated-1");
        assert!(json.get("sha").is_none());
        assert_eq!(
            STANDARD.decode(json["content"].as_str().unwrap()).unwrap(),
            b"# Project Documentation\n"
        );
    }
}
