//! GitHub repository source
//!
//! Lists a repository through the git trees API and fetches file contents
//! through the contents API. [`GitHubClient`] carries the shared HTTP
//! plumbing and is reused by the publisher.

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use reqwest::{Method, RequestBuilder};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};
use url::Url;

use super::ContentSource;
use crate::config::GitHubConfig;
use crate::constants::{github, network};
use crate::types::{DocError, Result};

// =============================================================================
// Client
// =============================================================================

/// Authenticated GitHub REST client
pub struct GitHubClient {
    http: reqwest::Client,
    api_base: Url,
    token: Option<SecretString>,
}

impl std::fmt::Debug for GitHubClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubClient")
            .field("api_base", &self.api_base.as_str())
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl GitHubClient {
    pub fn new(api_base: &str, token: Option<&SecretString>) -> Result<Self> {
        let api_base = Url::parse(api_base).map_err(|e| {
            DocError::Config(format!("Invalid GitHub API base '{}': {}", api_base, e))
        })?;
        if api_base.cannot_be_a_base() {
            return Err(DocError::Config(format!(
                "GitHub API base cannot hold paths: {}",
                api_base
            )));
        }

        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::ACCEPT,
            reqwest::header::HeaderValue::from_static(github::ACCEPT_HEADER),
        );

        let http = reqwest::Client::builder()
            .user_agent(github::USER_AGENT)
            .default_headers(headers)
            .connect_timeout(Duration::from_secs(network::CONNECTION_TIMEOUT_SECS))
            .timeout(Duration::from_secs(network::DEFAULT_TIMEOUT_SECS))
            .build()
            .map_err(|e| DocError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http,
            api_base,
            token: token.map(|t| SecretString::from(t.expose_secret().to_owned())),
        })
    }

    /// `{api_base}/repos/{owner}/{repo}/{segments...}` with each segment
    /// percent-encoded
    pub fn repo_url(&self, owner: &str, repo: &str, segments: &[&str]) -> Result<Url> {
        let mut url = self.api_base.clone();
        {
            let mut path = url.path_segments_mut().map_err(|_| {
                DocError::Config(format!("GitHub API base cannot hold paths: {}", self.api_base))
            })?;
            path.pop_if_empty().extend(["repos", owner, repo]);
            for segment in segments {
                path.extend(segment.split('/').filter(|s| !s.is_empty()));
            }
        }
        Ok(url)
    }

    pub fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let builder = self.http.request(method, url);
        match &self.token {
            Some(token) => builder.bearer_auth(token.expose_secret()),
            None => builder,
        }
    }
}

/// Error text for a non-success response, including GitHub's message if any
pub async fn describe_failure(response: reqwest::Response) -> String {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<serde_json::Value>(&body)
        .ok()
        .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(String::from))
        .unwrap_or(body);

    if message.is_empty() {
        format!("HTTP {}", status)
    } else {
        format!("HTTP {}: {}", status, message)
    }
}

// =============================================================================
// Source
// =============================================================================

#[derive(Debug, Deserialize)]
struct TreeResponse {
    #[serde(default)]
    tree: Vec<TreeItem>,
    #[serde(default)]
    truncated: bool,
}

#[derive(Debug, Deserialize)]
struct TreeItem {
    path: String,
    #[serde(rename = "type")]
    kind: String,
}

#[derive(Debug, Deserialize)]
struct ContentResponse {
    content: String,
    encoding: String,
}

/// Blob paths of a recursive tree listing, in tree order
fn parse_tree(body: &str) -> Result<(Vec<String>, bool)> {
    let response: TreeResponse = serde_json::from_str(body)
        .map_err(|e| DocError::Discovery(format!("Malformed tree listing: {}", e)))?;

    let paths = response
        .tree
        .into_iter()
        .filter(|item| item.kind == "blob")
        .map(|item| item.path)
        .collect();
    Ok((paths, response.truncated))
}

/// Decode a contents API payload into text
fn decode_content(path: &str, body: &str) -> Result<String> {
    let response: ContentResponse = serde_json::from_str(body)
        .map_err(|e| DocError::fetch(path, format!("unexpected contents payload: {}", e)))?;

    if response.encoding != "base64" {
        return Err(DocError::fetch(
            path,
            format!("unsupported encoding '{}'", response.encoding),
        ));
    }

    let compact: String = response
        .content
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();
    let bytes = STANDARD
        .decode(compact)
        .map_err(|e| DocError::fetch(path, format!("invalid base64: {}", e)))?;

    String::from_utf8(bytes).map_err(|_| DocError::fetch(path, "content is not valid UTF-8"))
}

/// Files of one repository ref on GitHub
#[derive(Debug)]
pub struct GitHubSource {
    client: GitHubClient,
    owner: String,
    repo: String,
    git_ref: String,
}

impl GitHubSource {
    pub fn new(
        owner: impl Into<String>,
        repo: impl Into<String>,
        credential: Option<&SecretString>,
        config: &GitHubConfig,
    ) -> Result<Self> {
        Ok(Self {
            client: GitHubClient::new(&config.api_base, credential)?,
            owner: owner.into(),
            repo: repo.into(),
            git_ref: config.git_ref.clone(),
        })
    }
}

#[async_trait]
impl ContentSource for GitHubSource {
    #[instrument(skip(self), fields(owner = %self.owner, repo = %self.repo, git_ref = %self.git_ref))]
    async fn list_files(&self) -> Result<Vec<String>> {
        let mut url = self
            .client
            .repo_url(&self.owner, &self.repo, &["git", "trees", &self.git_ref])?;
        url.query_pairs_mut().append_pair("recursive", "1");

        let response = self
            .client
            .request(Method::GET, url)
            .send()
            .await
            .map_err(|e| DocError::Discovery(format!("Tree request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(DocError::Discovery(format!(
                "Listing {}/{}@{} failed: {}",
                self.owner,
                self.repo,
                self.git_ref,
                describe_failure(response).await
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| DocError::Discovery(format!("Tree response unreadable: {}", e)))?;
        let (paths, truncated) = parse_tree(&body)?;

        if truncated {
            warn!(
                "Tree listing for {}/{} was truncated by GitHub; some files will be missing",
                self.owner, self.repo
            );
        }
        info!("Listed {} files", paths.len());
        Ok(paths)
    }

    async fn fetch_content(&self, path: &str) -> Result<String> {
        let mut url = self
            .client
            .repo_url(&self.owner, &self.repo, &["contents", path])?;
        url.query_pairs_mut().append_pair("ref", &self.git_ref);

        debug!("Fetching {}", path);
        let response = self
            .client
            .request(Method::GET, url)
            .send()
            .await
            .map_err(|e| DocError::fetch(path, e))?;

        if !response.status().is_success() {
            return Err(DocError::fetch(path, describe_failure(response).await));
        }

        let body = response.text().await.map_err(|e| DocError::fetch(path, e))?;
        decode_content(path, &body)
    }

    fn describe(&self) -> String {
        format!("github:{}/{}@{}", self.owner, self.repo, self.git_ref)
    }
}
