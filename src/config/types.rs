//! Configuration Types
//!
//! All configuration structures with sensible defaults.
//! Supports global (~/.config/repodoc/) and project (.repodoc/) level configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::ai::provider::ProviderConfig;
use crate::constants::{filter, github, llm, network, output, pipeline};
use crate::types::{DocError, Result};

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Configuration version
    pub version: String,

    /// Generation backend settings
    pub llm: LlmConfig,

    /// GitHub API settings
    pub github: GitHubConfig,

    /// Eligibility filter settings
    pub filter: FilterConfig,

    /// Concurrency and retry settings
    pub pipeline: PipelineConfig,

    /// Local output and publishing settings
    pub output: OutputConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            llm: LlmConfig::default(),
            github: GitHubConfig::default(),
            filter: FilterConfig::default(),
            pipeline: PipelineConfig::default(),
            output: OutputConfig::default(),
        }
    }
}

impl Config {
    /// Validate configuration values are within acceptable ranges.
    /// Returns `DocError::Config` on validation failure.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=2.0).contains(&self.llm.temperature) {
            return Err(DocError::Config(format!(
                "LLM temperature must be between 0.0 and 2.0, got {}",
                self.llm.temperature
            )));
        }

        if self.llm.timeout_secs == 0 {
            return Err(DocError::Config(
                "LLM timeout_secs must be greater than 0".to_string(),
            ));
        }

        if self.pipeline.fetch_concurrency == 0 || self.pipeline.generation_concurrency == 0 {
            return Err(DocError::Config(
                "Pipeline concurrency limits must be greater than 0".to_string(),
            ));
        }

        if self.pipeline.job_timeout_secs == Some(0) {
            return Err(DocError::Config(
                "Pipeline job_timeout_secs must be greater than 0 when set".to_string(),
            ));
        }

        if self.filter.extensions.is_empty() {
            return Err(DocError::Config(
                "Filter extensions must list at least one extension".to_string(),
            ));
        }

        for pattern in &self.filter.exclude_globs {
            glob::Pattern::new(pattern).map_err(|e| {
                DocError::Config(format!("Invalid exclude glob '{}': {}", pattern, e))
            })?;
        }

        Ok(())
    }
}

// =============================================================================
// LLM Configuration
// =============================================================================

#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Provider name: "openai" or "ollama"
    pub provider: String,

    /// Model name; each provider has its own default
    pub model: Option<String>,

    /// Custom endpoint (OpenAI-compatible gateways, remote Ollama)
    pub api_base: Option<String>,

    /// Per-request timeout in seconds
    pub timeout_secs: u64,

    /// Temperature for LLM generation (0.0 = deterministic, 1.0 = creative)
    pub temperature: f32,

    /// Maximum tokens to generate per file
    pub max_tokens: usize,

    /// API key; falls back to OPENAI_API_KEY. Never serialized.
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
}

impl std::fmt::Debug for LlmConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmConfig")
            .field("provider", &self.provider)
            .field("model", &self.model)
            .field("api_base", &self.api_base)
            .field("timeout_secs", &self.timeout_secs)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: llm::DEFAULT_PROVIDER.to_string(),
            model: None,
            api_base: None,
            timeout_secs: network::DEFAULT_TIMEOUT_SECS,
            temperature: 0.2,
            max_tokens: llm::DEFAULT_MAX_TOKENS,
            api_key: None,
        }
    }
}

impl LlmConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn to_provider_config(&self) -> ProviderConfig {
        ProviderConfig {
            provider: self.provider.clone(),
            model: self.model.clone(),
            timeout_secs: self.timeout_secs,
            temperature: self.temperature,
            api_key: self.api_key.clone(),
            api_base: self.api_base.clone(),
            max_tokens: self.max_tokens,
        }
    }
}

// =============================================================================
// GitHub Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GitHubConfig {
    /// REST API base URL (GitHub Enterprise installs differ)
    pub api_base: String,

    /// Branch, tag or SHA whose tree is documented
    pub git_ref: String,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            api_base: github::DEFAULT_API_BASE.to_string(),
            git_ref: github::DEFAULT_REF.to_string(),
        }
    }
}

// =============================================================================
// Filter Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Allowed extensions, with or without the leading dot
    pub extensions: Vec<String>,

    /// Directory names excluded wherever they appear in a path
    pub exclude_dirs: Vec<String>,

    /// Additional glob patterns matched against the whole path
    pub exclude_globs: Vec<String>,

    /// Maximum file size in bytes for local discovery
    pub max_file_size: u64,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            extensions: filter::DEFAULT_EXTENSIONS
                .iter()
                .map(|e| format!(".{}", e))
                .collect(),
            exclude_dirs: filter::DEFAULT_EXCLUDED_DIRS
                .iter()
                .map(|d| d.to_string())
                .collect(),
            exclude_globs: Vec::new(),
            max_file_size: filter::MAX_FILE_SIZE,
        }
    }
}

// =============================================================================
// Pipeline Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Simultaneous content fetches
    pub fetch_concurrency: usize,

    /// Simultaneous generation requests
    pub generation_concurrency: usize,

    /// Generation retries per file for retryable errors (0 = no retry)
    pub max_retries: usize,

    /// First retry delay in milliseconds, doubled per attempt
    pub retry_backoff_ms: u64,

    /// Whole-job deadline; completed entries are still persisted when hit
    pub job_timeout_secs: Option<u64>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            fetch_concurrency: pipeline::DEFAULT_FETCH_CONCURRENCY,
            generation_concurrency: pipeline::DEFAULT_GENERATION_CONCURRENCY,
            max_retries: pipeline::DEFAULT_MAX_RETRIES,
            retry_backoff_ms: pipeline::DEFAULT_RETRY_BACKOFF_MS,
            job_timeout_secs: None,
        }
    }
}

impl PipelineConfig {
    pub fn job_timeout(&self) -> Option<Duration> {
        self.job_timeout_secs.map(Duration::from_secs)
    }
}

// =============================================================================
// Output Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Local directory receiving index and per-file documents
    pub dir: PathBuf,

    /// Push generated documents to the source repository
    pub publish: bool,

    /// Directory inside the repository receiving published documents
    pub publish_path: String,

    /// Prefix of the branch created for published documents
    pub branch_prefix: String,

    /// Open a pull request after publishing
    pub open_pull_request: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from(output::DEFAULT_OUTPUT_DIR),
            publish: false,
            publish_path: output::DEFAULT_PUBLISH_PATH.to_string(),
            branch_prefix: output::DEFAULT_BRANCH_PREFIX.to_string(),
            open_pull_request: true,
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.version, "1.0");
        assert_eq!(config.llm.provider, "openai");
        assert!(config.llm.model.is_none());
        assert_eq!(config.pipeline.max_retries, 0);
        assert_eq!(
            config.filter.extensions,
            vec![".py", ".js", ".ts", ".java"]
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_concurrency() {
        let mut config = Config::default();
        config.pipeline.generation_concurrency = 0;
        assert!(matches!(config.validate(), Err(DocError::Config(_))));
    }

    #[test]
    fn test_validate_rejects_temperature() {
        let mut config = Config::default();
        config.llm.temperature = 3.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_glob() {
        let mut config = Config::default();
        config.filter.exclude_globs = vec!["[".to_string()];
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_api_key_never_serialized() {
        let mut config = Config::default();
        config.llm.api_key = Some("sk-secret".to_string());

        let json = serde_json::to_string(&config).unwrap();
        assert!(!json.contains("sk-secret"));
        assert!(!format!("{:?}", config.llm).contains("sk-secret"));
    }

    #[test]
    fn test_provider_config_conversion() {
        let config = LlmConfig {
            model: Some("gpt-4o-mini".to_string()),
            ..Default::default()
        };
        let provider = config.to_provider_config();
        assert_eq!(provider.provider, "openai");
        assert_eq!(provider.model.as_deref(), Some("gpt-4o-mini"));
    }
}
