//! Per-file documentation generator
//!
//! Wraps an [`LlmProvider`](crate::ai::LlmProvider) with the documentation
//! prompt, a per-attempt timeout and optional retry. [`DocGenerator::document`]
//! is the per-file failure boundary: it always yields an entry.

use backon::{ExponentialBuilder, Retryable};
use std::time::Duration;
use tracing::{debug, warn};

use crate::ai::{DOCUMENTATION_SYSTEM, SharedProvider, documentation_prompt, with_timeout};
use crate::config::Config;
use crate::constants::{network, pipeline};
use crate::types::{DocError, DocumentationEntry, Result, SourceFile};

#[derive(Debug, Clone)]
pub struct GeneratorOptions {
    /// Upper bound for a single generation attempt
    pub request_timeout: Duration,
    /// Extra attempts after the first, for retryable errors only
    pub max_retries: usize,
    /// Delay before the first retry, doubled per attempt
    pub retry_backoff: Duration,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(network::DEFAULT_TIMEOUT_SECS),
            max_retries: pipeline::DEFAULT_MAX_RETRIES,
            retry_backoff: Duration::from_millis(pipeline::DEFAULT_RETRY_BACKOFF_MS),
        }
    }
}

impl GeneratorOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            request_timeout: config.llm.request_timeout(),
            max_retries: config.pipeline.max_retries,
            retry_backoff: Duration::from_millis(config.pipeline.retry_backoff_ms),
        }
    }
}

pub struct DocGenerator {
    provider: SharedProvider,
    options: GeneratorOptions,
}

impl DocGenerator {
    pub fn new(provider: SharedProvider, options: GeneratorOptions) -> Self {
        Self { provider, options }
    }

    /// Generated documentation text for one file, returned verbatim
    pub async fn generate(&self, path: &str, content: &str) -> Result<String> {
        let prompt = documentation_prompt(path, content);

        if self.options.max_retries == 0 {
            return self.attempt(path, &prompt).await;
        }

        let backoff = ExponentialBuilder::default()
            .with_min_delay(self.options.retry_backoff)
            .with_max_delay(Duration::from_secs(pipeline::MAX_RETRY_DELAY_SECS))
            .with_max_times(self.options.max_retries);

        (|| self.attempt(path, &prompt))
            .retry(backoff)
            .when(|e: &DocError| e.is_retryable())
            .notify(|e: &DocError, delay: Duration| {
                warn!("Retrying {} in {:?}: {}", path, delay, e);
            })
            .await
    }

    async fn attempt(&self, path: &str, prompt: &str) -> Result<String> {
        let operation = format!("generate {}", path);
        let response = with_timeout(
            self.options.request_timeout,
            self.provider.generate(DOCUMENTATION_SYSTEM, prompt),
            &operation,
        )
        .await?;

        debug!(
            "Generated {} ({} tokens, {}ms)",
            path,
            response.usage.total(),
            response.timing.total_ms
        );
        Ok(response.content)
    }

    /// Documentation entry for one file; generation errors become a
    /// `Failed` entry carrying the error text
    pub async fn document(&self, file: &SourceFile) -> DocumentationEntry {
        match self.generate(&file.path, &file.content).await {
            Ok(body) => DocumentationEntry::success(file, body),
            Err(e) => {
                warn!("Generation failed for {}: {}", file.path, e);
                DocumentationEntry::failed(file, format!("Error generating documentation: {}", e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::{LlmProvider, LlmResponse};
    use crate::types::{EntryStatus, ErrorCategory, LlmError};
    use async_trait::async_trait;
    use std::sync::Arc;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Fails the first `failures` calls with `category`, then echoes
    struct FlakyProvider {
        calls: AtomicU32,
        failures: u32,
        category: ErrorCategory,
        last_prompt: Mutex<Option<(String, String)>>,
    }

    impl FlakyProvider {
        fn new(failures: u32, category: ErrorCategory) -> Self {
            Self {
                calls: AtomicU32::new(0),
                failures,
                category,
                last_prompt: Mutex::new(None),
            }
        }
    }

    #[async_trait]
    impl LlmProvider for FlakyProvider {
        async fn generate(&self, system: &str, prompt: &str) -> Result<LlmResponse> {
            *self.last_prompt.lock().unwrap() = Some((system.to_string(), prompt.to_string()));
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call < self.failures {
                return Err(LlmError::new(self.category, "backend said no").into());
            }
            Ok(LlmResponse::content_only("generated docs"))
        }

        fn name(&self) -> &str {
            "flaky"
        }

        fn model(&self) -> &str {
            "test"
        }
    }

    struct SlowProvider;

    #[async_trait]
    impl LlmProvider for SlowProvider {
        async fn generate(&self, _system: &str, _prompt: &str) -> Result<LlmResponse> {
            tokio::time::sleep(Duration::from_secs(10)).await;
            Ok(LlmResponse::content_only("too late"))
        }

        fn name(&self) -> &str {
            "slow"
        }

        fn model(&self) -> &str {
            "test"
        }
    }

    fn options(max_retries: usize) -> GeneratorOptions {
        GeneratorOptions {
            request_timeout: Duration::from_secs(5),
            max_retries,
            retry_backoff: Duration::from_millis(1),
        }
    }

    #[tokio::test]
    async fn test_prompt_and_system_instruction() {
        let provider = Arc::new(FlakyProvider::new(0, ErrorCategory::Transient));
        let generator = DocGenerator::new(provider.clone(), options(0));

        let text = generator.generate("src/app.py", "x = 1").await.unwrap();
        assert_eq!(text, "generated docs");

        let (system, prompt) = provider.last_prompt.lock().unwrap().clone().unwrap();
        assert_eq!(system, "You are a technical documentation expert.");
        assert!(prompt.contains("File: src/app.py"));
        assert!(prompt.contains("x = 1"));
    }

    #[tokio::test]
    async fn test_no_retry_by_default() {
        let provider = Arc::new(FlakyProvider::new(1, ErrorCategory::Transient));
        let generator = DocGenerator::new(provider.clone(), options(0));

        assert!(generator.generate("a.py", "x").await.is_err());
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_retries_transient_errors() {
        let provider = Arc::new(FlakyProvider::new(2, ErrorCategory::Transient));
        let generator = DocGenerator::new(provider.clone(), options(3));

        assert_eq!(generator.generate("a.py", "x").await.unwrap(), "generated docs");
        assert_eq!(provider.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_does_not_retry_auth_errors() {
        let provider = Arc::new(FlakyProvider::new(5, ErrorCategory::Auth));
        let generator = DocGenerator::new(provider.clone(), options(3));

        assert!(generator.generate("a.py", "x").await.is_err());
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_retries_exhausted() {
        let provider = Arc::new(FlakyProvider::new(10, ErrorCategory::RateLimit));
        let generator = DocGenerator::new(provider.clone(), options(2));

        assert!(generator.generate("a.py", "x").await.is_err());
        assert_eq!(provider.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_document_converts_failure_to_entry() {
        let provider = Arc::new(FlakyProvider::new(1, ErrorCategory::BadRequest));
        let generator = DocGenerator::new(provider, options(0));

        let entry = generator.document(&SourceFile::new("b.py", "y")).await;
        assert_eq!(entry.status, EntryStatus::Failed);
        assert!(entry.body.starts_with("Error generating documentation: "));
        assert!(entry.body.contains("backend said no"));
    }

    #[tokio::test]
    async fn test_attempt_timeout_becomes_failed_entry() {
        let generator = DocGenerator::new(
            Arc::new(SlowProvider),
            GeneratorOptions {
                request_timeout: Duration::from_millis(20),
                ..options(0)
            },
        );

        let entry = generator.document(&SourceFile::new("slow.py", "z")).await;
        assert!(!entry.is_success());
        assert!(entry.body.contains("Timeout"));
    }
}
