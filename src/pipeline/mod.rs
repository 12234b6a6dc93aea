//! Documentation Pipeline
//!
//! ```text
//! ContentSource::list_files ─► EligibilityFilter
//!        │
//!        ▼  fetch (≤ fetch_concurrency)
//!   SourceFile / FetchFailure
//!        │
//!        ▼  generate (≤ generation_concurrency)
//!   DocumentationEntry ─► Aggregator (single owner) ─► DocumentationSet
//!        │
//!        ▼
//!   Persister ─► Publisher
//! ```
//!
//! Fan-out uses `buffer_unordered`; completions are drained by one loop that
//! owns the [`Aggregator`]. Cancellation and the job deadline stop that loop,
//! which drops every in-flight fetch and generation future. Entries completed
//! before that point are kept and persisted.

pub mod aggregator;
pub mod generator;

use futures::{FutureExt, StreamExt, stream};
use secrecy::SecretString;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, error, info, instrument, warn};

pub use aggregator::Aggregator;
pub use generator::{DocGenerator, GeneratorOptions};

use crate::ai::SharedProvider;
use crate::config::Config;
use crate::constants::pipeline as defaults;
use crate::output::{NoopPublisher, PersistReport, Persister, PublishReceipt, SharedPublisher};
use crate::source::{EligibilityFilter, SharedSource};
use crate::types::{
    DocError, DocumentationEntry, DocumentationSet, FetchFailure, Job, JobId, JobOutcome, Result,
    SourceFile,
};

// =============================================================================
// Cancellation
// =============================================================================

/// Cloneable cancellation signal shared between a job and its caller
#[derive(Debug, Clone)]
pub struct CancelHandle {
    tx: Arc<watch::Sender<bool>>,
}

impl Default for CancelHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl CancelHandle {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.tx.borrow()
    }

    /// Resolves once [`cancel`](Self::cancel) has been called
    pub async fn cancelled(&self) {
        let mut rx = self.tx.subscribe();
        // The sender lives as long as `self`, so this cannot fail
        let _ = rx.wait_for(|cancelled| *cancelled).await;
    }
}

// =============================================================================
// Options
// =============================================================================

#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub fetch_concurrency: usize,
    pub generation_concurrency: usize,
    /// Deadline for discovery, fetch and generation together
    pub job_timeout: Option<Duration>,
    pub generator: GeneratorOptions,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            fetch_concurrency: defaults::DEFAULT_FETCH_CONCURRENCY,
            generation_concurrency: defaults::DEFAULT_GENERATION_CONCURRENCY,
            job_timeout: None,
            generator: GeneratorOptions::default(),
        }
    }
}

impl PipelineOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            fetch_concurrency: config.pipeline.fetch_concurrency,
            generation_concurrency: config.pipeline.generation_concurrency,
            job_timeout: config.pipeline.job_timeout(),
            generator: GeneratorOptions::from_config(config),
        }
    }
}

/// Collaborators for one job, constructed by the caller
pub struct PipelineDeps {
    pub source: SharedSource,
    pub provider: SharedProvider,
    pub filter: EligibilityFilter,
    pub publisher: SharedPublisher,
    pub options: PipelineOptions,
    /// Local output directory; `None` skips persistence
    pub output_dir: Option<PathBuf>,
    pub cancel: CancelHandle,
}

impl PipelineDeps {
    pub fn new(source: SharedSource, provider: SharedProvider) -> Self {
        Self {
            source,
            provider,
            filter: EligibilityFilter::default(),
            publisher: Arc::new(NoopPublisher),
            options: PipelineOptions::default(),
            output_dir: None,
            cancel: CancelHandle::new(),
        }
    }

    pub fn with_filter(mut self, filter: EligibilityFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn with_publisher(mut self, publisher: SharedPublisher) -> Self {
        self.publisher = publisher;
        self
    }

    pub fn with_options(mut self, options: PipelineOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(dir.into());
        self
    }

    pub fn with_cancel(mut self, cancel: CancelHandle) -> Self {
        self.cancel = cancel;
        self
    }
}

// =============================================================================
// Pipeline
// =============================================================================

enum Completion {
    Documented(DocumentationEntry),
    FetchFailed(FetchFailure),
}

/// Discovery, fetch, generation and aggregation for one job
pub struct Pipeline {
    source: SharedSource,
    filter: EligibilityFilter,
    generator: Arc<DocGenerator>,
    options: PipelineOptions,
    cancel: CancelHandle,
}

impl Pipeline {
    pub fn new(
        source: SharedSource,
        provider: SharedProvider,
        filter: EligibilityFilter,
        options: PipelineOptions,
        cancel: CancelHandle,
    ) -> Self {
        let generator = Arc::new(DocGenerator::new(provider, options.generator.clone()));
        // buffer_unordered(0) never pulls an item
        let options = PipelineOptions {
            fetch_concurrency: options.fetch_concurrency.max(1),
            generation_concurrency: options.generation_concurrency.max(1),
            ..options
        };
        Self {
            source,
            filter,
            generator,
            options,
            cancel,
        }
    }

    /// Run every stage up to aggregation, recording results on `job`.
    ///
    /// Returns `Ok(true)` when the job was interrupted by cancellation or the
    /// deadline after discovery. Errors are job-level.
    #[instrument(skip_all, fields(job = %job.id, source = %self.source.describe()))]
    pub async fn run(&self, job: &mut Job) -> Result<bool> {
        let deadline = async {
            match self.options.job_timeout {
                Some(limit) => tokio::time::sleep(limit).await,
                None => std::future::pending().await,
            }
        };
        tokio::pin!(deadline);

        let eligible = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => return Err(DocError::Cancelled),
            _ = &mut deadline => {
                return Err(DocError::timeout("discovery", self.options.job_timeout.unwrap_or_default()));
            }
            listed = self.discover() => listed?,
        };
        job.eligible = eligible.clone();

        if eligible.is_empty() {
            info!("No eligible files");
            return Ok(false);
        }

        let mut aggregator = Aggregator::new(eligible.iter().cloned());
        let mut fetch_failures = Vec::new();
        let total = eligible.len();

        let source = self.source.clone();
        let generator = self.generator.clone();
        let completions = stream::iter(eligible)
            .map(move |path| {
                let source = source.clone();
                async move {
                    match source.fetch_content(&path).await {
                        Ok(content) => Ok(SourceFile::new(path, content)),
                        Err(e) => Err(FetchFailure {
                            reason: e.to_string(),
                            path,
                        }),
                    }
                }
            })
            .buffer_unordered(self.options.fetch_concurrency)
            .map(move |fetched| {
                let generator = generator.clone();
                async move {
                    match fetched {
                        Ok(file) => Completion::Documented(generator.document(&file).await),
                        Err(failure) => Completion::FetchFailed(failure),
                    }
                }
            })
            .buffer_unordered(self.options.generation_concurrency);
        tokio::pin!(completions);

        let mut stopped: Option<&str> = None;
        loop {
            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => {
                    stopped = Some("Job cancelled");
                    break;
                }
                _ = &mut deadline => {
                    stopped = Some("Job deadline reached");
                    break;
                }
                next = completions.next() => match next {
                    Some(completion) => record(completion, &mut aggregator, &mut fetch_failures),
                    None => break,
                },
            }
        }

        let mut interrupted = false;
        if let Some(reason) = stopped {
            // Completions that were already ready when the stop arrived still count
            while let Some(Some(completion)) = completions.next().now_or_never() {
                record(completion, &mut aggregator, &mut fetch_failures);
            }
            interrupted = aggregator.received() + fetch_failures.len() < total;
            if interrupted {
                warn!(
                    "{}; keeping {} completed entries",
                    reason,
                    aggregator.received()
                );
            }
        }

        // Failures arrive in completion order; report them in discovery order
        let order: HashMap<&str, usize> = job
            .eligible
            .iter()
            .enumerate()
            .map(|(i, p)| (p.as_str(), i))
            .collect();
        fetch_failures.sort_by_key(|f| order.get(f.path.as_str()).copied());

        job.documentation = aggregator.finalize();
        job.fetch_failures = fetch_failures;

        info!(
            "Generated {} entries ({} failed, {} not fetched) of {} eligible files",
            job.documentation.len(),
            job.documentation.failed_count(),
            job.fetch_failures.len(),
            total
        );
        Ok(interrupted)
    }

    /// Eligible paths in discovery order, without duplicates
    async fn discover(&self) -> Result<Vec<String>> {
        let listed = self.source.list_files().await?;
        let listed_count = listed.len();

        let mut seen = HashSet::new();
        let eligible: Vec<String> = self
            .filter
            .retain(listed)
            .into_iter()
            .filter(|p| seen.insert(p.clone()))
            .collect();

        info!(
            "Discovered {} files, {} eligible",
            listed_count,
            eligible.len()
        );
        Ok(eligible)
    }
}

fn record(
    completion: Completion,
    aggregator: &mut Aggregator,
    fetch_failures: &mut Vec<FetchFailure>,
) {
    match completion {
        Completion::Documented(entry) => {
            debug!("Documented {} ({})", entry.path, entry.status);
            let path = entry.path.clone();
            aggregator.add(&path, entry);
        }
        Completion::FetchFailed(failure) => {
            warn!("Dropping {}: {}", failure.path, failure.reason);
            fetch_failures.push(failure);
        }
    }
}

// =============================================================================
// Entry Point
// =============================================================================

/// Caller-visible result of [`generate_documentation`]. Always carries
/// whatever documentation was produced, even on failure.
#[derive(Debug, Serialize)]
pub struct JobReport {
    pub job_id: JobId,
    /// `"success"`, `"partial"` or `"error"`
    pub status: &'static str,
    pub message: String,
    pub outcome: JobOutcome,
    pub documentation: DocumentationSet,
    pub fetch_failures: Vec<FetchFailure>,
    pub output_dir: Option<PathBuf>,
    pub publish: Option<PublishReceipt>,
}

impl JobReport {
    pub fn is_failure(&self) -> bool {
        self.outcome == JobOutcome::Failure
    }
}

/// Run a complete documentation job for `owner/repo`.
///
/// Never panics on collaborator failures and never discards partial work:
/// job-level errors are folded into the report.
pub async fn generate_documentation(
    owner: &str,
    repo: &str,
    credential: Option<SecretString>,
    deps: PipelineDeps,
) -> JobReport {
    let mut job = Job::new(owner, repo, credential);
    info!("Starting job {} for {}/{}", job.id, owner, repo);

    let pipeline = Pipeline::new(
        deps.source,
        deps.provider,
        deps.filter,
        deps.options,
        deps.cancel,
    );

    let mut fatal: Option<DocError> = None;
    let mut interrupted = false;
    match pipeline.run(&mut job).await {
        Ok(was_interrupted) => interrupted = was_interrupted,
        Err(e) => {
            error!("Job {} failed: {}", job.id, e);
            fatal = Some(e);
        }
    }

    let mut persisted: Option<PersistReport> = None;
    if fatal.is_none()
        && let Some(dir) = &deps.output_dir
    {
        match Persister::new().persist(&job.documentation, dir) {
            Ok(report) => persisted = Some(report),
            Err(e) => {
                error!("Persisting documentation failed: {}", e);
                fatal = Some(e);
            }
        }
    }

    let mut publish = None;
    if fatal.is_none() && !interrupted {
        match deps
            .publisher
            .publish(owner, repo, job.credential.as_ref(), &job.documentation)
            .await
        {
            Ok(receipt) => publish = Some(receipt),
            Err(e) => {
                error!("Publishing documentation failed: {}", e);
                fatal = Some(e);
            }
        }
    }

    let outcome = job.finish(fatal.is_some(), interrupted);
    let message = summarize(&job, outcome, fatal.as_ref(), interrupted, publish.as_ref());
    info!("Job {} finished: {} ({})", job.id, outcome, message);

    JobReport {
        job_id: job.id,
        status: outcome.as_status(),
        message,
        outcome,
        documentation: job.documentation,
        fetch_failures: job.fetch_failures,
        output_dir: persisted.map(|r| r.dir),
        publish,
    }
}

fn summarize(
    job: &Job,
    outcome: JobOutcome,
    fatal: Option<&DocError>,
    interrupted: bool,
    publish: Option<&PublishReceipt>,
) -> String {
    if let Some(err) = fatal {
        return err.to_string();
    }

    let docs = &job.documentation;
    let mut message = match outcome {
        JobOutcome::Success if job.eligible.is_empty() => "No eligible files found".to_string(),
        JobOutcome::Success => format!("Documented {} files", docs.len()),
        JobOutcome::PartialFailure => format!(
            "Documented {} of {} files ({} failed, {} not fetched)",
            docs.success_count(),
            job.eligible.len(),
            docs.failed_count(),
            job.fetch_failures.len()
        ),
        JobOutcome::Failure => format!(
            "No documentation could be generated for {} eligible files",
            job.eligible.len()
        ),
    };

    if interrupted {
        message.push_str("; job was interrupted before completion");
    }
    if let Some(receipt) = publish
        && let Some(branch) = &receipt.branch
    {
        message.push_str(&format!("; published to branch {}", branch));
    }
    message
}
