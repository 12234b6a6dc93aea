//! Shared job runner for the `github` and `local` commands

use std::path::PathBuf;
use std::sync::Arc;
use tokio::runtime::Runtime;
use tracing::{info, warn};

use secrecy::SecretString;

use crate::ai::provider::create_provider;
use crate::cli::Output;
use crate::config::Config;
use crate::output::{GitHubPublisher, NoopPublisher, SharedPublisher};
use crate::pipeline::{CancelHandle, PipelineDeps, PipelineOptions, generate_documentation};
use crate::source::{EligibilityFilter, SharedSource};
use crate::types::{DocError, JobOutcome, Result};

/// Command-line overrides applied on top of the loaded configuration
#[derive(Debug, Clone, Default)]
pub struct GenerateOptions {
    pub output: Option<PathBuf>,
    pub concurrency: Option<usize>,
    pub model: Option<String>,
    pub provider: Option<String>,
    pub publish: bool,
}

impl GenerateOptions {
    pub fn apply(&self, config: &mut Config) -> Result<()> {
        if let Some(output) = &self.output {
            config.output.dir = output.clone();
        }
        if let Some(concurrency) = self.concurrency {
            config.pipeline.generation_concurrency = concurrency;
        }
        if let Some(provider) = &self.provider {
            config.llm.provider = provider.clone();
        }
        if let Some(model) = &self.model {
            config.llm.model = Some(model.clone());
        }
        if self.publish {
            config.output.publish = true;
        }
        config.validate()
    }
}

pub struct JobTarget {
    pub owner: String,
    pub repo: String,
    pub credential: Option<SecretString>,
    pub source: SharedSource,
}

/// Run one documentation job on a fresh runtime and print its report.
/// Ctrl-C cancels the job; completed entries are still written.
pub fn run(target: JobTarget, config: &Config) -> Result<JobOutcome> {
    let output = Output::new();

    let provider = create_provider(&config.llm.to_provider_config())?;
    let provider_name = provider.name().to_string();
    let provider_model = provider.model().to_string();
    info!("Using LLM provider: {} ({})", provider_name, provider_model);

    let publisher: SharedPublisher = if config.output.publish {
        Arc::new(GitHubPublisher::from_config(config))
    } else {
        Arc::new(NoopPublisher)
    };

    let cancel = CancelHandle::new();
    let deps = PipelineDeps::new(target.source.clone(), provider)
        .with_filter(EligibilityFilter::from_config(&config.filter)?)
        .with_publisher(publisher)
        .with_options(PipelineOptions::from_config(config))
        .with_output_dir(config.output.dir.clone())
        .with_cancel(cancel.clone());

    output.header(&format!("Documenting {}", target.source.describe()));
    output.info(&format!(
        "Provider {} ({}), {} concurrent requests",
        provider_name, provider_model, config.pipeline.generation_concurrency
    ));

    let rt = Runtime::new().map_err(|e| DocError::Config(format!("Tokio runtime: {}", e)))?;
    let report = rt.block_on(async {
        let interrupt = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("Interrupt received, finishing with completed entries");
                interrupt.cancel();
            }
        });

        generate_documentation(&target.owner, &target.repo, target.credential, deps).await
    });

    output.report(&report);
    Ok(report.outcome)
}
