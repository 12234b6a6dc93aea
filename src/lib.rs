//! repodoc - AI-Generated Repository Documentation
//!
//! Turns a source repository (GitHub or a local directory) into one
//! generated Markdown document per eligible source file plus an index.
//!
//! ## Quick Start
//!
//! ```ignore
//! use std::sync::Arc;
//! use repodoc::{MemorySource, PipelineDeps, generate_documentation};
//! use repodoc::ai::{ProviderConfig, create_provider};
//!
//! let source = MemorySource::from_files([("a.py", "x = 1")]);
//! let provider = create_provider(&ProviderConfig::default())?;
//! let deps = PipelineDeps::new(Arc::new(source), provider).with_output_dir("docs");
//!
//! let report = generate_documentation("octo", "demo", None, deps).await;
//! println!("{}: {}", report.status, report.message);
//! ```
//!
//! ## Modules
//!
//! - [`source`]: content sources and the eligibility filter
//! - [`ai`]: generation backends and the documentation prompt
//! - [`pipeline`]: bounded fan-out, aggregation and the job entry point
//! - [`output`]: local layout and publishing
//! - [`config`]: layered configuration

pub mod ai;
pub mod cli;
pub mod config;
pub mod constants;
pub mod output;
pub mod pipeline;
pub mod source;
pub mod types;

// Configuration
pub use config::{Config, ConfigLoader};

// Error Types
pub use types::error::{DocError, ErrorCategory, Result};

// Data Model
pub use types::{
    DocumentationEntry, DocumentationSet, EntryStatus, FetchFailure, Job, JobOutcome, SourceFile,
};

// Pipeline
pub use pipeline::{
    Aggregator, CancelHandle, DocGenerator, JobReport, Pipeline, PipelineDeps, PipelineOptions,
    generate_documentation,
};

// Sources and Output
pub use output::{GitHubPublisher, NoopPublisher, Persister, Publisher};
pub use source::{
    ContentSource, EligibilityFilter, GitHubSource, LocalSource, MemorySource, SharedSource,
};

// AI
pub use ai::{LlmProvider, LlmResponse, SharedProvider, with_timeout};
