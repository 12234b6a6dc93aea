//! Output stage: local persistence and optional publishing

pub mod persister;
pub mod publisher;

pub use persister::{PersistReport, Persister, RenderedFile, render, slug};
pub use publisher::{
    GitHubPublisher, NoopPublisher, PublishReceipt, Publisher, SharedPublisher,
};
