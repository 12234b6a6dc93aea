//! AI Integration Layer
//!
//! Generation backends, the documentation prompt and timeout helpers.

pub mod prompt;
pub mod provider;
pub mod timeout;

pub use prompt::{DOCUMENTATION_SYSTEM, PromptBuilder, documentation_prompt};
pub use provider::{
    LlmProvider, LlmResponse, OllamaProvider, OpenAiProvider, ProviderConfig, SharedProvider,
    TokenUsage, create_provider,
};
pub use timeout::with_timeout;
