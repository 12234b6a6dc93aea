//! Global Constants
//!
//! Centralized constants for configuration and tuning.
//! All magic numbers should be defined here with documentation.

/// Eligibility filter defaults
pub mod filter {
    /// Extensions documented by default (without the leading dot)
    pub const DEFAULT_EXTENSIONS: &[&str] = &["py", "js", "ts", "java"];

    /// Dependency-cache and virtual-environment directory names
    pub const DEFAULT_EXCLUDED_DIRS: &[&str] = &[
        "node_modules",
        "venv",
        ".venv",
        "env",
        "__pycache__",
        ".git",
    ];

    /// Maximum file size for local discovery (1MB)
    pub const MAX_FILE_SIZE: u64 = 1_048_576;
}

/// Pipeline scheduling constants
pub mod pipeline {
    /// Simultaneous content fetches against the content source
    pub const DEFAULT_FETCH_CONCURRENCY: usize = 8;

    /// Simultaneous in-flight generation requests
    pub const DEFAULT_GENERATION_CONCURRENCY: usize = 4;

    /// Generation retries per file (0 = single attempt)
    pub const DEFAULT_MAX_RETRIES: usize = 0;

    /// First retry delay (milliseconds), doubled per attempt
    pub const DEFAULT_RETRY_BACKOFF_MS: u64 = 1000;

    /// Ceiling for a single retry delay (seconds)
    pub const MAX_RETRY_DELAY_SECS: u64 = 30;
}

/// HTTP/Network constants
pub mod network {
    /// Default generation request timeout (seconds)
    pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

    /// Connection timeout (seconds)
    pub const CONNECTION_TIMEOUT_SECS: u64 = 30;
}

/// GitHub REST API constants
pub mod github {
    pub const DEFAULT_API_BASE: &str = "https://api.github.com";

    /// Branch listed when no ref is given
    pub const DEFAULT_REF: &str = "main";

    pub const ACCEPT_HEADER: &str = "application/vnd.github.v3+json";

    pub const USER_AGENT: &str = concat!("repodoc/", env!("CARGO_PKG_VERSION"));
}

/// LLM backend constants
pub mod llm {
    pub const DEFAULT_PROVIDER: &str = "openai";

    pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";

    pub const DEFAULT_MAX_TOKENS: usize = 2048;
}

/// Output layout constants
pub mod output {
    pub const INDEX_FILE: &str = "index.md";

    pub const MANIFEST_FILE: &str = "manifest.json";

    /// Extension appended to every per-file document
    pub const DOC_EXTENSION: &str = "md";

    pub const DEFAULT_OUTPUT_DIR: &str = "docs";

    /// Directory inside the repository that publishing writes to
    pub const DEFAULT_PUBLISH_PATH: &str = "docs";

    pub const DEFAULT_BRANCH_PREFIX: &str = "docs/generated";
}
