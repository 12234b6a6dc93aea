//! Timeout helpers
//!
//! Wraps async operations with `tokio::time::timeout`, turning an elapsed
//! deadline into `DocError::Timeout`.
//!
//! ```ignore
//! let text = with_timeout(
//!     Duration::from_secs(120),
//!     async { provider.generate(system, &prompt).await },
//!     "generate src/app.py",
//! ).await?;
//! ```

use std::future::Future;
use std::time::Duration;

use crate::types::{DocError, Result};

/// Execute an async operation with a timeout
pub async fn with_timeout<T, F>(timeout: Duration, future: F, operation_name: &str) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match tokio::time::timeout(timeout, future).await {
        Ok(result) => result,
        Err(_) => Err(DocError::timeout(operation_name, timeout)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_with_timeout_success() {
        let result = with_timeout(
            Duration::from_secs(1),
            async { Ok::<_, DocError>(42) },
            "test operation",
        )
        .await;

        assert_eq!(result.unwrap(), 42);
    }

    #[tokio::test]
    async fn test_with_timeout_expired() {
        let result = with_timeout(
            Duration::from_millis(10),
            async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Ok::<_, DocError>(())
            },
            "slow operation",
        )
        .await;

        match result {
            Err(DocError::Timeout { operation, .. }) => assert_eq!(operation, "slow operation"),
            other => panic!("Expected timeout, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_with_timeout_propagates_inner_error() {
        let result: Result<()> = with_timeout(
            Duration::from_secs(1),
            async { Err(DocError::LlmApi("boom".into())) },
            "failing operation",
        )
        .await;

        assert!(matches!(result, Err(DocError::LlmApi(_))));
    }
}
