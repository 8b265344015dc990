use std::future::Future;
use std::time::Duration;

use crate::error::{CatalogError, Result};

/// Runtime settings shared by the command and query services.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ServiceConfig {
    /// Upper bound for one whole operation, load and commit included.
    pub operation_timeout: Option<Duration>,
}

impl ServiceConfig {
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            operation_timeout: Some(timeout),
        }
    }

    /// Runs `operation` under the configured deadline, if any.
    ///
    /// On expiry the future is dropped. A commit that was still in flight is
    /// rolled back with it, so nothing is written.
    pub(crate) async fn with_deadline<T, F>(&self, operation: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        match self.operation_timeout {
            Some(limit) => tokio::time::timeout(limit, operation)
                .await
                .unwrap_or(Err(CatalogError::DeadlineExceeded(limit))),
            None => operation.await,
        }
    }
}
