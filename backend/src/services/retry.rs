//! Retry of database writes with exponential backoff

use std::future::Future;
use std::time::Duration;

use backon::{ExponentialBuilder, Retryable};
use tracing::warn;

use crate::config::RetryConfig;
use crate::error::CONSTRAINT_VIOLATION_CODES;

/// Backoff policy: base delay doubling on each retry
pub fn backoff(config: &RetryConfig) -> ExponentialBuilder {
    ExponentialBuilder::default()
        .with_min_delay(Duration::from_millis(config.base_delay_ms))
        .with_factor(2.0)
        .with_max_times(config.max_retries)
}

/// Whether an error is worth another attempt
pub fn is_transient(error: &sqlx::Error) -> bool {
    match error {
        sqlx::Error::Database(db_error) => {
            let code = db_error.code();
            match code.as_deref() {
                Some(code) if CONSTRAINT_VIOLATION_CODES.contains(&code) => false,
                // serialization failure, deadlock, connection exceptions
                Some(code) => code == "40001" || code == "40P01" || code.starts_with("08"),
                None => false,
            }
        }
        sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed
        | sqlx::Error::Io(_)
        | sqlx::Error::Tls(_)
        | sqlx::Error::Protocol(_)
        | sqlx::Error::WorkerCrashed => true,
        _ => false,
    }
}

/// Run a database operation, retrying transient failures
pub async fn with_retry<T, F, Fut>(
    config: &RetryConfig,
    operation: &str,
    op: F,
) -> Result<T, sqlx::Error>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, sqlx::Error>>,
{
    op.retry(backoff(config))
        .when(is_transient)
        .notify(|e, dur| {
            warn!(
                "{} failed, retrying after {:.2}s: {}",
                operation,
                dur.as_secs_f64(),
                e
            )
        })
        .await
}
