//! Timeout and bounded retry around storage calls.

use std::future::Future;
use std::time::Duration;

use tokio::time::{sleep, timeout};
use tracing::warn;

use hms_core::config::StorageConfig;
use hms_core::db::DatabaseError;
use hms_core::retry::RetryPolicy;

use crate::error::BookingError;

/// Applies the per-operation timeout and the retry policy to storage calls.
#[derive(Debug, Clone)]
pub struct StorageGuard {
    op_timeout: Duration,
    retry: RetryPolicy,
}

impl StorageGuard {
    pub const fn new(op_timeout: Duration, retry: RetryPolicy) -> Self {
        Self { op_timeout, retry }
    }

    pub fn from_config(config: &StorageConfig) -> Self {
        Self::new(config.op_timeout(), config.retry.clone())
    }

    /// Run a storage operation once, bounded by the timeout.
    pub async fn once<T, Fut>(&self, op: &'static str, fut: Fut) -> Result<T, BookingError>
    where
        Fut: Future<Output = Result<T, DatabaseError>>,
    {
        self.attempt(op, fut).await.map_err(Failure::into_booking)
    }

    async fn attempt<T, Fut>(&self, op: &'static str, fut: Fut) -> Result<T, Failure>
    where
        Fut: Future<Output = Result<T, DatabaseError>>,
    {
        match timeout(self.op_timeout, fut).await {
            Ok(result) => result.map_err(Failure::Database),
            Err(_) => Err(Failure::TimedOut(format!(
                "{op} timed out after {}ms",
                self.op_timeout.as_millis()
            ))),
        }
    }

    /// Run a storage operation, retrying transient failures with backoff.
    ///
    /// Conflicts, constraint violations and not-found return immediately.
    /// After the last attempt the storage failure is returned.
    pub async fn call<T, F, Fut>(&self, op: &'static str, mut f: F) -> Result<T, BookingError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, DatabaseError>>,
    {
        let mut attempts = 0;
        loop {
            let outcome = self.attempt(op, f()).await;
            attempts += 1;
            match outcome {
                Err(failure) if failure.is_transient() && self.retry.should_retry(attempts) => {
                    let delay = self.retry.delay_for_attempt(attempts - 1);
                    warn!(
                        op,
                        attempts,
                        delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                        error = %failure,
                        "Storage call failed, retrying"
                    );
                    sleep(delay).await;
                }
                other => return other.map_err(Failure::into_booking),
            }
        }
    }
}

/// Outcome of a single failed attempt, before mapping to [`BookingError`].
#[derive(Debug)]
enum Failure {
    Database(DatabaseError),
    TimedOut(String),
}

impl Failure {
    const fn is_transient(&self) -> bool {
        match self {
            Self::Database(e) => e.is_transient(),
            Self::TimedOut(_) => true,
        }
    }

    fn into_booking(self) -> BookingError {
        match self {
            Self::Database(e) => e.into(),
            Self::TimedOut(msg) => BookingError::StorageFailure(msg),
        }
    }
}

impl std::fmt::Display for Failure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Database(e) => e.fmt(f),
            Self::TimedOut(msg) => f.write_str(msg),
        }
    }
}
