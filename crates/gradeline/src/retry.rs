//! Opt-in retry utilities.
//!
//! The client never retries by itself. Callers wrap single fetches in
//! [`with_retry`], and paginated walks go through [`collect_with_retry`]
//! when the client was built with [`CanvasClient::with_page_retry`].
//!
//! [`CanvasClient::with_page_retry`]: crate::CanvasClient::with_page_retry

use std::future::Future;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use backon::{BackoffBuilder, ExponentialBuilder, Retryable};
use serde::de::DeserializeOwned;

use crate::api::pagination::Paginator;
use crate::error::{CanvasError, Result, short_error_message};

/// Initial backoff delay in milliseconds.
pub const INITIAL_BACKOFF_MS: u64 = 1_000;
/// Maximum backoff delay in milliseconds.
pub const MAX_BACKOFF_MS: u64 = 60_000;
/// Maximum retry attempts.
pub const MAX_RETRIES: usize = 5;

/// Configuration for retry operations.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Minimum delay between retries.
    pub min_delay: Duration,
    /// Maximum delay between retries.
    pub max_delay: Duration,
    /// Maximum number of retry attempts.
    pub max_retries: usize,
    /// Whether to add jitter to delays.
    pub with_jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            min_delay: Duration::from_millis(INITIAL_BACKOFF_MS),
            max_delay: Duration::from_millis(MAX_BACKOFF_MS),
            max_retries: MAX_RETRIES,
            with_jitter: true,
        }
    }
}

impl RetryConfig {
    /// Create a new retry configuration with custom values.
    #[must_use]
    pub fn new(min_delay: Duration, max_delay: Duration, max_retries: usize) -> Self {
        Self {
            min_delay,
            max_delay,
            max_retries,
            with_jitter: true,
        }
    }

    /// Set whether to use jitter.
    #[must_use]
    pub fn with_jitter(mut self, jitter: bool) -> Self {
        self.with_jitter = jitter;
        self
    }

    /// Build an exponential backoff strategy from this configuration.
    #[must_use]
    pub fn into_backoff(self) -> ExponentialBuilder {
        let mut builder = ExponentialBuilder::default()
            .with_min_delay(self.min_delay)
            .with_max_delay(self.max_delay)
            .with_max_times(self.max_retries);

        if self.with_jitter {
            builder = builder.with_jitter();
        }

        builder
    }
}

/// Run `operation`, retrying errors for which
/// [`CanvasError::is_retryable`] holds.
///
/// # Example
///
/// ```ignore
/// let account = with_retry(|| client.get_account(111), &RetryConfig::default()).await?;
/// ```
pub async fn with_retry<T, F, Fut>(mut operation: F, config: &RetryConfig) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let attempt = AtomicU32::new(0);

    let retry_op = || {
        attempt.fetch_add(1, Ordering::SeqCst);
        operation()
    };

    retry_op
        .retry(config.clone().into_backoff())
        .notify(|err: &CanvasError, dur: Duration| {
            tracing::debug!(
                "Retrying in {:?} (attempt {}): {}",
                dur,
                attempt.load(Ordering::SeqCst),
                short_error_message(err)
            );
        })
        .when(CanvasError::is_retryable)
        .await
}

/// Drain a walk, sleeping and resuming it whenever a page fails with a
/// retryable error.
///
/// The backoff sequence restarts after every successful page. Sleeps are cut
/// short by the client's cancellation token.
pub async fn collect_with_retry<T: DeserializeOwned>(
    mut paginator: Paginator<T>,
    config: RetryConfig,
) -> Result<Vec<T>> {
    let cancel = paginator.client().cancellation_token().clone();
    let mut items = Vec::new();
    let mut backoff = config.clone().into_backoff().build();
    let mut attempt = 0u32;

    loop {
        match paginator.next_page().await {
            Ok(Some(page)) => {
                items.extend(page);
                backoff = config.clone().into_backoff().build();
                attempt = 0;
            }
            Ok(None) => return Ok(items),
            Err(err) if err.is_retryable() => {
                let Some(delay) = backoff.next() else {
                    return Err(err);
                };
                attempt += 1;
                tracing::debug!(
                    url = paginator.next_url().unwrap_or_default(),
                    "Page failed, retrying in {:?} (attempt {}): {}",
                    delay,
                    attempt,
                    short_error_message(&err)
                );
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => return Err(CanvasError::Cancelled),
                    _ = tokio::time::sleep(delay) => {}
                }
                paginator.resume();
            }
            Err(err) => return Err(err),
        }
    }
}
