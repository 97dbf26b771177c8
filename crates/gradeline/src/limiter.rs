use std::num::NonZeroU32;
use std::sync::Arc;

use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use tokio_util::sync::CancellationToken;

use crate::config::RateLimitPolicy;
use crate::error::{CanvasError, Result};

/// Type alias for the governor rate limiter.
type GovernorRateLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// A shared token bucket guarding every outbound request.
///
/// Clones share the same bucket, so a client and all of its clones draw from
/// one budget.
///
/// # Example
///
/// ```ignore
/// use gradeline::limiter::ApiRateLimiter;
///
/// let limiter = ApiRateLimiter::new(&RateLimitPolicy::default())?;
///
/// // Before each API call:
/// limiter.acquire(&cancel).await?;
/// transport.send(request).await?;
/// ```
#[derive(Clone)]
pub struct ApiRateLimiter {
    inner: Arc<GovernorRateLimiter>,
}

impl ApiRateLimiter {
    /// Build a limiter replenishing `requests` tokens every `per`.
    pub fn new(policy: &RateLimitPolicy) -> Result<Self> {
        if policy.requests == 0 {
            return Err(CanvasError::Config(
                "rate limit requests must be greater than zero".to_string(),
            ));
        }
        let burst = NonZeroU32::new(policy.burst).ok_or_else(|| {
            CanvasError::Config("rate limit burst must be greater than zero".to_string())
        })?;
        let period = policy.per / policy.requests;
        let quota = Quota::with_period(period)
            .ok_or_else(|| {
                CanvasError::Config(format!(
                    "rate limit period must be positive (got {:?} per {} requests)",
                    policy.per, policy.requests
                ))
            })?
            .allow_burst(burst);

        Ok(Self {
            inner: Arc::new(RateLimiter::direct(quota)),
        })
    }

    /// Wait for one token.
    ///
    /// The wait races `cancel`; an already-cancelled token wins even when a
    /// token is immediately available.
    pub async fn acquire(&self, cancel: &CancellationToken) -> Result<()> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(CanvasError::Cancelled),
            ready = self.inner.until_n_ready(NonZeroU32::MIN) => {
                ready.map_err(|e| CanvasError::RateLimit(e.to_string()))
            }
        }
    }
}
