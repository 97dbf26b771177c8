use std::time::Duration;

/// Default number of items requested per page.
pub const DEFAULT_PAGE_SIZE: u32 = 100;

/// Default per-request timeout.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Client-side token bucket settings.
///
/// `requests` tokens are replenished every `per`, and up to `burst` may be
/// spent at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitPolicy {
    pub requests: u32,
    pub per: Duration,
    pub burst: u32,
}

impl Default for RateLimitPolicy {
    fn default() -> Self {
        Self {
            requests: 10,
            per: Duration::from_secs(1),
            burst: 10,
        }
    }
}

/// Everything needed to build a [`CanvasClient`](crate::CanvasClient).
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// API root, including `/api/v1`.
    pub base_url: String,
    pub access_token: String,
    pub page_size: u32,
    pub rate_limit: RateLimitPolicy,
    pub request_timeout: Duration,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            access_token: access_token.into(),
            page_size: DEFAULT_PAGE_SIZE,
            rate_limit: RateLimitPolicy::default(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    #[must_use]
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    #[must_use]
    pub fn with_rate_limit(mut self, rate_limit: RateLimitPolicy) -> Self {
        self.rate_limit = rate_limit;
        self
    }

    #[must_use]
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}
