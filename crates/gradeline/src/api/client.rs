//! LMS API client creation and request dispatch.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;

use super::pagination::Paginator;
use crate::config::ClientConfig;
use crate::error::{CanvasError, Result};
use crate::http::{HttpRequest, HttpResponse, HttpTransport, ReqwestTransport};
use crate::limiter::ApiRateLimiter;
use crate::retry::{RetryConfig, collect_with_retry};

/// Read-only LMS API client.
///
/// Clones share the transport, the rate limiter and the cancellation token.
#[derive(Clone)]
pub struct CanvasClient {
    transport: Arc<dyn HttpTransport>,
    base_url: String,
    token: String,
    page_size: u32,
    limiter: ApiRateLimiter,
    cancel: CancellationToken,
    page_retry: Option<RetryConfig>,
}

impl std::fmt::Debug for CanvasClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CanvasClient")
            .field("base_url", &self.base_url)
            .field("page_size", &self.page_size)
            .field("page_retry", &self.page_retry)
            .finish_non_exhaustive()
    }
}

impl CanvasClient {
    /// Create a client backed by reqwest.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let config = ClientConfig::new("https://lms.example.edu/api/v1", token);
    /// let client = CanvasClient::new(&config)?;
    /// let account = client.get_account(111).await?;
    /// ```
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let transport = ReqwestTransport::with_timeout(config.request_timeout)
            .map_err(|e| CanvasError::Config(e.to_string()))?;
        Self::new_with_transport(config, Arc::new(transport))
    }

    pub fn new_with_transport(
        config: &ClientConfig,
        transport: Arc<dyn HttpTransport>,
    ) -> Result<Self> {
        let base_url = config.base_url.trim().trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(CanvasError::Config("base URL must not be empty".to_string()));
        }
        if config.access_token.trim().is_empty() {
            return Err(CanvasError::Config(
                "access token must not be empty".to_string(),
            ));
        }
        if config.page_size == 0 {
            return Err(CanvasError::Config(
                "page size must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            transport,
            base_url,
            token: config.access_token.clone(),
            page_size: config.page_size,
            limiter: ApiRateLimiter::new(&config.rate_limit)?,
            cancel: CancellationToken::new(),
            page_retry: None,
        })
    }

    /// Use `token` to abort limiter waits and in-flight requests.
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Retry failed pages of every paginated fetch with backoff.
    #[must_use]
    pub fn with_page_retry(mut self, config: RetryConfig) -> Self {
        self.page_retry = Some(config);
        self
    }

    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// API root without a trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Absolute URL for a single-object endpoint.
    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Absolute URL for the first page of a listing. `query` is appended
    /// verbatim and should start with `&` when non-empty.
    pub(crate) fn first_page_url(&self, path: &str, query: &str) -> String {
        format!(
            "{}{}?page=1&per_page={}{}",
            self.base_url, path, self.page_size, query
        )
    }

    /// Wait for the limiter, then send one authenticated GET.
    ///
    /// The status code is not interpreted here.
    pub async fn dispatch(&self, url: &str) -> Result<HttpResponse> {
        self.limiter.acquire(&self.cancel).await?;

        let request = HttpRequest {
            url: url.to_string(),
            headers: vec![
                ("Accept".to_string(), "application/json".to_string()),
                ("User-Agent".to_string(), "gradeline".to_string()),
                (
                    "Authorization".to_string(),
                    format!("Bearer {}", self.token),
                ),
            ],
        };

        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(CanvasError::Cancelled),
            response = self.transport.send(request) => response.map_err(CanvasError::from),
        }
    }

    /// Fetch and decode a single object.
    ///
    /// A 404 becomes [`CanvasError::NotFound`] naming `resource`.
    pub(crate) async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        resource: &str,
    ) -> Result<T> {
        let response = self.dispatch(url).await?;

        if response.status == 404 {
            return Err(CanvasError::not_found(resource));
        }
        if !response.is_success() {
            return Err(CanvasError::UpstreamStatus {
                status: response.status,
                url: url.to_string(),
            });
        }

        Ok(serde_json::from_slice(&response.body)?)
    }

    /// Start a lazy walk over a paginated listing.
    pub fn paginate<T: DeserializeOwned>(&self, url: impl Into<String>) -> Paginator<T> {
        Paginator::new(self.clone(), url.into())
    }

    /// Fetch every page of a listing, in order.
    pub(crate) async fn collect<T: DeserializeOwned>(&self, url: String) -> Result<Vec<T>> {
        let paginator = self.paginate(url);
        match &self.page_retry {
            Some(config) => collect_with_retry(paginator, config.clone()).await,
            None => paginator.collect_all().await,
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::http::MockTransport;

    pub const BASE: &str = "https://lms.test/api/v1";

    pub fn client_with(transport: &MockTransport) -> CanvasClient {
        let config = ClientConfig::new(BASE, "secret").with_page_size(2);
        CanvasClient::new_with_transport(&config, Arc::new(transport.clone()))
            .expect("test client should build")
    }
}
