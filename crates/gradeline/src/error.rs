use thiserror::Error;

use crate::http::HttpError;

/// Errors that can occur while talking to the LMS or assembling a report.
#[derive(Debug, Error)]
pub enum CanvasError {
    /// DNS failure, refused connection, timeout.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The limiter could not grant a token.
    #[error("Rate limiter error: {0}")]
    RateLimit(String),

    /// The client's cancellation token fired.
    #[error("Operation cancelled")]
    Cancelled,

    /// Non-2xx status on a fetch whose failure is fatal.
    #[error("Upstream returned HTTP {status} for {url}")]
    UpstreamStatus { status: u16, url: String },

    /// 404 on a single-object fetch.
    #[error("Not found: {resource}")]
    NotFound { resource: String },

    #[error("Invalid JSON payload: {0}")]
    Json(#[from] serde_json::Error),

    /// Section code/teacher lookup failed.
    #[error("Failed to resolve section {section_id}: {source}")]
    Resolution {
        section_id: u64,
        #[source]
        source: Box<CanvasError>,
    },

    #[error("Invalid timestamp {value:?}: {source}")]
    Timestamp {
        value: String,
        #[source]
        source: chrono::ParseError,
    },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CanvasError {
    /// Create a not found error.
    #[inline]
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
        }
    }

    /// Wrap a section resolution failure.
    #[inline]
    pub fn resolution(section_id: u64, source: CanvasError) -> Self {
        Self::Resolution {
            section_id,
            source: Box::new(source),
        }
    }

    /// Whether a caller-level retry has a chance of succeeding.
    ///
    /// Transport and limiter failures are retryable, as are 429 and 5xx
    /// statuses. Resolution errors defer to their cause.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport(_) | Self::RateLimit(_) => true,
            Self::UpstreamStatus { status, .. } => *status == 429 || (500..600).contains(status),
            Self::Resolution { source, .. } => source.is_retryable(),
            _ => false,
        }
    }

    /// Check if this error is a cancellation.
    #[inline]
    pub fn is_cancelled(&self) -> bool {
        match self {
            Self::Cancelled => true,
            Self::Resolution { source, .. } => source.is_cancelled(),
            _ => false,
        }
    }
}

impl From<HttpError> for CanvasError {
    fn from(err: HttpError) -> Self {
        Self::Transport(err.to_string())
    }
}

/// Extract a short error message suitable for display.
///
/// Takes the first line of an error message, which is useful for upstream
/// errors that embed multi-line response bodies.
#[inline]
pub fn short_error_message(e: &impl std::error::Error) -> String {
    let full = e.to_string();
    full.lines().next().unwrap_or(&full).to_string()
}

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, CanvasError>;
