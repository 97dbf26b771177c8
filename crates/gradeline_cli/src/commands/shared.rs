use std::error::Error;
use std::future::Future;

use gradeline::{AssignmentBucket, CanvasClient, CourseEnrollmentType, RetryConfig, with_retry};

use crate::config::Config;

const COURSE_ENROLLMENT_TYPES: [CourseEnrollmentType; 5] = [
    CourseEnrollmentType::Teacher,
    CourseEnrollmentType::Student,
    CourseEnrollmentType::Ta,
    CourseEnrollmentType::Observer,
    CourseEnrollmentType::Designer,
];

pub(crate) fn parse_bucket(value: &str) -> Result<AssignmentBucket, String> {
    let value = value.trim().to_ascii_lowercase();
    AssignmentBucket::ALL
        .into_iter()
        .find(|bucket| bucket.as_str() == value)
        .ok_or_else(|| {
            let names: Vec<&str> = AssignmentBucket::ALL.iter().map(|b| b.as_str()).collect();
            format!(
                "unknown bucket {value:?} (expected one of: {})",
                names.join(", ")
            )
        })
}

pub(crate) fn parse_course_enrollment_type(value: &str) -> Result<CourseEnrollmentType, String> {
    let value = value.trim().to_ascii_lowercase();
    COURSE_ENROLLMENT_TYPES
        .into_iter()
        .find(|kind| kind.as_str() == value)
        .ok_or_else(|| {
            let names: Vec<&str> = COURSE_ENROLLMENT_TYPES.iter().map(|k| k.as_str()).collect();
            format!(
                "unknown enrollment type {value:?} (expected one of: {})",
                names.join(", ")
            )
        })
}

/// Build the reqwest-backed client from configuration.
pub(crate) fn build_client(config: &Config) -> Result<CanvasClient, Box<dyn Error>> {
    let client_config = config.client_config()?;
    tracing::debug!(
        base_url = %client_config.base_url,
        page_size = client_config.page_size,
        "Connecting"
    );
    Ok(CanvasClient::new(&client_config)?)
}

/// Opt `client` into page retries when a retry budget is configured.
///
/// The returned policy is also used for single-entity lookups.
pub(crate) fn with_retry_policy(
    client: CanvasClient,
    config: &Config,
    retries: Option<usize>,
) -> (CanvasClient, Option<RetryConfig>) {
    match config.retry_config(retries) {
        Some(retry) => (client.with_page_retry(retry.clone()), Some(retry)),
        None => (client, None),
    }
}

/// Run a single lookup, with backoff when `retry` is set.
pub(crate) async fn fetch<T, F, Fut>(
    retry: Option<&RetryConfig>,
    mut operation: F,
) -> gradeline::error::Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = gradeline::error::Result<T>>,
{
    match retry {
        Some(retry) => with_retry(operation, retry).await,
        None => operation().await,
    }
}
