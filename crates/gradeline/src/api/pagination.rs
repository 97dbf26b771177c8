//! Cursor pagination over `Link: <url>; rel="next"` headers.
//!
//! A [`Paginator`] walks forward one page per call and never restarts. It
//! does not retry on its own: a failed walk stays failed until the caller
//! invokes [`Paginator::resume`].

use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use super::client::CanvasClient;
use crate::error::{CanvasError, Result};

/// Where a walk currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageState {
    /// Nothing fetched yet.
    Start,
    /// At least one page fetched and another one pending.
    FetchingPage,
    /// No further pages.
    Done,
    /// The last fetch failed. See [`Paginator::resume`].
    Failed,
}

/// Lazy, forward-only walk over a paginated listing.
pub struct Paginator<T> {
    client: CanvasClient,
    next_url: Option<String>,
    state: PageState,
    pages_fetched: usize,
    _marker: PhantomData<fn() -> T>,
}

impl<T: DeserializeOwned> Paginator<T> {
    pub(crate) fn new(client: CanvasClient, first_url: String) -> Self {
        Self {
            client,
            next_url: Some(first_url),
            state: PageState::Start,
            pages_fetched: 0,
            _marker: PhantomData,
        }
    }

    pub fn state(&self) -> PageState {
        self.state
    }

    pub fn pages_fetched(&self) -> usize {
        self.pages_fetched
    }

    /// URL the next call to [`next_page`](Self::next_page) will request.
    pub fn next_url(&self) -> Option<&str> {
        self.next_url.as_deref()
    }

    pub(crate) fn client(&self) -> &CanvasClient {
        &self.client
    }

    /// Fetch the next page.
    ///
    /// Returns `Ok(None)` once the walk is done, and also while it is
    /// failed and has not been resumed.
    pub async fn next_page(&mut self) -> Result<Option<Vec<T>>> {
        if matches!(self.state, PageState::Done | PageState::Failed) {
            return Ok(None);
        }
        let Some(url) = self.next_url.clone() else {
            self.state = PageState::Done;
            return Ok(None);
        };

        match self.fetch(&url).await {
            Ok((items, next)) => {
                self.pages_fetched += 1;
                debug!(
                    url = %url,
                    page = self.pages_fetched,
                    count = items.len(),
                    "Fetched page"
                );
                self.state = if next.is_some() {
                    PageState::FetchingPage
                } else {
                    PageState::Done
                };
                self.next_url = next;
                Ok(Some(items))
            }
            Err(err) => {
                self.state = PageState::Failed;
                Err(err)
            }
        }
    }

    /// Move a failed walk back to fetching the same URL.
    ///
    /// Returns `false` when the walk was not failed.
    pub fn resume(&mut self) -> bool {
        if self.state == PageState::Failed {
            self.state = PageState::FetchingPage;
            true
        } else {
            false
        }
    }

    /// Drain the walk, concatenating pages in order.
    pub async fn collect_all(mut self) -> Result<Vec<T>> {
        let mut items = Vec::new();
        while let Some(page) = self.next_page().await? {
            items.extend(page);
        }
        Ok(items)
    }

    async fn fetch(&self, url: &str) -> Result<(Vec<T>, Option<String>)> {
        let response = self.client.dispatch(url).await?;
        if !response.is_success() {
            return Err(CanvasError::UpstreamStatus {
                status: response.status,
                url: url.to_string(),
            });
        }

        let items: Vec<T> = serde_json::from_slice(&response.body)?;
        let next = response
            .header("link")
            .and_then(parse_next_link)
            .map(|target| resolve_against(url, target));
        Ok((items, next))
    }
}

/// Resolve a possibly relative link target against the page it came from.
fn resolve_against(current: &str, target: &str) -> String {
    Url::parse(current)
        .and_then(|base| base.join(target))
        .map(String::from)
        .unwrap_or_else(|_| target.to_string())
}

/// Find the target of the first `rel="next"` entry in a `Link` header.
///
/// Tolerates any parameter order, extra whitespace, unquoted `rel` values
/// and space-separated relation lists such as `rel="next last"`.
pub fn parse_next_link(header: &str) -> Option<&str> {
    let mut rest = header;
    while let Some(open) = rest.find('<') {
        let after_open = &rest[open + 1..];
        let close = after_open.find('>')?;
        let target = after_open[..close].trim();
        let tail = &after_open[close + 1..];
        let params_end = tail.find('<').unwrap_or(tail.len());
        let params = &tail[..params_end];

        if !target.is_empty() && has_next_relation(params) {
            return Some(target);
        }
        rest = tail;
    }
    None
}

fn has_next_relation(params: &str) -> bool {
    params.split(';').any(|param| {
        let Some((key, value)) = param.split_once('=') else {
            return false;
        };
        if !key.trim().eq_ignore_ascii_case("rel") {
            return false;
        }
        value
            .trim()
            .trim_end_matches(',')
            .trim()
            .trim_matches('"')
            .split_whitespace()
            .any(|rel| rel.eq_ignore_ascii_case("next"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::client::test_support::{BASE, client_with};
    use crate::http::MockTransport;
    use serde_json::json;

    #[test]
    fn next_link_before_prev() {
        let header = r#"<https://x/2>; rel="next", <https://x/1>; rel="prev""#;
        assert_eq!(parse_next_link(header), Some("https://x/2"));
    }

    #[test]
    fn only_prev_terminates() {
        let header = r#"<https://x/1>; rel="prev", <https://x/1>; rel="first""#;
        assert_eq!(parse_next_link(header), None);
    }

    #[test]
    fn next_link_after_others_with_extra_whitespace() {
        let header = "<https://x/1?page=1>;  rel=\"current\" ,\n   <https://x/1?page=3> ; rel = \"next\" , <https://x/1?page=9>; rel=\"last\"";
        assert_eq!(parse_next_link(header), Some("https://x/1?page=3"));
    }

    #[test]
    fn unquoted_and_multi_valued_relations() {
        assert_eq!(
            parse_next_link("<https://x/2>; rel=next"),
            Some("https://x/2")
        );
        assert_eq!(
            parse_next_link(r#"<https://x/2>; rel="last next""#),
            Some("https://x/2")
        );
        assert_eq!(
            parse_next_link(r#"<https://x/2>; title="a"; REL="Next""#),
            Some("https://x/2")
        );
    }

    #[test]
    fn does_not_confuse_other_params_or_relations() {
        assert_eq!(parse_next_link(r#"<https://x/2>; title="next""#), None);
        assert_eq!(parse_next_link(r#"<https://x/2>; rel="nextpage""#), None);
        assert_eq!(parse_next_link(r#"<>; rel="next""#), None);
        assert_eq!(parse_next_link(""), None);
    }

    #[test]
    fn relative_targets_resolve_against_current_page() {
        let current = "https://lms.test/api/v1/courses?page=1";
        assert_eq!(
            resolve_against(current, "/api/v1/courses?page=2"),
            "https://lms.test/api/v1/courses?page=2"
        );
        assert_eq!(
            resolve_against(current, "https://other.test/p2"),
            "https://other.test/p2"
        );
    }

    #[tokio::test]
    async fn walks_n_pages_with_n_requests_in_order() {
        let transport = MockTransport::new();
        let p1 = format!("{BASE}/courses/1/sections?page=1&per_page=2");
        let p2 = format!("{BASE}/courses/1/sections?page=2&per_page=2");
        let p3 = format!("{BASE}/courses/1/sections?page=3&per_page=2");
        transport.push_json(
            &p1,
            json!([1, 2]),
            Some(&format!(r#"<{p2}>; rel="next", <{p3}>; rel="last""#)),
        );
        transport.push_json(
            &p2,
            json!([3, 4]),
            Some(&format!(r#"<{p1}>; rel="prev", <{p3}>; rel="next""#)),
        );
        transport.push_json(&p3, json!([5]), Some(&format!(r#"<{p2}>; rel="prev""#)));

        let client = client_with(&transport);
        let items: Vec<u32> = client
            .paginate(p1.clone())
            .collect_all()
            .await
            .expect("walk");

        assert_eq!(items, vec![1, 2, 3, 4, 5]);
        let urls: Vec<String> = transport.requests().into_iter().map(|r| r.url).collect();
        assert_eq!(urls, vec![p1, p2, p3]);
    }

    #[tokio::test]
    async fn missing_link_header_ends_after_current_page() {
        let transport = MockTransport::new();
        let p1 = format!("{BASE}/x?page=1&per_page=2");
        transport.push_json(&p1, json!([7]), None);

        let client = client_with(&transport);
        let mut walk = client.paginate::<u32>(p1);
        assert_eq!(walk.state(), PageState::Start);
        assert_eq!(walk.next_page().await.expect("page"), Some(vec![7]));
        assert_eq!(walk.state(), PageState::Done);
        assert_eq!(walk.next_page().await.expect("done"), None);
        assert_eq!(walk.next_page().await.expect("still done"), None);
        assert_eq!(transport.requests().len(), 1);
    }

    #[tokio::test]
    async fn failed_walk_stays_failed_until_resumed() {
        let transport = MockTransport::new();
        let p1 = format!("{BASE}/x?page=1&per_page=2");
        let p2 = format!("{BASE}/x?page=2&per_page=2");
        transport.push_json(&p1, json!([1, 2]), Some(&format!(r#"<{p2}>; rel="next""#)));
        transport.push_status(&p2, 503);
        transport.push_json(&p2, json!([3]), None);

        let client = client_with(&transport);
        let mut walk = client.paginate::<u32>(p1);

        assert_eq!(walk.next_page().await.expect("p1"), Some(vec![1, 2]));
        assert_eq!(walk.state(), PageState::FetchingPage);

        let err = walk.next_page().await.expect_err("p2 fails");
        assert!(matches!(err, CanvasError::UpstreamStatus { status: 503, .. }));
        assert_eq!(walk.state(), PageState::Failed);

        // No implicit retry.
        assert_eq!(walk.next_page().await.expect("failed yields none"), None);
        assert_eq!(transport.requests().len(), 2);

        assert!(walk.resume());
        assert_eq!(walk.next_url(), Some(p2.as_str()));
        assert_eq!(walk.next_page().await.expect("p2 retried"), Some(vec![3]));
        assert_eq!(walk.state(), PageState::Done);
        assert_eq!(walk.pages_fetched(), 2);
        assert!(!walk.resume());
    }

    #[tokio::test]
    async fn decode_failure_fails_the_walk() {
        let transport = MockTransport::new();
        let p1 = format!("{BASE}/x?page=1&per_page=2");
        transport.push_json(&p1, json!({"not": "a list"}), None);

        let client = client_with(&transport);
        let err = client
            .paginate::<u32>(p1)
            .collect_all()
            .await
            .expect_err("decode");
        assert!(matches!(err, CanvasError::Json(_)));
    }

    #[tokio::test]
    async fn cancellation_stops_mid_walk() {
        let transport = MockTransport::new();
        let p1 = format!("{BASE}/x?page=1&per_page=2");
        let p2 = format!("{BASE}/x?page=2&per_page=2");
        transport.push_json(&p1, json!([1]), Some(&format!(r#"<{p2}>; rel="next""#)));
        transport.push_json(&p2, json!([2]), None);

        let client = client_with(&transport);
        let mut walk = client.paginate::<u32>(p1);
        assert_eq!(walk.next_page().await.expect("p1"), Some(vec![1]));

        client.cancellation_token().cancel();
        let err = walk.next_page().await.expect_err("cancelled");
        assert!(matches!(err, CanvasError::Cancelled));
        assert_eq!(transport.requests().len(), 1);
    }
}
