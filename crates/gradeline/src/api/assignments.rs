use tracing::debug;

use super::client::CanvasClient;
use super::types::{Assignment, AssignmentAnalytics, AssignmentBucket};
use crate::error::{CanvasError, Result};

impl CanvasClient {
    /// Assignments of a course in `bucket`, with per-section grading counts
    /// and every date variant.
    pub async fn get_assignments_by_course(
        &self,
        course_id: u64,
        bucket: AssignmentBucket,
    ) -> Result<Vec<Assignment>> {
        let url = self.first_page_url(
            &format!("/courses/{course_id}/assignments"),
            &format!(
                "&bucket={}&needs_grading_count_by_section=true&include[]=all_dates",
                bucket.as_str()
            ),
        );
        self.collect(url).await
    }

    /// Per-user assignment analytics for a course.
    ///
    /// Unpublished or inaccessible courses answer with a non-2xx status; that
    /// yields an empty list instead of an error.
    pub async fn get_user_assignment_analytics(
        &self,
        course_id: u64,
        user_id: u64,
    ) -> Result<Vec<AssignmentAnalytics>> {
        let url = self.first_page_url(
            &format!("/courses/{course_id}/analytics/users/{user_id}/assignments"),
            "",
        );
        match self.collect(url).await {
            Err(CanvasError::UpstreamStatus { status, .. }) => {
                debug!(
                    course_id,
                    user_id,
                    status,
                    "Analytics unavailable, skipping course"
                );
                Ok(Vec::new())
            }
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::api::client::test_support::{BASE, client_with};
    use crate::api::types::AssignmentBucket;
    use crate::error::CanvasError;
    use crate::http::MockTransport;
    use serde_json::json;

    #[tokio::test]
    async fn assignments_request_bucket_and_dates() {
        let transport = MockTransport::new();
        transport.push_json(
            format!(
                "{BASE}/courses/9/assignments?page=1&per_page=2&bucket=overdue&needs_grading_count_by_section=true&include[]=all_dates"
            ),
            json!([{"id": 1, "course_id": 9, "name": "Quiz"}]),
            None,
        );

        let assignments = client_with(&transport)
            .get_assignments_by_course(9, AssignmentBucket::Overdue)
            .await
            .expect("assignments");
        assert_eq!(assignments[0].name, "Quiz");
        assert!(assignments[0].needs_grading_count_by_section.is_empty());
    }

    #[tokio::test]
    async fn analytics_absorbs_non_success_status() {
        let transport = MockTransport::new();
        transport.push_status(
            format!("{BASE}/courses/9/analytics/users/5/assignments?page=1&per_page=2"),
            404,
        );

        let analytics = client_with(&transport)
            .get_user_assignment_analytics(9, 5)
            .await
            .expect("absorbed");
        assert!(analytics.is_empty());
    }

    #[tokio::test]
    async fn analytics_still_propagates_transport_errors() {
        let transport = MockTransport::new();

        let err = client_with(&transport)
            .get_user_assignment_analytics(9, 5)
            .await
            .expect_err("transport");
        assert!(matches!(err, CanvasError::Transport(_)));
    }
}
