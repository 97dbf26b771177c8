//! End-to-end aggregation against a scripted LMS.
//!
//! The fake serves fixed JSON per URL (repeatable, unlike the unit-test
//! mock) and counts every request so the at-most-once section lookups can be
//! asserted across whole runs.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use gradeline::http::{HttpError, HttpRequest, HttpResponse, HttpTransport};
use gradeline::{
    AggregationRun, AssignmentBucket, CanvasClient, CanvasError, ClientConfig, ReportOptions,
    RetryConfig,
};
use serde_json::{Value, json};

const BASE: &str = "https://lms.test/api/v1";

#[derive(Default)]
struct FakeLms {
    routes: HashMap<String, (u16, Value, Option<String>)>,
    hits: Mutex<HashMap<String, usize>>,
    latency: Option<Duration>,
}

impl FakeLms {
    fn json(&mut self, url: impl Into<String>, body: Value) -> &mut Self {
        self.routes.insert(url.into(), (200, body, None));
        self
    }

    fn page(&mut self, url: impl Into<String>, body: Value, next: &str) -> &mut Self {
        let link = format!(r#"<{next}>; rel="next""#);
        self.routes.insert(url.into(), (200, body, Some(link)));
        self
    }

    fn status(&mut self, url: impl Into<String>, status: u16) -> &mut Self {
        self.routes.insert(url.into(), (status, json!({}), None));
        self
    }

    fn hits(&self, prefix: &str) -> usize {
        self.hits
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .filter(|(url, _)| url.starts_with(prefix))
            .map(|(_, n)| n)
            .sum()
    }

    fn total_hits(&self) -> usize {
        self.hits("")
    }
}

#[async_trait]
impl HttpTransport for FakeLms {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, HttpError> {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        *self
            .hits
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .entry(request.url.clone())
            .or_default() += 1;

        let Some((status, body, link)) = self.routes.get(&request.url) else {
            return Err(HttpError::Unrouted { url: request.url });
        };

        let mut headers = vec![("content-type".to_string(), "application/json".to_string())];
        if let Some(link) = link {
            headers.push(("link".to_string(), link.clone()));
        }
        Ok(HttpResponse {
            status: *status,
            headers,
            body: body.to_string().into_bytes(),
        })
    }
}

fn assignments_url(course_id: u64) -> String {
    format!(
        "{BASE}/courses/{course_id}/assignments?page=1&per_page=2&bucket=ungraded&needs_grading_count_by_section=true&include[]=all_dates"
    )
}

fn teachers_url(section_id: u64) -> String {
    format!("{BASE}/sections/{section_id}/enrollments?page=1&per_page=2&type[]=TeacherEnrollment")
}

fn assignment(id: u64, course_id: u64, sections: &[u64], dates: Value) -> Value {
    let by_section: Vec<Value> = sections
        .iter()
        .map(|s| json!({"section_id": s, "needs_grading_count": 1}))
        .collect();
    json!({
        "id": id,
        "course_id": course_id,
        "name": format!("Assessment {id}"),
        "published": true,
        "needs_grading_count": sections.len(),
        "needs_grading_count_by_section": by_section,
        "all_dates": dates
    })
}

/// Account 111 with three courses over two pages. Sections 11 and 12 are
/// shared by several assignments and courses; section 13 has no teachers.
fn campus_lms(latency: Option<Duration>) -> FakeLms {
    let mut lms = FakeLms {
        latency,
        ..FakeLms::default()
    };

    let courses_p1 = format!(
        "{BASE}/accounts/111/courses?page=1&per_page=2&enrollment_type[]=student&include[]=account"
    );
    let courses_p2 = format!("{BASE}/accounts/111/courses?page=2&per_page=2");
    let account = json!({"id": 111, "name": "Diploma of Business"});

    lms.json(format!("{BASE}/accounts/111"), account.clone())
        .page(
            courses_p1,
            json!([
                {"id": 1, "name": "Marketing", "account": account},
                {"id": 2, "name": "Finance", "account": account}
            ]),
            &courses_p2,
        )
        .json(
            courses_p2,
            json!([{"id": 3, "name": "Leadership", "account": account}]),
        );

    let course_1_p2 = format!("{BASE}/courses/1/assignments?page=2&per_page=2");
    lms.page(
        assignments_url(1),
        json!([
            assignment(101, 1, &[11, 12], json!([
                {"set_id": 11, "set_type": "CourseSection", "due_at": "2024-03-01T04:00:00Z",
                 "unlock_at": "2024-02-01T00:00:00Z", "lock_at": "2024-03-08T04:00:00Z"}
            ])),
            assignment(102, 1, &[11], json!([]))
        ]),
        &course_1_p2,
    )
    .json(course_1_p2, json!([assignment(103, 1, &[12], json!([]))]))
    .json(
        assignments_url(2),
        json!([
            assignment(201, 2, &[11, 13], json!([
                {"set_id": 13, "set_type": "ADHOC", "due_at": "2024-04-01T00:00:00Z"}
            ])),
            assignment(202, 2, &[], json!([]))
        ]),
    )
    .json(
        assignments_url(3),
        json!([assignment(301, 3, &[12], json!([]))]),
    );

    lms.json(
        teachers_url(11),
        json!([
            {"id": 1, "user_id": 1, "course_id": 1, "sis_section_id": "PER-01", "user": {"name": "Ada"}},
            {"id": 2, "user_id": 2, "course_id": 1, "sis_section_id": "PER-01", "user": {"name": "Grace"}}
        ]),
    )
    .json(
        teachers_url(12),
        json!([{"id": 3, "user_id": 3, "course_id": 1, "sis_section_id": null, "user": {"name": "Alan"}}]),
    )
    .json(
        format!("{BASE}/sections/12"),
        json!({"id": 12, "name": "Adelaide Evening", "sis_section_id": null}),
    )
    .json(teachers_url(13), json!([]))
    .json(
        format!("{BASE}/sections/13"),
        json!({"id": 13, "name": "Online", "sis_section_id": ""}),
    );

    lms
}

fn client(lms: &Arc<FakeLms>) -> CanvasClient {
    let config = ClientConfig::new(BASE, "secret").with_page_size(2);
    let transport: Arc<dyn HttpTransport> = lms.clone();
    CanvasClient::new_with_transport(&config, transport).expect("client")
}

#[tokio::test]
async fn account_report_joins_sections_teachers_and_dates() {
    let lms = Arc::new(campus_lms(None));
    let run = AggregationRun::new(client(&lms), ReportOptions::default());

    let rows = run
        .assignments_for_account(111, AssignmentBucket::Ungraded)
        .await
        .expect("report");

    let summary: Vec<(u64, &str, &str)> = rows
        .iter()
        .map(|r| (r.assignment_id, r.section.as_str(), r.teachers.as_str()))
        .collect();
    assert_eq!(
        summary,
        vec![
            (101, "PER-01", "Ada;Grace"),
            (101, "Adelaide Evening", "Alan"),
            (102, "PER-01", "Ada;Grace"),
            (103, "Adelaide Evening", "Alan"),
            (201, "PER-01", "Ada;Grace"),
            (201, "Online", ""),
            (301, "Adelaide Evening", "Alan"),
        ]
    );

    let first = &rows[0];
    assert_eq!(first.account, "Diploma of Business");
    assert_eq!(first.course_name, "Marketing");
    assert!(first.due_at.starts_with("2024-03-01 12:00:00 +0800"));
    assert!(first.unlock_at.starts_with("2024-02-01 08:00:00 +0800"));
    assert!(first.lock_at.starts_with("2024-03-08 12:00:00 +0800"));
    assert_eq!(first.gradebook_url, "https://lms.test/courses/1/gradebook");

    // Section-level override only applies to section 11.
    assert_eq!(rows[1].due_at, "");
    // The ad-hoc set sharing id 13 is not a section override.
    assert_eq!(rows[5].due_at, "");

    // Every section resolved exactly once across all courses.
    for section_id in [11, 12, 13] {
        assert_eq!(
            lms.hits(&format!("{BASE}/sections/{section_id}/enrollments")),
            1,
            "section {section_id} enrollments"
        );
    }
    assert_eq!(lms.hits(&format!("{BASE}/sections/11")), 1);
    assert_eq!(lms.hits(&format!("{BASE}/sections/12")), 2);
    assert_eq!(lms.hits(&format!("{BASE}/sections/13")), 2);
    assert_eq!(run.cache().len(), 3);
}

#[tokio::test]
async fn worker_pool_matches_sequential_output() {
    let sequential_lms = Arc::new(campus_lms(None));
    let sequential = AggregationRun::new(client(&sequential_lms), ReportOptions::default())
        .assignments_for_account(111, AssignmentBucket::Ungraded)
        .await
        .expect("sequential report");

    let pooled_lms = Arc::new(campus_lms(Some(Duration::from_millis(2))));
    let options = ReportOptions {
        concurrency: 3,
        ..ReportOptions::default()
    };
    let pooled = AggregationRun::new(client(&pooled_lms), options)
        .assignments_for_account(111, AssignmentBucket::Ungraded)
        .await
        .expect("pooled report");

    assert_eq!(pooled, sequential);
    assert_eq!(pooled_lms.total_hits(), sequential_lms.total_hits());
}

#[tokio::test]
async fn cancelled_client_makes_no_requests() {
    let lms = Arc::new(campus_lms(None));
    let client = client(&lms);
    client.cancellation_token().cancel();

    let err = AggregationRun::new(client, ReportOptions::default())
        .assignments_for_account(111, AssignmentBucket::Ungraded)
        .await
        .expect_err("cancelled");

    assert!(matches!(err, CanvasError::Cancelled));
    assert_eq!(lms.total_hits(), 0);
}

#[tokio::test]
async fn failing_course_fails_the_whole_report() {
    let mut lms = campus_lms(None);
    lms.status(assignments_url(3), 500);
    let lms = Arc::new(lms);

    let err = AggregationRun::new(client(&lms), ReportOptions::default())
        .assignments_for_account(111, AssignmentBucket::Ungraded)
        .await
        .expect_err("course 3 fails");

    assert!(matches!(err, CanvasError::UpstreamStatus { status: 500, .. }));
    assert!(err.is_retryable());
}

#[tokio::test(start_paused = true)]
async fn page_retry_recovers_a_flaky_listing() {
    struct Flaky {
        inner: FakeLms,
        failures_left: Mutex<usize>,
    }

    #[async_trait]
    impl HttpTransport for Flaky {
        async fn send(&self, request: HttpRequest) -> Result<HttpResponse, HttpError> {
            let fail = {
                let mut left = self.failures_left.lock().unwrap_or_else(|e| e.into_inner());
                let fail = request.url.contains("/courses?page=2") && *left > 0;
                if fail {
                    *left -= 1;
                }
                fail
            };
            if fail {
                return Ok(HttpResponse {
                    status: 503,
                    headers: Vec::new(),
                    body: Vec::new(),
                });
            }
            self.inner.send(request).await
        }
    }

    let flaky = Arc::new(Flaky {
        inner: campus_lms(None),
        failures_left: Mutex::new(2),
    });
    let config = ClientConfig::new(BASE, "secret").with_page_size(2);
    let client = CanvasClient::new_with_transport(&config, flaky.clone())
        .expect("client")
        .with_page_retry(RetryConfig::default());

    let courses = client
        .get_courses_by_account(111, gradeline::CourseEnrollmentType::Student)
        .await
        .expect("listing recovers");

    assert_eq!(
        courses.iter().map(|c| c.id).collect::<Vec<_>>(),
        vec![1, 2, 3]
    );
    let failures_left = flaky
        .failures_left
        .lock()
        .unwrap_or_else(|e| e.into_inner());
    assert_eq!(*failures_left, 0);
}
