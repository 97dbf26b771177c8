//! Gradeline - a read-only aggregation client for Canvas-style LMS APIs.
//!
//! This library walks paginated, rate-limited LMS endpoints and joins
//! accounts, courses, sections, enrollments, assignments and submissions into
//! flat report rows.
//!
//! # Example
//!
//! ```ignore
//! use gradeline::{AggregationRun, AssignmentBucket, CanvasClient, ClientConfig, ReportOptions};
//!
//! let config = ClientConfig::new("https://lms.example.edu/api/v1", token);
//! let client = CanvasClient::new(&config)?;
//!
//! let run = AggregationRun::new(client, ReportOptions::default());
//! let rows = run.assignments_for_account(111, AssignmentBucket::Ungraded).await?;
//! ```

pub mod api;
pub mod cache;
pub mod config;
pub mod dates;
pub mod error;
pub mod http;
pub mod limiter;
pub mod report;
pub mod retry;

pub use api::types::{
    Account, Assignment, AssignmentAnalytics, AssignmentBucket, AssignmentDate, Course,
    CourseEnrollmentType, Enrollment, EnrollmentState, EnrollmentType, GradingContext,
    GradingStandard, Section, SectionWithEnrollments, Submission, User,
};
pub use api::{CanvasClient, PageState, Paginator, parse_next_link};
pub use cache::SectionCache;
pub use config::{ClientConfig, RateLimitPolicy};
pub use dates::{DateOverrideMatch, convert_timestamp, parse_time_zone};
pub use error::{CanvasError, short_error_message};
pub use limiter::ApiRateLimiter;
pub use report::{
    AggregationRun, AssignmentReportRow, AssignmentResultRow, EnrollmentResultRow,
    ProgressCallback, ReportOptions, ReportProgress, UngradedSubmissionRow,
};
pub use retry::{RetryConfig, with_retry};
