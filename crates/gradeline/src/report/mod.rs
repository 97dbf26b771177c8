//! Report assembly on top of the API fetchers.

pub mod assignments;
mod pool;
pub mod progress;
pub mod results;
pub mod submissions;
pub mod types;

pub use assignments::{AggregationRun, assignment_rows, gradebook_url};
pub use progress::{ProgressCallback, ReportProgress, emit};
pub use results::{assignment_results_by_user, enrollment_results_by_user};
pub use submissions::ungraded_submissions_by_account;
pub use types::{
    AssignmentReportRow, AssignmentResultRow, EnrollmentResultRow, ReportOptions,
    UngradedSubmissionRow,
};
