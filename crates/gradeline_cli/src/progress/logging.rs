use gradeline::ReportProgress;

/// Logging reporter using tracing for structured output.
pub struct LoggingReporter;

impl LoggingReporter {
    pub fn new() -> Self {
        Self
    }

    pub fn handle(&self, event: ReportProgress) {
        match event {
            ReportProgress::FetchingCourses { account } => {
                tracing::info!(account = %account, "Fetching courses");
            }

            ReportProgress::CoursesFetched { account, total } => {
                tracing::info!(account = %account, total, "Courses fetched");
            }

            ReportProgress::CourseCompleted {
                course_id,
                course,
                rows,
                completed,
                total,
            } => {
                tracing::debug!(
                    course_id,
                    course = %course,
                    rows,
                    completed,
                    total,
                    "Course joined"
                );
            }

            ReportProgress::EnrollmentSkipped { course_id, reason } => {
                tracing::warn!(course_id, reason = %reason, "Enrollment skipped");
            }

            ReportProgress::ReportComplete { rows } => {
                tracing::info!(rows, "Report complete");
            }

            _ => {}
        }
    }
}

impl Default for LoggingReporter {
    fn default() -> Self {
        Self::new()
    }
}
