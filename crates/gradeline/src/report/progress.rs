/// Progress events emitted while a report is assembled.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub enum ReportProgress {
    /// Starting to list an account's courses.
    FetchingCourses {
        /// Account name.
        account: String,
    },

    /// Course listing finished.
    CoursesFetched {
        account: String,
        /// Number of courses that will be processed.
        total: usize,
    },

    /// One course has been fully joined.
    CourseCompleted {
        course_id: u64,
        course: String,
        /// Rows produced for this course.
        rows: usize,
        /// Courses completed so far, this one included.
        completed: usize,
        total: usize,
    },

    /// An enrollment was left out of a per-user report.
    EnrollmentSkipped {
        course_id: u64,
        /// Short description of why.
        reason: String,
    },

    /// The report is complete.
    ReportComplete {
        /// Total rows produced.
        rows: usize,
    },
}

/// Callback for progress updates during report assembly.
pub type ProgressCallback = Box<dyn Fn(ReportProgress) + Send + Sync>;

/// Emit a progress event if a callback is provided.
#[inline]
pub fn emit(on_progress: Option<&ProgressCallback>, event: ReportProgress) {
    if let Some(cb) = on_progress {
        cb(event);
    }
}
