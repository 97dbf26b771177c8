//! Assignment status report: one row per assignment per section that still
//! needs grading.

use std::sync::Arc;

use tracing::{debug, info};

use super::pool::for_each_course;
use super::progress::{ProgressCallback, ReportProgress, emit};
use super::types::{AssignmentReportRow, ReportOptions};
use crate::api::CanvasClient;
use crate::api::types::{AssignmentBucket, Course, CourseEnrollmentType};
use crate::cache::SectionCache;
use crate::dates::{convert_timestamp, find_override, override_index};
use crate::error::Result;

/// Link to a course gradebook in the web UI.
///
/// `base_url` is the API root; a trailing `/api/v1` is removed.
pub fn gradebook_url(base_url: &str, course_id: u64) -> String {
    let trimmed = base_url.trim_end_matches('/');
    let root = trimmed.strip_suffix("/api/v1").unwrap_or(trimmed);
    format!("{root}/courses/{course_id}/gradebook")
}

/// Join one course's assignments with their sections, teachers and dates.
///
/// Sections are resolved through `cache`, so a section shared by many
/// assignments costs one lookup.
pub async fn assignment_rows(
    client: &CanvasClient,
    cache: &SectionCache,
    course: &Course,
    bucket: AssignmentBucket,
    options: &ReportOptions,
) -> Result<Vec<AssignmentReportRow>> {
    let assignments = client.get_assignments_by_course(course.id, bucket).await?;
    let gradebook = gradebook_url(client.base_url(), course.id);
    let mut rows = Vec::new();

    for assignment in &assignments {
        if assignment.needs_grading_count_by_section.is_empty() {
            debug!(
                course_id = course.id,
                assignment_id = assignment.id,
                "No sections need grading for assignment"
            );
            continue;
        }

        let overrides = override_index(&assignment.all_dates, options.date_overrides);

        for entry in &assignment.needs_grading_count_by_section {
            let section = cache.resolve(client, entry.section_id).await?;

            let (due_at, unlock_at, lock_at) = match find_override(&overrides, entry.section_id) {
                Some(date) => (
                    convert_timestamp(date.due_at.as_deref(), options.time_zone)?,
                    convert_timestamp(date.unlock_at.as_deref(), options.time_zone)?,
                    convert_timestamp(date.lock_at.as_deref(), options.time_zone)?,
                ),
                None => (String::new(), String::new(), String::new()),
            };

            rows.push(AssignmentReportRow {
                assignment_id: assignment.id,
                course_id: course.id,
                account: course.account_name().to_string(),
                course_name: course.name.clone(),
                assignment: assignment.name.clone(),
                due_at,
                unlock_at,
                lock_at,
                section: section.code.clone(),
                needs_grading: entry.needs_grading_count,
                teachers: section.teachers.join(";"),
                status: bucket.as_str().to_string(),
                published: assignment.published,
                gradebook_url: gradebook.clone(),
            });
        }
    }

    Ok(rows)
}

/// One aggregation run: a client, a fresh section cache and report options.
pub struct AggregationRun {
    client: CanvasClient,
    cache: Arc<SectionCache>,
    options: ReportOptions,
    on_progress: Option<ProgressCallback>,
}

impl AggregationRun {
    pub fn new(client: CanvasClient, options: ReportOptions) -> Self {
        Self {
            client,
            cache: Arc::new(SectionCache::new()),
            options,
            on_progress: None,
        }
    }

    #[must_use]
    pub fn with_progress(mut self, on_progress: ProgressCallback) -> Self {
        self.on_progress = Some(on_progress);
        self
    }

    pub fn cache(&self) -> &SectionCache {
        &self.cache
    }

    pub fn options(&self) -> &ReportOptions {
        &self.options
    }

    pub async fn assignments_for_course(
        &self,
        course: &Course,
        bucket: AssignmentBucket,
    ) -> Result<Vec<AssignmentReportRow>> {
        let client = &self.client;
        let rows = assignment_rows(client, &self.cache, course, bucket, &self.options).await?;
        self.course_completed(course, rows.len(), 1, 1);
        emit(
            self.on_progress.as_ref(),
            ReportProgress::ReportComplete { rows: rows.len() },
        );
        Ok(rows)
    }

    /// Rows for every student course of an account, in course order.
    pub async fn assignments_for_account(
        &self,
        account_id: u64,
        bucket: AssignmentBucket,
    ) -> Result<Vec<AssignmentReportRow>> {
        let account = self.client.get_account(account_id).await?;
        emit(
            self.on_progress.as_ref(),
            ReportProgress::FetchingCourses {
                account: account.name.clone(),
            },
        );

        let courses = self
            .client
            .get_courses_by_account(account.id, CourseEnrollmentType::Student)
            .await?;
        emit(
            self.on_progress.as_ref(),
            ReportProgress::CoursesFetched {
                account: account.name.clone(),
                total: courses.len(),
            },
        );

        let rows = self.assignments_for_courses(courses, bucket).await?;
        emit(
            self.on_progress.as_ref(),
            ReportProgress::ReportComplete { rows: rows.len() },
        );
        Ok(rows)
    }

    /// Join each course, sequentially or on a bounded worker pool.
    ///
    /// Output keeps course order either way. The first failure aborts the
    /// remaining courses.
    pub async fn assignments_for_courses(
        &self,
        courses: Vec<Course>,
        bucket: AssignmentBucket,
    ) -> Result<Vec<AssignmentReportRow>> {
        let job = |course: Course| {
            let client = self.client.clone();
            let cache = Arc::clone(&self.cache);
            let options = self.options;
            async move { assignment_rows(&client, &cache, &course, bucket, &options).await }
        };

        for_each_course(
            courses,
            self.options.concurrency,
            job,
            |course, rows, completed, total| self.course_completed(course, rows, completed, total),
        )
        .await
    }

    fn course_completed(&self, course: &Course, rows: usize, completed: usize, total: usize) {
        info!(
            course_id = course.id,
            count = rows,
            "Completed {} ({}/{})",
            course.name,
            completed,
            total
        );
        emit(
            self.on_progress.as_ref(),
            ReportProgress::CourseCompleted {
                course_id: course.id,
                course: course.name.clone(),
                rows,
                completed,
                total,
            },
        );
    }
}
