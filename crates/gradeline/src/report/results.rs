//! Per-student reports: assignment analytics and enrollment grades.

use std::collections::HashSet;

use tracing::{debug, warn};

use super::progress::{ProgressCallback, ReportProgress, emit};
use super::types::{AssignmentResultRow, EnrollmentResultRow, ReportOptions};
use crate::api::CanvasClient;
use crate::api::types::{EnrollmentState, User};
use crate::dates::convert_timestamp;
use crate::error::{CanvasError, Result, short_error_message};

/// Enrollment states whose courses carry assignment analytics worth reporting.
const RESULT_STATES: [EnrollmentState; 3] = [
    EnrollmentState::Active,
    EnrollmentState::Completed,
    EnrollmentState::Inactive,
];

/// Assignment analytics for every course `user` is enrolled in.
///
/// Courses whose analytics are unavailable (unpublished, no access) are
/// skipped. A course is only looked up when it has analytics entries.
pub async fn assignment_results_by_user(
    client: &CanvasClient,
    user: &User,
    options: &ReportOptions,
    on_progress: Option<&ProgressCallback>,
) -> Result<Vec<AssignmentResultRow>> {
    let enrollments = client
        .get_enrollments_by_user(user.id, &RESULT_STATES)
        .await?;

    let mut seen = HashSet::new();
    let course_ids: Vec<u64> = enrollments
        .iter()
        .map(|e| e.course_id)
        .filter(|id| seen.insert(*id))
        .collect();

    let student_id = user.sis_user_id.clone().unwrap_or_default();
    let mut rows = Vec::new();

    for course_id in course_ids {
        let analytics = client
            .get_user_assignment_analytics(course_id, user.id)
            .await?;
        if analytics.is_empty() {
            debug!(course_id, user_id = user.id, "No analytics for course");
            emit(
                on_progress,
                ReportProgress::EnrollmentSkipped {
                    course_id,
                    reason: "no assignment analytics".to_string(),
                },
            );
            continue;
        }

        let course = client.get_course(course_id).await?;
        for entry in analytics {
            let submission = entry.submission.unwrap_or_default();
            rows.push(AssignmentResultRow {
                assignment_id: entry.assignment_id,
                student_id: student_id.clone(),
                student_name: user.name.clone(),
                account: course.account_name().to_string(),
                course_name: course.name.clone(),
                assignment: entry.title,
                max_score: entry.max_score,
                min_score: entry.min_score,
                score: submission.score,
                submitted_at: convert_timestamp(
                    submission.submitted_at.as_deref(),
                    options.time_zone,
                )?,
                due_at: convert_timestamp(entry.due_at.as_deref(), options.time_zone)?,
                status: entry.status.unwrap_or_default(),
            });
        }
    }

    emit(
        on_progress,
        ReportProgress::ReportComplete { rows: rows.len() },
    );
    Ok(rows)
}

/// Current grade of every enrollment of `user`.
///
/// Enrollments whose course cannot be fetched (deleted, no access) are
/// skipped with a warning.
pub async fn enrollment_results_by_user(
    client: &CanvasClient,
    user: &User,
    on_progress: Option<&ProgressCallback>,
) -> Result<Vec<EnrollmentResultRow>> {
    let enrollments = client.get_enrollments_by_user(user.id, &[]).await?;
    let mut rows = Vec::with_capacity(enrollments.len());

    for enrollment in enrollments {
        let course = match client.get_course(enrollment.course_id).await {
            Ok(course) => course,
            Err(err @ (CanvasError::NotFound { .. } | CanvasError::UpstreamStatus { .. })) => {
                let reason = short_error_message(&err);
                warn!(
                    course_id = enrollment.course_id,
                    "Skipping enrollment: {reason}"
                );
                emit(
                    on_progress,
                    ReportProgress::EnrollmentSkipped {
                        course_id: enrollment.course_id,
                        reason,
                    },
                );
                continue;
            }
            Err(err) => return Err(err),
        };

        let student_id = enrollment
            .user
            .sis_user_id
            .filter(|id| !id.is_empty())
            .or_else(|| user.sis_user_id.clone())
            .unwrap_or_default();
        let student_name = if enrollment.user.name.is_empty() {
            user.name.clone()
        } else {
            enrollment.user.name
        };

        rows.push(EnrollmentResultRow {
            student_id,
            student_name,
            account: course.account_name().to_string(),
            course_name: course.name,
            course_status: course.workflow_state.unwrap_or_default(),
            current_grade: enrollment.grades.current_grade.unwrap_or_default(),
            current_score: enrollment.grades.current_score,
            grades_url: enrollment.grades.html_url.unwrap_or_default(),
        });
    }

    emit(
        on_progress,
        ReportProgress::ReportComplete { rows: rows.len() },
    );
    Ok(rows)
}
