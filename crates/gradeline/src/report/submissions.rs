use tracing::info;

use super::pool::for_each_course;
use super::progress::{ProgressCallback, ReportProgress, emit};
use super::types::{ReportOptions, UngradedSubmissionRow};
use crate::api::CanvasClient;
use crate::api::types::{AssignmentBucket, Course, CourseEnrollmentType};
use crate::dates::convert_timestamp;
use crate::error::Result;

/// Every submission without a grade across an account's student courses.
///
/// Courses run on a pool bounded by `options.concurrency`; rows keep
/// course order.
pub async fn ungraded_submissions_by_account(
    client: &CanvasClient,
    account_id: u64,
    options: &ReportOptions,
    on_progress: Option<&ProgressCallback>,
) -> Result<Vec<UngradedSubmissionRow>> {
    let account = client.get_account(account_id).await?;
    emit(
        on_progress,
        ReportProgress::FetchingCourses {
            account: account.name.clone(),
        },
    );

    let courses = client
        .get_courses_by_account(account.id, CourseEnrollmentType::Student)
        .await?;
    emit(
        on_progress,
        ReportProgress::CoursesFetched {
            account: account.name.clone(),
            total: courses.len(),
        },
    );

    let job = |course: Course| {
        let client = client.clone();
        let account = account.name.clone();
        let options = *options;
        async move { course_submissions(&client, &account, &course, &options).await }
    };
    let on_done = |course: &Course, rows, completed, total| {
        info!(
            course_id = course.id,
            count = rows,
            "Completed {} ({}/{})",
            course.name,
            completed,
            total
        );
        emit(
            on_progress,
            ReportProgress::CourseCompleted {
                course_id: course.id,
                course: course.name.clone(),
                rows,
                completed,
                total,
            },
        );
    };
    let rows = for_each_course(courses, options.concurrency, job, on_done).await?;

    emit(
        on_progress,
        ReportProgress::ReportComplete { rows: rows.len() },
    );
    Ok(rows)
}

async fn course_submissions(
    client: &CanvasClient,
    account: &str,
    course: &Course,
    options: &ReportOptions,
) -> Result<Vec<UngradedSubmissionRow>> {
    let assignments = client
        .get_assignments_by_course(course.id, AssignmentBucket::Ungraded)
        .await?;

    let mut rows = Vec::new();
    for assignment in &assignments {
        let due_at = convert_timestamp(assignment.due_at.as_deref(), options.time_zone)?;
        let submissions = client.get_submissions(course.id, assignment.id).await?;

        for submission in submissions.into_iter().filter(|s| s.is_ungraded()) {
            let user = submission.user.unwrap_or_default();
            rows.push(UngradedSubmissionRow {
                submission_id: submission.id,
                account: account.to_string(),
                course_name: course.name.clone(),
                student_id: user.sis_user_id.unwrap_or_default(),
                student_name: user.name,
                assignment: assignment.name.clone(),
                due_at: due_at.clone(),
                grade: submission.grade.unwrap_or_default(),
                submitted_at: convert_timestamp(
                    submission.submitted_at.as_deref(),
                    options.time_zone,
                )?,
                graded_at: convert_timestamp(submission.graded_at.as_deref(), options.time_zone)?,
                attempt: submission.attempt,
                late: submission.late,
                excused: submission.excused.unwrap_or(false),
                preview_url: submission.preview_url.unwrap_or_default(),
            });
        }
    }

    Ok(rows)
}
