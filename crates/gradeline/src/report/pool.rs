//! Bounded per-course worker pool for account-wide reports.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::api::types::Course;
use crate::error::{CanvasError, Result};

/// Run `job` once per course with at most `concurrency` in flight.
///
/// Rows come back in course order whatever the completion order.
/// `on_done(course, rows, completed, total)` fires as each course finishes.
/// The first failure aborts the courses still running.
pub(crate) async fn for_each_course<R, F, Fut>(
    courses: Vec<Course>,
    concurrency: usize,
    job: F,
    mut on_done: impl FnMut(&Course, usize, usize, usize),
) -> Result<Vec<R>>
where
    R: Send + 'static,
    F: Fn(Course) -> Fut,
    Fut: Future<Output = Result<Vec<R>>> + Send + 'static,
{
    let total = courses.len();
    let concurrency = std::cmp::max(1, concurrency);

    if concurrency == 1 || total <= 1 {
        let mut rows = Vec::new();
        for (index, course) in courses.into_iter().enumerate() {
            let course_rows = job(course.clone()).await?;
            on_done(&course, course_rows.len(), index + 1, total);
            rows.extend(course_rows);
        }
        return Ok(rows);
    }

    let semaphore = Arc::new(Semaphore::new(concurrency));
    let mut join_set: JoinSet<Result<(usize, Course, Vec<R>)>> = JoinSet::new();

    for (index, course) in courses.into_iter().enumerate() {
        let semaphore = Arc::clone(&semaphore);
        let work = job(course.clone());

        join_set.spawn(async move {
            let _permit = semaphore
                .acquire_owned()
                .await
                .map_err(|_| CanvasError::Internal("course pool closed".to_string()))?;
            Ok((index, course, work.await?))
        });
    }

    let mut slots: Vec<Option<Vec<R>>> = (0..total).map(|_| None).collect();
    let mut completed = 0usize;

    while let Some(joined) = join_set.join_next().await {
        let outcome = joined
            .map_err(|err| CanvasError::Internal(format!("course task failed: {err}")))
            .and_then(|outcome| outcome);

        match outcome {
            Ok((index, course, rows)) => {
                completed += 1;
                on_done(&course, rows.len(), completed, total);
                slots[index] = Some(rows);
            }
            Err(err) => {
                join_set.abort_all();
                return Err(err);
            }
        }
    }

    Ok(slots.into_iter().flatten().flatten().collect())
}
