use std::error::Error;
use std::sync::Arc;

use gradeline::{AggregationRun, AssignmentBucket, AssignmentReportRow, CanvasClient};

use crate::commands::shared::{fetch, with_retry_policy};
use crate::config::Config;
use crate::export::{campus_paths, file_stamp, split_by_campus, write_rows};
use crate::progress::ProgressReporter;
use crate::{OutputOptions, ReportArgs};

/// What the assignment report covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum AssignmentsTarget {
    Account(u64),
    Course(u64),
}

impl AssignmentsTarget {
    pub(crate) fn from_args(account: Option<u64>, course: Option<u64>) -> Result<Self, String> {
        match (account, course) {
            (_, Some(course)) => Ok(Self::Course(course)),
            (Some(account), None) => Ok(Self::Account(account)),
            (None, None) => Err("either --account or --course is required".to_string()),
        }
    }
}

pub(crate) async fn handle_assignments(
    client: CanvasClient,
    config: &Config,
    target: AssignmentsTarget,
    bucket: AssignmentBucket,
    split_campus: bool,
    report: &ReportArgs,
    output: &OutputOptions,
) -> Result<(), Box<dyn Error>> {
    let options = config.report_options(report.concurrency, report.zone.time_zone.as_deref())?;
    let (client, retry) = with_retry_policy(client, config, report.retry.retries);

    tracing::info!(
        ?target,
        %bucket,
        concurrency = options.concurrency,
        date_overrides = options.date_overrides.as_str(),
        "Building assignment report"
    );

    let reporter = Arc::new(ProgressReporter::new());
    let run = AggregationRun::new(client.clone(), options).with_progress(reporter.as_callback());

    let result = match target {
        AssignmentsTarget::Account(account_id) => {
            run.assignments_for_account(account_id, bucket).await
        }
        AssignmentsTarget::Course(course_id) => {
            match fetch(retry.as_ref(), || client.get_course(course_id)).await {
                Ok(course) => run.assignments_for_course(&course, bucket).await,
                Err(e) => Err(e),
            }
        }
    };
    reporter.finish();
    let rows = result?;

    tracing::debug!(sections = run.cache().len(), "Sections resolved");

    if split_campus {
        write_split(rows, target, output)
    } else {
        write_rows(&rows, output.format, output.output.as_deref())
    }
}

fn write_split(
    rows: Vec<AssignmentReportRow>,
    target: AssignmentsTarget,
    output: &OutputOptions,
) -> Result<(), Box<dyn Error>> {
    let label = rows
        .first()
        .map(|row| row.account.clone())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| match target {
            AssignmentsTarget::Account(id) => format!("account-{id}"),
            AssignmentsTarget::Course(id) => format!("course-{id}"),
        });

    let (adelaide, perth) = split_by_campus(rows);
    let stamp = file_stamp();
    let (adelaide_path, perth_path) =
        campus_paths(output.output.as_deref(), &label, &stamp, output.format);

    write_rows(&adelaide, output.format, Some(&adelaide_path))?;
    write_rows(&perth, output.format, Some(&perth_path))?;

    eprintln!(
        "Wrote {} Adelaide rows to {} and {} Perth rows to {}",
        adelaide.len(),
        adelaide_path.display(),
        perth.len(),
        perth_path.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn course_takes_precedence_over_account() {
        assert_eq!(
            AssignmentsTarget::from_args(Some(1), None),
            Ok(AssignmentsTarget::Account(1))
        );
        assert_eq!(
            AssignmentsTarget::from_args(None, Some(2)),
            Ok(AssignmentsTarget::Course(2))
        );
        assert_eq!(
            AssignmentsTarget::from_args(Some(1), Some(2)),
            Ok(AssignmentsTarget::Course(2))
        );
        assert!(AssignmentsTarget::from_args(None, None).is_err());
    }
}
