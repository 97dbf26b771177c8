use std::error::Error;
use std::sync::Arc;

use gradeline::report::{assignment_results_by_user, enrollment_results_by_user};
use gradeline::{CanvasClient, RetryConfig, User};

use crate::commands::shared::{fetch, with_retry_policy};
use crate::config::Config;
use crate::export::write_rows;
use crate::progress::ProgressReporter;
use crate::{OutputOptions, RetryArgs, ZoneArgs};

async fn find_student(
    client: &CanvasClient,
    retry: Option<&RetryConfig>,
    sis_user_id: &str,
) -> Result<User, Box<dyn Error>> {
    let user = fetch(retry, || client.get_user_by_sis_id(sis_user_id)).await?;
    tracing::info!(user_id = user.id, name = %user.name, "Found student");
    Ok(user)
}

pub(crate) async fn handle_results(
    client: CanvasClient,
    config: &Config,
    sis_user_id: &str,
    zone: &ZoneArgs,
    retries: &RetryArgs,
    output: &OutputOptions,
) -> Result<(), Box<dyn Error>> {
    let options = config.report_options(None, zone.time_zone.as_deref())?;
    let (client, retry) = with_retry_policy(client, config, retries.retries);
    let user = find_student(&client, retry.as_ref(), sis_user_id).await?;

    let reporter = Arc::new(ProgressReporter::new());
    let on_progress = reporter.as_callback();
    let result = assignment_results_by_user(&client, &user, &options, Some(&on_progress)).await;
    reporter.finish();

    write_rows(&result?, output.format, output.output.as_deref())
}

pub(crate) async fn handle_enrollments(
    client: CanvasClient,
    config: &Config,
    sis_user_id: &str,
    retries: &RetryArgs,
    output: &OutputOptions,
) -> Result<(), Box<dyn Error>> {
    let (client, retry) = with_retry_policy(client, config, retries.retries);
    let user = find_student(&client, retry.as_ref(), sis_user_id).await?;

    let reporter = Arc::new(ProgressReporter::new());
    let on_progress = reporter.as_callback();
    let result = enrollment_results_by_user(&client, &user, Some(&on_progress)).await;
    reporter.finish();

    write_rows(&result?, output.format, output.output.as_deref())
}
