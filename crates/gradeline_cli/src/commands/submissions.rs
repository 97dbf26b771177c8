use std::error::Error;
use std::sync::Arc;

use gradeline::CanvasClient;
use gradeline::report::ungraded_submissions_by_account;

use crate::commands::shared::with_retry_policy;
use crate::config::Config;
use crate::export::write_rows;
use crate::progress::ProgressReporter;
use crate::{OutputOptions, ReportArgs};

pub(crate) async fn handle_submissions(
    client: CanvasClient,
    config: &Config,
    account_id: u64,
    report: &ReportArgs,
    output: &OutputOptions,
) -> Result<(), Box<dyn Error>> {
    let options = config.report_options(report.concurrency, report.zone.time_zone.as_deref())?;
    let (client, _) = with_retry_policy(client, config, report.retry.retries);

    let reporter = Arc::new(ProgressReporter::new());
    let on_progress = reporter.as_callback();
    let result =
        ungraded_submissions_by_account(&client, account_id, &options, Some(&on_progress)).await;
    reporter.finish();

    write_rows(&result?, output.format, output.output.as_deref())
}
