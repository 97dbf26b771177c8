//! Plain listings: an account's courses and grading standards.

use std::error::Error;

use chrono_tz::Tz;
use gradeline::{
    CanvasClient, Course, CourseEnrollmentType, GradingContext, GradingStandard,
    convert_timestamp,
};
use serde::Serialize;

use crate::OutputOptions;
use crate::config::Config;
use crate::export::write_rows;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub(crate) struct CourseListing {
    #[serde(rename = "ID")]
    pub id: u64,
    #[serde(rename = "Course Name")]
    pub name: String,
    #[serde(rename = "Course Code")]
    pub code: String,
    #[serde(rename = "Qualification")]
    pub account: String,
    #[serde(rename = "State")]
    pub state: String,
    #[serde(rename = "Start")]
    pub start_at: String,
    #[serde(rename = "End")]
    pub end_at: String,
}

impl CourseListing {
    fn from_course(course: Course, tz: Tz) -> gradeline::error::Result<Self> {
        Ok(Self {
            id: course.id,
            account: course.account_name().to_string(),
            start_at: convert_timestamp(course.start_at.as_deref(), tz)?,
            end_at: convert_timestamp(course.end_at.as_deref(), tz)?,
            name: course.name,
            code: course.course_code.unwrap_or_default(),
            state: course.workflow_state.unwrap_or_default(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub(crate) struct GradingStandardListing {
    #[serde(rename = "ID")]
    pub id: u64,
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "Context")]
    pub context: String,
    /// Entries as `name >= value`, in scheme order.
    #[serde(rename = "Scheme")]
    pub scheme: String,
}

impl From<GradingStandard> for GradingStandardListing {
    fn from(standard: GradingStandard) -> Self {
        let context = match (standard.context_type, standard.context_id) {
            (Some(kind), Some(id)) => format!("{kind} {id}"),
            (Some(kind), None) => kind,
            _ => String::new(),
        };
        let scheme = standard
            .grading_scheme
            .iter()
            .map(|entry| format!("{} >= {}", entry.name, entry.value))
            .collect::<Vec<_>>()
            .join("; ");

        Self {
            id: standard.id,
            title: standard.title,
            context,
            scheme,
        }
    }
}

pub(crate) async fn handle_courses(
    client: CanvasClient,
    config: &Config,
    account_id: u64,
    enrollment_type: CourseEnrollmentType,
    output: &OutputOptions,
) -> Result<(), Box<dyn Error>> {
    let tz = config.report_options(None, None)?.time_zone;
    let courses = client
        .get_courses_by_account(account_id, enrollment_type)
        .await?;
    tracing::info!(account_id, %enrollment_type, count = courses.len(), "Fetched courses");

    let listings = courses
        .into_iter()
        .map(|course| CourseListing::from_course(course, tz))
        .collect::<gradeline::error::Result<Vec<_>>>()?;
    write_rows(&listings, output.format, output.output.as_deref())
}

pub(crate) async fn handle_grading_standards(
    client: CanvasClient,
    account: Option<u64>,
    course: Option<u64>,
    output: &OutputOptions,
) -> Result<(), Box<dyn Error>> {
    let context = match (account, course) {
        (_, Some(course_id)) => GradingContext::Course(course_id),
        (Some(account_id), None) => GradingContext::Account(account_id),
        (None, None) => return Err("either --account or --course is required".into()),
    };

    let standards = client.get_grading_standards(context).await?;
    tracing::info!(?context, count = standards.len(), "Fetched grading standards");

    let listings: Vec<GradingStandardListing> = standards
        .into_iter()
        .map(GradingStandardListing::from)
        .collect();
    write_rows(&listings, output.format, output.output.as_deref())
}
