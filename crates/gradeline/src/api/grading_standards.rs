use super::client::CanvasClient;
use super::types::{GradingContext, GradingStandard};
use crate::error::Result;

impl CanvasClient {
    pub async fn get_grading_standards(
        &self,
        context: GradingContext,
    ) -> Result<Vec<GradingStandard>> {
        let path = match context {
            GradingContext::Account(id) => format!("/accounts/{id}/grading_standards"),
            GradingContext::Course(id) => format!("/courses/{id}/grading_standards"),
        };
        let url = self.first_page_url(&path, "");
        self.collect(url).await
    }
}
