use super::client::CanvasClient;
use super::types::Submission;
use crate::error::Result;

impl CanvasClient {
    /// Every submission of an assignment, with the submitting user embedded.
    pub async fn get_submissions(
        &self,
        course_id: u64,
        assignment_id: u64,
    ) -> Result<Vec<Submission>> {
        let url = self.first_page_url(
            &format!("/courses/{course_id}/assignments/{assignment_id}/submissions"),
            "&include[]=user",
        );
        self.collect(url).await
    }
}
