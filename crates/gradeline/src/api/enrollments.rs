use super::client::CanvasClient;
use super::types::{Enrollment, EnrollmentState, EnrollmentType};
use crate::error::Result;

impl CanvasClient {
    /// Enrollments of a section, filtered by role. An empty filter returns
    /// every role.
    pub async fn get_enrollments_by_section(
        &self,
        section_id: u64,
        types: &[EnrollmentType],
    ) -> Result<Vec<Enrollment>> {
        let query: String = types
            .iter()
            .map(|t| format!("&type[]={}", t.as_str()))
            .collect();
        let url = self.first_page_url(&format!("/sections/{section_id}/enrollments"), &query);
        self.collect(url).await
    }

    /// Enrollments of a user, filtered by state. An empty filter leaves the
    /// server default in place.
    pub async fn get_enrollments_by_user(
        &self,
        user_id: u64,
        states: &[EnrollmentState],
    ) -> Result<Vec<Enrollment>> {
        let query: String = states
            .iter()
            .map(|s| format!("&state[]={}", s.as_str()))
            .collect();
        let url = self.first_page_url(&format!("/users/{user_id}/enrollments"), &query);
        self.collect(url).await
    }
}
