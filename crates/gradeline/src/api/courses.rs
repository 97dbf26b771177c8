use super::client::CanvasClient;
use super::types::{Course, CourseEnrollmentType};
use crate::error::Result;

impl CanvasClient {
    /// Fetch one course with its account embedded.
    pub async fn get_course(&self, course_id: u64) -> Result<Course> {
        let url = self.url(&format!("/courses/{course_id}?include[]=account"));
        self.get_json(&url, &format!("course {course_id}")).await
    }

    /// All courses of an account in which someone holds `enrollment_type`.
    pub async fn get_courses_by_account(
        &self,
        account_id: u64,
        enrollment_type: CourseEnrollmentType,
    ) -> Result<Vec<Course>> {
        let url = self.first_page_url(
            &format!("/accounts/{account_id}/courses"),
            &format!(
                "&enrollment_type[]={}&include[]=account",
                enrollment_type.as_str()
            ),
        );
        self.collect(url).await
    }
}
