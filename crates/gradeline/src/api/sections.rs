use super::client::CanvasClient;
use super::types::Section;
use crate::error::Result;

impl CanvasClient {
    pub async fn get_section(&self, section_id: u64) -> Result<Section> {
        let url = self.url(&format!("/sections/{section_id}"));
        self.get_json(&url, &format!("section {section_id}")).await
    }

    pub async fn get_sections_by_course(&self, course_id: u64) -> Result<Vec<Section>> {
        let url = self.first_page_url(
            &format!("/courses/{course_id}/sections"),
            "&include[]=total_students",
        );
        self.collect(url).await
    }
}
