use url::Url;

use super::client::CanvasClient;
use super::types::User;
use crate::error::{CanvasError, Result};

impl CanvasClient {
    pub async fn get_user(&self, user_id: u64) -> Result<User> {
        let url = self.url(&format!("/users/{user_id}"));
        self.get_json(&url, &format!("user {user_id}")).await
    }

    /// Look a user up by externally-assigned (SIS) id.
    pub async fn get_user_by_sis_id(&self, sis_user_id: &str) -> Result<User> {
        let mut url =
            Url::parse(&self.url("/users")).map_err(|e| CanvasError::Config(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|()| CanvasError::Config(format!("cannot append to {}", self.base_url())))?
            .push(&format!("sis_user_id:{sis_user_id}"));

        self.get_json(url.as_str(), &format!("user with SIS id {sis_user_id}"))
            .await
    }
}
