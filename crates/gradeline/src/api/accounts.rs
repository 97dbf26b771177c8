use super::client::CanvasClient;
use super::types::Account;
use crate::error::Result;

impl CanvasClient {
    pub async fn get_account(&self, account_id: u64) -> Result<Account> {
        let url = self.url(&format!("/accounts/{account_id}"));
        self.get_json(&url, &format!("account {account_id}")).await
    }
}

#[cfg(test)]
mod tests {
    use crate::api::client::test_support::{BASE, client_with};
    use crate::error::CanvasError;
    use crate::http::MockTransport;
    use serde_json::json;

    #[tokio::test]
    async fn get_account_decodes_single_object() {
        let transport = MockTransport::new();
        transport.push_json(
            format!("{BASE}/accounts/111"),
            json!({"id": 111, "name": "Diploma of Business", "parent_account_id": 1, "root_account_id": 1}),
            None,
        );

        let account = client_with(&transport)
            .get_account(111)
            .await
            .expect("account");
        assert_eq!(account.name, "Diploma of Business");
        assert_eq!(account.parent_account_id, Some(1));
    }

    #[tokio::test]
    async fn get_account_missing_is_not_found() {
        let transport = MockTransport::new();
        transport.push_status(format!("{BASE}/accounts/5"), 404);

        let err = client_with(&transport)
            .get_account(5)
            .await
            .expect_err("missing");
        assert!(matches!(err, CanvasError::NotFound { ref resource } if resource == "account 5"));
    }
}
