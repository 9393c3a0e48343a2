use crate::client::ApiClient;
use crate::error::ApiResult;
use serde::{Deserialize, Serialize};

/// On update only the fields that are `Some` are sent; `key_name` is then
/// left empty and skipped.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Column {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub key_name: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub column_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hidden: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_written: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl ApiClient {
    pub async fn list_columns(&self, dataset: &str) -> ApiResult<Vec<Column>> {
        self.list(&format!("/1/columns/{dataset}"), &[]).await
    }

    pub async fn get_column(&self, dataset: &str, id: &str) -> ApiResult<Column> {
        self.get(&format!("/1/columns/{dataset}/{id}")).await
    }

    pub async fn create_column(&self, dataset: &str, column: &Column) -> ApiResult<Column> {
        self.create(&format!("/1/columns/{dataset}"), column).await
    }

    pub async fn update_column(&self, dataset: &str, id: &str, column: &Column) -> ApiResult<Column> {
        self.update(&format!("/1/columns/{dataset}/{id}"), column)
            .await
    }

    pub async fn delete_column(&self, dataset: &str, id: &str) -> ApiResult<()> {
        self.delete(&format!("/1/columns/{dataset}/{id}")).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::test_client;
    use httpmock::prelude::*;
    use serde_json::json;

    #[tokio::test]
    async fn partial_update_sends_only_given_fields() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(PUT)
                    .path("/1/columns/api/c-1")
                    .json_body(json!({"hidden": true}));
                then.status(200)
                    .json_body(json!({"id": "c-1", "key_name": "trace.parent_id", "hidden": true}));
            })
            .await;

        let update = Column {
            hidden: Some(true),
            ..Column::default()
        };
        let updated = test_client(&server.base_url())
            .update_column("api", "c-1", &update)
            .await
            .unwrap();
        mock.assert_async().await;
        assert_eq!(updated.key_name, "trace.parent_id");
    }

    #[tokio::test]
    async fn empty_dataset_lists_no_columns() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/1/columns/__all__");
                then.status(200).json_body(json!([]));
            })
            .await;

        let cols = test_client(&server.base_url())
            .list_columns("__all__")
            .await
            .unwrap();
        assert!(cols.is_empty());
    }
}
