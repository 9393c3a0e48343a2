use crate::client::ApiClient;
use crate::error::ApiResult;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct DerivedColumn {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub alias: String,
    pub expression: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl ApiClient {
    pub async fn list_derived_columns(&self, dataset: &str) -> ApiResult<Vec<DerivedColumn>> {
        self.list(&format!("/1/derived_columns/{dataset}"), &[])
            .await
    }

    pub async fn get_derived_column(&self, dataset: &str, id: &str) -> ApiResult<DerivedColumn> {
        self.get(&format!("/1/derived_columns/{dataset}/{id}"))
            .await
    }

    pub async fn create_derived_column(
        &self,
        dataset: &str,
        column: &DerivedColumn,
    ) -> ApiResult<DerivedColumn> {
        self.create(&format!("/1/derived_columns/{dataset}"), column)
            .await
    }

    pub async fn update_derived_column(
        &self,
        dataset: &str,
        id: &str,
        column: &DerivedColumn,
    ) -> ApiResult<DerivedColumn> {
        self.update(&format!("/1/derived_columns/{dataset}/{id}"), column)
            .await
    }

    pub async fn delete_derived_column(&self, dataset: &str, id: &str) -> ApiResult<()> {
        self.delete(&format!("/1/derived_columns/{dataset}/{id}"))
            .await
    }
}
