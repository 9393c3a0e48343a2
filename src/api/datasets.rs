use crate::client::ApiClient;
use crate::error::ApiResult;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct DatasetSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delete_protected: Option<bool>,
}

/// Environment-scoped; addressed by slug rather than ID.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Dataset {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settings: Option<DatasetSettings>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expand_json_depth: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub regular_columns_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_written_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

impl ApiClient {
    pub async fn list_datasets(&self) -> ApiResult<Vec<Dataset>> {
        self.list("/1/datasets", &[]).await
    }

    pub async fn get_dataset(&self, slug: &str) -> ApiResult<Dataset> {
        self.get(&format!("/1/datasets/{slug}")).await
    }

    pub async fn create_dataset(&self, dataset: &Dataset) -> ApiResult<Dataset> {
        self.create("/1/datasets", dataset).await
    }

    pub async fn update_dataset(&self, slug: &str, dataset: &Dataset) -> ApiResult<Dataset> {
        self.update(&format!("/1/datasets/{slug}"), dataset).await
    }

    pub async fn delete_dataset(&self, slug: &str) -> ApiResult<()> {
        self.delete(&format!("/1/datasets/{slug}")).await
    }
}
