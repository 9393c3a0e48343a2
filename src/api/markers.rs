use crate::client::ApiClient;
use crate::error::ApiResult;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Marker {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Unix seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub marker_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl ApiClient {
    pub async fn list_markers(&self, dataset: &str) -> ApiResult<Vec<Marker>> {
        self.list(&format!("/1/markers/{dataset}"), &[]).await
    }

    pub async fn create_marker(&self, dataset: &str, marker: &Marker) -> ApiResult<Marker> {
        self.create(&format!("/1/markers/{dataset}"), marker).await
    }

    pub async fn update_marker(&self, dataset: &str, id: &str, marker: &Marker) -> ApiResult<Marker> {
        self.update(&format!("/1/markers/{dataset}/{id}"), marker)
            .await
    }

    pub async fn delete_marker(&self, dataset: &str, id: &str) -> ApiResult<()> {
        self.delete(&format!("/1/markers/{dataset}/{id}")).await
    }
}
