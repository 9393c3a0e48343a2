use crate::client::ApiClient;
use crate::error::ApiResult;
use serde::{Deserialize, Serialize};

/// Colour assigned to every marker of a given type.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MarkerSetting {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub marker_type: String,
    pub color: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl MarkerSetting {
    pub fn new(marker_type: String, color: String) -> Self {
        Self {
            id: None,
            marker_type,
            color,
            created_at: None,
            updated_at: None,
        }
    }
}

impl ApiClient {
    pub async fn list_marker_settings(&self, dataset: &str) -> ApiResult<Vec<MarkerSetting>> {
        self.list(&format!("/1/marker_settings/{dataset}"), &[])
            .await
    }

    pub async fn create_marker_setting(
        &self,
        dataset: &str,
        setting: &MarkerSetting,
    ) -> ApiResult<MarkerSetting> {
        self.create(&format!("/1/marker_settings/{dataset}"), setting)
            .await
    }

    pub async fn update_marker_setting(
        &self,
        dataset: &str,
        id: &str,
        setting: &MarkerSetting,
    ) -> ApiResult<MarkerSetting> {
        self.update(&format!("/1/marker_settings/{dataset}/{id}"), setting)
            .await
    }

    pub async fn delete_marker_setting(&self, dataset: &str, id: &str) -> ApiResult<()> {
        self.delete(&format!("/1/marker_settings/{dataset}/{id}"))
            .await
    }
}
