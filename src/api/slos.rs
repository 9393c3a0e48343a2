use super::Tag;
use crate::client::ApiClient;
use crate::error::ApiResult;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Slo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub sli: Sli,
    pub time_period_days: u32,
    pub target_per_million: u32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<Tag>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dataset_slugs: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reset_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,

    // Only present on `?detailed` responses.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compliance: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget_remaining: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub burn_rate: Option<f64>,
}

/// The SLI is a derived column, referenced by alias.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Sli {
    pub alias: String,
}

impl ApiClient {
    pub async fn list_slos(&self, dataset: &str) -> ApiResult<Vec<Slo>> {
        self.list(&format!("/1/slos/{dataset}"), &[]).await
    }

    pub async fn get_slo(&self, dataset: &str, id: &str, detailed: bool) -> ApiResult<Slo> {
        let path = if detailed {
            format!("/1/slos/{dataset}/{id}?detailed")
        } else {
            format!("/1/slos/{dataset}/{id}")
        };
        self.get(&path).await
    }

    pub async fn create_slo(&self, dataset: &str, slo: &Slo) -> ApiResult<Slo> {
        self.create(&format!("/1/slos/{dataset}"), slo).await
    }

    pub async fn update_slo(&self, dataset: &str, id: &str, slo: &Slo) -> ApiResult<Slo> {
        self.update(&format!("/1/slos/{dataset}/{id}"), slo).await
    }

    pub async fn delete_slo(&self, dataset: &str, id: &str) -> ApiResult<()> {
        self.delete(&format!("/1/slos/{dataset}/{id}")).await
    }
}
