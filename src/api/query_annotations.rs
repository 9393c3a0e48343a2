use crate::client::ApiClient;
use crate::error::ApiResult;
use serde::{Deserialize, Serialize};

/// A name and description attached to a saved query.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct QueryAnnotation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub query_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl ApiClient {
    pub async fn list_query_annotations(&self, dataset: &str) -> ApiResult<Vec<QueryAnnotation>> {
        self.list(&format!("/1/query_annotations/{dataset}"), &[])
            .await
    }

    pub async fn get_query_annotation(&self, dataset: &str, id: &str) -> ApiResult<QueryAnnotation> {
        self.get(&format!("/1/query_annotations/{dataset}/{id}"))
            .await
    }

    pub async fn create_query_annotation(
        &self,
        dataset: &str,
        annotation: &QueryAnnotation,
    ) -> ApiResult<QueryAnnotation> {
        self.create(&format!("/1/query_annotations/{dataset}"), annotation)
            .await
    }

    pub async fn update_query_annotation(
        &self,
        dataset: &str,
        id: &str,
        annotation: &QueryAnnotation,
    ) -> ApiResult<QueryAnnotation> {
        self.update(&format!("/1/query_annotations/{dataset}/{id}"), annotation)
            .await
    }

    pub async fn delete_query_annotation(&self, dataset: &str, id: &str) -> ApiResult<()> {
        self.delete(&format!("/1/query_annotations/{dataset}/{id}"))
            .await
    }
}
