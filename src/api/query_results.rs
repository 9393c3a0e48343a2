use crate::client::{ApiClient, AuthScheme};
use crate::error::ApiResult;
use crate::poller::ResultSource;
use reqwest::Method;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// One execution of a saved query. Created incomplete; the server flips
/// `complete` once the data is ready.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct QueryResult {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub complete: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub links: Option<Map<String, Value>>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub data: QueryData,
}

/// Rows are grouped by breakdown under `results[].data`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct QueryData {
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub series: Vec<Map<String, Value>>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub results: Vec<Map<String, Value>>,
}

// Pending results may carry `null` where data will later appear.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl QueryResult {
    pub fn is_empty(&self) -> bool {
        self.data.results.is_empty()
    }
}

#[derive(Debug, Serialize)]
struct CreateQueryResult<'a> {
    query_id: &'a str,
}

impl ApiClient {
    /// Starts executing a saved query.
    pub async fn create_query_result(&self, dataset: &str, query_id: &str) -> ApiResult<QueryResult> {
        self.request_json(
            Method::POST,
            &format!("/1/query_results/{dataset}"),
            &[],
            Some(&CreateQueryResult { query_id }),
            AuthScheme::Team,
        )
        .await
    }

    pub async fn get_query_result(&self, dataset: &str, result_id: &str) -> ApiResult<QueryResult> {
        self.get(&format!("/1/query_results/{dataset}/{result_id}"))
            .await
    }
}

/// Polls query results of one dataset over HTTP.
#[derive(Debug)]
pub struct DatasetResults<'a> {
    pub client: &'a ApiClient,
    pub dataset: &'a str,
}

impl ResultSource for DatasetResults<'_> {
    async fn fetch(&self, result_id: &str) -> ApiResult<QueryResult> {
        self.client.get_query_result(self.dataset, result_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::test_client;
    use httpmock::prelude::*;
    use serde_json::json;

    #[test]
    fn null_data_decodes_as_pending_and_empty() {
        let result: QueryResult =
            serde_json::from_str(r#"{"id":"r-1","complete":false,"data":null}"#).unwrap();
        assert_eq!(result.id, "r-1");
        assert!(!result.complete);
        assert!(result.is_empty());

        let result: QueryResult = serde_json::from_str(
            r#"{"id":"r-2","complete":true,"data":{"series":null,"results":null}}"#,
        )
        .unwrap();
        assert!(result.complete);
        assert!(result.is_empty());
    }

    #[tokio::test]
    async fn submit_posts_query_id() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/1/query_results/api")
                    .json_body(json!({"query_id": "q-1"}));
                then.status(201)
                    .json_body(json!({"id": "r-1", "complete": false, "query_id": "q-1"}));
            })
            .await;

        let result = test_client(&server.base_url())
            .create_query_result("api", "q-1")
            .await
            .unwrap();
        mock.assert_async().await;
        assert_eq!(result.id, "r-1");
        assert!(!result.complete);
        assert!(result.is_empty());
    }

    #[tokio::test]
    async fn completed_result_exposes_grouped_rows() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/1/query_results/api/r-1");
                then.status(200).json_body(json!({
                    "id": "r-1",
                    "complete": true,
                    "data": {"results": [{"data": {"COUNT": 42, "service.name": "api"}}]},
                    "links": {"query_url": "https://ui.honeycomb.io/acme/q/r-1"}
                }));
            })
            .await;

        let client = test_client(&server.base_url());
        let source = DatasetResults {
            client: &client,
            dataset: "api",
        };
        let result = source.fetch("r-1").await.unwrap();
        assert!(result.complete);
        assert!(!result.is_empty());
        assert_eq!(result.data.results[0]["data"]["COUNT"], 42);
    }
}
