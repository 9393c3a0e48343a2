use crate::client::ApiClient;
use crate::error::ApiResult;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A query specification. Queries are immutable once created; the server
/// hands back an ID that query results and annotations refer to.
///
/// The time window is either `time_range` alone, `start_time` + `end_time`,
/// or `time_range` anchored by one of the two.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Query {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub breakdowns: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub calculations: Vec<Calculation>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub filters: Vec<QueryFilter>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter_combination: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub granularity: Option<u64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub orders: Vec<Order>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_range: Option<u64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub havings: Vec<Having>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Calculation {
    pub op: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QueryFilter {
    pub column: String,
    pub op: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Order {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub op: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Having {
    pub calculate_op: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column: Option<String>,
    pub op: String,
    pub value: Value,
}

impl ApiClient {
    pub async fn get_query(&self, dataset: &str, query_id: &str) -> ApiResult<Query> {
        self.get(&format!("/1/queries/{dataset}/{query_id}")).await
    }

    pub async fn create_query(&self, dataset: &str, query: &Query) -> ApiResult<Query> {
        self.create(&format!("/1/queries/{dataset}"), query).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::test_client;
    use httpmock::prelude::*;
    use serde_json::json;

    #[tokio::test]
    async fn create_sends_only_populated_clauses() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST).path("/1/queries/api").json_body(json!({
                    "calculations": [{"op": "COUNT"}, {"op": "P99", "column": "duration_ms"}],
                    "breakdowns": ["service.name"],
                    "filters": [{"column": "status_code", "op": ">=", "value": 500}],
                    "time_range": 7200
                }));
                then.status(200).json_body(json!({
                    "id": "q-1",
                    "calculations": [{"op": "COUNT"}, {"op": "P99", "column": "duration_ms"}],
                    "breakdowns": ["service.name"],
                    "filters": [{"column": "status_code", "op": ">=", "value": 500}],
                    "time_range": 7200
                }));
            })
            .await;

        let query = Query {
            calculations: vec![
                Calculation {
                    op: "COUNT".into(),
                    column: None,
                    name: None,
                },
                Calculation {
                    op: "P99".into(),
                    column: Some("duration_ms".into()),
                    name: None,
                },
            ],
            breakdowns: vec!["service.name".into()],
            filters: vec![QueryFilter {
                column: "status_code".into(),
                op: ">=".into(),
                value: Some(json!(500)),
            }],
            time_range: Some(7200),
            ..Query::default()
        };
        let created = test_client(&server.base_url())
            .create_query("api", &query)
            .await
            .unwrap();
        mock.assert_async().await;
        assert_eq!(created.id.as_deref(), Some("q-1"));
        assert_eq!(created.calculations, query.calculations);
    }
}
