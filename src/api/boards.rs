use super::Tag;
use crate::client::ApiClient;
use crate::error::ApiResult;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Boards are environment-scoped; their views hang off the board ID.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Board {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "type", default)]
    pub board_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub links: Option<BoardLinks>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub panels: Vec<BoardPanel>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<Tag>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub preset_filters: Vec<PresetFilter>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout_generation: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BoardLinks {
    pub board_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BoardPanel {
    #[serde(rename = "type")]
    pub panel_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query_panel: Option<QueryPanel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slo_panel: Option<SloPanel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_panel: Option<TextPanel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
}

impl BoardPanel {
    pub fn query(query_id: String, annotation_id: Option<String>, style: String) -> Self {
        Self {
            panel_type: "query".into(),
            query_panel: Some(QueryPanel {
                query_id,
                query_annotation_id: annotation_id,
                query_style: Some(style),
            }),
            slo_panel: None,
            text_panel: None,
            position: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct QueryPanel {
    pub query_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query_annotation_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query_style: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SloPanel {
    pub slo_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TextPanel {
    pub content: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Position {
    pub x_coordinate: i64,
    pub y_coordinate: i64,
    pub height: i64,
    pub width: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PresetFilter {
    pub column: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BoardView {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub filters: Vec<BoardViewFilter>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BoardViewFilter {
    pub column: String,
    pub operation: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
}

impl ApiClient {
    pub async fn list_boards(&self) -> ApiResult<Vec<Board>> {
        self.list("/1/boards", &[]).await
    }

    pub async fn get_board(&self, board_id: &str) -> ApiResult<Board> {
        self.get(&format!("/1/boards/{board_id}")).await
    }

    pub async fn create_board(&self, board: &Board) -> ApiResult<Board> {
        self.create("/1/boards", board).await
    }

    pub async fn update_board(&self, board_id: &str, board: &Board) -> ApiResult<Board> {
        self.update(&format!("/1/boards/{board_id}"), board).await
    }

    pub async fn delete_board(&self, board_id: &str) -> ApiResult<()> {
        self.delete(&format!("/1/boards/{board_id}")).await
    }

    pub async fn list_board_views(&self, board_id: &str) -> ApiResult<Vec<BoardView>> {
        self.list(&format!("/1/boards/{board_id}/views"), &[]).await
    }

    pub async fn get_board_view(&self, board_id: &str, view_id: &str) -> ApiResult<BoardView> {
        self.get(&format!("/1/boards/{board_id}/views/{view_id}"))
            .await
    }

    pub async fn create_board_view(&self, board_id: &str, view: &BoardView) -> ApiResult<BoardView> {
        self.create(&format!("/1/boards/{board_id}/views"), view)
            .await
    }

    pub async fn update_board_view(
        &self,
        board_id: &str,
        view_id: &str,
        view: &BoardView,
    ) -> ApiResult<BoardView> {
        self.update(&format!("/1/boards/{board_id}/views/{view_id}"), view)
            .await
    }

    pub async fn delete_board_view(&self, board_id: &str, view_id: &str) -> ApiResult<()> {
        self.delete(&format!("/1/boards/{board_id}/views/{view_id}"))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::test_client;
    use httpmock::prelude::*;
    use serde_json::json;

    #[tokio::test]
    async fn create_then_get_round_trips_caller_fields() {
        let server = MockServer::start_async().await;
        let create = server
            .mock_async(|when, then| {
                when.method(POST).path("/1/boards").json_body(json!({
                    "name": "latency",
                    "description": "p99 by service",
                    "type": "flexible"
                }));
                then.status(201).json_body(json!({
                    "id": "b-1",
                    "name": "latency",
                    "description": "p99 by service",
                    "type": "flexible",
                    "links": {"board_url": "https://ui.honeycomb.io/acme/board/b-1"}
                }));
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/1/boards/b-1");
                then.status(200).json_body(json!({
                    "id": "b-1",
                    "name": "latency",
                    "description": "p99 by service",
                    "type": "flexible",
                    "panels": []
                }));
            })
            .await;

        let client = test_client(&server.base_url());
        let sent = Board {
            name: "latency".into(),
            description: Some("p99 by service".into()),
            board_type: "flexible".into(),
            ..Board::default()
        };
        let created = client.create_board(&sent).await.unwrap();
        create.assert_async().await;

        let id = created.id.clone().unwrap();
        let fetched = client.get_board(&id).await.unwrap();
        assert_eq!(fetched.name, sent.name);
        assert_eq!(fetched.description, sent.description);
        assert_eq!(fetched.board_type, sent.board_type);
        assert!(created.links.is_some());
    }

    #[tokio::test]
    async fn views_are_nested_under_the_board() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST).path("/1/boards/b-1/views").json_body(json!({
                    "name": "errors",
                    "filters": [{"column": "error", "operation": "exists"}]
                }));
                then.status(201).json_body(json!({
                    "id": "v-1",
                    "name": "errors",
                    "filters": [{"column": "error", "operation": "exists"}]
                }));
            })
            .await;

        let view = BoardView {
            id: None,
            name: "errors".into(),
            filters: vec![BoardViewFilter {
                column: "error".into(),
                operation: "exists".into(),
                value: None,
            }],
        };
        let created = test_client(&server.base_url())
            .create_board_view("b-1", &view)
            .await
            .unwrap();
        mock.assert_async().await;
        assert_eq!(created.id.as_deref(), Some("v-1"));
    }

    #[test]
    fn query_panel_serializes_without_empty_fields() {
        let panel = BoardPanel::query("q-1".into(), None, "graph".into());
        let value = serde_json::to_value(&panel).unwrap();
        assert_eq!(
            value,
            json!({"type": "query", "query_panel": {"query_id": "q-1", "query_style": "graph"}})
        );
    }
}
