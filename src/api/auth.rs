use crate::client::{ApiClient, AuthScheme};
use crate::error::ApiResult;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AuthResponse {
    #[serde(default)]
    pub id: String,
    #[serde(rename = "type", default)]
    pub key_type: String,
    #[serde(default)]
    pub api_key_access: ApiKeyAccess,
    #[serde(default)]
    pub environment: Environment,
    #[serde(default)]
    pub team: Team,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ApiKeyAccess {
    pub events: bool,
    pub markers: bool,
    pub triggers: bool,
    pub boards: bool,
    pub queries: bool,
    pub columns: bool,
    #[serde(rename = "createDatasets")]
    pub create_datasets: bool,
    pub slos: bool,
    pub recipients: bool,
    #[serde(rename = "privateBoards")]
    pub private_boards: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Environment {
    pub name: String,
    pub slug: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Team {
    pub name: String,
    pub slug: String,
}

/// `/2/auth` answers in JSON:API form; the document is passed through
/// untouched apart from the top-level split.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthV2Response {
    pub data: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub included: Option<Value>,
}

impl ApiClient {
    pub async fn get_auth(&self) -> ApiResult<AuthResponse> {
        self.get("/1/auth").await
    }

    /// Management-key introspection; uses the bearer scheme.
    pub async fn get_auth_v2(&self) -> ApiResult<AuthV2Response> {
        self.get_with_auth("/2/auth", AuthScheme::Bearer).await
    }
}

#[cfg(test)]
mod tests {
    use crate::client::test_client;
    use httpmock::prelude::*;
    use serde_json::json;

    #[tokio::test]
    async fn classic_auth_reads_team_and_environment() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/1/auth")
                    .header("X-Honeycomb-Team", "test-key");
                then.status(200).json_body(json!({
                    "id": "key-1",
                    "type": "configuration",
                    "api_key_access": {"boards": true, "createDatasets": true},
                    "environment": {"name": "Production", "slug": "prod"},
                    "team": {"name": "Acme", "slug": "acme"}
                }));
            })
            .await;

        let auth = test_client(&server.base_url()).get_auth().await.unwrap();
        assert_eq!(auth.key_type, "configuration");
        assert!(auth.api_key_access.boards);
        assert!(auth.api_key_access.create_datasets);
        assert!(!auth.api_key_access.slos);
        assert_eq!(auth.team.slug, "acme");
        assert_eq!(auth.environment.slug, "prod");
    }

    #[tokio::test]
    async fn management_auth_uses_bearer() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/2/auth")
                    .header("Authorization", "Bearer test-key");
                then.status(200).json_body(json!({
                    "data": {"id": "hcxmk_1", "type": "api-keys", "attributes": {"name": "ops"}}
                }));
            })
            .await;

        let auth = test_client(&server.base_url()).get_auth_v2().await.unwrap();
        mock.assert_async().await;
        assert_eq!(auth.data["attributes"]["name"], "ops");
        assert!(auth.included.is_none());
    }
}
