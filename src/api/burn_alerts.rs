use crate::client::ApiClient;
use crate::error::ApiResult;
use serde::{Deserialize, Serialize};

pub const EXHAUSTION_TIME: &str = "exhaustion_time";
pub const BUDGET_RATE: &str = "budget_rate";

/// Which fields are meaningful depends on `alert_type`: `exhaustion_minutes`
/// for `exhaustion_time`, the two `budget_rate_*` fields for `budget_rate`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct BurnAlert {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alert_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub triggered: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exhaustion_minutes: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget_rate_window_minutes: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget_rate_decrease_threshold_per_million: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slo: Option<BurnAlertSlo>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub recipients: Vec<NotificationRecipient>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BurnAlertSlo {
    pub id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct NotificationRecipient {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub recipient_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<RecipientDetails>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct RecipientDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pagerduty_severity: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub variables: Vec<WebhookVariable>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WebhookVariable {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl ApiClient {
    pub async fn list_burn_alerts(&self, dataset: &str, slo_id: &str) -> ApiResult<Vec<BurnAlert>> {
        self.list(
            &format!("/1/burn_alerts/{dataset}"),
            &[("slo_id", slo_id.to_string())],
        )
        .await
    }

    pub async fn get_burn_alert(&self, dataset: &str, id: &str) -> ApiResult<BurnAlert> {
        self.get(&format!("/1/burn_alerts/{dataset}/{id}")).await
    }

    pub async fn create_burn_alert(&self, dataset: &str, alert: &BurnAlert) -> ApiResult<BurnAlert> {
        self.create(&format!("/1/burn_alerts/{dataset}"), alert)
            .await
    }

    pub async fn update_burn_alert(
        &self,
        dataset: &str,
        id: &str,
        alert: &BurnAlert,
    ) -> ApiResult<BurnAlert> {
        self.update(&format!("/1/burn_alerts/{dataset}/{id}"), alert)
            .await
    }

    pub async fn delete_burn_alert(&self, dataset: &str, id: &str) -> ApiResult<()> {
        self.delete(&format!("/1/burn_alerts/{dataset}/{id}")).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::test_client;
    use httpmock::prelude::*;
    use serde_json::json;

    #[tokio::test]
    async fn list_passes_slo_id_as_query_param() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/1/burn_alerts/api")
                    .query_param("slo_id", "slo-9");
                then.status(200).json_body(json!([
                    {"id": "ba-1", "alert_type": "exhaustion_time", "exhaustion_minutes": 60}
                ]));
            })
            .await;

        let alerts = test_client(&server.base_url())
            .list_burn_alerts("api", "slo-9")
            .await
            .unwrap();
        mock.assert_async().await;
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].exhaustion_minutes, Some(60));
    }

    #[test]
    fn budget_rate_alert_omits_exhaustion_fields() {
        let alert = BurnAlert {
            alert_type: Some(BUDGET_RATE.into()),
            budget_rate_window_minutes: Some(60),
            budget_rate_decrease_threshold_per_million: Some(10_000),
            slo: Some(BurnAlertSlo { id: "slo-1".into() }),
            recipients: vec![NotificationRecipient {
                recipient_type: Some("email".into()),
                target: Some("oncall@example.com".into()),
                ..NotificationRecipient::default()
            }],
            ..BurnAlert::default()
        };
        let value = serde_json::to_value(&alert).unwrap();
        assert!(value.get("exhaustion_minutes").is_none());
        assert_eq!(value["budget_rate_window_minutes"], 60);
        assert_eq!(value["recipients"][0]["type"], "email");
    }
}
