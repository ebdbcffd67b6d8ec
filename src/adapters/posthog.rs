use crate::config::toml_config::PosthogConfig;
use crate::domain::model::{Dashboard, Insight};
use crate::domain::ports::AnalyticsStore;
use crate::utils::error::{CopilotError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

/// PostHog REST client. List endpoints are cursor-paginated; every page is
/// fetched before returning.
#[derive(Clone)]
pub struct PostHogClient {
    host: String,
    project_id: String,
    api_key: String,
    client: Client,
}

#[derive(Debug, Deserialize)]
struct Page {
    results: Vec<serde_json::Value>,
    #[serde(default)]
    next: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SharingSettings {
    #[serde(default)]
    enabled: bool,
    #[serde(default)]
    access_token: Option<String>,
}

impl PostHogClient {
    pub fn new(config: &PosthogConfig) -> Self {
        Self {
            host: config.host().trim_end_matches('/').to_string(),
            project_id: config.project_id.clone(),
            api_key: config.personal_api_key.clone(),
            client: Client::new(),
        }
    }

    async fn get_json(&self, url: &str) -> Result<reqwest::Response> {
        tracing::debug!("Making PostHog request to: {}", url);
        let response = self
            .client
            .get(url)
            .bearer_auth(&self.api_key)
            .header("Content-Type", "application/json")
            .send()
            .await?;

        let status = response.status();
        tracing::debug!("PostHog response status: {}", status);
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CopilotError::UpstreamError {
                service: "posthog",
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    /// Follow the `next` cursor until exhausted, concatenating result pages.
    async fn paginated(&self, base_url: String) -> Result<Vec<serde_json::Value>> {
        let mut all_results = Vec::new();
        let mut next_url = Some(base_url);

        while let Some(url) = next_url {
            let page: Page = self.get_json(&url).await?.json().await?;
            all_results.extend(page.results);
            next_url = page.next;
        }

        Ok(all_results)
    }

    async fn sharing_url(&self, resource: &str, id: i64) -> Result<Option<String>> {
        let url = format!(
            "{}/api/projects/{}/{}/{}/sharing/",
            self.host, self.project_id, resource, id
        );
        let settings: SharingSettings = self.get_json(&url).await?.json().await?;

        match settings.access_token {
            Some(token) if settings.enabled => {
                Ok(Some(format!("{}/embedded/{}", self.host, token)))
            }
            _ => Ok(None),
        }
    }
}

#[async_trait]
impl AnalyticsStore for PostHogClient {
    async fn dashboards(&self) -> Result<Vec<Dashboard>> {
        let url = format!("{}/api/projects/{}/dashboards", self.host, self.project_id);
        let results = self.paginated(url).await?;

        results
            .into_iter()
            .map(|value| serde_json::from_value(value).map_err(CopilotError::from))
            .collect()
    }

    async fn insights(&self) -> Result<Vec<Insight>> {
        let url = format!("{}/api/projects/{}/insights", self.host, self.project_id);
        let results = self.paginated(url).await?;

        results
            .into_iter()
            .map(|value| serde_json::from_value(value).map_err(CopilotError::from))
            .collect()
    }

    async fn insight_embed_url(&self, insight_id: i64) -> Result<Option<String>> {
        self.sharing_url("insights", insight_id).await
    }

    async fn dashboard_embed_url(&self, dashboard_id: i64) -> Result<Option<String>> {
        self.sharing_url("dashboards", dashboard_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    fn test_client(server: &MockServer) -> PostHogClient {
        PostHogClient::new(&PosthogConfig {
            host: Some(server.base_url()),
            project_id: "9270".to_string(),
            personal_api_key: "phx_test_key".to_string(),
        })
    }

    #[tokio::test]
    async fn test_insights_follow_pagination_cursor() {
        let server = MockServer::start();

        let second_page_url = server.url("/api/projects/9270/insights/page2");
        let second_page = server.mock(|when, then| {
            when.method(GET)
                .path("/api/projects/9270/insights/page2")
                .header("Authorization", "Bearer phx_test_key");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!({
                    "results": [
                        {"id": 3, "short_id": "c3", "name": "Retention", "description": "D7"}
                    ],
                    "next": null
                }));
        });
        let first_page = server.mock(|when, then| {
            when.method(GET)
                .path("/api/projects/9270/insights")
                .header("Authorization", "Bearer phx_test_key");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!({
                    "results": [
                        {"id": 1, "short_id": "a1", "name": "Signups", "description": "Weekly",
                         "dashboards": [7], "result": [{"count": 42}]},
                        {"id": 2, "short_id": "b2", "name": "Churn", "description": ""}
                    ],
                    "next": second_page_url
                }));
        });

        let insights = test_client(&server).insights().await.unwrap();

        first_page.assert();
        second_page.assert();
        assert_eq!(insights.len(), 3);
        assert_eq!(insights[0].id, 1);
        assert_eq!(insights[0].dashboards, vec![7]);
        assert_eq!(insights[2].name, "Retention");
    }

    #[tokio::test]
    async fn test_dashboards_tolerate_null_description() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/api/projects/9270/dashboards");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!({
                    "results": [{"id": 7, "name": "Growth", "description": null}],
                    "next": null
                }));
        });

        let dashboards = test_client(&server).dashboards().await.unwrap();
        assert_eq!(dashboards.len(), 1);
        assert_eq!(dashboards[0].name, "Growth");
        assert!(dashboards[0].description.is_none());
    }

    #[tokio::test]
    async fn test_non_success_status_is_an_upstream_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/api/projects/9270/insights");
            then.status(403).body("permission denied");
        });

        let err = test_client(&server).insights().await.unwrap_err();
        match err {
            CopilotError::UpstreamError {
                service,
                status,
                body,
            } => {
                assert_eq!(service, "posthog");
                assert_eq!(status, 403);
                assert!(body.contains("permission denied"));
            }
            other => panic!("expected UpstreamError, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_embed_url_requires_enabled_sharing_and_token() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/api/projects/9270/insights/1/sharing/");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!({"enabled": true, "access_token": "tok123"}));
        });
        server.mock(|when, then| {
            when.method(GET).path("/api/projects/9270/insights/2/sharing/");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!({"enabled": false, "access_token": "tok456"}));
        });
        server.mock(|when, then| {
            when.method(GET)
                .path("/api/projects/9270/dashboards/3/sharing/");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!({"enabled": true}));
        });

        let client = test_client(&server);

        let url = client.insight_embed_url(1).await.unwrap();
        assert_eq!(url, Some(format!("{}/embedded/tok123", server.base_url())));

        assert_eq!(client.insight_embed_url(2).await.unwrap(), None);
        assert_eq!(client.dashboard_embed_url(3).await.unwrap(), None);
    }
}
