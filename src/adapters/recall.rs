use crate::config::toml_config::MeetingConfig;
use crate::domain::model::{AudioClip, MeetingEvent, MeetingEventKind};
use crate::domain::ports::MeetingOutput;
use crate::utils::error::{CopilotError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde_json::json;

/// Recall.ai client: pushes audio and screenshare frames to the in-call bot
/// and parses the webhook events Recall delivers back.
#[derive(Clone)]
pub struct RecallClient {
    endpoint: String,
    api_key: String,
    client: Client,
}

impl RecallClient {
    pub fn new(config: &MeetingConfig) -> Self {
        Self {
            endpoint: config.host().trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            client: Client::new(),
        }
    }

    async fn post_output(&self, url: String, payload: Option<serde_json::Value>) -> Result<()> {
        let mut request = self
            .client
            .post(&url)
            .header("accept", "application/json")
            .header("authorization", format!("Token {}", self.api_key));
        if let Some(payload) = payload {
            request = request.json(&payload);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!("Recall API returned error: {} - {}", status, body);
            return Err(CopilotError::UpstreamError {
                service: "recall",
                status: status.as_u16(),
                body,
            });
        }
        Ok(())
    }

    /// Parse a webhook payload into a `MeetingEvent`.
    ///
    /// Payload shape: `{event, data: {bot: {id, metadata}, data: {code,
    /// sub_code, updated_at}}}`. Unparseable timestamps become `None`;
    /// unknown event names and a missing bot id are errors.
    pub fn parse_event(payload: &serde_json::Value) -> Result<MeetingEvent> {
        let kind_str = payload
            .get("event")
            .and_then(|v| v.as_str())
            .ok_or_else(|| CopilotError::EventPayloadError {
                message: "missing 'event' field".to_string(),
            })?;

        let kind =
            MeetingEventKind::parse(kind_str).ok_or_else(|| CopilotError::UnknownEventError {
                kind: kind_str.to_string(),
            })?;

        let bot_id = payload
            .pointer("/data/bot/id")
            .and_then(|v| v.as_str())
            .ok_or_else(|| CopilotError::EventPayloadError {
                message: "missing bot id".to_string(),
            })?
            .to_string();

        let metadata = payload
            .pointer("/data/bot/metadata")
            .cloned()
            .unwrap_or_else(|| json!({}));

        let inner = payload.pointer("/data/data");
        let code = inner
            .and_then(|d| d.get("code"))
            .and_then(|v| v.as_str())
            .map(|s| s.to_string());
        let sub_code = inner
            .and_then(|d| d.get("sub_code"))
            .and_then(|v| v.as_str())
            .map(|s| s.to_string());
        let updated_at = inner
            .and_then(|d| d.get("updated_at"))
            .and_then(|v| v.as_str())
            .and_then(parse_timestamp);

        Ok(MeetingEvent {
            kind,
            bot_id,
            metadata,
            code,
            sub_code,
            updated_at,
        })
    }
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

#[async_trait]
impl MeetingOutput for RecallClient {
    async fn send_audio(&self, bot_id: &str, clip: &AudioClip) -> Result<()> {
        let url = format!("{}/api/v1/bot/{}/output_audio/", self.endpoint, bot_id);
        let payload = json!({
            "kind": "mp3",
            "b64_data": clip.b64_data,
        });

        self.post_output(url, Some(payload)).await?;
        tracing::info!("Successfully sent audio to Recall API");
        Ok(())
    }

    async fn send_screenshare(&self, bot_id: &str, image_b64: &str) -> Result<()> {
        let url = format!("{}/api/v1/bot/{}/output_screenshare/", self.endpoint, bot_id);
        let payload = json!({
            "kind": "jpeg",
            "b64_data": image_b64,
        });

        self.post_output(url, Some(payload)).await?;
        tracing::info!("Successfully sent screenshare request to Recall API");
        Ok(())
    }

    async fn stop_screenshare(&self, bot_id: &str) -> Result<()> {
        let url = format!(
            "{}/api/v1/bot/{}/output_screenshare/stop/",
            self.endpoint, bot_id
        );

        self.post_output(url, None).await?;
        tracing::info!("Successfully sent stop screenshare request to Recall API");
        Ok(())
    }
}
