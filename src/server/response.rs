//! JSON response envelopes for the HTTP surface.

use crate::domain::model::{Briefing, MeetingEventKind};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct QueryResponse {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<Briefing>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub embed_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl QueryResponse {
    pub fn success(briefing: Briefing) -> Self {
        Self {
            status: "success",
            embed_url: briefing.embed_url.clone(),
            response: Some(briefing),
            error: None,
        }
    }

    pub fn err(message: impl Into<String>) -> Self {
        Self {
            status: "error",
            response: None,
            embed_url: None,
            error: Some(message.into()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub uptime_secs: u64,
    pub requests: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memory_mb: Option<u64>,
}

#[derive(Debug, Serialize)]
pub struct WebhookResponse {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl WebhookResponse {
    pub fn acknowledged(kind: MeetingEventKind) -> Self {
        Self {
            status: "ok",
            event: Some(kind.as_str()),
            description: Some(kind.description()),
            error: None,
        }
    }

    pub fn err(message: impl Into<String>) -> Self {
        Self {
            status: "error",
            event: None,
            description: None,
            error: Some(message.into()),
        }
    }
}
