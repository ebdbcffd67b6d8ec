//! HTTP request handlers.

use crate::adapters::RecallClient;
use crate::domain::model::MeetingEventKind;
use crate::server::middleware::RequestId;
use crate::server::response::{HealthResponse, QueryResponse, WebhookResponse};
use crate::server::state::AppState;
use crate::utils::error::{CopilotError, ErrorCategory};
use axum::extract::{FromRequest, Request, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde_json::Value;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::{error, info, warn};

#[derive(Debug, Deserialize)]
pub struct UserQueryRequest {
    pub user_query: String,
}

/// Liveness probe with basic service stats.
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let memory_mb = state.monitor.get_stats().map(|s| s.memory_usage_mb);

    Json(HealthResponse {
        status: "ok",
        service: "meeting-copilot",
        uptime_secs: state.start_time.elapsed().as_secs(),
        requests: state.request_count.load(Ordering::Relaxed),
        memory_mb,
    })
}

fn error_status(e: &CopilotError) -> StatusCode {
    match e.category() {
        ErrorCategory::Network | ErrorCategory::Upstream | ErrorCategory::Assistant => {
            StatusCode::BAD_GATEWAY
        }
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn request_id(request: &Request) -> String {
    request
        .extensions()
        .get::<RequestId>()
        .map(|r| r.0.clone())
        .unwrap_or_default()
}

/// Answer a direct analytics question. `POST /query`
pub async fn query(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> (StatusCode, Json<QueryResponse>) {
    state.request_count.fetch_add(1, Ordering::Relaxed);
    let req_id = request_id(&request);

    let body = match Json::<UserQueryRequest>::from_request(request, &state).await {
        Ok(Json(v)) => v,
        Err(e) => {
            warn!(req_id = %req_id, error = %e, "Invalid JSON body");
            return (
                StatusCode::BAD_REQUEST,
                Json(QueryResponse::err("Invalid JSON body")),
            );
        }
    };

    info!(req_id = %req_id, "Received query: {}", body.user_query);

    match state.briefings.answer_query(&body.user_query).await {
        Ok(briefing) => {
            state.monitor.log_stats("query");
            (StatusCode::OK, Json(QueryResponse::success(briefing)))
        }
        Err(e) => {
            error!(
                req_id = %req_id,
                error = %e,
                suggestion = %e.recovery_suggestion(),
                "Query briefing failed"
            );
            (error_status(&e), Json(QueryResponse::err(e.user_friendly_message())))
        }
    }
}

/// Summarize the dashboard that best matches a question. `POST /dashboard_summary`
pub async fn dashboard_summary(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> (StatusCode, Json<QueryResponse>) {
    state.request_count.fetch_add(1, Ordering::Relaxed);
    let req_id = request_id(&request);

    let body = match Json::<UserQueryRequest>::from_request(request, &state).await {
        Ok(Json(v)) => v,
        Err(e) => {
            warn!(req_id = %req_id, error = %e, "Invalid JSON body");
            return (
                StatusCode::BAD_REQUEST,
                Json(QueryResponse::err("Invalid JSON body")),
            );
        }
    };

    info!(req_id = %req_id, "Received dashboard summary request: {}", body.user_query);

    match state.briefings.summarize_dashboard(&body.user_query).await {
        Ok(briefing) => {
            state.monitor.log_stats("dashboard_summary");
            (StatusCode::OK, Json(QueryResponse::success(briefing)))
        }
        Err(e) => {
            error!(
                req_id = %req_id,
                error = %e,
                suggestion = %e.recovery_suggestion(),
                "Dashboard briefing failed"
            );
            (error_status(&e), Json(QueryResponse::err(e.user_friendly_message())))
        }
    }
}

/// Meeting-bot lifecycle events. `POST /webhook`
///
/// A `bot.in_call_recording` event triggers the spoken briefing in the
/// background; the webhook acknowledges immediately either way.
pub async fn webhook(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> (StatusCode, Json<WebhookResponse>) {
    state.request_count.fetch_add(1, Ordering::Relaxed);
    let req_id = request_id(&request);

    let payload = match Json::<Value>::from_request(request, &state).await {
        Ok(Json(v)) => v,
        Err(e) => {
            warn!(req_id = %req_id, error = %e, "Invalid JSON body");
            return (
                StatusCode::BAD_REQUEST,
                Json(WebhookResponse::err("Invalid JSON body")),
            );
        }
    };

    let event = match RecallClient::parse_event(&payload) {
        Ok(event) => event,
        Err(e) => {
            warn!(req_id = %req_id, error = %e, "Rejected webhook event");
            return (
                StatusCode::BAD_REQUEST,
                Json(WebhookResponse::err(e.user_friendly_message())),
            );
        }
    };

    info!(
        req_id = %req_id,
        event = event.kind.as_str(),
        bot_id = %event.bot_id,
        "{}",
        event.kind.description()
    );

    if event.kind == MeetingEventKind::InCallRecording {
        // Fire and forget: the call must not receive an HTTP error because
        // the copilot failed to speak.
        let agent = state.agent.clone();
        let bot_id = event.bot_id.clone();
        tokio::spawn(async move {
            if let Err(e) = agent.respond_in_meeting(&bot_id).await {
                error!(
                    error = %e,
                    suggestion = %e.recovery_suggestion(),
                    "Error in agent response for bot {}",
                    bot_id
                );
            }
        });
    }

    (StatusCode::OK, Json(WebhookResponse::acknowledged(event.kind)))
}
