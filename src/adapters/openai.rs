use crate::config::toml_config::AssistantConfig;
use crate::domain::model::Candidate;
use crate::domain::ports::Assistant;
use crate::utils::error::{CopilotError, Result};
use crate::utils::retry::RetryPolicy;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

const DEFAULT_ENDPOINT: &str = "https://api.openai.com";

/// Chat-completions client. Every call uses strict JSON-schema output with an
/// `explanation` + `final_answer` pair so answers are machine-checkable.
#[derive(Clone)]
pub struct OpenAiAssistant {
    endpoint: String,
    api_key: String,
    model: String,
    temperature: f32,
    max_completion_tokens: u32,
    client: Client,
    retry: RetryPolicy,
}

#[derive(Debug, Deserialize)]
struct StructuredAnswer {
    explanation: String,
    final_answer: serde_json::Value,
}

impl OpenAiAssistant {
    pub fn new(config: &AssistantConfig, retry: RetryPolicy) -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            api_key: config.api_key.clone(),
            model: config.model(),
            temperature: config.temperature(),
            max_completion_tokens: config.max_completion_tokens(),
            client: Client::new(),
            retry,
        }
    }

    /// Point the client at a different API host (proxies, tests).
    pub fn with_endpoint(mut self, endpoint: &str) -> Self {
        self.endpoint = endpoint.trim_end_matches('/').to_string();
        self
    }

    async fn request_structured(
        &self,
        schema_name: &str,
        answer_type: &str,
        answer_description: &str,
        instructions: &str,
        context: &str,
        user: Option<&str>,
    ) -> Result<StructuredAnswer> {
        let mut messages = vec![
            json!({
                "role": "system",
                "content": [{"type": "text", "text": instructions}],
            }),
            json!({
                "role": "assistant",
                "content": [{"type": "text", "text": context}],
            }),
        ];
        if let Some(user) = user {
            messages.push(json!({
                "role": "user",
                "content": [{"type": "text", "text": user}],
            }));
        }

        let body = json!({
            "model": self.model,
            "messages": messages,
            "response_format": {
                "type": "json_schema",
                "json_schema": {
                    "name": schema_name,
                    "strict": true,
                    "schema": {
                        "type": "object",
                        "properties": {
                            "explanation": {
                                "type": "string",
                                "description": "A detailed explanation of the answer.",
                            },
                            "final_answer": {
                                "type": answer_type,
                                "description": answer_description,
                            },
                        },
                        "required": ["explanation", "final_answer"],
                        "additionalProperties": false,
                    },
                },
            },
            "temperature": self.temperature,
            "max_completion_tokens": self.max_completion_tokens,
        });

        let url = format!("{}/v1/chat/completions", self.endpoint);

        let response_json: serde_json::Value = self
            .retry
            .run("openai chat completion", || async {
                let response = self
                    .client
                    .post(&url)
                    .bearer_auth(&self.api_key)
                    .header("Content-Type", "application/json")
                    .json(&body)
                    .send()
                    .await?;

                let status = response.status();
                if !status.is_success() {
                    let body = response.text().await.unwrap_or_default();
                    return Err(CopilotError::UpstreamError {
                        service: "openai",
                        status: status.as_u16(),
                        body,
                    });
                }

                Ok(response.json().await?)
            })
            .await?;

        let content = response_json
            .pointer("/choices/0/message/content")
            .and_then(|v| v.as_str())
            .ok_or_else(|| CopilotError::AssistantError {
                message: "chat completion response missing content".to_string(),
            })?;

        let answer: StructuredAnswer =
            serde_json::from_str(content).map_err(|e| CopilotError::AssistantError {
                message: format!("structured answer is not valid JSON: {}", e),
            })?;

        tracing::debug!("Assistant {} explanation: {}", schema_name, answer.explanation);
        Ok(answer)
    }
}

#[async_trait]
impl Assistant for OpenAiAssistant {
    async fn choose(
        &self,
        instructions: &str,
        candidates: &[Candidate],
        question: &str,
    ) -> Result<Option<usize>> {
        let context = serde_json::to_string(candidates)?;
        let answer = self
            .request_structured(
                "selection",
                "number",
                "The index of the selected option, or -1 when none match.",
                instructions,
                &context,
                Some(question),
            )
            .await?;

        let index = answer
            .final_answer
            .as_i64()
            .or_else(|| answer.final_answer.as_f64().map(|f| f as i64))
            .ok_or_else(|| CopilotError::AssistantError {
                message: format!("selection answer is not numeric: {}", answer.final_answer),
            })?;

        if index == -1 {
            return Ok(None);
        }
        if index < 0 || index as usize >= candidates.len() {
            return Err(CopilotError::AssistantError {
                message: format!(
                    "selection index {} is outside the candidate range 0..{}",
                    index,
                    candidates.len()
                ),
            });
        }
        Ok(Some(index as usize))
    }

    async fn summarize(
        &self,
        instructions: &str,
        context: &str,
        focus: Option<&str>,
    ) -> Result<String> {
        let answer = self
            .request_structured(
                "analytics_summary",
                "string",
                "The summary of the analytics.",
                instructions,
                context,
                focus,
            )
            .await?;

        answer
            .final_answer
            .as_str()
            .map(|s| s.to_string())
            .ok_or_else(|| CopilotError::AssistantError {
                message: format!("summary answer is not a string: {}", answer.final_answer),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use std::time::Duration;

    fn test_assistant(server: &MockServer) -> OpenAiAssistant {
        OpenAiAssistant::new(
            &AssistantConfig {
                api_key: "sk-test".to_string(),
                model: None,
                temperature: None,
                max_completion_tokens: None,
            },
            RetryPolicy::new(1, Duration::from_millis(1)),
        )
        .with_endpoint(&server.base_url())
    }

    fn candidates() -> Vec<Candidate> {
        vec![
            Candidate {
                id: 0,
                name: "Signups - Weekly".to_string(),
                description: None,
            },
            Candidate {
                id: 1,
                name: "Churn - Monthly".to_string(),
                description: None,
            },
        ]
    }

    fn completion_body(content: serde_json::Value) -> serde_json::Value {
        serde_json::json!({
            "choices": [{"message": {"content": content.to_string()}}]
        })
    }

    #[tokio::test]
    async fn test_choose_returns_selected_index() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/v1/chat/completions")
                .header("Authorization", "Bearer sk-test")
                .body_contains("Churn - Monthly")
                .body_contains("which metric fits");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(completion_body(serde_json::json!({
                    "explanation": "Churn matches the question.",
                    "final_answer": 1
                })));
        });

        let choice = test_assistant(&server)
            .choose("pick a metric", &candidates(), "which metric fits")
            .await
            .unwrap();

        mock.assert();
        assert_eq!(choice, Some(1));
    }

    #[tokio::test]
    async fn test_choose_minus_one_means_no_match() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/v1/chat/completions");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(completion_body(serde_json::json!({
                    "explanation": "Nothing fits.",
                    "final_answer": -1
                })));
        });

        let choice = test_assistant(&server)
            .choose("pick a metric", &candidates(), "unrelated question")
            .await
            .unwrap();
        assert_eq!(choice, None);
    }

    #[tokio::test]
    async fn test_choose_out_of_range_index_is_an_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/v1/chat/completions");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(completion_body(serde_json::json!({
                    "explanation": "Hallucinated.",
                    "final_answer": 7
                })));
        });

        let err = test_assistant(&server)
            .choose("pick a metric", &candidates(), "question")
            .await
            .unwrap_err();
        assert!(matches!(err, CopilotError::AssistantError { .. }));
    }

    #[tokio::test]
    async fn test_summarize_returns_final_answer_text() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/v1/chat/completions")
                .body_contains("Metric: Signups - Weekly");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(completion_body(serde_json::json!({
                    "explanation": "Counts rose.",
                    "final_answer": "Signups grew 12% week over week."
                })));
        });

        let summary = test_assistant(&server)
            .summarize(
                "summarize this",
                r#"[{"count": 42}]"#,
                Some("Metric: Signups - Weekly"),
            )
            .await
            .unwrap();

        mock.assert();
        assert_eq!(summary, "Signups grew 12% week over week.");
    }

    #[tokio::test]
    async fn test_upstream_failure_is_surfaced() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/v1/chat/completions");
            then.status(401).body("invalid api key");
        });

        let err = test_assistant(&server)
            .summarize("summarize this", "{}", None)
            .await
            .unwrap_err();
        match err {
            CopilotError::UpstreamError { service, status, .. } => {
                assert_eq!(service, "openai");
                assert_eq!(status, 401);
            }
            other => panic!("expected UpstreamError, got {:?}", other),
        }
    }
}
