use crate::domain::model::{AudioClip, Candidate, Dashboard, Insight};
use crate::utils::error::Result;
use async_trait::async_trait;

/// Read access to the analytics backend (PostHog).
#[async_trait]
pub trait AnalyticsStore: Send + Sync {
    async fn dashboards(&self) -> Result<Vec<Dashboard>>;
    async fn insights(&self) -> Result<Vec<Insight>>;
    async fn insight_embed_url(&self, insight_id: i64) -> Result<Option<String>>;
    async fn dashboard_embed_url(&self, dashboard_id: i64) -> Result<Option<String>>;
}

/// The LLM seam. Both operations use strict structured output so downstream
/// code never parses free-form prose.
#[async_trait]
pub trait Assistant: Send + Sync {
    /// Pick one candidate by index. `None` means the assistant found no match.
    async fn choose(
        &self,
        instructions: &str,
        candidates: &[Candidate],
        question: &str,
    ) -> Result<Option<usize>>;

    /// Produce a short prose summary of `context`. `focus` narrows the request
    /// (e.g. the metric name); some flows summarize the context alone.
    async fn summarize(
        &self,
        instructions: &str,
        context: &str,
        focus: Option<&str>,
    ) -> Result<String>;
}

/// Text-to-speech synthesis.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    async fn speak(&self, text: &str) -> Result<AudioClip>;
}

/// Output channels of the in-call meeting bot.
#[async_trait]
pub trait MeetingOutput: Send + Sync {
    async fn send_audio(&self, bot_id: &str, clip: &AudioClip) -> Result<()>;
    async fn send_screenshare(&self, bot_id: &str, image_b64: &str) -> Result<()>;
    async fn stop_screenshare(&self, bot_id: &str) -> Result<()>;
}
