use crate::utils::error::{CopilotError, Result};
use crate::utils::retry::RetryPolicy;
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

const DEFAULT_POSTHOG_HOST: &str = "https://us.posthog.com";
const DEFAULT_RECALL_HOST: &str = "https://us-west-2.recall.ai";
const DEFAULT_MODEL: &str = "gpt-4o-2024-08-06";
const DEFAULT_VOICE_ID: &str = "pNInz6obpgDQGcFmaJgB"; // Adam pre-made voice
const DEFAULT_SPEECH_MODEL: &str = "eleven_turbo_v2"; // turbo model for low latency

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub posthog: PosthogConfig,
    pub assistant: AssistantConfig,
    pub speech: SpeechConfig,
    pub meeting: MeetingConfig,
    pub retry: Option<RetryConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PosthogConfig {
    pub host: Option<String>,
    pub project_id: String,
    pub personal_api_key: String,
}

impl PosthogConfig {
    pub fn host(&self) -> &str {
        self.host.as_deref().unwrap_or(DEFAULT_POSTHOG_HOST)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssistantConfig {
    pub api_key: String,
    pub model: Option<String>,
    pub temperature: Option<f32>,
    pub max_completion_tokens: Option<u32>,
}

impl AssistantConfig {
    pub fn model(&self) -> String {
        self.model.clone().unwrap_or_else(|| DEFAULT_MODEL.to_string())
    }

    pub fn temperature(&self) -> f32 {
        self.temperature.unwrap_or(0.3)
    }

    pub fn max_completion_tokens(&self) -> u32 {
        self.max_completion_tokens.unwrap_or(2048)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeechConfig {
    pub api_key: String,
    pub voice_id: Option<String>,
    pub model_id: Option<String>,
}

impl SpeechConfig {
    pub fn voice_id(&self) -> String {
        self.voice_id
            .clone()
            .unwrap_or_else(|| DEFAULT_VOICE_ID.to_string())
    }

    pub fn model_id(&self) -> String {
        self.model_id
            .clone()
            .unwrap_or_else(|| DEFAULT_SPEECH_MODEL.to_string())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeetingConfig {
    pub host: Option<String>,
    pub api_key: String,
}

impl MeetingConfig {
    pub fn host(&self) -> &str {
        self.host.as_deref().unwrap_or(DEFAULT_RECALL_HOST)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    pub attempts: Option<u32>,
    pub delay_seconds: Option<u64>,
}

impl TomlConfig {
    /// Load configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(CopilotError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| CopilotError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Substitute `${VAR_NAME}` placeholders from the environment. Unset
    /// variables are left as-is; validation rejects unresolved secrets.
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").unwrap();

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn validate_config(&self) -> Result<()> {
        validation::validate_url("posthog.host", self.posthog.host())?;
        validation::validate_url("meeting.host", self.meeting.host())?;

        validation::validate_non_empty_string("posthog.project_id", &self.posthog.project_id)?;
        validation::validate_secret("posthog.personal_api_key", &self.posthog.personal_api_key)?;
        validation::validate_secret("assistant.api_key", &self.assistant.api_key)?;
        validation::validate_secret("speech.api_key", &self.speech.api_key)?;
        validation::validate_secret("meeting.api_key", &self.meeting.api_key)?;

        validation::validate_range(
            "assistant.temperature",
            self.assistant.temperature(),
            0.0,
            2.0,
        )?;
        validation::validate_positive_number(
            "retry.attempts",
            self.retry_attempts() as usize,
            1,
        )?;

        Ok(())
    }

    pub fn retry_attempts(&self) -> u32 {
        self.retry
            .as_ref()
            .and_then(|r| r.attempts)
            .unwrap_or(3)
    }

    pub fn retry_delay(&self) -> Duration {
        let seconds = self
            .retry
            .as_ref()
            .and_then(|r| r.delay_seconds)
            .unwrap_or(1);
        Duration::from_secs(seconds)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.retry_attempts(), self.retry_delay())
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
