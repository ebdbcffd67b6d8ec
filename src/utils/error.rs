use thiserror::Error;

#[derive(Error, Debug)]
pub enum CopilotError {
    #[error("API request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("{service} returned status {status}: {body}")]
    UpstreamError {
        service: &'static str,
        status: u16,
        body: String,
    },

    #[error("Assistant error: {message}")]
    AssistantError { message: String },

    #[error("Unrecognized meeting event: {kind}")]
    UnknownEventError { kind: String },

    #[error("Invalid meeting event payload: {message}")]
    EventPayloadError { message: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration validation error for {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value for {field}: '{value}' ({reason})")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Upstream,
    Assistant,
    Configuration,
    Internal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl CopilotError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::HttpError(_) => ErrorCategory::Network,
            Self::UpstreamError { .. } => ErrorCategory::Upstream,
            Self::AssistantError { .. } => ErrorCategory::Assistant,
            Self::UnknownEventError { .. } | Self::EventPayloadError { .. } => {
                ErrorCategory::Upstream
            }
            Self::ConfigError { .. }
            | Self::ConfigValidationError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::MissingConfigError { .. } => ErrorCategory::Configuration,
            Self::IoError(_) | Self::SerializationError(_) => ErrorCategory::Internal,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::HttpError(_) | Self::UpstreamError { .. } => ErrorSeverity::Medium,
            Self::AssistantError { .. } => ErrorSeverity::High,
            Self::UnknownEventError { .. } | Self::EventPayloadError { .. } => ErrorSeverity::Low,
            Self::ConfigError { .. }
            | Self::ConfigValidationError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::MissingConfigError { .. } => ErrorSeverity::Critical,
            Self::IoError(_) | Self::SerializationError(_) => ErrorSeverity::High,
        }
    }

    /// Transient errors are worth retrying: transport failures and upstream 5xx.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::HttpError(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            Self::UpstreamError { status, .. } => *status >= 500,
            _ => false,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::HttpError(_) => "An external API could not be reached".to_string(),
            Self::UpstreamError { service, .. } => {
                format!("The {} API rejected the request", service)
            }
            Self::AssistantError { .. } => "The assistant produced an unusable answer".to_string(),
            Self::UnknownEventError { kind } => {
                format!(
                    "Received a meeting event this service does not handle: {}",
                    kind
                )
            }
            Self::EventPayloadError { .. } => "Received a malformed meeting event".to_string(),
            Self::ConfigError { message } => format!("Configuration problem: {}", message),
            Self::ConfigValidationError { field, .. }
            | Self::InvalidConfigValueError { field, .. } => {
                format!("Configuration field '{}' is invalid", field)
            }
            Self::MissingConfigError { field } => {
                format!("Configuration field '{}' is required", field)
            }
            Self::IoError(_) => "A local file operation failed".to_string(),
            Self::SerializationError(_) => {
                "Unexpected data shape from an external API".to_string()
            }
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            Self::HttpError(_) => {
                "Check network connectivity and the configured API hosts".to_string()
            }
            Self::UpstreamError {
                service, status, ..
            } => format!(
                "Inspect the {} response (status {}); verify the API key and project settings",
                service, status
            ),
            Self::AssistantError { .. } => {
                "Retry the request; if it persists, review the configured model".to_string()
            }
            Self::UnknownEventError { .. } | Self::EventPayloadError { .. } => {
                "Verify the webhook is pointed at this service and uses the expected schema"
                    .to_string()
            }
            Self::ConfigError { .. }
            | Self::ConfigValidationError { .. }
            | Self::InvalidConfigValueError { .. } => {
                "Fix copilot.toml and restart the service".to_string()
            }
            Self::MissingConfigError { field } => format!(
                "Set '{}' in copilot.toml or export the environment variable it references",
                field
            ),
            Self::IoError(_) => "Check file permissions and paths".to_string(),
            Self::SerializationError(_) => {
                "The upstream API may have changed; check for schema updates".to_string()
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, CopilotError>;
