pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod server;
pub mod utils;

pub use crate::adapters::{ElevenLabsSynthesizer, OpenAiAssistant, PostHogClient, RecallClient};
pub use crate::config::{CliConfig, TomlConfig};
pub use crate::core::agent::MeetingAgent;
pub use crate::core::briefing::BriefingService;
pub use crate::server::AppState;
pub use crate::utils::error::{CopilotError, Result};
