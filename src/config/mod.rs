pub mod toml_config;

pub use toml_config::TomlConfig;

use crate::utils::error::{CopilotError, Result};
use crate::utils::validation::{validate_non_empty_string, Validate};
use clap::Parser;

#[derive(Debug, Clone, Parser)]
#[command(name = "meeting-copilot")]
#[command(about = "Answers product-analytics questions in live meetings")]
pub struct CliConfig {
    #[arg(long, default_value = "0.0.0.0:8000")]
    pub bind_address: String,

    #[arg(long, default_value = "copilot.toml")]
    pub config: String,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit JSON logs instead of the compact console format")]
    pub json_logs: bool,

    #[arg(long, help = "Log process CPU/memory stats after each briefing")]
    pub monitor: bool,
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("config", &self.config)?;

        self.bind_address
            .parse::<std::net::SocketAddr>()
            .map_err(|e| CopilotError::InvalidConfigValueError {
                field: "bind_address".to_string(),
                value: self.bind_address.clone(),
                reason: format!("Invalid socket address: {}", e),
            })?;

        Ok(())
    }
}
