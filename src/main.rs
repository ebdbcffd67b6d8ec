use clap::Parser;
use meeting_copilot::utils::{logger, validation::Validate};
use meeting_copilot::{server, AppState, CliConfig, TomlConfig};
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    if cli.json_logs {
        logger::init_json_logger();
    } else {
        logger::init_server_logger(cli.verbose);
    }

    tracing::info!("Starting meeting-copilot");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    if let Err(e) = cli.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    let settings = match TomlConfig::from_file(&cli.config) {
        Ok(settings) => settings,
        Err(e) => {
            tracing::error!(
                "❌ Failed to load {}: {} (Category: {:?}, Severity: {:?})",
                cli.config,
                e,
                e.category(),
                e.severity()
            );
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());
            std::process::exit(1);
        }
    };

    if let Err(e) = settings.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 {}", e.recovery_suggestion());
        std::process::exit(1);
    }

    if cli.monitor {
        tracing::info!("🔍 System monitoring enabled");
    }

    tracing::info!(
        "Configuration loaded: posthog project {} via {}",
        settings.posthog.project_id,
        settings.posthog.host()
    );

    let state = Arc::new(AppState::new(&settings, cli.monitor));

    server::run(&cli.bind_address, Arc::clone(&state)).await?;

    state.monitor.log_stats("shutdown");
    tracing::info!("✅ meeting-copilot shut down gracefully");
    Ok(())
}
