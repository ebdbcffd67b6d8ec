use crate::adapters::{ElevenLabsSynthesizer, OpenAiAssistant, PostHogClient, RecallClient};
use crate::config::TomlConfig;
use crate::core::agent::MeetingAgent;
use crate::core::briefing::BriefingService;
use crate::utils::monitor::SystemMonitor;
use std::sync::atomic::AtomicU64;
use std::time::Instant;

pub type Briefings = BriefingService<PostHogClient, OpenAiAssistant>;
pub type Agent = MeetingAgent<PostHogClient, OpenAiAssistant, ElevenLabsSynthesizer, RecallClient>;

/// Shared per-process state handed to every handler.
pub struct AppState {
    pub briefings: Briefings,
    pub agent: Agent,
    pub start_time: Instant,
    pub request_count: AtomicU64,
    pub monitor: SystemMonitor,
}

impl AppState {
    pub fn new(config: &TomlConfig, monitor_enabled: bool) -> Self {
        let posthog = PostHogClient::new(&config.posthog);
        let assistant = OpenAiAssistant::new(&config.assistant, config.retry_policy());
        let speech = ElevenLabsSynthesizer::new(&config.speech);
        let meeting = RecallClient::new(&config.meeting);

        let briefings = BriefingService::new(posthog.clone(), assistant.clone());
        let agent = MeetingAgent::new(BriefingService::new(posthog, assistant), speech, meeting);

        Self::with_components(briefings, agent, monitor_enabled)
    }

    /// Assemble from pre-built services; used by `new` and by tests that
    /// point the adapters at mock endpoints.
    pub fn with_components(briefings: Briefings, agent: Agent, monitor_enabled: bool) -> Self {
        Self {
            briefings,
            agent,
            start_time: Instant::now(),
            request_count: AtomicU64::new(0),
            monitor: SystemMonitor::new(monitor_enabled),
        }
    }
}
