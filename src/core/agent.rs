use crate::core::briefing::BriefingService;
use crate::domain::ports::{AnalyticsStore, Assistant, MeetingOutput, SpeechSynthesizer};
use crate::utils::error::Result;

/// The standing question the agent answers when it speaks up in a call.
const DAILY_INSIGHTS_PROMPT: &str = "What are my top insights from yesterday?";

/// Turns a briefing into spoken audio inside the meeting the bot attends.
#[derive(Clone)]
pub struct MeetingAgent<A, L, S, M>
where
    A: AnalyticsStore,
    L: Assistant,
    S: SpeechSynthesizer,
    M: MeetingOutput,
{
    briefings: BriefingService<A, L>,
    speech: S,
    meeting: M,
}

impl<A, L, S, M> MeetingAgent<A, L, S, M>
where
    A: AnalyticsStore,
    L: Assistant,
    S: SpeechSynthesizer,
    M: MeetingOutput,
{
    pub fn new(briefings: BriefingService<A, L>, speech: S, meeting: M) -> Self {
        Self {
            briefings,
            speech,
            meeting,
        }
    }

    pub async fn respond_in_meeting(&self, bot_id: &str) -> Result<()> {
        tracing::info!("Processing agent request for bot {}", bot_id);

        let briefing = self.briefings.summarize_dashboard(DAILY_INSIGHTS_PROMPT).await?;
        let response_text = format!(
            "Here are your top insights from yesterday: {}",
            briefing.summary
        );

        let clip = self.speech.speak(&response_text).await?;
        self.meeting.send_audio(bot_id, &clip).await?;

        tracing::info!("Successfully processed agent request and sent audio response");
        Ok(())
    }
}
