use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A saved PostHog analytics query, with cached results when the API has them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Insight {
    pub id: i64,
    #[serde(default)]
    pub short_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub derived_name: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub dashboards: Vec<i64>,
    #[serde(default)]
    pub filters: serde_json::Value,
    #[serde(default)]
    pub query: serde_json::Value,
    #[serde(default)]
    pub result: Option<serde_json::Value>,
}

impl Insight {
    /// Label shown to the assistant when selecting and summarizing.
    pub fn label(&self) -> String {
        format!("{} - {}", self.name, self.description)
    }

    /// Insights with neither a name nor a description cannot be selected
    /// meaningfully and are skipped.
    pub fn is_unlabeled(&self) -> bool {
        self.name.is_empty() && self.description.is_empty()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dashboard {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// The copilot's answer: a prose summary plus an optional embed URL for the
/// underlying visualization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Briefing {
    pub summary: String,
    pub embed_url: Option<String>,
}

impl Briefing {
    pub fn no_matching_insight() -> Self {
        Self {
            summary: "I couldn't find a relevant metric that matches your query. Please try \
                      rephrasing your question or ask about a different metric."
                .to_string(),
            embed_url: None,
        }
    }

    pub fn no_matching_dashboard() -> Self {
        Self {
            summary: "I couldn't find a relevant dashboard that matches your query. Please try \
                      rephrasing your question or ask about a different dashboard."
                .to_string(),
            embed_url: None,
        }
    }
}

/// One candidate offered to the assistant for selection. Serialized verbatim
/// into the prompt, so the field set stays minimal.
#[derive(Debug, Clone, Serialize)]
pub struct Candidate {
    pub id: usize,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Base64-encoded MP3 produced by speech synthesis, consumed by bot output.
#[derive(Debug, Clone)]
pub struct AudioClip {
    pub b64_data: String,
}

/// Meeting-bot lifecycle events delivered over the webhook.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MeetingEventKind {
    #[serde(rename = "bot.joining")]
    Joining,
    #[serde(rename = "bot.in_waiting_room")]
    InWaitingRoom,
    #[serde(rename = "bot.in_call_not_recording")]
    InCallNotRecording,
    #[serde(rename = "bot.recording_permission_allowed")]
    RecordingPermissionAllowed,
    #[serde(rename = "bot.recording_permission_denied")]
    RecordingPermissionDenied,
    #[serde(rename = "bot.in_call_recording")]
    InCallRecording,
    #[serde(rename = "bot.call_ended")]
    CallEnded,
    #[serde(rename = "bot.done")]
    Done,
    #[serde(rename = "bot.fatal")]
    Fatal,
    #[serde(rename = "recording.processing")]
    RecordingProcessing,
}

impl MeetingEventKind {
    pub fn parse(kind: &str) -> Option<Self> {
        match kind {
            "bot.joining" => Some(Self::Joining),
            "bot.in_waiting_room" => Some(Self::InWaitingRoom),
            "bot.in_call_not_recording" => Some(Self::InCallNotRecording),
            "bot.recording_permission_allowed" => Some(Self::RecordingPermissionAllowed),
            "bot.recording_permission_denied" => Some(Self::RecordingPermissionDenied),
            "bot.in_call_recording" => Some(Self::InCallRecording),
            "bot.call_ended" => Some(Self::CallEnded),
            "bot.done" => Some(Self::Done),
            "bot.fatal" => Some(Self::Fatal),
            "recording.processing" => Some(Self::RecordingProcessing),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Joining => "bot.joining",
            Self::InWaitingRoom => "bot.in_waiting_room",
            Self::InCallNotRecording => "bot.in_call_not_recording",
            Self::RecordingPermissionAllowed => "bot.recording_permission_allowed",
            Self::RecordingPermissionDenied => "bot.recording_permission_denied",
            Self::InCallRecording => "bot.in_call_recording",
            Self::CallEnded => "bot.call_ended",
            Self::Done => "bot.done",
            Self::Fatal => "bot.fatal",
            Self::RecordingProcessing => "recording.processing",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Joining => {
                "The bot has acknowledged the request to join the call, and is in the process of \
                 connecting."
            }
            Self::InWaitingRoom => "The bot is in the waiting room of the meeting.",
            Self::InCallNotRecording => {
                "The bot has joined the meeting, however is not recording yet. This could be \
                 because the bot is still setting up, does not have recording permissions, or the \
                 recording was paused."
            }
            Self::RecordingPermissionAllowed => {
                "The bot has joined the meeting and it's request to record the meeting has been \
                 allowed by the host."
            }
            Self::RecordingPermissionDenied => {
                "The bot has joined the meeting and it's request to record the meeting has been \
                 denied."
            }
            Self::InCallRecording => {
                "The bot is in the meeting, and is currently recording the audio and video."
            }
            Self::CallEnded => {
                "The bot has left the call, and the real-time transcription is complete."
            }
            Self::Done => {
                "The bot has shut down. If bot produced in_call_recording event, the video is \
                 uploaded and available for download."
            }
            Self::Fatal => {
                "The bot has encountered an error that prevented it from joining the call."
            }
            Self::RecordingProcessing => "The bot is processing the recording.",
        }
    }
}

/// A parsed webhook event from the meeting-bot provider.
#[derive(Debug, Clone)]
pub struct MeetingEvent {
    pub kind: MeetingEventKind,
    pub bot_id: String,
    pub metadata: serde_json::Value,
    pub code: Option<String>,
    pub sub_code: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
}
