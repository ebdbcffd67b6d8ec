pub mod agent;
pub mod briefing;

pub use crate::domain::model::{AudioClip, Briefing, Dashboard, Insight, MeetingEvent};
pub use crate::domain::ports::{AnalyticsStore, Assistant, MeetingOutput, SpeechSynthesizer};
pub use crate::utils::error::Result;
