// Adapters layer: concrete clients for the external systems the copilot
// talks to (analytics, LLM, speech synthesis, meeting bot).

pub mod elevenlabs;
pub mod openai;
pub mod posthog;
pub mod recall;

pub use elevenlabs::ElevenLabsSynthesizer;
pub use openai::OpenAiAssistant;
pub use posthog::PostHogClient;
pub use recall::RecallClient;
