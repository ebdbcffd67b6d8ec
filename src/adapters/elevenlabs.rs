use crate::config::toml_config::SpeechConfig;
use crate::domain::model::AudioClip;
use crate::domain::ports::SpeechSynthesizer;
use crate::utils::error::{CopilotError, Result};
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use reqwest::Client;
use serde_json::json;

const DEFAULT_ENDPOINT: &str = "https://api.elevenlabs.io";

/// ElevenLabs text-to-speech client. Output is MP3 at 22.05kHz/32kbps, the
/// format the meeting-bot output channel accepts.
#[derive(Clone)]
pub struct ElevenLabsSynthesizer {
    endpoint: String,
    api_key: String,
    voice_id: String,
    model_id: String,
    client: Client,
}

impl ElevenLabsSynthesizer {
    pub fn new(config: &SpeechConfig) -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            api_key: config.api_key.clone(),
            voice_id: config.voice_id(),
            model_id: config.model_id(),
            client: Client::new(),
        }
    }

    pub fn with_endpoint(mut self, endpoint: &str) -> Self {
        self.endpoint = endpoint.trim_end_matches('/').to_string();
        self
    }
}

#[async_trait]
impl SpeechSynthesizer for ElevenLabsSynthesizer {
    async fn speak(&self, text: &str) -> Result<AudioClip> {
        let url = format!(
            "{}/v1/text-to-speech/{}?output_format=mp3_22050_32&optimize_streaming_latency=0",
            self.endpoint, self.voice_id
        );

        let body = json!({
            "text": text,
            "model_id": self.model_id,
            "voice_settings": {
                "stability": 0.0,
                "similarity_boost": 1.0,
                "style": 0.0,
                "use_speaker_boost": true,
            },
        });

        let response = self
            .client
            .post(&url)
            .header("xi-api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CopilotError::UpstreamError {
                service: "elevenlabs",
                status: status.as_u16(),
                body,
            });
        }

        let audio_bytes = response.bytes().await?;
        let b64_data = BASE64.encode(&audio_bytes);

        tracing::info!("Audio successfully converted to base64");
        Ok(AudioClip { b64_data })
    }
}
