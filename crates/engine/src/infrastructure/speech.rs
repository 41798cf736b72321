//! Speech synthesis over an OpenAI-compatible `/v1/audio/speech` endpoint
//! (Kokoro-FastAPI, openedai-speech, OpenAI itself).

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;

use crate::infrastructure::ports::{AudioResult, MediaError, SpeechPort, SpeechRequest};

pub const DEFAULT_TTS_BASE_URL: &str = "http://localhost:8880";
pub const DEFAULT_TTS_MODEL: &str = "tts-1";

const AUDIO_FORMAT: &str = "mp3";

#[derive(Clone)]
pub struct SpeechClient {
    client: Client,
    base_url: String,
    model: String,
}

impl SpeechClient {
    pub fn new(base_url: &str, model: &str) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(90))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
struct SpeechBody<'a> {
    model: &'a str,
    input: &'a str,
    voice: &'a str,
    response_format: &'a str,
}

#[async_trait]
impl SpeechPort for SpeechClient {
    async fn synthesize(&self, request: SpeechRequest) -> Result<AudioResult, MediaError> {
        if request.text.trim().is_empty() {
            return Err(MediaError::GenerationFailed(
                "Nothing to narrate".to_string(),
            ));
        }

        let body = SpeechBody {
            model: &self.model,
            input: &request.text,
            voice: &request.voice,
            response_format: AUDIO_FORMAT,
        };

        let response = self
            .client
            .post(format!("{}/v1/audio/speech", self.base_url))
            .json(&body)
            .send()
            .await
            .map_err(|e| MediaError::GenerationFailed(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(MediaError::GenerationFailed(format!(
                "Speech service returned {status}: {text}"
            )));
        }

        let audio_data = response
            .bytes()
            .await
            .map_err(|e| MediaError::GenerationFailed(e.to_string()))?
            .to_vec();

        Ok(AudioResult {
            audio_data,
            format: AUDIO_FORMAT.to_string(),
        })
    }
}
