//! OpenAI-compatible `/audio/speech` client.

use async_trait::async_trait;
use serde_json::json;
use tracing::debug;

use super::{trim_base, SpeechSynthesizer};
use crate::error::{ServiceError, ServiceResult};

const SERVICE: &str = "speech";

pub struct HttpSpeech {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
}

impl HttpSpeech {
    pub fn new(client: reqwest::Client, base_url: &str, api_key: Option<String>, model: &str) -> Self {
        Self {
            client,
            base_url: trim_base(base_url),
            api_key,
            model: model.to_string(),
        }
    }
}

#[async_trait]
impl SpeechSynthesizer for HttpSpeech {
    async fn synthesize(&self, text: &str, voice: &str) -> ServiceResult<Vec<u8>> {
        let api_key = self.api_key.as_deref().ok_or(ServiceError::MissingCredentials {
            service: SERVICE,
            variable: "A4F_API_KEY",
        })?;

        let response = self
            .client
            .post(format!("{}/audio/speech", self.base_url))
            .bearer_auth(api_key)
            .json(&json!({
                "model": self.model,
                "input": text,
                "voice": voice,
            }))
            .send()
            .await
            .map_err(ServiceError::http(SERVICE))?;
        let response = ServiceError::check(SERVICE, response).await?;

        let audio = response.bytes().await.map_err(ServiceError::http(SERVICE))?;
        if audio.is_empty() {
            return Err(ServiceError::malformed(SERVICE, "empty audio"));
        }
        debug!(bytes = audio.len(), voice, "speech synthesized");
        Ok(audio.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_returns_audio_bytes() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/audio/speech"))
            .and(body_partial_json(json!({"model": "tts-1", "voice": "nova", "input": "Ready!"})))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0xFF, 0xF3, 0x01]))
            .mount(&server)
            .await;

        let speech = HttpSpeech::new(reqwest::Client::new(), &server.uri(), Some("k".into()), "tts-1");
        let audio = speech.synthesize("Ready!", "nova").await.unwrap();
        assert_eq!(audio, vec![0xFF, 0xF3, 0x01]);
    }

    #[tokio::test]
    async fn test_server_error_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let speech = HttpSpeech::new(reqwest::Client::new(), &server.uri(), Some("k".into()), "tts-1");
        assert!(matches!(
            speech.synthesize("hi", "nova").await,
            Err(ServiceError::Status { .. })
        ));
    }
}
