//! OpenAI-compatible chat completion client.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{trim_base, Oracle};
use crate::error::{ServiceError, ServiceResult};
use crate::models::ChatMessage;

const SERVICE: &str = "oracle";
const TEMPERATURE: f32 = 0.1;
const MAX_TOKENS: u32 = 500;

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<&'a ChatMessage>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Chat completions over HTTP (Groq by default).
pub struct ChatOracle {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
}

impl ChatOracle {
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
impl Oracle for ChatOracle {
    async fn complete(
        &self,
        system_prompt: &str,
        history: &[ChatMessage],
        message: &str,
    ) -> ServiceResult<String> {
        let api_key = self.api_key.as_deref().ok_or(ServiceError::MissingCredentials {
            service: SERVICE,
            variable: "GROQ_API_KEY",
        })?;

        let system = ChatMessage::system(system_prompt);
        let user = ChatMessage::user(message);
        let mut messages = Vec::with_capacity(history.len() + 2);
        messages.push(&system);
        messages.extend(history);
        messages.push(&user);

        let body = ChatRequest {
            model: &self.model,
            messages,
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .map_err(ServiceError::http(SERVICE))?;
        let response = ServiceError::check(SERVICE, response).await?;

        let parsed: ChatResponse = response.json().await.map_err(ServiceError::http(SERVICE))?;
        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| ServiceError::malformed(SERVICE, "no choices in completion"))?;

        debug!(chars = content.len(), "oracle replied");
        Ok(content)
    }
}
