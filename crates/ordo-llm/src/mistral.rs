//! Mistral chat-completions client.
//!
//! Speaks the OpenAI-compatible `/chat/completions` API with bearer auth.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use ordo_contracts::{
    agent::{ChatMessage, Role},
    error::{OrdoError, OrdoResult},
};
use ordo_core::{config::LlmSettings, traits::LanguageModel};

// OpenAI-compatible request/response
#[derive(Debug, Serialize)]
pub(crate) struct ChatRequest {
    model: String,
    messages: Vec<WireMessage>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub(crate) struct WireMessage {
    role: &'static str,
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessageResponse,
}

#[derive(Deserialize)]
struct ChatMessageResponse {
    content: Option<String>,
}

pub struct MistralClient {
    api_key: String,
    model: String,
    base_url: String,
    temperature: f32,
    max_tokens: u32,
    client: reqwest::Client,
}

impl MistralClient {
    /// Build a client from `settings`.
    ///
    /// Returns `Ok(None)` when no API key is configured, and
    /// `OrdoError::ModelUnavailable` if the HTTP client cannot be built.
    pub fn from_settings(settings: &LlmSettings) -> OrdoResult<Option<Self>> {
        let Some(api_key) = settings.api_key() else {
            return Ok(None);
        };

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_seconds))
            .build()
            .map_err(|e| OrdoError::ModelUnavailable {
                reason: format!("failed to build HTTP client: {}", e),
            })?;

        Ok(Some(Self {
            api_key: api_key.to_string(),
            model: settings.model.clone(),
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            temperature: settings.temperature,
            max_tokens: settings.max_tokens,
            client,
        }))
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub(crate) fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    /// The request body for one call: the system prompt first, then `messages`.
    pub(crate) fn request_body(&self, system_prompt: &str, messages: &[ChatMessage]) -> ChatRequest {
        let mut wire = Vec::with_capacity(messages.len() + 1);
        wire.push(WireMessage {
            role: "system",
            content: system_prompt.to_string(),
        });
        wire.extend(messages.iter().map(|m| WireMessage {
            role: wire_role(m.role),
            content: m.content.clone(),
        }));

        ChatRequest {
            model: self.model.clone(),
            messages: wire,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        }
    }
}

fn wire_role(role: Role) -> &'static str {
    match role {
        Role::System => "system",
        Role::Human => "user",
        Role::Assistant => "assistant",
    }
}

#[async_trait]
impl LanguageModel for MistralClient {
    async fn send(&self, system_prompt: &str, messages: &[ChatMessage]) -> OrdoResult<String> {
        let body = self.request_body(system_prompt, messages);
        debug!(model = %self.model, messages = body.messages.len(), "sending chat completion");

        let res = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| OrdoError::ModelCall {
                reason: format!("request failed: {}", e),
            })?;

        if !res.status().is_success() {
            let status = res.status();
            let text = res.text().await.unwrap_or_default();
            warn!(status = %status, "model API returned an error");
            return Err(OrdoError::ModelCall {
                reason: format!("API error {}: {}", status, text),
            });
        }

        let parsed: ChatResponse = res.json().await.map_err(|e| OrdoError::ModelCall {
            reason: format!("response parse failed: {}", e),
        })?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| OrdoError::ModelCall {
                reason: "response contained no message content".to_string(),
            })
    }
}
