//! Client for OpenAI-compatible `/chat/completions` endpoints.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::AgentError;
use crate::sse;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    #[must_use]
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Sampling and transport options for one completion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChatOptions {
    pub temperature: f32,
    pub max_tokens: u32,
    /// Request a server-sent-event stream; the reply is still returned whole.
    pub stream: bool,
    /// Provider extension toggling the model's reasoning phase.
    pub enable_thinking: bool,
}

impl ChatOptions {
    /// Deterministic, short replies for tool routing.
    #[must_use]
    pub fn tool_routing() -> Self {
        Self {
            temperature: 0.1,
            max_tokens: 4000,
            stream: false,
            enable_thinking: false,
        }
    }

    /// Long-form planning with reasoning enabled. Providers only allow
    /// thinking on streamed requests.
    #[must_use]
    pub fn planning() -> Self {
        Self {
            temperature: 0.2,
            max_tokens: 8000,
            stream: true,
            enable_thinking: true,
        }
    }
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
    max_tokens: u32,
    stream: bool,
    enable_thinking: bool,
}

#[derive(Deserialize)]
struct CompletionResponse {
    choices: Vec<CompletionChoice>,
}

#[derive(Deserialize)]
struct CompletionChoice {
    message: CompletionMessage,
}

#[derive(Deserialize)]
struct CompletionMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct StreamChunk {
    #[serde(default)]
    choices: Vec<StreamChoice>,
}

#[derive(Deserialize)]
struct StreamChoice {
    #[serde(default)]
    delta: StreamDelta,
}

#[derive(Default, Deserialize)]
struct StreamDelta {
    content: Option<String>,
}

/// Chat completion client with bearer-token auth.
pub struct ChatClient {
    client: Client,
    url: String,
    api_key: String,
    model: String,
}

impl ChatClient {
    /// `base_url` is the API root, e.g. `https://api.example.com/v1`.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(
        base_url: &str,
        api_key: &str,
        model: &str,
        timeout_secs: u64,
    ) -> Result<Self, AgentError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("ermap/0.1 (emergency-dispatch)")
            .build()?;

        Ok(Self {
            client,
            url: format!("{}/chat/completions", base_url.trim_end_matches('/')),
            api_key: api_key.to_owned(),
            model: model.to_owned(),
        })
    }

    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Sends `messages` and returns the assistant's reply text.
    ///
    /// Streamed replies are accumulated from each chunk's `delta.content`
    /// until `[DONE]`.
    ///
    /// # Errors
    ///
    /// - [`AgentError::Http`] on network failure.
    /// - [`AgentError::Status`] on a non-2xx reply.
    /// - [`AgentError::Deserialize`] if the body is not a completion.
    /// - [`AgentError::EmptyCompletion`] if the reply has no text.
    pub async fn complete(
        &self,
        messages: &[ChatMessage],
        options: &ChatOptions,
    ) -> Result<String, AgentError> {
        let request = CompletionRequest {
            model: &self.model,
            messages,
            temperature: options.temperature,
            max_tokens: options.max_tokens,
            stream: options.stream,
            enable_thinking: options.enable_thinking,
        };

        let response = self
            .client
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AgentError::Status {
                service: "chat completion",
                status: status.as_u16(),
                body,
            });
        }

        let streamed = sse::is_event_stream(&response);
        let body = response.text().await?;
        let content = if streamed {
            accumulate_stream(&body)?
        } else {
            let parsed: CompletionResponse =
                serde_json::from_str(&body).map_err(|e| AgentError::Deserialize {
                    context: "chat completion".to_string(),
                    source: e,
                })?;
            parsed
                .choices
                .into_iter()
                .next()
                .and_then(|c| c.message.content)
                .unwrap_or_default()
        };

        if content.trim().is_empty() {
            return Err(AgentError::EmptyCompletion);
        }

        tracing::debug!(
            model = %self.model,
            messages = messages.len(),
            chars = content.chars().count(),
            streamed,
            "chat completion received"
        );
        Ok(content)
    }
}

fn accumulate_stream(body: &str) -> Result<String, AgentError> {
    let mut content = String::new();
    for data in sse::data_events(body) {
        if data.trim() == "[DONE]" {
            break;
        }
        let chunk: StreamChunk =
            serde_json::from_str(&data).map_err(|e| AgentError::Deserialize {
                context: "chat completion stream chunk".to_string(),
                source: e,
            })?;
        for choice in chunk.choices {
            if let Some(piece) = choice.delta.content {
                content.push_str(&piece);
            }
        }
    }
    Ok(content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stream_skips_reasoning_only_chunks() {
        let body = concat!(
            "data: {\"choices\":[{\"delta\":{\"reasoning_content\":\"思考\"}}]}\n\n",
            "data: {\"choices\":[{\"delta\":{\"content\":\"第一\"}}]}\n\n",
            "data: {\"choices\":[{\"delta\":{\"content\":\"批次\"}}]}\n\n",
            "data: {\"choices\":[]}\n\n",
            "data: [DONE]\n\n",
        );
        assert_eq!(accumulate_stream(body).unwrap(), "第一批次");
    }

    #[test]
    fn message_serializes_lowercase_role() {
        let json = serde_json::to_value(ChatMessage::assistant("好的")).unwrap();
        assert_eq!(json, serde_json::json!({"role": "assistant", "content": "好的"}));
    }
}
