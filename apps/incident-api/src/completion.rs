//! Chat-completion client
//!
//! The pipeline only sees the [`CompletionService`] trait; production uses
//! [`OpenAiCompletion`] against any OpenAI-compatible `/chat/completions`
//! endpoint, tests plug in a scripted implementation.

use std::time::Duration;

use async_trait::async_trait;
use incident_core::Prompt;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("Completion request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Completion service returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Completion reply has no choices")]
    EmptyChoices,

    #[error("Completion reply has no message content")]
    EmptyContent,
}

/// One system + user exchange
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionRequest {
    pub system: String,
    pub user: String,
    /// Ask the service for a JSON object reply
    pub json_response: bool,
}

impl CompletionRequest {
    pub fn new(prompt: Prompt, json_response: bool) -> Self {
        Self {
            system: prompt.system,
            user: prompt.user,
            json_response,
        }
    }
}

#[async_trait]
pub trait CompletionService: Send + Sync {
    /// Text content of the first choice
    async fn complete(&self, request: CompletionRequest) -> Result<String, CompletionError>;
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// OpenAI-compatible chat completions over HTTPS
pub struct OpenAiCompletion {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
}

impl OpenAiCompletion {
    /// `base_url` is the API root, e.g. `https://api.openai.com/v1`
    pub fn new(
        base_url: &str,
        api_key: impl Into<String>,
        model: impl Into<String>,
        timeout: Option<Duration>,
    ) -> Result<Self, CompletionError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
            endpoint: format!("{}/chat/completions", base_url.trim_end_matches('/')),
            api_key: api_key.into(),
            model: model.into(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl CompletionService for OpenAiCompletion {
    async fn complete(&self, request: CompletionRequest) -> Result<String, CompletionError> {
        let body = ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: &request.system,
                },
                ChatMessage {
                    role: "user",
                    content: &request.user,
                },
            ],
            response_format: request.json_response.then_some(ResponseFormat {
                kind: "json_object",
            }),
        };

        debug!(endpoint = %self.endpoint, model = %self.model, "Sending completion request");
        let res = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(CompletionError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ChatResponse = res.json().await?;
        let choice = parsed
            .choices
            .into_iter()
            .next()
            .ok_or(CompletionError::EmptyChoices)?;
        choice
            .message
            .content
            .filter(|content| !content.trim().is_empty())
            .ok_or(CompletionError::EmptyContent)
    }
}
