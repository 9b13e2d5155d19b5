//! Model validation client.
//!
//! Defines the [`RequirementsModel`] trait and the OpenAI-compatible
//! implementation [`OpenAiValidator`].
//!
//! # Failure Handling
//!
//! A model call never fails past this module. Every outcome is a
//! [`Verdict`]:
//! - **`Parsed`** — the reply was JSON with `score`, `issues`, `suggestions`.
//! - **`Unparseable`** — the model answered, but not with the expected shape.
//! - **`CallFailed`** — missing key, transport, HTTP status, or envelope errors.
//!
//! Both degraded variants still convert into a well-formed
//! [`ValidationResult`] via [`Verdict::into_result`]. No retries are made.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

use crate::config::ModelConfig;
use crate::models::{Payload, ValidationResult};
use crate::prompt::{build_messages, ChatMessage};

const REQUIRED_KEYS: [&str; 3] = ["score", "issues", "suggestions"];

/// Outcome of one validation call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Parsed(ValidationResult),
    Unparseable { reason: String },
    CallFailed { reason: String },
}

impl Verdict {
    /// Converts the verdict into the response body, substituting the fixed
    /// fallbacks for degraded outcomes.
    pub fn into_result(self) -> ValidationResult {
        match self {
            Verdict::Parsed(result) => result,
            Verdict::Unparseable { .. } => ValidationResult {
                score: 0,
                issues: vec!["❌ Unable to parse requirements document".to_string()],
                suggestions: vec![
                    "Check if the input is a proper SRS / requirements document".to_string(),
                ],
            },
            Verdict::CallFailed { reason } => ValidationResult {
                score: 0,
                issues: vec![format!("❌ Model call failed: {}", reason)],
                suggestions: vec!["Check API key, model availability, and payload".to_string()],
            },
        }
    }
}

/// A backend able to score a requirements payload.
#[async_trait]
pub trait RequirementsModel: Send + Sync {
    /// Returns the model identifier (e.g. `"gpt-4o"`).
    fn model_name(&self) -> &str;

    /// Scores a payload. Infallible by contract; failures become degraded verdicts.
    async fn validate(&self, payload: &Payload) -> Verdict;
}

/// Errors raised while talking to the chat-completion API.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("API key not configured (set {0})")]
    MissingApiKey(String),
    #[error("request failed: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("API error {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("invalid response envelope: {0}")]
    Envelope(#[source] reqwest::Error),
    #[error("empty response from model")]
    EmptyReply,
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ReplyMessage,
}

#[derive(Debug, Deserialize)]
struct ReplyMessage {
    content: Option<String>,
}

/// Validator backed by an OpenAI-compatible `/chat/completions` endpoint.
pub struct OpenAiValidator {
    http: Client,
    config: ModelConfig,
    api_key: Option<String>,
}

impl OpenAiValidator {
    /// Creates a validator. The key is resolved by the caller at startup;
    /// `None` is accepted and turns every call into a `CallFailed` verdict.
    pub fn new(config: ModelConfig, api_key: Option<String>) -> anyhow::Result<Self> {
        let mut builder = Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let http = builder.build()?;
        Ok(Self {
            http,
            config,
            api_key,
        })
    }

    async fn complete(&self, payload: &Payload) -> Result<String, ModelError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| ModelError::MissingApiKey(self.config.api_key_env.clone()))?;

        let request = ChatCompletionRequest {
            model: &self.config.model,
            messages: build_messages(payload),
            temperature: self.config.temperature,
        };

        let url = format!(
            "{}/chat/completions",
            self.config.api_base.trim_end_matches('/')
        );
        tracing::debug!(%url, model = %self.config.model, kind = payload.kind(), "calling model");

        let response = self
            .http
            .post(&url)
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
            .map_err(ModelError::Transport)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ModelError::Status { status, body });
        }

        let envelope: ChatCompletionResponse =
            response.json().await.map_err(ModelError::Envelope)?;

        envelope
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or(ModelError::EmptyReply)
    }
}

#[async_trait]
impl RequirementsModel for OpenAiValidator {
    fn model_name(&self) -> &str {
        &self.config.model
    }

    async fn validate(&self, payload: &Payload) -> Verdict {
        match self.complete(payload).await {
            Ok(content) => match parse_reply(&content) {
                Ok(result) => Verdict::Parsed(result),
                Err(reason) => Verdict::Unparseable { reason },
            },
            Err(e) => Verdict::CallFailed {
                reason: e.to_string(),
            },
        }
    }
}

/// Parses the model's reply into a [`ValidationResult`].
///
/// All three keys must be present. `score` may be any JSON number; it is
/// truncated to an integer and clamped into `0..=100`.
pub fn parse_reply(content: &str) -> Result<ValidationResult, String> {
    let value: Value =
        serde_json::from_str(content.trim()).map_err(|e| format!("invalid JSON: {}", e))?;
    let object = value
        .as_object()
        .ok_or_else(|| "reply is not a JSON object".to_string())?;

    if let Some(key) = REQUIRED_KEYS.iter().find(|k| !object.contains_key(**k)) {
        return Err(format!("missing key: {}", key));
    }

    let score = object["score"]
        .as_i64()
        .or_else(|| object["score"].as_f64().map(|f| f as i64))
        .ok_or_else(|| "score is not a number".to_string())?;

    let strings = |key: &str| -> Result<Vec<String>, String> {
        serde_json::from_value(object[key].clone())
            .map_err(|_| format!("{} is not a list of strings", key))
    };

    Ok(ValidationResult {
        score: score.clamp(0, 100) as u8,
        issues: strings("issues")?,
        suggestions: strings("suggestions")?,
    })
}
