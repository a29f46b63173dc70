//! [`ChatCompletionsClient`]: a client for OpenAI-compatible
//! `/v1/chat/completions` endpoints.

use std::time::Duration;

use crimefiles_core::generate::{Generator, Turn};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

// ─── Wire types ──────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct ChatRequest<'a> {
  model:       &'a str,
  messages:    &'a [Turn],
  temperature: f32,
}

#[derive(Deserialize)]
struct ChatResponse {
  #[serde(default)]
  choices: Vec<Choice>,
  #[serde(default)]
  usage:   Option<Usage>,
}

#[derive(Deserialize)]
struct Choice {
  #[serde(default)]
  message: Option<ChoiceMessage>,
}

#[derive(Deserialize)]
struct ChoiceMessage {
  #[serde(default)]
  content: Option<String>,
}

#[derive(Deserialize)]
struct Usage {
  #[serde(default)]
  prompt_tokens:     u64,
  #[serde(default)]
  completion_tokens: u64,
  #[serde(default)]
  total_tokens:      u64,
}

// ─── Client ──────────────────────────────────────────────────────────────────

/// Sends role-tagged turns to a chat-completions endpoint and returns the
/// first choice's content.
///
/// Every request is bounded by the timeout given at construction.
#[derive(Clone)]
pub struct ChatCompletionsClient {
  http:     reqwest::Client,
  endpoint: String,
  api_key:  String,
  model:    String,
}

impl ChatCompletionsClient {
  pub fn new(
    base_url: &str,
    api_key: impl Into<String>,
    model: impl Into<String>,
    timeout: Duration,
  ) -> Result<Self> {
    let http = reqwest::Client::builder().timeout(timeout).build()?;
    Ok(Self {
      http,
      endpoint: format!("{}/v1/chat/completions", base_url.trim_end_matches('/')),
      api_key: api_key.into(),
      model: model.into(),
    })
  }

  pub fn endpoint(&self) -> &str { &self.endpoint }

  pub async fn complete(&self, turns: &[Turn], temperature: f32) -> Result<String> {
    tracing::debug!(turns = turns.len(), model = %self.model, "requesting chat completion");

    let response = self
      .http
      .post(&self.endpoint)
      .bearer_auth(&self.api_key)
      .json(&ChatRequest { model: &self.model, messages: turns, temperature })
      .send()
      .await?;

    let status = response.status();
    if !status.is_success() {
      let body = response.text().await.unwrap_or_default();
      return Err(Error::Status { status: status.as_u16(), body });
    }

    let parsed: ChatResponse = response.json().await?;
    if let Some(usage) = &parsed.usage {
      tracing::debug!(
        prompt_tokens = usage.prompt_tokens,
        completion_tokens = usage.completion_tokens,
        total_tokens = usage.total_tokens,
        "chat completion usage"
      );
    }

    parsed
      .choices
      .into_iter()
      .next()
      .and_then(|c| c.message)
      .and_then(|m| m.content)
      .map(|text| text.trim().to_owned())
      .filter(|text| !text.is_empty())
      .ok_or(Error::EmptyCompletion)
  }
}

impl Generator for ChatCompletionsClient {
  type Error = Error;

  async fn generate(&self, turns: &[Turn], temperature: f32) -> Result<String> {
    self.complete(turns, temperature).await
  }
}
