//! The `[llm]` configuration table.

use std::time::Duration;

use serde::Deserialize;

/// Which collaborator answers for the suspects.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
  /// An OpenAI-compatible HTTP endpoint.
  #[default]
  ChatCompletions,
  /// The offline keyword responder.
  Scripted,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LlmConfig {
  #[serde(default)]
  pub provider:     ProviderKind,
  #[serde(default)]
  pub base_url:     Option<String>,
  #[serde(default)]
  pub api_key:      Option<String>,
  #[serde(default = "default_model")]
  pub model:        String,
  #[serde(default = "default_temperature")]
  pub temperature:  f32,
  #[serde(default = "default_timeout_secs")]
  pub timeout_secs: u64,
}

impl LlmConfig {
  pub fn timeout(&self) -> Duration { Duration::from_secs(self.timeout_secs) }
}

impl Default for LlmConfig {
  fn default() -> Self {
    Self {
      provider:     ProviderKind::default(),
      base_url:     None,
      api_key:      None,
      model:        default_model(),
      temperature:  default_temperature(),
      timeout_secs: default_timeout_secs(),
    }
  }
}

fn default_model() -> String { "asi1-mini".to_owned() }

fn default_temperature() -> f32 { 0.6 }

fn default_timeout_secs() -> u64 { 30 }
