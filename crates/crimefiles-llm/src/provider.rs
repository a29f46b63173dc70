//! [`Provider`] is the configured collaborator behind one concrete type.

use crimefiles_core::generate::{Generator, Turn};

use crate::{
  ChatCompletionsClient, Error, LlmConfig, ProviderKind, Result, ScriptedResponder,
};

#[derive(Clone)]
pub enum Provider {
  ChatCompletions(ChatCompletionsClient),
  Scripted(ScriptedResponder),
}

impl Provider {
  /// Build the provider named by `config.provider`.
  ///
  /// `chat_completions` needs both `base_url` and `api_key`.
  pub fn from_config(config: &LlmConfig) -> Result<Self> {
    match config.provider {
      ProviderKind::Scripted => Ok(Self::Scripted(ScriptedResponder)),
      ProviderKind::ChatCompletions => {
        let base_url = non_blank(config.base_url.as_deref())
          .ok_or_else(|| Error::Configuration("llm.base_url is not set".into()))?;
        let api_key = non_blank(config.api_key.as_deref())
          .ok_or_else(|| Error::Configuration("llm.api_key is not set".into()))?;
        let client =
          ChatCompletionsClient::new(base_url, api_key, config.model.clone(), config.timeout())?;
        Ok(Self::ChatCompletions(client))
      }
    }
  }

  pub fn kind(&self) -> ProviderKind {
    match self {
      Self::ChatCompletions(_) => ProviderKind::ChatCompletions,
      Self::Scripted(_) => ProviderKind::Scripted,
    }
  }
}

impl Generator for Provider {
  type Error = Error;

  async fn generate(&self, turns: &[Turn], temperature: f32) -> Result<String> {
    match self {
      Self::ChatCompletions(client) => client.complete(turns, temperature).await,
      Self::Scripted(responder) => Ok(responder.respond(turns)),
    }
  }
}

fn non_blank(s: Option<&str>) -> Option<&str> {
  s.map(str::trim).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn scripted_needs_no_credentials() {
    let config = LlmConfig { provider: ProviderKind::Scripted, ..LlmConfig::default() };
    let provider = Provider::from_config(&config).unwrap();
    assert_eq!(provider.kind(), ProviderKind::Scripted);
  }

  #[test]
  fn chat_completions_requires_base_url_and_key() {
    let missing_url = LlmConfig { api_key: Some("sk".into()), ..LlmConfig::default() };
    assert!(matches!(
      Provider::from_config(&missing_url),
      Err(Error::Configuration(_))
    ));

    let blank_key = LlmConfig {
      base_url: Some("https://asi1.example".into()),
      api_key: Some("  ".into()),
      ..LlmConfig::default()
    };
    assert!(matches!(
      Provider::from_config(&blank_key),
      Err(Error::Configuration(_))
    ));
  }

  #[test]
  fn chat_completions_endpoint_is_derived_from_base_url() {
    let config = LlmConfig {
      base_url: Some("https://asi1.example/".into()),
      api_key: Some("sk".into()),
      ..LlmConfig::default()
    };
    match Provider::from_config(&config).unwrap() {
      Provider::ChatCompletions(client) => {
        assert_eq!(client.endpoint(), "https://asi1.example/v1/chat/completions");
      }
      Provider::Scripted(_) => panic!("expected the HTTP client"),
    }
  }

  #[tokio::test]
  async fn scripted_provider_generates() {
    let provider = Provider::Scripted(ScriptedResponder);
    let reply = provider.generate(&[Turn::user("Where were you?")], 0.6).await.unwrap();
    assert_eq!(reply, crate::scripted::TERSE);
  }
}
