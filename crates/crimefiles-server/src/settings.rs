//! Server configuration: a TOML file overlaid with `CRIMEFILES_*` environment
//! variables.
//!
//! Nested keys use a double underscore, so `CRIMEFILES_LLM__API_KEY` sets
//! `llm.api_key`.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use crimefiles_dialogue::DialogueSettings;
use crimefiles_llm::LlmConfig;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:                String,
  #[serde(default = "default_port")]
  pub port:                u16,
  #[serde(default = "default_store_path")]
  pub store_path:          PathBuf,
  /// Empty disables the admin routes.
  #[serde(default)]
  pub admin_username:      String,
  /// argon2 PHC string; see `--hash-password`.
  #[serde(default)]
  pub admin_password_hash: String,
  #[serde(default)]
  pub llm:                 LlmConfig,
}

impl ServerConfig {
  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }

  pub fn dialogue_settings(&self) -> DialogueSettings {
    DialogueSettings {
      temperature: self.llm.temperature,
      generation_timeout: self.llm.timeout(),
      ..DialogueSettings::default()
    }
  }
}

fn default_host() -> String { "127.0.0.1".to_owned() }

fn default_port() -> u16 { 4020 }

fn default_store_path() -> PathBuf { PathBuf::from("crimefiles.db") }

/// Read `path` (if it exists) and the environment into a [`ServerConfig`].
pub fn load(path: &Path) -> anyhow::Result<ServerConfig> {
  let settings = config::Config::builder()
    .add_source(config::File::from(path).required(false))
    .add_source(environment())
    .build()
    .context("failed to read config file")?;

  settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")
}

fn environment() -> config::Environment {
  config::Environment::with_prefix("CRIMEFILES")
    .prefix_separator("_")
    .separator("__")
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}

#[cfg(test)]
mod tests {
  use std::time::Duration;

  use config::{Config, File, FileFormat, Map};
  use crimefiles_llm::ProviderKind;

  use super::*;

  fn parse(toml: &str, env: &[(&str, &str)]) -> ServerConfig {
    let env: Map<String, String> = env
      .iter()
      .map(|(k, v)| (k.to_string(), v.to_string()))
      .collect();
    Config::builder()
      .add_source(File::from_str(toml, FileFormat::Toml))
      .add_source(environment().source(Some(env)))
      .build()
      .unwrap()
      .try_deserialize()
      .unwrap()
  }

  #[test]
  fn empty_file_uses_defaults() {
    let cfg = parse("", &[]);
    assert_eq!(cfg.address(), "127.0.0.1:4020");
    assert_eq!(cfg.store_path, PathBuf::from("crimefiles.db"));
    assert!(cfg.admin_username.is_empty());
    assert_eq!(cfg.llm.provider, ProviderKind::ChatCompletions);
    assert_eq!(cfg.llm.model, "asi1-mini");
  }

  #[test]
  fn file_values_are_read() {
    let cfg = parse(
      r#"
        port = 9000
        admin_username = "inspector"

        [llm]
        provider = "scripted"
        temperature = 0.2
        timeout_secs = 5
      "#,
      &[],
    );
    assert_eq!(cfg.port, 9000);
    assert_eq!(cfg.admin_username, "inspector");
    assert_eq!(cfg.llm.provider, ProviderKind::Scripted);

    let settings = cfg.dialogue_settings();
    assert_eq!(settings.temperature, 0.2);
    assert_eq!(settings.generation_timeout, Duration::from_secs(5));
    assert_eq!(settings.history_window, DialogueSettings::default().history_window);
  }

  #[test]
  fn environment_overrides_the_file() {
    let cfg = parse(
      "port = 9000\n[llm]\nmodel = \"from-file\"\n",
      &[
        ("CRIMEFILES_PORT", "9100"),
        ("CRIMEFILES_LLM__API_KEY", "sk-test"),
        ("CRIMEFILES_LLM__MODEL", "from-env"),
      ],
    );
    assert_eq!(cfg.port, 9100);
    assert_eq!(cfg.llm.api_key.as_deref(), Some("sk-test"));
    assert_eq!(cfg.llm.model, "from-env");
  }

  #[test]
  fn tilde_expands_to_home() {
    let Ok(home) = std::env::var("HOME") else { return };
    assert_eq!(
      expand_tilde(Path::new("~/crimefiles.db")),
      PathBuf::from(home).join("crimefiles.db")
    );
    assert_eq!(expand_tilde(Path::new("/tmp/x.db")), PathBuf::from("/tmp/x.db"));
  }
}
