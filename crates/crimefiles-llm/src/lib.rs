//! Language-model collaborators for the Crimefiles interrogation engine.
//!
//! Two [`Generator`](crimefiles_core::generate::Generator) implementations:
//!
//! - [`ChatCompletionsClient`] talks to any OpenAI-compatible
//!   `/v1/chat/completions` endpoint.
//! - [`ScriptedResponder`] answers offline from keyword cues, for local play
//!   and tests.
//!
//! [`Provider`] picks one of them from an [`LlmConfig`].

#![allow(async_fn_in_trait)]

pub mod chat;
pub mod config;
pub mod error;
pub mod provider;
pub mod scripted;

pub use chat::ChatCompletionsClient;
pub use config::{LlmConfig, ProviderKind};
pub use error::{Error, Result};
pub use provider::Provider;
pub use scripted::ScriptedResponder;
