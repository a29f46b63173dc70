//! The language-model collaborator seam.

use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::thread::{Message, Role};

/// One role-tagged entry of a prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
  pub role:    Role,
  pub content: String,
}

impl Turn {
  pub fn system(content: impl Into<String>) -> Self {
    Self { role: Role::System, content: content.into() }
  }

  pub fn user(content: impl Into<String>) -> Self {
    Self { role: Role::User, content: content.into() }
  }

  pub fn assistant(content: impl Into<String>) -> Self {
    Self { role: Role::Assistant, content: content.into() }
  }
}

impl From<&Message> for Turn {
  fn from(m: &Message) -> Self {
    Self { role: m.role, content: m.content.clone() }
  }
}

/// Produces a reply for a list of turns.
///
/// Implementations should bound their own network timeouts; the orchestrator
/// additionally wraps every call in a deadline.
pub trait Generator: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  fn generate<'a>(
    &'a self,
    turns: &'a [Turn],
    temperature: f32,
  ) -> impl Future<Output = Result<String, Self::Error>> + Send + 'a;
}
