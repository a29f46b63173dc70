//! The orchestrator's error taxonomy.

use thiserror::Error;
use uuid::Uuid;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error)]
pub enum DialogueError {
  #[error("message is empty")]
  EmptyInput,

  #[error("a player address is required")]
  Unauthenticated,

  #[error("case {0} not found")]
  CaseNotFound(String),

  #[error("suspect {suspect_id} not found in case {case_id}")]
  SuspectNotFound { case_id: String, suspect_id: String },

  #[error("thread {0} not found")]
  ThreadNotFound(Uuid),

  /// The model failed or timed out. The player's turn is already persisted.
  #[error("reply generation failed: {0}")]
  UpstreamGeneration(#[source] BoxError),

  #[error("suspect cannot be rendered: {0}")]
  Configuration(#[source] crimefiles_core::Error),

  #[error("store error: {0}")]
  Store(#[source] BoxError),
}

impl DialogueError {
  pub fn is_not_found(&self) -> bool {
    matches!(
      self,
      Self::CaseNotFound(_) | Self::SuspectNotFound { .. } | Self::ThreadNotFound(_)
    )
  }

  /// Caller mistakes, as opposed to failures of the service.
  pub fn is_player_error(&self) -> bool {
    matches!(self, Self::EmptyInput | Self::Unauthenticated) || self.is_not_found()
  }

  pub(crate) fn store<E>(e: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Store(Box::new(e))
  }
}

pub type Result<T, E = DialogueError> = std::result::Result<T, E>;
