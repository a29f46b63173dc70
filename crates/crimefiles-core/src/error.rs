//! Error types for `crimefiles-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("suspect {suspect_id} does not belong to case {case_id}")]
  SuspectCaseMismatch { case_id: String, suspect_id: String },

  #[error("suspect {0} has no name")]
  UnnamedSuspect(String),

  #[error("case {case_id} flags more than one culprit: {suspects:?}")]
  MultipleCulprits {
    case_id:  String,
    suspects: Vec<String>,
  },

  #[error("case {case_id} names unknown solution suspect {suspect_id}")]
  UnknownSolution { case_id: String, suspect_id: String },

  #[error("unknown message role: {0:?}")]
  UnknownRole(String),

  #[error("unknown thread status: {0:?}")]
  UnknownThreadStatus(String),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
