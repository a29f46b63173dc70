//! Error types for `crimefiles-llm`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("http error: {0}")]
  Http(#[from] reqwest::Error),

  #[error("model endpoint returned {status}: {body}")]
  Status { status: u16, body: String },

  #[error("model returned an empty completion")]
  EmptyCompletion,

  #[error("configuration error: {0}")]
  Configuration(String),
}

impl Error {
  /// True when the request gave up waiting on the endpoint.
  pub fn is_timeout(&self) -> bool {
    matches!(self, Error::Http(e) if e.is_timeout())
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
