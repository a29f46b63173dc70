//! JSON HTTP API for the Crimefiles interrogation engine.
//!
//! Exposes an axum [`Router`] over an [`Interrogator`]. TLS and payment
//! gating are the caller's responsibility.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/cases/{case_id}/suspects/{suspect_id}/messages` | Ask a question |
//! | `GET`  | `/cases/{case_id}/suspects/{suspect_id}/thread?userAddress=` | Resume the open thread |
//! | `POST` | `/admin/cases/{case_id}/threads/reset` | Basic auth |
//! | `POST` | `/admin/threads/{thread_id}/close` | Basic auth |
//! | `GET`  | `/health` | Liveness |

pub mod admin;
pub mod auth;
pub mod error;
pub mod interrogation;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use crimefiles_core::{
  generate::Generator,
  store::{CaseRepository, ThreadStore},
};
use crimefiles_dialogue::Interrogator;

pub use auth::AuthConfig;
pub use error::ApiError;

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all handlers.
pub struct AppState<S, G> {
  pub interrogator: Arc<Interrogator<S, G>>,
  pub auth:         Arc<AuthConfig>,
}

// `S` and `G` need not be `Clone`.
impl<S, G> Clone for AppState<S, G> {
  fn clone(&self) -> Self {
    Self {
      interrogator: Arc::clone(&self.interrogator),
      auth:         Arc::clone(&self.auth),
    }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the API router.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S, G>(state: AppState<S, G>) -> Router<()>
where
  S: ThreadStore + CaseRepository + 'static,
  G: Generator + 'static,
{
  Router::new()
    .route("/health", get(health))
    // Interrogation
    .route(
      "/cases/{case_id}/suspects/{suspect_id}/messages",
      post(interrogation::send::<S, G>),
    )
    .route(
      "/cases/{case_id}/suspects/{suspect_id}/thread",
      get(interrogation::open_thread::<S, G>),
    )
    // Admin
    .route("/admin/cases/{case_id}/threads/reset", post(admin::reset::<S, G>))
    .route("/admin/threads/{thread_id}/close", post(admin::close::<S, G>))
    .with_state(state)
}

async fn health() -> &'static str { "ok" }

#[cfg(test)]
mod tests;
