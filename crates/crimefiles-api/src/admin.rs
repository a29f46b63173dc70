//! Handlers for `/admin` endpoints. Every handler requires [`Authenticated`].

use axum::{
  Json,
  extract::{Path, State},
};
use crimefiles_core::{
  generate::Generator,
  store::{CaseRepository, ThreadStore},
  thread::Thread,
};
use serde::Serialize;
use uuid::Uuid;

use crate::{AppState, auth::Authenticated, error::ApiError};

#[derive(Debug, Serialize)]
pub struct ResetResponse {
  pub purged: usize,
}

/// `POST /admin/cases/{case_id}/threads/reset`
pub async fn reset<S, G>(
  _auth: Authenticated,
  State(state): State<AppState<S, G>>,
  Path(case_id): Path<String>,
) -> Result<Json<ResetResponse>, ApiError>
where
  S: ThreadStore + CaseRepository,
  G: Generator,
{
  let purged = state.interrogator.reset_case_threads(&case_id).await?;
  Ok(Json(ResetResponse { purged }))
}

/// `POST /admin/threads/{thread_id}/close`. 404 if the thread is unknown.
pub async fn close<S, G>(
  _auth: Authenticated,
  State(state): State<AppState<S, G>>,
  Path(thread_id): Path<Uuid>,
) -> Result<Json<Thread>, ApiError>
where
  S: ThreadStore + CaseRepository,
  G: Generator,
{
  let thread = state.interrogator.close_thread(thread_id).await?;
  Ok(Json(thread))
}
