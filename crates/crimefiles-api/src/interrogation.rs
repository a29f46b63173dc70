//! Handlers for the player-facing interrogation endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/cases/{case_id}/suspects/{suspect_id}/messages` | Body: `{"userAddress","userMessage"}` |
//! | `GET`  | `/cases/{case_id}/suspects/{suspect_id}/thread` | `?userAddress=` |

use axum::{
  Json,
  extract::{Path, Query, State, rejection::JsonRejection},
};
use crimefiles_core::{
  generate::Generator,
  store::{CaseRepository, ThreadStore},
};
use crimefiles_dialogue::{InterrogationReply, ThreadView};
use serde::Deserialize;

use crate::{AppState, error::ApiError};

#[derive(Debug, Deserialize)]
pub struct SuspectPath {
  pub case_id:    String,
  pub suspect_id: String,
}

// ─── Send ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SendMessageBody {
  /// Absent or blank means the player is not signed in.
  #[serde(default)]
  pub user_address: Option<String>,
  pub user_message: String,
}

/// `POST /cases/{case_id}/suspects/{suspect_id}/messages`
pub async fn send<S, G>(
  State(state): State<AppState<S, G>>,
  Path(path): Path<SuspectPath>,
  body: Result<Json<SendMessageBody>, JsonRejection>,
) -> Result<Json<InterrogationReply>, ApiError>
where
  S: ThreadStore + CaseRepository,
  G: Generator,
{
  let Json(body) = body.map_err(|e| ApiError::BadRequest(e.body_text()))?;
  let reply = state
    .interrogator
    .send_message(
      body.user_address.as_deref().unwrap_or_default(),
      &path.case_id,
      &path.suspect_id,
      &body.user_message,
    )
    .await?;
  Ok(Json(reply))
}

// ─── Open thread ──────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThreadParams {
  #[serde(default)]
  pub user_address: Option<String>,
}

/// `GET /cases/{case_id}/suspects/{suspect_id}/thread?userAddress=<address>`
pub async fn open_thread<S, G>(
  State(state): State<AppState<S, G>>,
  Path(path): Path<SuspectPath>,
  Query(params): Query<ThreadParams>,
) -> Result<Json<ThreadView>, ApiError>
where
  S: ThreadStore + CaseRepository,
  G: Generator,
{
  let view = state
    .interrogator
    .get_open_thread(
      params.user_address.as_deref().unwrap_or_default(),
      &path.case_id,
      &path.suspect_id,
    )
    .await?;
  Ok(Json(view))
}
