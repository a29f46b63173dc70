//! Router tests driven with `tower::ServiceExt::oneshot` over an in-memory
//! store and the scripted responder.

use std::sync::Arc;

use argon2::{Argon2, PasswordHasher, password_hash::SaltString};
use axum::{
  Router,
  body::Body,
  http::{Request, StatusCode, header},
};
use base64::{Engine as _, engine::general_purpose::STANDARD as B64};
use crimefiles_core::case::{CaseFile, CaseNarrative, SuspectProfile};
use crimefiles_dialogue::{DialogueSettings, Interrogator};
use crimefiles_llm::ScriptedResponder;
use crimefiles_store_sqlite::SqliteStore;
use rand_core::OsRng;
use serde_json::{Value, json};
use tower::ServiceExt as _;
use uuid::Uuid;

use crate::{AppState, AuthConfig, api_router};

const CASE_ID: &str = "b4fa1f9a-ef3f-4f39-9b65-9a6f35288968";
const MAYA: &str = "c28bf9a2-9e2c-4b3c-8d4a-7f45ba9cd123";

fn case_file() -> CaseFile {
  CaseFile {
    case:     CaseNarrative {
      case_id:             CASE_ID.into(),
      title:               "The Crimson Kiss".into(),
      excerpt:             "A tycoon is found dead in his study.".into(),
      story:               "Arnav Sharma was found dead at midnight.".into(),
      hints:               vec![],
      timeline:            None,
      solution_suspect_id: None,
    },
    suspects: vec![SuspectProfile {
      suspect_id:  MAYA.into(),
      case_id:     CASE_ID.into(),
      name:        "Maya Singh".into(),
      age:         29,
      occupation:  "Personal secretary".into(),
      gender:      "F".into(),
      description: None,
      traits:      vec![],
      mannerisms:  vec![],
      whereabouts: vec![],
      brief:       None,
      is_culprit:  false,
    }],
  }
}

async fn app() -> Router {
  let store = SqliteStore::open_in_memory().await.unwrap();
  store.import_case(case_file()).await.unwrap();

  let salt = SaltString::generate(&mut OsRng);
  let hash = Argon2::default()
    .hash_password(b"secret", &salt)
    .unwrap()
    .to_string();

  api_router(AppState {
    interrogator: Arc::new(Interrogator::new(
      store,
      ScriptedResponder,
      DialogueSettings::default(),
    )),
    auth:         Arc::new(AuthConfig {
      username:      "admin".to_string(),
      password_hash: hash,
    }),
  })
}

fn admin_auth() -> String {
  format!("Basic {}", B64.encode("admin:secret"))
}

async fn call(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
  let resp = app.clone().oneshot(req).await.unwrap();
  let status = resp.status();
  let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
  let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
  (status, body)
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
  Request::builder()
    .method("POST")
    .uri(uri)
    .header(header::CONTENT_TYPE, "application/json")
    .body(Body::from(body.to_string()))
    .unwrap()
}

fn messages_uri() -> String {
  format!("/cases/{CASE_ID}/suspects/{MAYA}/messages")
}

fn ask(question: &str) -> Request<Body> {
  post_json(
    &messages_uri(),
    json!({ "userAddress": "0xABC", "userMessage": question }),
  )
}

// ─── Health ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn health_is_ok() {
  let app = app().await;
  let resp = app
    .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
    .await
    .unwrap();
  assert_eq!(resp.status(), StatusCode::OK);
  let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
  assert_eq!(&bytes[..], b"ok");
}

// ─── Messages ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn send_message_returns_reply_and_thread() {
  let app = app().await;
  let (status, body) = call(&app, ask("Where were you at 11:30 PM?")).await;

  assert_eq!(status, StatusCode::OK);
  assert!(!body["replyText"].as_str().unwrap().is_empty());
  assert!(Uuid::parse_str(body["threadId"].as_str().unwrap()).is_ok());
  assert_eq!(body["claims"]["mentionsTime"], true);
  assert!(body["consistency"].as_f64().is_some());
}

#[tokio::test]
async fn thread_view_follows_the_conversation() {
  let app = app().await;
  let thread_uri = format!("/cases/{CASE_ID}/suspects/{MAYA}/thread?userAddress=0xabc");
  let get = |uri: &str| Request::builder().uri(uri).body(Body::empty()).unwrap();

  let (status, body) = call(&app, get(&thread_uri)).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body, json!({ "thread": null, "messages": [] }));

  let (_, sent) = call(&app, ask("Where were you at 11:30 PM?")).await;
  let (status, body) = call(&app, get(&thread_uri)).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["thread"]["threadId"], sent["threadId"]);
  assert_eq!(body["thread"]["status"], "open");
  let messages = body["messages"].as_array().unwrap();
  assert_eq!(messages.len(), 2);
  assert_eq!(messages[0]["role"], "user");
  assert_eq!(messages[1]["role"], "assistant");
}

#[tokio::test]
async fn empty_message_is_400() {
  let app = app().await;
  let (status, body) = call(&app, ask("   ")).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert!(body["error"].is_string());
}

#[tokio::test]
async fn missing_address_is_401() {
  let app = app().await;
  let req = post_json(&messages_uri(), json!({ "userMessage": "Where were you?" }));
  let (status, _) = call(&app, req).await;
  assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn unknown_fields_are_rejected() {
  let app = app().await;
  let req = post_json(
    &messages_uri(),
    json!({ "userAddress": "0xabc", "userMessage": "hi", "threadId": "x" }),
  );
  let (status, body) = call(&app, req).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert!(body["error"].as_str().unwrap().contains("threadId"));
}

#[tokio::test]
async fn unknown_suspect_is_404() {
  let app = app().await;
  let req = post_json(
    &format!("/cases/{CASE_ID}/suspects/nobody/messages"),
    json!({ "userAddress": "0xabc", "userMessage": "hi" }),
  );
  let (status, _) = call(&app, req).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
}

// ─── Admin ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn admin_requires_credentials() {
  let app = app().await;
  let req = Request::builder()
    .method("POST")
    .uri(format!("/admin/cases/{CASE_ID}/threads/reset"))
    .body(Body::empty())
    .unwrap();
  let resp = app.oneshot(req).await.unwrap();
  assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
  assert!(resp.headers().contains_key(header::WWW_AUTHENTICATE));
}

#[tokio::test]
async fn admin_reset_purges_threads() {
  let app = app().await;
  call(&app, ask("Where were you?")).await;

  let reset = || {
    Request::builder()
      .method("POST")
      .uri(format!("/admin/cases/{CASE_ID}/threads/reset"))
      .header(header::AUTHORIZATION, admin_auth())
      .body(Body::empty())
      .unwrap()
  };
  let (status, body) = call(&app, reset()).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body, json!({ "purged": 1 }));

  let (_, body) = call(&app, reset()).await;
  assert_eq!(body, json!({ "purged": 0 }));
}

#[tokio::test]
async fn admin_close_thread() {
  let app = app().await;
  let (_, sent) = call(&app, ask("Where were you?")).await;
  let thread_id = sent["threadId"].as_str().unwrap().to_owned();

  let close = |id: &str| {
    Request::builder()
      .method("POST")
      .uri(format!("/admin/threads/{id}/close"))
      .header(header::AUTHORIZATION, admin_auth())
      .body(Body::empty())
      .unwrap()
  };

  let (status, body) = call(&app, close(&thread_id)).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["status"], "closed");

  let (status, _) = call(&app, close(&Uuid::new_v4().to_string())).await;
  assert_eq!(status, StatusCode::NOT_FOUND);

  // the next question opens a fresh thread
  let (_, again) = call(&app, ask("Where were you?")).await;
  assert_ne!(again["threadId"], sent["threadId"]);
}
