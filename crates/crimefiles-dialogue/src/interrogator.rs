//! [`Interrogator`]: one player question in, one suspect answer out.

use std::{
  sync::Arc,
  time::{Duration, Instant},
};

use crimefiles_core::{
  case::{CaseNarrative, SuspectProfile},
  context::{self, HISTORY_WINDOW},
  generate::{Generator, Turn},
  persona,
  signals::{ClaimFlags, KeywordExtractor, Lead, SignalExtractor, Signals},
  store::{CaseRepository, ThreadStore},
  thread::{Message, PlayerAddress, Role, Thread, ThreadKey},
};
use serde::Serialize;
use uuid::Uuid;

use crate::{DialogueError, Result};

// ─── Settings ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy)]
pub struct DialogueSettings {
  /// Sampling temperature passed on every generation call.
  pub temperature:        f32,
  /// Upper bound on a single generation call.
  pub generation_timeout: Duration,
  /// Prior turns kept in the context window.
  pub history_window:     usize,
}

impl Default for DialogueSettings {
  fn default() -> Self {
    Self {
      temperature:        0.6,
      generation_timeout: Duration::from_secs(30),
      history_window:     HISTORY_WINDOW,
    }
  }
}

// ─── Results ─────────────────────────────────────────────────────────────────

/// What the player gets back for one question.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InterrogationReply {
  pub reply_text:  String,
  pub thread_id:   Uuid,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub claims:      Option<ClaimFlags>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub leads:       Option<Vec<Lead>>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub consistency: Option<f64>,
}

/// The open thread for a triple, with its transcript.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThreadView {
  pub thread:   Option<Thread>,
  pub messages: Vec<Message>,
}

// ─── Turn states ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy)]
enum TurnState {
  Validated,
  ThreadResolved,
  UserTurnPersisted,
  ModelInvoked,
  AssistantTurnPersisted,
}

impl TurnState {
  fn as_str(self) -> &'static str {
    match self {
      Self::Validated => "validated",
      Self::ThreadResolved => "thread_resolved",
      Self::UserTurnPersisted => "user_turn_persisted",
      Self::ModelInvoked => "model_invoked",
      Self::AssistantTurnPersisted => "assistant_turn_persisted",
    }
  }
}

#[derive(Debug, thiserror::Error)]
#[error("model returned a blank reply")]
struct BlankReply;

// ─── Interrogator ────────────────────────────────────────────────────────────

/// Runs interrogation turns against a store and a generator.
///
/// Holds no per-request state; share it behind an `Arc`.
pub struct Interrogator<S, G> {
  store:     S,
  generator: G,
  extractor: Arc<dyn SignalExtractor>,
  settings:  DialogueSettings,
}

impl<S, G> Interrogator<S, G>
where
  S: ThreadStore + CaseRepository,
  G: Generator,
{
  /// Build an interrogator using the keyword extractor for signals.
  pub fn new(store: S, generator: G, settings: DialogueSettings) -> Self {
    Self {
      store,
      generator,
      extractor: Arc::new(KeywordExtractor),
      settings,
    }
  }

  /// Replace the signal extractor.
  pub fn with_extractor(mut self, extractor: impl SignalExtractor + 'static) -> Self {
    self.extractor = Arc::new(extractor);
    self
  }

  pub fn store(&self) -> &S { &self.store }

  pub fn settings(&self) -> &DialogueSettings { &self.settings }

  /// Ask `suspect_id` in `case_id` a question on behalf of `player`.
  ///
  /// Input and lookup failures happen before anything is written. Once the
  /// player's turn is persisted, a generation failure leaves it in place and
  /// writes no reply.
  pub async fn send_message(
    &self,
    player: &str,
    case_id: &str,
    suspect_id: &str,
    text: &str,
  ) -> Result<InterrogationReply> {
    let started = Instant::now();
    tracing::debug!(state = "received", case_id, suspect_id, "interrogation turn");

    let result = self.run_turn(player, case_id, suspect_id, text).await;
    let elapsed_ms = started.elapsed().as_millis() as u64;

    match &result {
      Ok(reply) => tracing::info!(
        thread_id = %reply.thread_id,
        reply_len = reply.reply_text.len(),
        elapsed_ms,
        "interrogation turn answered"
      ),
      Err(e) if e.is_player_error() => tracing::debug!(
        state = "errored",
        case_id,
        suspect_id,
        error = %e,
        "interrogation turn rejected"
      ),
      Err(e) => tracing::warn!(
        state = "errored",
        case_id,
        suspect_id,
        elapsed_ms,
        error = %e,
        "interrogation turn failed"
      ),
    }
    result
  }

  async fn run_turn(
    &self,
    player: &str,
    case_id: &str,
    suspect_id: &str,
    text: &str,
  ) -> Result<InterrogationReply> {
    // ── Validate ──────────────────────────────────────────────────────────
    let text = text.trim();
    if text.is_empty() {
      return Err(DialogueError::EmptyInput);
    }
    let player = PlayerAddress::parse(player).ok_or(DialogueError::Unauthenticated)?;

    let (case, suspect) = self.load(case_id, suspect_id).await?;
    let system = persona::compile(&case, &suspect).map_err(DialogueError::Configuration)?;
    trace_state(TurnState::Validated, None);

    // ── Resolve thread ────────────────────────────────────────────────────
    let key = ThreadKey {
      player,
      case_id: case.case_id.clone(),
      suspect_id: suspect.suspect_id.clone(),
    };
    let thread = self
      .store
      .get_or_create_open_thread(&key)
      .await
      .map_err(DialogueError::store)?;
    trace_state(TurnState::ThreadResolved, Some(thread.thread_id));

    // ── Persist the player's turn ─────────────────────────────────────────
    let question = self.append(thread.thread_id, Role::User, text.to_owned()).await?;
    trace_state(TurnState::UserTurnPersisted, Some(thread.thread_id));

    // ── Generate ──────────────────────────────────────────────────────────
    let mut transcript = self
      .store
      .list_messages(thread.thread_id)
      .await
      .map_err(DialogueError::store)?;
    let turns = context::build(&system, &transcript, &question, self.settings.history_window);
    tracing::debug!(thread_id = %thread.thread_id, turns = turns.len(), "context built");

    let reply_text = self.generate(&turns).await?;
    trace_state(TurnState::ModelInvoked, Some(thread.thread_id));

    // ── Persist the reply ─────────────────────────────────────────────────
    let answer = self.append(thread.thread_id, Role::Assistant, reply_text).await?;
    trace_state(TurnState::AssistantTurnPersisted, Some(thread.thread_id));

    // ── Signals ───────────────────────────────────────────────────────────
    if !transcript.iter().any(|m| m.message_id == question.message_id) {
      transcript.push(question);
    }
    transcript.push(answer.clone());
    let signals = self.signals(&case, &suspect, &transcript);

    Ok(InterrogationReply {
      reply_text:  answer.content,
      thread_id:   thread.thread_id,
      claims:      signals.as_ref().map(|s| s.claims),
      leads:       signals.as_ref().map(|s| s.leads.clone()),
      consistency: signals.and_then(|s| s.consistency),
    })
  }

  /// The open thread for a triple and its messages, without creating one.
  pub async fn get_open_thread(
    &self,
    player: &str,
    case_id: &str,
    suspect_id: &str,
  ) -> Result<ThreadView> {
    let player = PlayerAddress::parse(player).ok_or(DialogueError::Unauthenticated)?;
    let key = ThreadKey {
      player,
      case_id: case_id.to_owned(),
      suspect_id: suspect_id.to_owned(),
    };

    let Some(thread) = self
      .store
      .get_open_thread(&key)
      .await
      .map_err(DialogueError::store)?
    else {
      return Ok(ThreadView { thread: None, messages: Vec::new() });
    };

    let messages = self
      .store
      .list_messages(thread.thread_id)
      .await
      .map_err(DialogueError::store)?;
    Ok(ThreadView { thread: Some(thread), messages })
  }

  /// Purge every thread of a case. Returns how many were removed.
  pub async fn reset_case_threads(&self, case_id: &str) -> Result<usize> {
    let purged = self
      .store
      .reset_case_threads(case_id)
      .await
      .map_err(DialogueError::store)?;
    tracing::info!(case_id, purged, "case threads reset");
    Ok(purged)
  }

  /// Close a thread; the next question for its triple starts a fresh one.
  pub async fn close_thread(&self, thread_id: Uuid) -> Result<Thread> {
    let thread = self
      .store
      .close_thread(thread_id)
      .await
      .map_err(DialogueError::store)?
      .ok_or(DialogueError::ThreadNotFound(thread_id))?;
    tracing::info!(thread_id = %thread_id, "thread closed");
    Ok(thread)
  }

  // ─── Steps ───────────────────────────────────────────────────────────────

  async fn load(
    &self,
    case_id: &str,
    suspect_id: &str,
  ) -> Result<(CaseNarrative, SuspectProfile)> {
    let case = self
      .store
      .get_case(case_id)
      .await
      .map_err(DialogueError::store)?
      .ok_or_else(|| DialogueError::CaseNotFound(case_id.to_owned()))?;
    let suspect = self
      .store
      .get_suspect(case_id, suspect_id)
      .await
      .map_err(DialogueError::store)?
      .ok_or_else(|| DialogueError::SuspectNotFound {
        case_id:    case_id.to_owned(),
        suspect_id: suspect_id.to_owned(),
      })?;
    Ok((case, suspect))
  }

  async fn append(&self, thread_id: Uuid, role: Role, content: String) -> Result<Message> {
    self
      .store
      .append_message(thread_id, role, content)
      .await
      .map_err(DialogueError::store)?
      .ok_or(DialogueError::ThreadNotFound(thread_id))
  }

  async fn generate(&self, turns: &[Turn]) -> Result<String> {
    let call = self.generator.generate(turns, self.settings.temperature);
    let text = match tokio::time::timeout(self.settings.generation_timeout, call).await {
      Ok(Ok(text)) => text,
      Ok(Err(e)) => return Err(DialogueError::UpstreamGeneration(Box::new(e))),
      Err(elapsed) => return Err(DialogueError::UpstreamGeneration(Box::new(elapsed))),
    };
    if text.trim().is_empty() {
      return Err(DialogueError::UpstreamGeneration(Box::new(BlankReply)));
    }
    Ok(text)
  }

  fn signals(
    &self,
    case: &CaseNarrative,
    suspect: &SuspectProfile,
    transcript: &[Message],
  ) -> Option<Signals> {
    match self.extractor.extract(case, suspect, transcript) {
      Ok(signals) => Some(signals),
      Err(e) => {
        tracing::warn!(error = %e, "signal extraction failed; replying without signals");
        None
      }
    }
  }
}

fn trace_state(state: TurnState, thread_id: Option<Uuid>) {
  match thread_id {
    Some(id) => tracing::debug!(state = state.as_str(), thread_id = %id, "interrogation turn"),
    None => tracing::debug!(state = state.as_str(), "interrogation turn"),
  }
}
