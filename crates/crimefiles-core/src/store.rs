//! Storage traits: the thread store and the read-only case repository.
//!
//! Both are implemented by storage backends (e.g. `crimefiles-store-sqlite`).
//! The orchestrator depends on these abstractions, never on a concrete
//! backend.

use std::future::Future;

use uuid::Uuid;

use crate::{
  case::{CaseNarrative, SuspectProfile},
  thread::{Message, Role, Thread, ThreadKey},
};

/// Shared error type for a storage backend.
///
/// A backend usually implements both [`ThreadStore`] and [`CaseRepository`];
/// hanging the error off a common supertrait keeps `S::Error` unambiguous.
pub trait Backend: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;
}

// ─── Thread store ────────────────────────────────────────────────────────────

/// Single source of truth for conversation identity and transcript order.
///
/// At most one `open` thread exists per [`ThreadKey`]; implementations must
/// enforce this at the storage layer, not by check-then-insert alone.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait ThreadStore: Backend {
  /// Return the open thread for `key`, creating it if none exists.
  ///
  /// Concurrent callers for the same key all receive the same thread.
  fn get_or_create_open_thread<'a>(
    &'a self,
    key: &'a ThreadKey,
  ) -> impl Future<Output = Result<Thread, Self::Error>> + Send + 'a;

  /// Return the open thread for `key` without creating one.
  fn get_open_thread<'a>(
    &'a self,
    key: &'a ThreadKey,
  ) -> impl Future<Output = Result<Option<Thread>, Self::Error>> + Send + 'a;

  /// Retrieve a thread by id, whatever its status.
  fn get_thread(
    &self,
    thread_id: Uuid,
  ) -> impl Future<Output = Result<Option<Thread>, Self::Error>> + Send + '_;

  /// Append a message with a server-assigned timestamp.
  ///
  /// Returns `None` if the thread does not exist.
  fn append_message(
    &self,
    thread_id: Uuid,
    role: Role,
    content: String,
  ) -> impl Future<Output = Result<Option<Message>, Self::Error>> + Send + '_;

  /// All messages of a thread in ascending creation order. Empty for an
  /// unknown thread or a thread with no messages.
  fn list_messages(
    &self,
    thread_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Message>, Self::Error>> + Send + '_;

  /// Mark a thread closed. Closing a closed thread is a no-op.
  ///
  /// Returns `None` if the thread does not exist.
  fn close_thread(
    &self,
    thread_id: Uuid,
  ) -> impl Future<Output = Result<Option<Thread>, Self::Error>> + Send + '_;

  /// Purge every thread (and its messages) belonging to a case.
  ///
  /// Returns the number of threads removed; repeating the call returns 0.
  fn reset_case_threads<'a>(
    &'a self,
    case_id: &'a str,
  ) -> impl Future<Output = Result<usize, Self::Error>> + Send + 'a;
}

// ─── Case repository ─────────────────────────────────────────────────────────

/// Read-only access to authored cases and suspects.
pub trait CaseRepository: Backend {
  /// Retrieve a case by id. Returns `None` if not found.
  fn get_case<'a>(
    &'a self,
    case_id: &'a str,
  ) -> impl Future<Output = Result<Option<CaseNarrative>, Self::Error>> + Send + 'a;

  /// Retrieve a suspect of a case. Returns `None` if the suspect does not
  /// exist within that case.
  ///
  /// `is_culprit` is resolved against the case's solution suspect.
  fn get_suspect<'a>(
    &'a self,
    case_id: &'a str,
    suspect_id: &'a str,
  ) -> impl Future<Output = Result<Option<SuspectProfile>, Self::Error>> + Send + 'a;
}
