//! Conversation threads and their messages.
//!
//! A thread is one ongoing interrogation between a player and a suspect,
//! scoped to a single case. Messages are append-only; the only mutable parts
//! of a thread are its status and `updated_at` timestamp.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Player identity ─────────────────────────────────────────────────────────

/// A player's wallet address, normalised to lower case.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerAddress(String);

impl PlayerAddress {
  /// Trim and lower-case `raw`. Returns `None` when nothing is left.
  pub fn parse(raw: &str) -> Option<Self> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
      None
    } else {
      Some(Self(trimmed.to_lowercase()))
    }
  }

  pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for PlayerAddress {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

/// The triple that identifies "the" open conversation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ThreadKey {
  pub player:     PlayerAddress,
  pub case_id:    String,
  pub suspect_id: String,
}

// ─── Thread ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThreadStatus {
  Open,
  Closed,
}

impl ThreadStatus {
  /// The string stored in the `status` column.
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Open => "open",
      Self::Closed => "closed",
    }
  }

  pub fn parse(s: &str) -> Result<Self> {
    match s {
      "open" => Ok(Self::Open),
      "closed" => Ok(Self::Closed),
      other => Err(Error::UnknownThreadStatus(other.to_owned())),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Thread {
  pub thread_id:  Uuid,
  pub player:     PlayerAddress,
  pub case_id:    String,
  pub suspect_id: String,
  pub status:     ThreadStatus,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

impl Thread {
  pub fn is_open(&self) -> bool { self.status == ThreadStatus::Open }
}

// ─── Message ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
  System,
  User,
  Assistant,
}

impl Role {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::System => "system",
      Self::User => "user",
      Self::Assistant => "assistant",
    }
  }

  pub fn parse(s: &str) -> Result<Self> {
    match s {
      "system" => Ok(Self::System),
      "user" => Ok(Self::User),
      "assistant" => Ok(Self::Assistant),
      other => Err(Error::UnknownRole(other.to_owned())),
    }
  }
}

/// One persisted turn. Immutable once written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
  pub message_id: Uuid,
  pub thread_id:  Uuid,
  pub role:       Role,
  pub content:    String,
  /// Server-assigned; establishes total order within the thread.
  pub created_at: DateTime<Utc>,
}
