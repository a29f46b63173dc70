//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as fixed-width RFC 3339 strings (microseconds, `Z`
//! suffix) so that lexical order equals chronological order. Lists and the
//! timeline are stored as compact JSON. UUIDs are stored as hyphenated
//! lowercase strings.

use chrono::{DateTime, SecondsFormat, Utc};
use crimefiles_core::{
  case::{CaseNarrative, SuspectProfile, Timeline},
  thread::{Message, PlayerAddress, Role, Thread, ThreadStatus},
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── JSON columns ────────────────────────────────────────────────────────────

pub fn encode_list(items: &[String]) -> Result<String> {
  Ok(serde_json::to_string(items)?)
}

pub fn decode_list(s: &str) -> Result<Vec<String>> { Ok(serde_json::from_str(s)?) }

pub fn encode_timeline(t: &Timeline) -> Result<String> { Ok(serde_json::to_string(t)?) }

pub fn decode_timeline(s: &str) -> Result<Timeline> { Ok(serde_json::from_str(s)?) }

// ─── Row types ───────────────────────────────────────────────────────────────

/// Column list matching [`RawThread`]'s field order.
pub const THREAD_COLUMNS: &str =
  "thread_id, user_address, case_id, suspect_id, status, created_at, updated_at";

/// Raw strings read directly from a `threads` row.
pub struct RawThread {
  pub thread_id:    String,
  pub user_address: String,
  pub case_id:      String,
  pub suspect_id:   String,
  pub status:       String,
  pub created_at:   String,
  pub updated_at:   String,
}

impl RawThread {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      thread_id:    row.get(0)?,
      user_address: row.get(1)?,
      case_id:      row.get(2)?,
      suspect_id:   row.get(3)?,
      status:       row.get(4)?,
      created_at:   row.get(5)?,
      updated_at:   row.get(6)?,
    })
  }

  pub fn into_thread(self) -> Result<Thread> {
    let player = PlayerAddress::parse(&self.user_address)
      .ok_or_else(|| Error::CorruptRow(format!("thread {} has no user address", self.thread_id)))?;
    Ok(Thread {
      thread_id:  decode_uuid(&self.thread_id)?,
      player,
      case_id:    self.case_id,
      suspect_id: self.suspect_id,
      status:     ThreadStatus::parse(&self.status)?,
      created_at: decode_dt(&self.created_at)?,
      updated_at: decode_dt(&self.updated_at)?,
    })
  }
}

/// Column list matching [`RawMessage`]'s field order.
pub const MESSAGE_COLUMNS: &str = "message_id, thread_id, role, content, created_at";

/// Raw strings read directly from a `messages` row.
pub struct RawMessage {
  pub message_id: String,
  pub thread_id:  String,
  pub role:       String,
  pub content:    String,
  pub created_at: String,
}

impl RawMessage {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      message_id: row.get(0)?,
      thread_id:  row.get(1)?,
      role:       row.get(2)?,
      content:    row.get(3)?,
      created_at: row.get(4)?,
    })
  }

  pub fn into_message(self) -> Result<Message> {
    Ok(Message {
      message_id: decode_uuid(&self.message_id)?,
      thread_id:  decode_uuid(&self.thread_id)?,
      role:       Role::parse(&self.role)?,
      content:    self.content,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

/// Raw strings read directly from a `cases` row.
pub struct RawCase {
  pub case_id:             String,
  pub title:               String,
  pub excerpt:             String,
  pub story:               String,
  pub hints:               String,
  pub timeline:            Option<String>,
  pub solution_suspect_id: Option<String>,
}

impl RawCase {
  pub fn into_case(self) -> Result<CaseNarrative> {
    Ok(CaseNarrative {
      case_id:             self.case_id,
      title:               self.title,
      excerpt:             self.excerpt,
      story:               self.story,
      hints:               decode_list(&self.hints)?,
      timeline:            self.timeline.as_deref().map(decode_timeline).transpose()?,
      solution_suspect_id: self.solution_suspect_id,
    })
  }
}

/// Raw strings read from a `suspects` row joined with its case's solution id.
pub struct RawSuspect {
  pub case_id:             String,
  pub suspect_id:          String,
  pub name:                String,
  pub age:                 u32,
  pub occupation:          String,
  pub gender:              String,
  pub description:         Option<String>,
  pub traits:              String,
  pub mannerisms:          String,
  pub whereabouts:         String,
  pub brief:               Option<String>,
  pub solution_suspect_id: Option<String>,
}

impl RawSuspect {
  pub fn into_suspect(self) -> Result<SuspectProfile> {
    let is_culprit = self.solution_suspect_id.as_deref() == Some(self.suspect_id.as_str());
    Ok(SuspectProfile {
      suspect_id: self.suspect_id,
      case_id: self.case_id,
      name: self.name,
      age: self.age,
      occupation: self.occupation,
      gender: self.gender,
      description: self.description,
      traits: decode_list(&self.traits)?,
      mannerisms: decode_list(&self.mannerisms)?,
      whereabouts: decode_list(&self.whereabouts)?,
      brief: self.brief,
      is_culprit,
    })
  }
}
