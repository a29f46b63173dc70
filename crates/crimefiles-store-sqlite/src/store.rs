//! [`SqliteStore`] is the SQLite implementation of [`ThreadStore`] and
//! [`CaseRepository`].

use std::path::Path;

use chrono::Utc;
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use crimefiles_core::{
  case::{CaseFile, CaseNarrative, SuspectProfile},
  store::{Backend, CaseRepository, ThreadStore},
  thread::{Message, Role, Thread, ThreadKey, ThreadStatus},
};

use crate::{
  Result,
  encode::{
    MESSAGE_COLUMNS, RawCase, RawMessage, RawSuspect, RawThread, THREAD_COLUMNS, decode_dt,
    encode_dt, encode_list, encode_timeline, encode_uuid,
  },
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Crimefiles store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Close the underlying connection. Other clones fail afterwards.
  pub async fn close(self) -> Result<()> {
    self.conn.close().await?;
    Ok(())
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Insert or update a case and replace its suspects, in one transaction.
  ///
  /// Rejects case files that name more than one culprit or a solution suspect
  /// that is not among the suspects.
  pub async fn import_case(&self, file: CaseFile) -> Result<()> {
    let solution = file.solution_suspect_id()?;
    let now_str = encode_dt(Utc::now());

    let case = file.case;
    let hints_str = encode_list(&case.hints)?;
    let timeline_str = case.timeline.as_ref().map(encode_timeline).transpose()?;

    let mut suspect_rows = Vec::with_capacity(file.suspects.len());
    for s in file.suspects {
      suspect_rows.push((
        s.suspect_id,
        s.name,
        s.age,
        s.occupation,
        s.gender,
        s.description,
        encode_list(&s.traits)?,
        encode_list(&s.mannerisms)?,
        encode_list(&s.whereabouts)?,
        s.brief,
      ));
    }

    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute(
          "INSERT INTO cases (
             case_id, title, excerpt, story, hints, timeline,
             solution_suspect_id, created_at, updated_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)
           ON CONFLICT (case_id) DO UPDATE SET
             title               = excluded.title,
             excerpt             = excluded.excerpt,
             story               = excluded.story,
             hints               = excluded.hints,
             timeline            = excluded.timeline,
             solution_suspect_id = excluded.solution_suspect_id,
             updated_at          = excluded.updated_at",
          rusqlite::params![
            case.case_id,
            case.title,
            case.excerpt,
            case.story,
            hints_str,
            timeline_str,
            solution,
            now_str,
          ],
        )?;
        tx.execute(
          "DELETE FROM suspects WHERE case_id = ?1",
          rusqlite::params![case.case_id],
        )?;
        {
          let mut stmt = tx.prepare(
            "INSERT INTO suspects (
               case_id, suspect_id, name, age, occupation, gender, description,
               traits, mannerisms, whereabouts, brief, created_at
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
          )?;
          for (id, name, age, occupation, gender, description, traits, mannerisms, whereabouts, brief) in
            suspect_rows
          {
            stmt.execute(rusqlite::params![
              case.case_id,
              id,
              name,
              age,
              occupation,
              gender,
              description,
              traits,
              mannerisms,
              whereabouts,
              brief,
              now_str,
            ])?;
          }
        }
        tx.commit()?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn read_thread(&self, thread_id: Uuid) -> Result<Option<Thread>> {
    let id_str = encode_uuid(thread_id);
    let raw: Option<RawThread> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {THREAD_COLUMNS} FROM threads WHERE thread_id = ?1"),
              rusqlite::params![id_str],
              RawThread::from_row,
            )
            .optional()?,
        )
      })
      .await?;
    raw.map(RawThread::into_thread).transpose()
  }
}

// ─── Trait impls ─────────────────────────────────────────────────────────────

impl Backend for SqliteStore {
  type Error = crate::Error;
}

impl ThreadStore for SqliteStore {
  async fn get_or_create_open_thread(&self, key: &ThreadKey) -> Result<Thread> {
    let id_str      = encode_uuid(Uuid::new_v4());
    let at_str      = encode_dt(Utc::now());
    let address     = key.player.as_str().to_owned();
    let case_id     = key.case_id.clone();
    let suspect_id  = key.suspect_id.clone();

    // The partial unique index turns a losing insert into a no-op; whoever
    // lost the race reads the winner's row.
    let raw: RawThread = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT OR IGNORE INTO threads (
             thread_id, user_address, case_id, suspect_id, status, created_at, updated_at
           ) VALUES (?1, ?2, ?3, ?4, 'open', ?5, ?5)",
          rusqlite::params![id_str, address, case_id, suspect_id, at_str],
        )?;
        Ok(conn.query_row(
          &format!(
            "SELECT {THREAD_COLUMNS} FROM threads
             WHERE user_address = ?1 AND case_id = ?2 AND suspect_id = ?3
               AND status = 'open'"
          ),
          rusqlite::params![address, case_id, suspect_id],
          RawThread::from_row,
        )?)
      })
      .await?;

    raw.into_thread()
  }

  async fn get_open_thread(&self, key: &ThreadKey) -> Result<Option<Thread>> {
    let address    = key.player.as_str().to_owned();
    let case_id    = key.case_id.clone();
    let suspect_id = key.suspect_id.clone();

    let raw: Option<RawThread> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {THREAD_COLUMNS} FROM threads
                 WHERE user_address = ?1 AND case_id = ?2 AND suspect_id = ?3
                   AND status = 'open'"
              ),
              rusqlite::params![address, case_id, suspect_id],
              RawThread::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawThread::into_thread).transpose()
  }

  async fn get_thread(&self, thread_id: Uuid) -> Result<Option<Thread>> {
    self.read_thread(thread_id).await
  }

  async fn append_message(
    &self,
    thread_id: Uuid,
    role: Role,
    content: String,
  ) -> Result<Option<Message>> {
    let message_id = Uuid::new_v4();
    let id_str     = encode_uuid(message_id);
    let thread_str = encode_uuid(thread_id);
    let now_str    = encode_dt(Utc::now());
    let role_str   = role.as_str();
    let body       = content.clone();

    let stamped: Option<String> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let exists = tx
          .query_row(
            "SELECT 1 FROM threads WHERE thread_id = ?1",
            rusqlite::params![thread_str],
            |_| Ok(true),
          )
          .optional()?
          .unwrap_or(false);
        if !exists {
          return Ok(None);
        }

        // Never stamp a message earlier than the thread's latest one; ties
        // fall back to insertion order.
        let latest: Option<String> = tx.query_row(
          "SELECT MAX(created_at) FROM messages WHERE thread_id = ?1",
          rusqlite::params![thread_str],
          |r| r.get(0),
        )?;
        let created_at = match latest {
          Some(latest) if latest > now_str => latest,
          _ => now_str,
        };

        tx.execute(
          &format!("INSERT INTO messages ({MESSAGE_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5)"),
          rusqlite::params![id_str, thread_str, role_str, body, created_at],
        )?;
        tx.execute(
          "UPDATE threads SET updated_at = ?1 WHERE thread_id = ?2",
          rusqlite::params![created_at, thread_str],
        )?;
        tx.commit()?;
        Ok(Some(created_at))
      })
      .await?;

    stamped
      .map(|at| {
        Ok(Message {
          message_id,
          thread_id,
          role,
          content,
          created_at: decode_dt(&at)?,
        })
      })
      .transpose()
  }

  async fn list_messages(&self, thread_id: Uuid) -> Result<Vec<Message>> {
    let thread_str = encode_uuid(thread_id);

    let raws: Vec<RawMessage> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {MESSAGE_COLUMNS} FROM messages
           WHERE thread_id = ?1
           ORDER BY created_at ASC, rowid ASC"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![thread_str], RawMessage::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawMessage::into_message).collect()
  }

  async fn close_thread(&self, thread_id: Uuid) -> Result<Option<Thread>> {
    let id_str     = encode_uuid(thread_id);
    let at_str     = encode_dt(Utc::now());
    let closed_str = ThreadStatus::Closed.as_str();

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "UPDATE threads SET status = ?1, updated_at = ?2
           WHERE thread_id = ?3 AND status = 'open'",
          rusqlite::params![closed_str, at_str, id_str],
        )?;
        Ok(())
      })
      .await?;

    self.read_thread(thread_id).await
  }

  async fn reset_case_threads(&self, case_id: &str) -> Result<usize> {
    let case_id = case_id.to_owned();

    let purged = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute(
          "DELETE FROM messages
           WHERE thread_id IN (SELECT thread_id FROM threads WHERE case_id = ?1)",
          rusqlite::params![case_id],
        )?;
        let purged = tx.execute(
          "DELETE FROM threads WHERE case_id = ?1",
          rusqlite::params![case_id],
        )?;
        tx.commit()?;
        Ok(purged)
      })
      .await?;

    Ok(purged)
  }
}

impl CaseRepository for SqliteStore {
  async fn get_case(&self, case_id: &str) -> Result<Option<CaseNarrative>> {
    let case_id = case_id.to_owned();

    let raw: Option<RawCase> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT case_id, title, excerpt, story, hints, timeline, solution_suspect_id
               FROM cases WHERE case_id = ?1",
              rusqlite::params![case_id],
              |row| {
                Ok(RawCase {
                  case_id:             row.get(0)?,
                  title:               row.get(1)?,
                  excerpt:             row.get(2)?,
                  story:               row.get(3)?,
                  hints:               row.get(4)?,
                  timeline:            row.get(5)?,
                  solution_suspect_id: row.get(6)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawCase::into_case).transpose()
  }

  async fn get_suspect(
    &self,
    case_id: &str,
    suspect_id: &str,
  ) -> Result<Option<SuspectProfile>> {
    let case_id    = case_id.to_owned();
    let suspect_id = suspect_id.to_owned();

    let raw: Option<RawSuspect> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT s.case_id, s.suspect_id, s.name, s.age, s.occupation, s.gender,
                      s.description, s.traits, s.mannerisms, s.whereabouts, s.brief,
                      c.solution_suspect_id
               FROM suspects s
               JOIN cases c ON c.case_id = s.case_id
               WHERE s.case_id = ?1 AND s.suspect_id = ?2",
              rusqlite::params![case_id, suspect_id],
              |row| {
                Ok(RawSuspect {
                  case_id:             row.get(0)?,
                  suspect_id:          row.get(1)?,
                  name:                row.get(2)?,
                  age:                 row.get(3)?,
                  occupation:          row.get(4)?,
                  gender:              row.get(5)?,
                  description:         row.get(6)?,
                  traits:              row.get(7)?,
                  mannerisms:          row.get(8)?,
                  whereabouts:         row.get(9)?,
                  brief:               row.get(10)?,
                  solution_suspect_id: row.get(11)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawSuspect::into_suspect).transpose()
  }
}
