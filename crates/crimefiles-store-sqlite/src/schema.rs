//! SQL schema for the Crimefiles SQLite store.
//!
//! Executed once at connection startup. `PRAGMA user_version` records the
//! schema revision for future migrations.

/// Full schema DDL; idempotent thanks to `IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;
PRAGMA busy_timeout = 5000;

CREATE TABLE IF NOT EXISTS cases (
    case_id             TEXT PRIMARY KEY,
    title               TEXT NOT NULL,
    excerpt             TEXT NOT NULL,
    story               TEXT NOT NULL,
    hints               TEXT NOT NULL DEFAULT '[]',  -- JSON array of strings
    timeline            TEXT,                        -- JSON-encoded Timeline or NULL
    solution_suspect_id TEXT,
    created_at          TEXT NOT NULL,
    updated_at          TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS suspects (
    case_id     TEXT NOT NULL REFERENCES cases(case_id) ON DELETE CASCADE,
    suspect_id  TEXT NOT NULL,
    name        TEXT NOT NULL,
    age         INTEGER NOT NULL,
    occupation  TEXT NOT NULL,
    gender      TEXT NOT NULL,
    description TEXT,
    traits      TEXT NOT NULL DEFAULT '[]',
    mannerisms  TEXT NOT NULL DEFAULT '[]',
    whereabouts TEXT NOT NULL DEFAULT '[]',
    brief       TEXT,
    created_at  TEXT NOT NULL,
    PRIMARY KEY (case_id, suspect_id)
);

-- Threads are keyed by (player, case, suspect). case_id is not a foreign key;
-- cases may live in another store.
CREATE TABLE IF NOT EXISTS threads (
    thread_id    TEXT PRIMARY KEY,
    user_address TEXT NOT NULL,   -- lower-cased
    case_id      TEXT NOT NULL,
    suspect_id   TEXT NOT NULL,
    status       TEXT NOT NULL DEFAULT 'open',  -- 'open' | 'closed'
    created_at   TEXT NOT NULL,
    updated_at   TEXT NOT NULL
);

-- At most one open thread per triple.
CREATE UNIQUE INDEX IF NOT EXISTS threads_open_triple_idx
    ON threads(user_address, case_id, suspect_id)
    WHERE status = 'open';

CREATE INDEX IF NOT EXISTS threads_case_idx ON threads(case_id);

-- Messages are strictly append-only.
CREATE TABLE IF NOT EXISTS messages (
    message_id TEXT PRIMARY KEY,
    thread_id  TEXT NOT NULL REFERENCES threads(thread_id) ON DELETE CASCADE,
    role       TEXT NOT NULL,   -- 'system' | 'user' | 'assistant'
    content    TEXT NOT NULL,
    created_at TEXT NOT NULL    -- fixed-width RFC 3339 UTC; server-assigned
);

CREATE INDEX IF NOT EXISTS messages_thread_idx ON messages(thread_id, created_at);

PRAGMA user_version = 1;
";
