//! SQL schema for the recall SQLite store.
//!
//! Executed by every new connection; `PRAGMA user_version` marks the layout
//! so future migrations can be gated on it.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

-- One row per tracked question. Rows are never deleted; revision_count only
-- ever grows, one step per committed review.
CREATE TABLE IF NOT EXISTS questions (
    id             INTEGER PRIMARY KEY AUTOINCREMENT,
    url            TEXT    NOT NULL UNIQUE,
    revision_count INTEGER NOT NULL DEFAULT 0 CHECK (revision_count >= 0),
    last_sent_date TEXT                      -- RFC 3339 UTC or NULL
);

CREATE INDEX IF NOT EXISTS questions_revision_idx ON questions(revision_count);

PRAGMA user_version = 1;
";

/// Column list shared by every `SELECT` that decodes into a question.
pub const QUESTION_COLUMNS: &str = "id, url, revision_count, last_sent_date";
