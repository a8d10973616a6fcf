//! SQL schema for the Somnia SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS diseases (
    code        TEXT PRIMARY KEY,          -- 'P01'
    name        TEXT NOT NULL,
    description TEXT NOT NULL DEFAULT '',
    priority    INTEGER NOT NULL DEFAULT 100
);

CREATE TABLE IF NOT EXISTS symptoms (
    code     TEXT PRIMARY KEY,             -- 'G01'
    question TEXT NOT NULL
);

-- Required symptoms per disease. rule_id doubles as the insertion order.
CREATE TABLE IF NOT EXISTS rules (
    rule_id      INTEGER PRIMARY KEY AUTOINCREMENT,
    disease_code TEXT NOT NULL REFERENCES diseases(code) ON DELETE CASCADE,
    symptom_code TEXT NOT NULL REFERENCES symptoms(code) ON DELETE CASCADE,
    sort_order   INTEGER NOT NULL DEFAULT 0,
    UNIQUE (disease_code, symptom_code)
);

CREATE TABLE IF NOT EXISTS solutions (
    solution_id  INTEGER PRIMARY KEY AUTOINCREMENT,
    disease_code TEXT NOT NULL REFERENCES diseases(code) ON DELETE CASCADE,
    sort_order   INTEGER NOT NULL DEFAULT 0,
    text         TEXT NOT NULL
);

-- Disease codes on sessions are not foreign keys; knowledge-base edits never
-- touch existing sessions.
CREATE TABLE IF NOT EXISTS sessions (
    session_id           TEXT PRIMARY KEY,
    status               TEXT NOT NULL,    -- 'asking' | 'done' | 'unsatisfied'
    target_disease_code  TEXT,             -- NULL = free search
    biodata              TEXT,             -- JSON or NULL
    current_disease_code TEXT,
    result_disease_code  TEXT,
    version              INTEGER NOT NULL DEFAULT 0,
    created_at           TEXT NOT NULL,
    updated_at           TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS answers (
    session_id   TEXT NOT NULL REFERENCES sessions(session_id) ON DELETE CASCADE,
    symptom_code TEXT NOT NULL,
    value        INTEGER NOT NULL,
    answered_at  TEXT NOT NULL,
    PRIMARY KEY (session_id, symptom_code)
);

-- Append-only. session_id is informational; sessions may be purged.
CREATE TABLE IF NOT EXISTS history (
    history_id   INTEGER PRIMARY KEY AUTOINCREMENT,
    session_id   TEXT NOT NULL,
    biodata      TEXT,
    status       TEXT NOT NULL,            -- 'completed' | 'no_match' | 'unsatisfied'
    disease_code TEXT,
    disease_name TEXT,
    message      TEXT NOT NULL,
    recorded_at  TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS rules_disease_idx     ON rules(disease_code);
CREATE INDEX IF NOT EXISTS solutions_disease_idx ON solutions(disease_code);
CREATE INDEX IF NOT EXISTS history_session_idx   ON history(session_id);

PRAGMA user_version = 1;
";
