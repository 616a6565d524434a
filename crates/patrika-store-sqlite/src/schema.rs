//! SQL schema for the Patrika SQLite store.
//!
//! Executed at every connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE ... IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

-- One row per decision; re-scraping a URL replaces the row in place.
CREATE TABLE IF NOT EXISTS cases (
    id              INTEGER PRIMARY KEY AUTOINCREMENT,
    source_url      TEXT NOT NULL UNIQUE,
    decision_number TEXT,
    volume          TEXT,
    case_type       TEXT NOT NULL,   -- Nepali label, see CaseType::name
    year            INTEGER NOT NULL,
    month           TEXT,
    issue           TEXT,
    decision_date   TEXT,
    court           TEXT,
    judges          TEXT NOT NULL DEFAULT '[]',   -- JSON array
    order_date      TEXT,
    case_number     TEXT NOT NULL DEFAULT '[]',   -- JSON array
    subject         TEXT,
    applicant       TEXT NOT NULL DEFAULT '[]',   -- JSON array
    opponent        TEXT NOT NULL DEFAULT '[]',   -- JSON array
    case_details    TEXT NOT NULL DEFAULT '[]',   -- JSON array
    verdict         TEXT NOT NULL DEFAULT '[]',   -- JSON array
    snapshot_path   TEXT,
    created_at      TEXT NOT NULL                 -- ISO 8601 UTC
);

-- Links that failed within a run; retry_count only ever grows.
CREATE TABLE IF NOT EXISTS failed_links (
    id              INTEGER PRIMARY KEY AUTOINCREMENT,
    case_type       TEXT NOT NULL,
    year            INTEGER NOT NULL,
    source_url      TEXT NOT NULL,
    error_message   TEXT NOT NULL,
    retry_count     INTEGER NOT NULL DEFAULT 1,
    created_at      TEXT NOT NULL,
    last_attempt_at TEXT NOT NULL,
    UNIQUE (case_type, year, source_url)
);

CREATE INDEX IF NOT EXISTS cases_type_year_idx  ON cases(case_type, year);
CREATE INDEX IF NOT EXISTS failed_links_url_idx ON failed_links(source_url);

PRAGMA user_version = 1;
";
