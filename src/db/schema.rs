//! SQL DDL for initializing the record store.
//! SQLite-first design; can be adapted for other RDBMS.

/// SQLite schema with:
/// - `members` keyed by the natural `member_id`
/// - `attendance` unique per (date, group, member) so a session holds one row per member
/// - `offerings` / `welfare` append-only ledgers, amounts in minor units
/// - `users` keyed by username; `password_hash` is an Argon2id PHC string
/// - `attendance_summary` rebuilt wholesale by the summary worker
pub const SQLITE_INIT: &str = r#"
CREATE TABLE IF NOT EXISTS members (
    member_id TEXT PRIMARY KEY NOT NULL,
    name TEXT NOT NULL,
    home_cell_group TEXT NOT NULL,
    phone TEXT NULL,
    email TEXT NULL,
    gender TEXT NULL
);

CREATE INDEX IF NOT EXISTS idx_members_home_cell_group ON members(home_cell_group);

CREATE TABLE IF NOT EXISTS attendance (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    service_date TEXT NOT NULL, -- YYYY-MM-DD
    home_cell_group TEXT NOT NULL,
    member_id TEXT NOT NULL,
    member_name TEXT NOT NULL,
    present INTEGER NOT NULL,
    recorded_by TEXT NOT NULL,
    recorded_at TEXT NOT NULL, -- RFC3339
    UNIQUE (service_date, home_cell_group, member_id)
);

CREATE INDEX IF NOT EXISTS idx_attendance_service_date ON attendance(service_date);

CREATE TABLE IF NOT EXISTS offerings (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    service_date TEXT NOT NULL,
    member_id TEXT NULL,
    amount_minor INTEGER NOT NULL CHECK (amount_minor > 0),
    category TEXT NOT NULL,
    description TEXT NULL,
    entered_by TEXT NOT NULL,
    recorded_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS welfare (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    service_date TEXT NOT NULL,
    member_id TEXT NOT NULL,
    member_name TEXT NOT NULL,
    home_cell_group TEXT NOT NULL,
    amount_minor INTEGER NOT NULL CHECK (amount_minor > 0),
    collected_by TEXT NOT NULL,
    recorded_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS users (
    username TEXT PRIMARY KEY NOT NULL,
    password_hash TEXT NOT NULL,
    role TEXT NOT NULL,
    home_cell_group TEXT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS announcements (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT NOT NULL,
    message TEXT NOT NULL,
    posted_by TEXT NOT NULL,
    posted_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS attendance_summary (
    member_id TEXT PRIMARY KEY NOT NULL,
    member_name TEXT NOT NULL,
    home_cell_group TEXT NOT NULL,
    phone TEXT NULL,
    recent_attendance TEXT NOT NULL, -- JSON array of booleans, newest first
    missed_count INTEGER NOT NULL,
    updated_at TEXT NOT NULL
);
"#;
