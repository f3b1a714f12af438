//! SQLite schema for the persisted session.

/// Single-row table: at most one signed-in user per device.
pub const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS session (
    id INTEGER PRIMARY KEY CHECK (id = 1),
    access_token TEXT NOT NULL,
    refresh_token TEXT NOT NULL,
    username TEXT NOT NULL DEFAULT '',
    user_type TEXT NOT NULL DEFAULT 'clinic',
    saved_at TEXT NOT NULL DEFAULT (datetime('now'))
);
"#;
