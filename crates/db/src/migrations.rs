/// Inline SQL migrations for the parcelwise database schema.
///
/// Applied in order; the version of each is its 1-based index. Never edit a
/// shipped entry, append a new one instead.

pub const MIGRATIONS: &[&str] = &[
    // Migration 1: users table
    r#"
CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY,
    username TEXT NOT NULL UNIQUE,
    email TEXT NOT NULL UNIQUE
);
"#,
    // Migration 2: lookup indexes used by search
    r#"
BEGIN;
CREATE INDEX IF NOT EXISTS idx_users_username ON users(username);
CREATE INDEX IF NOT EXISTS idx_users_email ON users(email);
COMMIT;
"#,
];
