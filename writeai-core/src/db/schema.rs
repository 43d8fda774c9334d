//! Database schema and migrations
//!
//! Uses SQLite with embedded migrations managed via PRAGMA user_version.

use rusqlite::Connection;

/// Current schema version
pub const SCHEMA_VERSION: i32 = 1;

/// SQL migrations, indexed by version number
const MIGRATIONS: &[&str] = &[
    // Version 1: Initial schema
    r#"
    -- Account rows: plan tier and the running word-usage counter.
    CREATE TABLE IF NOT EXISTS profiles (
        id                    TEXT PRIMARY KEY,
        email                 TEXT,
        full_name             TEXT,
        plan_type             TEXT NOT NULL DEFAULT 'free',
        api_usage_count       INTEGER NOT NULL DEFAULT 0,
        monthly_usage_limit   INTEGER NOT NULL DEFAULT 10000,
        subscription_end_date DATETIME,
        created_at            DATETIME NOT NULL,
        updated_at            DATETIME NOT NULL
    );

    -- Writing artifacts. word_count/character_count are denormalized from
    -- content and recomputed on every content write.
    CREATE TABLE IF NOT EXISTS projects (
        id              TEXT PRIMARY KEY,
        user_id         TEXT NOT NULL REFERENCES profiles(id),
        title           TEXT NOT NULL,
        content         TEXT NOT NULL DEFAULT '',
        tool_type       TEXT NOT NULL,
        prompt          TEXT,
        status          TEXT NOT NULL DEFAULT 'draft',
        word_count      INTEGER NOT NULL DEFAULT 0,
        character_count INTEGER NOT NULL DEFAULT 0,
        language        TEXT NOT NULL DEFAULT 'en',
        created_at      DATETIME NOT NULL,
        updated_at      DATETIME NOT NULL
    );

    CREATE INDEX IF NOT EXISTS idx_projects_user ON projects(user_id);
    CREATE INDEX IF NOT EXISTS idx_projects_updated ON projects(user_id, updated_at DESC);

    -- Append-only usage ledger. Rows are never updated or deleted by
    -- normal flow; reads are aggregate only.
    CREATE TABLE IF NOT EXISTS usage_events (
        id                      INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id                 TEXT NOT NULL REFERENCES profiles(id),
        action_type             TEXT NOT NULL,
        tool_used               TEXT,
        words_generated         INTEGER NOT NULL DEFAULT 0,
        characters_generated    INTEGER NOT NULL DEFAULT 0,
        audio_seconds_generated INTEGER NOT NULL DEFAULT 0,
        created_at              DATETIME NOT NULL
    );

    CREATE INDEX IF NOT EXISTS idx_usage_events_user ON usage_events(user_id, created_at);
    CREATE INDEX IF NOT EXISTS idx_usage_events_action ON usage_events(user_id, action_type);

    -- Persisted text-to-speech results. Immutable once written.
    CREATE TABLE IF NOT EXISTS audio_generations (
        id               TEXT PRIMARY KEY,
        user_id          TEXT NOT NULL REFERENCES profiles(id),
        project_id       TEXT REFERENCES projects(id),
        text_content     TEXT NOT NULL,
        voice_id         TEXT NOT NULL,
        voice_name       TEXT NOT NULL,
        stability        REAL NOT NULL DEFAULT 0.5,
        similarity_boost REAL NOT NULL DEFAULT 0.75,
        style            REAL NOT NULL DEFAULT 0.3,
        audio_url        TEXT,
        duration_seconds INTEGER,
        file_size_bytes  INTEGER,
        status           TEXT NOT NULL DEFAULT 'pending',
        error_message    TEXT,
        created_at       DATETIME NOT NULL
    );

    CREATE INDEX IF NOT EXISTS idx_audio_user ON audio_generations(user_id, created_at DESC);

    -- Reusable content templates with {variable} placeholders.
    CREATE TABLE IF NOT EXISTS templates (
        id          TEXT PRIMARY KEY,
        user_id     TEXT NOT NULL REFERENCES profiles(id),
        name        TEXT NOT NULL,
        description TEXT,
        category    TEXT NOT NULL,
        content     TEXT NOT NULL,
        is_public   INTEGER NOT NULL DEFAULT 0,
        usage_count INTEGER NOT NULL DEFAULT 0,
        created_at  DATETIME NOT NULL,
        updated_at  DATETIME NOT NULL
    );

    CREATE INDEX IF NOT EXISTS idx_templates_user ON templates(user_id);
    CREATE INDEX IF NOT EXISTS idx_templates_public ON templates(is_public, usage_count DESC);
    "#,
];

/// Run all pending migrations
pub fn run_migrations(conn: &Connection) -> crate::error::Result<()> {
    let current_version: i32 = conn
        .query_row("PRAGMA user_version", [], |r| r.get(0))
        .unwrap_or(0);

    tracing::info!(
        current_version,
        target_version = SCHEMA_VERSION,
        "Checking database migrations"
    );

    for (i, migration) in MIGRATIONS.iter().enumerate() {
        let version = (i + 1) as i32;
        if version > current_version {
            tracing::info!(version, "Running migration");
            conn.execute_batch(migration)?;
            conn.execute(&format!("PRAGMA user_version = {}", version), [])?;
        }
    }

    if current_version < SCHEMA_VERSION {
        tracing::info!(
            from = current_version,
            to = SCHEMA_VERSION,
            "Migrations complete"
        );
    }

    Ok(())
}

/// Get the current schema version from the database
pub fn get_schema_version(conn: &Connection) -> crate::error::Result<i32> {
    let version: i32 = conn.query_row("PRAGMA user_version", [], |r| r.get(0))?;
    Ok(version)
}
