//! SQLite schema, applied at startup.
//!
//! chart_data is append-only history: one row per stored chart, never
//! updated in place, with the highest id per (user_id, chart_type) being
//! the authoritative record. chart_documents holds the synthesized
//! retrieval documents derived from the newest records. Vector embeddings
//! are never persisted.

pub const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS user_profiles (
        user_id TEXT PRIMARY KEY,
        display_name TEXT,
        birth_data TEXT,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS chart_data (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id TEXT NOT NULL,
        chart_type TEXT NOT NULL,
        payload TEXT NOT NULL,
        degraded INTEGER NOT NULL DEFAULT 0,
        created_at TEXT NOT NULL
    )",
    "CREATE INDEX IF NOT EXISTS idx_chart_data_user_type ON chart_data (user_id, chart_type)",
    "CREATE TABLE IF NOT EXISTS chart_documents (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id TEXT NOT NULL,
        chart_type TEXT NOT NULL,
        content TEXT NOT NULL,
        metadata TEXT NOT NULL,
        created_at TEXT NOT NULL
    )",
    "CREATE INDEX IF NOT EXISTS idx_chart_documents_user ON chart_documents (user_id)",
    "CREATE INDEX IF NOT EXISTS idx_chart_documents_user_type
        ON chart_documents (user_id, chart_type)",
    "CREATE TABLE IF NOT EXISTS user_contacts (
        user_id TEXT NOT NULL,
        contact_name TEXT NOT NULL,
        contact_user_id TEXT,
        relationship_type TEXT NOT NULL DEFAULT 'friend',
        birth_data TEXT,
        chart_data TEXT,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL,
        PRIMARY KEY (user_id, contact_name)
    )",
];
