//! Primary memory store implementation using SQLite.
//!
//! Provides durable, append-only storage for memory entries keyed by
//! (agent, user). Uses WAL mode for better concurrent read performance and a
//! `user_version` pragma for schema migrations.

mod entry_ops;

use std::path::Path;
use std::sync::Mutex;

use rusqlite::{Connection, OpenFlags};
use tracing::{debug, info};

use crate::error::Result;

/// Current schema version for migrations.
const SCHEMA_VERSION: i32 = 1;

/// Memory store backed by SQLite.
///
/// The connection is wrapped in a `Mutex` for thread safety; all statements
/// go through short-lived lock scopes.
pub struct SqliteStore {
    pub(crate) conn: Mutex<Connection>,
}

impl std::fmt::Debug for SqliteStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteStore").finish_non_exhaustive()
    }
}

impl SqliteStore {
    /// Open or create a store at the given path.
    ///
    /// Creates the database file and initializes the schema if needed.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            if !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_WRITE
                | OpenFlags::SQLITE_OPEN_CREATE
                | OpenFlags::SQLITE_OPEN_FULL_MUTEX,
        )?;

        let store = Self {
            conn: Mutex::new(conn),
        };
        store.initialize()?;

        info!("Memory store opened at {:?}", path);
        Ok(store)
    }

    /// Create an in-memory store (useful for testing).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.initialize()?;

        debug!("In-memory store created");
        Ok(store)
    }

    /// Initialize the database with schema and pragmas.
    fn initialize(&self) -> Result<()> {
        let conn = self.conn.lock().unwrap();

        // WAL mode for better concurrent reads
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;

        self.create_schema(&conn)?;
        Ok(())
    }

    /// Create the database schema.
    fn create_schema(&self, conn: &Connection) -> Result<()> {
        let current_version: i32 = conn
            .pragma_query_value(None, "user_version", |row| row.get(0))
            .unwrap_or(0);

        if current_version >= SCHEMA_VERSION {
            debug!("Schema up to date (version {})", current_version);
            return Ok(());
        }

        info!(
            "Migrating schema from version {} to {}",
            current_version, SCHEMA_VERSION
        );

        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS memory_entries (
                id TEXT PRIMARY KEY,
                agent_id TEXT NOT NULL,
                user_id TEXT,
                kind TEXT NOT NULL,
                input TEXT NOT NULL,
                summary TEXT NOT NULL,
                context TEXT,
                frequency INTEGER NOT NULL DEFAULT 1,
                created_at TEXT NOT NULL,
                last_accessed TEXT NOT NULL,
                tags TEXT NOT NULL DEFAULT '[]',
                goal_id TEXT,
                goal_summary TEXT,
                goal_status TEXT
            );

            CREATE INDEX IF NOT EXISTS idx_entries_agent_user
                ON memory_entries (agent_id, user_id);
            CREATE INDEX IF NOT EXISTS idx_entries_kind
                ON memory_entries (kind);
            CREATE INDEX IF NOT EXISTS idx_entries_created
                ON memory_entries (created_at);
            "#,
        )?;

        conn.pragma_update(None, "user_version", SCHEMA_VERSION)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MemoryBackend;
    use crate::query::MemoryQuery;
    use parley_types::{MemoryEntry, MemoryKind};

    #[test]
    fn test_open_in_memory() {
        let store = SqliteStore::open_in_memory().unwrap();
        assert_eq!(store.count(None).unwrap(), 0);
    }

    #[test]
    fn test_open_on_disk_and_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("memory.db");

        {
            let store = SqliteStore::open(&path).unwrap();
            let entry = MemoryEntry::new("tutor", MemoryKind::Summary, "input", "summary");
            store.insert(&entry).unwrap();
        }

        // Reopen and confirm durability
        let store = SqliteStore::open(&path).unwrap();
        let results = store.query(&MemoryQuery::new("tutor")).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].summary, "summary");
    }

    #[test]
    fn test_schema_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("memory.db");
        let _ = SqliteStore::open(&path).unwrap();
        let _ = SqliteStore::open(&path).unwrap();
    }
}
