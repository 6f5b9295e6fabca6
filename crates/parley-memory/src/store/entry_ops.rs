//! Entry CRUD operations for the SQLite store.

use chrono::{DateTime, Utc};
use rusqlite::types::Value;
use rusqlite::{Row, params};
use tracing::debug;
use uuid::Uuid;

use parley_types::{GoalStatus, Id, MemoryEntry, MemoryKind};

use crate::backend::MemoryBackend;
use crate::error::{MemoryError, Result};
use crate::query::{MemoryQuery, StoreStats};

use super::SqliteStore;

impl SqliteStore {
    /// Get an entry by ID.
    pub fn get(&self, id: Id) -> Result<Option<MemoryEntry>> {
        let conn = self.conn.lock().unwrap();

        let mut stmt = conn.prepare(
            r#"
            SELECT id, agent_id, user_id, kind, input, summary, context,
                   frequency, created_at, last_accessed, tags,
                   goal_id, goal_summary, goal_status
            FROM memory_entries
            WHERE id = ?1
            "#,
        )?;

        let mut rows = stmt.query(params![id.to_string()])?;
        if let Some(row) = rows.next()? {
            Ok(Some(row_to_entry(row)?))
        } else {
            Ok(None)
        }
    }

    fn query_inner(&self, query: &MemoryQuery) -> Result<Vec<MemoryEntry>> {
        let conn = self.conn.lock().unwrap();

        let mut sql = String::from(
            r#"
            SELECT id, agent_id, user_id, kind, input, summary, context,
                   frequency, created_at, last_accessed, tags,
                   goal_id, goal_summary, goal_status
            FROM memory_entries
            WHERE agent_id = ?
            "#,
        );
        let mut values: Vec<Value> = vec![Value::Text(query.agent_id.clone())];

        if let Some(user_id) = &query.user_id {
            sql.push_str(" AND user_id = ?");
            values.push(Value::Text(user_id.clone()));
        }

        if !query.kinds.is_empty() {
            let placeholders = vec!["?"; query.kinds.len()].join(", ");
            sql.push_str(&format!(" AND kind IN ({})", placeholders));
            for kind in &query.kinds {
                values.push(Value::Text(kind.as_str().to_string()));
            }
        }

        if let Some(cutoff) = query.time_window.cutoff() {
            sql.push_str(" AND created_at >= ?");
            values.push(Value::Text(cutoff.to_rfc3339()));
        }

        sql.push_str(" ORDER BY created_at DESC LIMIT ?");
        values.push(Value::Integer(query.limit as i64));

        let mut stmt = conn.prepare(&sql)?;
        let mut rows = stmt.query(rusqlite::params_from_iter(values))?;

        let mut entries = Vec::new();
        while let Some(row) = rows.next()? {
            entries.push(row_to_entry(row)?);
        }
        Ok(entries)
    }
}

impl MemoryBackend for SqliteStore {
    fn insert(&self, entry: &MemoryEntry) -> Result<()> {
        let conn = self.conn.lock().unwrap();

        let tags_json = serde_json::to_string(&entry.tags)?;

        conn.execute(
            r#"
            INSERT INTO memory_entries (id, agent_id, user_id, kind, input, summary, context,
                                        frequency, created_at, last_accessed, tags,
                                        goal_id, goal_summary, goal_status)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)
            "#,
            params![
                entry.id.to_string(),
                entry.agent_id,
                entry.user_id,
                entry.kind.as_str(),
                entry.input,
                entry.summary,
                entry.context,
                entry.frequency,
                entry.created_at.to_rfc3339(),
                entry.last_accessed.to_rfc3339(),
                tags_json,
                entry.goal_id,
                entry.goal_summary,
                entry.goal_status.map(|s| s.as_str()),
            ],
        )?;

        debug!(entry_id = %entry.id, agent_id = %entry.agent_id, "Inserted memory entry");
        Ok(())
    }

    fn query(&self, query: &MemoryQuery) -> Result<Vec<MemoryEntry>> {
        self.query_inner(query)
    }

    fn touch(&self, id: Id) -> Result<()> {
        let conn = self.conn.lock().unwrap();

        let rows_affected = conn.execute(
            r#"
            UPDATE memory_entries
            SET frequency = frequency + 1, last_accessed = ?2
            WHERE id = ?1
            "#,
            params![id.to_string(), Utc::now().to_rfc3339()],
        )?;

        if rows_affected == 0 {
            return Err(MemoryError::NotFound(format!("Entry {}", id)));
        }
        Ok(())
    }

    fn count(&self, agent_id: Option<&str>) -> Result<usize> {
        let conn = self.conn.lock().unwrap();

        let count: i64 = match agent_id {
            Some(agent) => conn.query_row(
                "SELECT COUNT(*) FROM memory_entries WHERE agent_id = ?1",
                params![agent],
                |row| row.get(0),
            )?,
            None => {
                conn.query_row("SELECT COUNT(*) FROM memory_entries", [], |row| row.get(0))?
            }
        };
        Ok(count as usize)
    }

    fn stats(&self) -> Result<StoreStats> {
        let conn = self.conn.lock().unwrap();

        let mut stats = StoreStats::default();
        let mut stmt =
            conn.prepare("SELECT kind, COUNT(*) FROM memory_entries GROUP BY kind")?;
        let mut rows = stmt.query([])?;
        while let Some(row) = rows.next()? {
            let kind_str: String = row.get(0)?;
            let count: i64 = row.get(1)?;
            let kind = MemoryKind::parse(&kind_str).ok_or_else(|| {
                MemoryError::InvalidData(format!("unknown memory kind: {}", kind_str))
            })?;
            stats.by_kind.insert(kind, count as usize);
            stats.total += count as usize;
        }
        Ok(stats)
    }
}

/// Map a database row to a `MemoryEntry`.
fn row_to_entry(row: &Row<'_>) -> Result<MemoryEntry> {
    let id_str: String = row.get(0)?;
    let id = Uuid::parse_str(&id_str)
        .map_err(|e| MemoryError::InvalidData(format!("bad entry id {}: {}", id_str, e)))?;

    let kind_str: String = row.get(3)?;
    let kind = MemoryKind::parse(&kind_str)
        .ok_or_else(|| MemoryError::InvalidData(format!("unknown memory kind: {}", kind_str)))?;

    let created_at: String = row.get(8)?;
    let last_accessed: String = row.get(9)?;
    let tags_json: String = row.get(10)?;

    let goal_status: Option<String> = row.get(13)?;
    let goal_status = goal_status
        .as_deref()
        .map(|s| {
            GoalStatus::parse(s)
                .ok_or_else(|| MemoryError::InvalidData(format!("unknown goal status: {}", s)))
        })
        .transpose()?;

    Ok(MemoryEntry {
        id,
        agent_id: row.get(1)?,
        user_id: row.get(2)?,
        kind,
        input: row.get(4)?,
        summary: row.get(5)?,
        context: row.get(6)?,
        relevance_score: None,
        frequency: row.get(7)?,
        created_at: parse_timestamp(&created_at)?,
        last_accessed: parse_timestamp(&last_accessed)?,
        tags: serde_json::from_str(&tags_json)?,
        goal_id: row.get(11)?,
        goal_summary: row.get(12)?,
        goal_status,
    })
}

fn parse_timestamp(s: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| MemoryError::InvalidData(format!("bad timestamp {}: {}", s, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::TimeWindow;
    use parley_types::GoalStatus;

    fn store() -> SqliteStore {
        SqliteStore::open_in_memory().unwrap()
    }

    #[test]
    fn test_insert_and_get_round_trip() {
        let store = store();

        let entry = MemoryEntry::new("tutor", MemoryKind::Goal, "I want to learn Rust", "learn rust")
            .with_user("user-1")
            .with_context("first session")
            .with_tag("learning")
            .with_tag("rust")
            .with_goal("goal-1", "learn rust", GoalStatus::New);
        store.insert(&entry).unwrap();

        let fetched = store.get(entry.id).unwrap().unwrap();
        assert_eq!(fetched.input, entry.input);
        assert_eq!(fetched.summary, entry.summary);
        assert_eq!(fetched.tags, entry.tags);
        assert_eq!(fetched.goal_status, Some(GoalStatus::New));
        assert_eq!(fetched.user_id.as_deref(), Some("user-1"));
    }

    #[test]
    fn test_query_filters_by_agent_user_kind() {
        let store = store();

        store
            .insert(
                &MemoryEntry::new("tutor", MemoryKind::Goal, "a", "b").with_user("user-1"),
            )
            .unwrap();
        store
            .insert(
                &MemoryEntry::new("tutor", MemoryKind::Summary, "c", "d").with_user("user-1"),
            )
            .unwrap();
        store
            .insert(
                &MemoryEntry::new("coach", MemoryKind::Goal, "e", "f").with_user("user-1"),
            )
            .unwrap();
        store
            .insert(
                &MemoryEntry::new("tutor", MemoryKind::Goal, "g", "h").with_user("user-2"),
            )
            .unwrap();

        let query = MemoryQuery::new("tutor")
            .with_user("user-1")
            .with_kind(MemoryKind::Goal);
        let results = store.query(&query).unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].input, "a");
    }

    #[test]
    fn test_query_orders_newest_first() {
        let store = store();

        let mut older = MemoryEntry::new("tutor", MemoryKind::Log, "older", "older");
        older.created_at = Utc::now() - chrono::Duration::hours(2);
        let newer = MemoryEntry::new("tutor", MemoryKind::Log, "newer", "newer");

        store.insert(&older).unwrap();
        store.insert(&newer).unwrap();

        let results = store.query(&MemoryQuery::new("tutor")).unwrap();
        assert_eq!(results[0].input, "newer");
        assert_eq!(results[1].input, "older");
    }

    #[test]
    fn test_query_time_window() {
        let store = store();

        let mut old = MemoryEntry::new("tutor", MemoryKind::Log, "old", "old");
        old.created_at = Utc::now() - chrono::Duration::days(10);
        store.insert(&old).unwrap();
        store
            .insert(&MemoryEntry::new("tutor", MemoryKind::Log, "recent", "recent"))
            .unwrap();

        let query = MemoryQuery::new("tutor").with_time_window(TimeWindow::Week);
        let results = store.query(&query).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].input, "recent");
    }

    #[test]
    fn test_touch_updates_frequency_and_last_accessed() {
        let store = store();

        let entry = MemoryEntry::new("tutor", MemoryKind::Summary, "a", "b");
        store.insert(&entry).unwrap();

        store.touch(entry.id).unwrap();

        let fetched = store.get(entry.id).unwrap().unwrap();
        assert_eq!(fetched.frequency, 2);
        assert!(fetched.last_accessed >= fetched.created_at);
    }

    #[test]
    fn test_touch_missing_entry_errors() {
        let store = store();
        let result = store.touch(parley_types::new_id());
        assert!(matches!(result, Err(MemoryError::NotFound(_))));
    }

    #[test]
    fn test_count_per_agent() {
        let store = store();
        for i in 0..3 {
            store
                .insert(&MemoryEntry::new("tutor", MemoryKind::Log, format!("i{}", i), "s"))
                .unwrap();
        }
        store
            .insert(&MemoryEntry::new("coach", MemoryKind::Log, "x", "y"))
            .unwrap();

        assert_eq!(store.count(None).unwrap(), 4);
        assert_eq!(store.count(Some("tutor")).unwrap(), 3);
        assert_eq!(store.count(Some("coach")).unwrap(), 1);
    }

    #[test]
    fn test_stats_counts_per_kind() {
        let store = store();
        store
            .insert(&MemoryEntry::new("tutor", MemoryKind::Goal, "a", "b"))
            .unwrap();
        store
            .insert(&MemoryEntry::new("tutor", MemoryKind::Goal, "c", "d"))
            .unwrap();
        store
            .insert(&MemoryEntry::new("tutor", MemoryKind::Summary, "e", "f"))
            .unwrap();

        let stats = store.stats().unwrap();
        assert_eq!(stats.total, 3);
        assert_eq!(stats.kind_count(MemoryKind::Goal), 2);
        assert_eq!(stats.kind_count(MemoryKind::Summary), 1);
        assert_eq!(stats.kind_count(MemoryKind::Correction), 0);
    }
}
