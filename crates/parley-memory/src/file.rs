//! File-based fallback store.
//!
//! A JSON-lines store used as the secondary tier when the primary database is
//! unreachable. Inserts append a single line; queries scan the file. This is
//! deliberately simple: the fallback exists so a storage outage degrades a
//! turn instead of failing it, not to compete with the primary on speed.

use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::{debug, warn};

use parley_types::{Id, MemoryEntry};

use crate::backend::MemoryBackend;
use crate::error::{MemoryError, Result};
use crate::query::{MemoryQuery, StoreStats};

/// JSONL-backed memory store.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    /// Serializes writers; readers re-open the file per query.
    write_lock: Mutex<()>,
}

impl FileStore {
    /// Open or create a file store at the given path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }

        // Create the file if absent so queries on a fresh store succeed.
        if !path.exists() {
            File::create(&path)?;
        }

        debug!("File store opened at {:?}", path);
        Ok(Self {
            path,
            write_lock: Mutex::new(()),
        })
    }

    /// Read all entries, skipping lines that fail to parse.
    fn read_all(&self) -> Result<Vec<MemoryEntry>> {
        let file = File::open(&self.path)?;
        let reader = BufReader::new(file);

        let mut entries = Vec::new();
        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<MemoryEntry>(&line) {
                Ok(entry) => entries.push(entry),
                Err(e) => warn!("Skipping corrupt file store line: {}", e),
            }
        }
        Ok(entries)
    }

    /// Rewrite the whole file from the given entries.
    fn rewrite(&self, entries: &[MemoryEntry]) -> Result<()> {
        let tmp = self.path.with_extension("jsonl.tmp");
        {
            let mut file = File::create(&tmp)?;
            for entry in entries {
                serde_json::to_writer(&mut file, entry)?;
                file.write_all(b"\n")?;
            }
            file.flush()?;
        }
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl MemoryBackend for FileStore {
    fn insert(&self, entry: &MemoryEntry) -> Result<()> {
        let _guard = self.write_lock.lock().unwrap();

        let mut file = OpenOptions::new().append(true).open(&self.path)?;
        let line = serde_json::to_string(entry)?;
        writeln!(file, "{}", line)?;

        debug!(entry_id = %entry.id, "Appended entry to file store");
        Ok(())
    }

    fn query(&self, query: &MemoryQuery) -> Result<Vec<MemoryEntry>> {
        let cutoff = query.time_window.cutoff();

        let mut results: Vec<_> = self
            .read_all()?
            .into_iter()
            .filter(|e| e.agent_id == query.agent_id)
            .filter(|e| query.user_id.is_none() || e.user_id == query.user_id)
            .filter(|e| query.kinds.is_empty() || query.kinds.contains(&e.kind))
            .filter(|e| cutoff.is_none_or(|c| e.created_at >= c))
            .collect();

        results.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        results.truncate(query.limit);
        Ok(results)
    }

    fn touch(&self, id: Id) -> Result<()> {
        let _guard = self.write_lock.lock().unwrap();

        let mut entries = self.read_all()?;
        let entry = entries
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or_else(|| MemoryError::NotFound(format!("Entry {}", id)))?;

        entry.frequency += 1;
        entry.last_accessed = chrono::Utc::now();
        self.rewrite(&entries)
    }

    fn count(&self, agent_id: Option<&str>) -> Result<usize> {
        Ok(self
            .read_all()?
            .iter()
            .filter(|e| agent_id.is_none_or(|a| e.agent_id == a))
            .count())
    }

    fn stats(&self) -> Result<StoreStats> {
        let entries = self.read_all()?;
        let mut stats = StoreStats {
            total: entries.len(),
            ..StoreStats::default()
        };
        for entry in &entries {
            *stats.by_kind.entry(entry.kind).or_insert(0) += 1;
        }
        Ok(stats)
    }
}
