//! Memory storage and recall for Parley.
//!
//! This crate implements the engine's storage contract: durable, append-only
//! memory entries keyed by (agent, user), recalled through a relevance ranker
//! with a bounded TTL cache.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────────┐
//! │  MemoryService                                                       │
//! │  - FallbackStore: SQLite primary → JSONL secondary → empty           │
//! │  - rank(): topical match + recency + kind weighting (pure)           │
//! │  - RecallCache: normalized query key, 5 min TTL, capacity 20         │
//! └──────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```no_run
//! use std::sync::Arc;
//! use parley_memory::{FileStore, MemoryService, RecallOptions, SqliteStore};
//! use parley_types::MemoryKind;
//!
//! let service = MemoryService::from_backends(
//!     Arc::new(SqliteStore::open("~/.parley/memory.db")?),
//!     Arc::new(FileStore::open("~/.parley/memory-fallback.jsonl")?),
//! );
//!
//! let entry = service.remember(
//!     "tutor",
//!     Some("user-1"),
//!     "I want to learn Rust",
//!     "user is starting to learn rust",
//!     None,
//!     MemoryKind::Goal,
//!     vec!["learning".to_string()],
//! );
//!
//! let context = service.recall(
//!     "tutor",
//!     Some("user-1"),
//!     &RecallOptions::new().with_topic("rust"),
//! );
//! # Ok::<(), parley_memory::MemoryError>(())
//! ```

pub mod backend;
pub mod cache;
pub mod error;
pub mod fallback;
pub mod file;
pub mod query;
pub mod ranker;
pub mod service;
pub mod store;

pub use backend::MemoryBackend;
pub use cache::{CACHE_CAPACITY, CACHE_TTL, RecallCache, RecallKey};
pub use error::{MemoryError, Result};
pub use fallback::FallbackStore;
pub use file::FileStore;
pub use query::{MemoryQuery, QUERY_CAP, StoreStats, TimeWindow};
pub use ranker::{
    BASE_RELEVANCE, GOAL_BONUS, MatchingMode, RECENCY_BOOST_CAP, RECENCY_WINDOW_DAYS, RankOptions,
    rank,
};
pub use service::{DEFAULT_RECALL_LIMIT, MemoryService, RecallOptions};
pub use store::SqliteStore;
