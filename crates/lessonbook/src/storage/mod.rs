//! Storage backend implementations.
//!
//! This module provides concrete implementations of the repository traits
//! defined in `lessonbook_core::storage`.
//!
//! # Feature Flags
//!
//! - `sqlite` (default): SQLite storage backend using `rusqlite` and `tokio-rusqlite`
//!
//! The in-memory backend is always compiled. The binary falls back to it when
//! built with `--no-default-features`.

pub mod inmemory;

#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use inmemory::InMemoryRepository;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteRepository;
