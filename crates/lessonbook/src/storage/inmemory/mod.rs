//! In-memory storage backend.
//!
//! This module provides an in-memory implementation of the repository traits
//! that stores all data in HashMaps wrapped in `Arc<RwLock<_>>`. It backs the
//! test suite and binaries built without the `sqlite` feature.
//!
//! # Example
//!
//! ```rust,ignore
//! use lessonbook::storage::inmemory::InMemoryRepository;
//!
//! let repo = InMemoryRepository::new();
//! // Use repo for testing...
//! ```

mod repository;

pub use repository::InMemoryRepository;
