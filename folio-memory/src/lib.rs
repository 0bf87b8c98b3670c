//! In-memory versioned storage backend for folio.
//!
//! This crate provides the reference implementation of the
//! `StorageProvider` trait: a slug-keyed document store that retains every
//! mutation as an immutable revision, plus the query executor that turns a
//! parsed plan into filtered, ordered, limited, projected results.
//!
//! # Features
//!
//! - **Thread-safe access** - Operations serialize through an async-aware read-write lock
//! - **Revision history** - Every add/update/delete appends an immutable snapshot
//! - **Rename splicing** - A slug change carries the full revision lineage along
//! - **Declarative queries** - Filter, order (including uniform RANDOM), limit, project
//!
//! # Quick Start
//!
//! ```ignore
//! use folio_memory::MemoryStorage;
//! use folio_core::provider::StorageProvider;
//! use bson::doc;
//!
//! #[tokio::main]
//! async fn main() {
//!     let storage = MemoryStorage::new();
//!
//!     storage.add(doc! { "slug": "first-document", "title": "First!" }).await;
//!
//!     let history = storage.get_history("first-document").await.unwrap();
//!     assert_eq!(history.len(), 1);
//! }
//! ```

#[allow(unused_extern_crates)]
extern crate self as folio_memory;

pub mod executor;
pub mod history;
pub mod store;

pub use store::{MemoryStorage, MemoryStorageBuilder};
