//! Main folio crate providing a versioned in-memory document store.
//!
//! This crate is the primary entry point for hosts embedding folio as
//! their storage backend. It re-exports the core vocabulary, the in-memory
//! store, and the event-adapter plugin used to wire storage operations
//! onto a host event bus.
//!
//! # Features
//!
//! - **Slug-keyed documents** - Schemaless records addressed by a human-readable identifier
//! - **Revision history** - Every mutation retained as an immutable, time-ordered snapshot
//! - **Rename splicing** - Changing a document's slug carries its full lineage along
//! - **Declarative queries** - Filter, order, limit, and field projection over the live set
//! - **Event-bus wiring** - A capability map binding operations to named host events
//!
//! # Quick Start
//!
//! ```ignore
//! use folio::prelude::*;
//! use bson::doc;
//!
//! #[tokio::main]
//! async fn main() {
//!     let storage = MemoryStorage::new();
//!
//!     storage.add(doc! { "slug": "welcome", "title": "Welcome", "tags": ["intro"] }).await;
//!     storage.update(doc! { "slug": "welcome", "title": "Welcome!" }, Some("welcome")).await;
//!
//!     // Two revisions so far: the add and the update.
//!     let history = storage.get_history("welcome").await.unwrap();
//!     assert_eq!(history.len(), 2);
//!
//!     // The first snapshot still shows the original title.
//!     let first = storage.get_revision("welcome", &history[0]).await.unwrap();
//!     assert_eq!(first.get_str("title").ok(), Some("Welcome"));
//! }
//! ```
//!
//! # Queries
//!
//! Query strings are parsed by an external collaborator implementing
//! [`query::QueryParser`]; the store itself consumes only the parsed
//! [`query::QueryPlan`]:
//!
//! ```ignore
//! use folio::prelude::*;
//!
//! # async fn example(storage: MemoryStorage) {
//! let plan = QueryPlan::builder()
//!     .fields(["slug", "tags"])
//!     .filter(Predicate::new(|doc| doc.tags().contains(&"intro")))
//!     .order("updateDate", SortDirection::Desc)
//!     .limit(10)
//!     .build();
//!
//! let results = storage.query(plan).await;
//! # }
//! ```
//!
//! # Host wiring
//!
//! The [`plugin`] module adapts the store to event-driven hosts: a
//! [`plugin::PluginConfig`] maps operation names to event names, and
//! [`plugin::StoragePlugin::register`] subscribes them through the host's
//! hook system. Registration is the one loud failure point; everything
//! else absorbs bad input silently and logs it.

pub mod prelude;
pub mod plugin;

pub use folio_core::{document, error, provider, query, revision};

// Re-export BSON types for convenience
pub use bson;

/// In-memory storage implementations.
pub mod memory {
    pub use folio_memory::{MemoryStorage, MemoryStorageBuilder};
}
