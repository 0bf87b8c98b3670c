//! Storage provider abstraction for versioned document stores.
//!
//! The [`StorageProvider`] trait is the capability set a host sees: direct
//! slug-keyed access, revision history, declarative queries, and the
//! add/update/delete/reset lifecycle. Implementations are required to be
//! thread-safe (`Send + Sync`) and to serialize their mutations internally.
//!
//! # Failure contract
//!
//! Store operations never panic and never return errors: invalid input
//! (missing slug, absent document) and not-found conditions degrade to
//! `None` or a silent no-op, so a single bad call cannot crash a caller
//! iterating many operations. Callers detect failure by inspecting return
//! values. Implementations log absorbed failures at debug level.

use std::collections::HashMap;

use async_trait::async_trait;
use bson::Document;
use serde::{Deserialize, Serialize};

use crate::{error::FolioResult, query::QueryPlan, revision::RevisionKey};

/// Configuration consumed by storage provider constructors.
///
/// No other options affect core behavior.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct StorageConfig {
    /// Whether `update` stamps `updateDate` with the current time.
    pub update_timestamps: bool,
    /// Whether mutations record history snapshots.
    pub use_history: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            update_timestamps: true,
            use_history: true,
        }
    }
}

/// Abstract interface for versioned, slug-keyed document storage.
///
/// # Concurrency
///
/// Every mutating operation performs multiple dependent reads and writes
/// against shared state and must run as a critical section. Read-only
/// operations may run concurrently with each other but not with a
/// mutation. The reference implementation holds an async read-write lock
/// for the full span of each operation.
#[async_trait]
pub trait StorageProvider: Send + Sync {
    /// Returns a copy of every current document, keyed by slug.
    async fn all(&self) -> HashMap<String, Document>;

    /// Runs a parsed query against the current snapshot of all documents.
    async fn query(&self, plan: QueryPlan) -> Vec<Document>;

    /// Returns a copy of the document stored under `slug`, or `None` when
    /// the slug is empty or unknown.
    async fn get(&self, slug: &str) -> Option<Document>;

    /// Returns the ordered revision keys recorded for `slug`, oldest
    /// first. `None` when the slug is empty; an empty sequence when the
    /// slug is valid but has no recorded history.
    async fn get_history(&self, slug: &str) -> Option<Vec<RevisionKey>>;

    /// Returns the snapshot taken at `revision`, or `None` when either
    /// the slug or the revision is unknown.
    async fn get_revision(&self, slug: &str, revision: &RevisionKey) -> Option<Document>;

    /// Adds a new document. No-op when the document lacks a slug or a
    /// document with that slug already exists.
    async fn add(&self, document: Document);

    /// Updates a document, renaming it when `original_slug` names a
    /// different existing entry, or falling through to [`add`](Self::add)
    /// when nothing matches. Refuses (no-op) when the target slug is
    /// already owned by a different document.
    async fn update(&self, document: Document, original_slug: Option<&str>);

    /// Removes the document under `slug` from current state, retaining
    /// its history. No-op for an unknown slug.
    async fn delete(&self, slug: &str);

    /// Discards all state: current documents, revision index, snapshots.
    async fn reset(&self);
}

/// Factory trait for constructing storage providers.
#[async_trait]
pub trait StorageProviderBuilder {
    /// The provider type this builder produces.
    type Provider: StorageProvider;

    /// Builds and returns a new provider instance.
    ///
    /// # Errors
    ///
    /// Returns an error if the provider cannot be initialized.
    async fn build(self) -> FolioResult<Self::Provider>;
}
