//! In-memory versioned document storage.
//!
//! [`MemoryStorage`] keeps the current slug-keyed documents and their full
//! revision history in process memory behind an async read-write lock. Every
//! mutation runs as one critical section under the write lock; lookups and
//! queries share the read lock.
//!
//! # Failure contract
//!
//! Operations absorb bad input silently: a missing slug, a duplicate add,
//! or an update conflict logs a debug event and leaves state untouched.
//! Callers inspect return values rather than catch errors.
//!
//! # Example
//!
//! ```ignore
//! use folio_memory::MemoryStorage;
//! use folio_core::provider::StorageProvider;
//! use bson::doc;
//!
//! # async fn example() {
//! let storage = MemoryStorage::new();
//! storage.add(doc! { "slug": "welcome", "title": "Welcome" }).await;
//!
//! let document = storage.get("welcome").await.unwrap();
//! assert_eq!(document.get_str("title").ok(), Some("Welcome"));
//! # }
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use bson::Document;
use chrono::Utc;
use mea::rwlock::RwLock;
use tracing::debug;

use folio_core::{
    document::{CREATE_DATE, DocumentExt, UPDATE_DATE},
    error::FolioResult,
    provider::{StorageConfig, StorageProvider, StorageProviderBuilder},
    query::QueryPlan,
    revision::RevisionKey,
};

use crate::{executor, history::HistoryIndex};

#[derive(Debug, Default)]
struct State {
    documents: HashMap<String, Document>,
    history: HistoryIndex,
}

/// Thread-safe, versioned, in-memory document storage.
///
/// `MemoryStorage` is cloneable and uses an `Arc`-wrapped internal state,
/// allowing it to be shared across async tasks. Multiple clones of the same
/// instance share the same underlying data.
#[derive(Default, Clone, Debug)]
pub struct MemoryStorage {
    state: Arc<RwLock<State>>,
    config: StorageConfig,
}

impl MemoryStorage {
    /// Creates an empty storage instance with the default configuration
    /// (timestamps stamped on update, history recorded).
    pub fn new() -> Self {
        Self::with_config(StorageConfig::default())
    }

    /// Creates an empty storage instance with the given configuration.
    pub fn with_config(config: StorageConfig) -> Self {
        Self {
            state: Arc::new(RwLock::new(State::default())),
            config,
        }
    }

    /// Creates a builder for constructing a `MemoryStorage` with custom
    /// options.
    pub fn builder() -> MemoryStorageBuilder {
        MemoryStorageBuilder::default()
    }

    /// Inserts a new document into `state`. Shared between `add` and the
    /// create fall-through of `update`, both of which already hold the
    /// write lock.
    fn add_locked(&self, state: &mut State, document: Document) {
        let Some(slug) = document.slug().map(str::to_string) else {
            debug!("cannot add, missing slug");
            return;
        };

        if state.documents.contains_key(&slug) {
            debug!(%slug, "cannot add, existing document");
            return;
        }

        let mut document = document;
        let create_date = document.create_date().unwrap_or_else(now_millis);
        document.insert(CREATE_DATE, create_date);
        document.insert(UPDATE_DATE, create_date);
        document.normalize();

        if self.config.use_history {
            state.history.record(&slug, &document, None);
        }

        state.documents.insert(slug, document);
    }

    /// Writes an already-validated update into `state`, recording history
    /// under the (possibly new) slug and migrating it from `original_slug`
    /// on the rename path.
    fn update_locked(&self, state: &mut State, mut document: Document, original_slug: &str) {
        // The caller has checked the slug is present.
        let Some(slug) = document.slug().map(str::to_string) else {
            return;
        };

        if self.config.update_timestamps {
            document.insert(UPDATE_DATE, now_millis());
        }
        document.normalize();

        if self.config.use_history {
            state
                .history
                .record(&slug, &document, Some(original_slug));
        }

        // Current state is keyed by the document's own slug: a rename
        // retires the old entry so the document stays reachable under the
        // slug it carries.
        if original_slug != slug {
            state.documents.remove(original_slug);
        }
        state.documents.insert(slug, document);
    }
}

#[async_trait]
impl StorageProvider for MemoryStorage {
    async fn all(&self) -> HashMap<String, Document> {
        let state = self.state.read().await;
        state.documents.clone()
    }

    async fn query(&self, plan: QueryPlan) -> Vec<Document> {
        let state = self.state.read().await;
        let documents = state
            .documents
            .values()
            .cloned()
            .collect::<Vec<_>>();

        executor::execute(&plan, documents)
    }

    async fn get(&self, slug: &str) -> Option<Document> {
        if slug.is_empty() {
            debug!("cannot get document without slug");
            return None;
        }

        let state = self.state.read().await;
        state.documents.get(slug).cloned()
    }

    async fn get_history(&self, slug: &str) -> Option<Vec<RevisionKey>> {
        if slug.is_empty() {
            debug!("cannot get history without slug");
            return None;
        }

        let state = self.state.read().await;
        Some(
            state
                .history
                .revisions(slug)
                .map(|revisions| revisions.to_vec())
                .unwrap_or_default(),
        )
    }

    async fn get_revision(&self, slug: &str, revision: &RevisionKey) -> Option<Document> {
        if slug.is_empty() {
            debug!("cannot get revision without slug");
            return None;
        }

        let state = self.state.read().await;
        let snapshot = state.history.snapshot(slug, revision).cloned();
        if snapshot.is_none() {
            debug!(%slug, %revision, "document history not found");
        }

        snapshot
    }

    async fn add(&self, document: Document) {
        let mut state = self.state.write().await;
        self.add_locked(&mut state, document);
    }

    async fn update(&self, document: Document, original_slug: Option<&str>) {
        let Some(slug) = document.slug().map(str::to_string) else {
            debug!("cannot update, missing slug");
            return;
        };

        let mut state = self.state.write().await;

        let existing = state.documents.contains_key(&slug);
        let original = original_slug
            .filter(|original| !original.is_empty())
            .filter(|original| state.documents.contains_key(*original));

        match (existing, original) {
            // A different document already occupies the target slug.
            (true, Some(original)) if original != slug => {
                debug!(%slug, original, "cannot update, slug already taken");
            }
            // Ordinary in-place update.
            (true, Some(original)) => {
                self.update_locked(&mut state, document, original);
            }
            // Caller passed a stale or absent original slug; the document's
            // own slug is the target.
            (true, None) => {
                self.update_locked(&mut state, document, &slug);
            }
            // Rename path: the document moves from `original` to its new
            // slug, history included.
            (false, Some(original)) => {
                self.update_locked(&mut state, document, original);
            }
            // Nothing to update; create instead.
            (false, None) => {
                debug!(%slug, "no document found to update, adding");
                self.add_locked(&mut state, document);
            }
        }
    }

    async fn delete(&self, slug: &str) {
        let mut state = self.state.write().await;

        let Some(existing) = state.documents.get(slug).cloned() else {
            debug!(%slug, "document not found");
            return;
        };

        // One final snapshot of the about-to-be-deleted document; history
        // outlives the live entry.
        if self.config.use_history {
            state.history.record(slug, &existing, None);
        }

        state.documents.remove(slug);
    }

    async fn reset(&self) {
        let mut state = self.state.write().await;
        state.documents.clear();
        state.history.clear();
    }
}

fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Builder for constructing [`MemoryStorage`] instances.
///
/// # Example
///
/// ```ignore
/// use folio_memory::MemoryStorage;
/// use folio_core::provider::StorageProviderBuilder;
///
/// # async fn example() {
/// let storage = MemoryStorage::builder()
///     .update_timestamps(false)
///     .build()
///     .await
///     .unwrap();
/// # }
/// ```
#[derive(Debug, Default)]
pub struct MemoryStorageBuilder {
    config: StorageConfig,
}

impl MemoryStorageBuilder {
    /// Sets whether `update` stamps `updateDate` with the current time.
    pub fn update_timestamps(mut self, enabled: bool) -> Self {
        self.config.update_timestamps = enabled;
        self
    }

    /// Sets whether mutations record history snapshots.
    pub fn use_history(mut self, enabled: bool) -> Self {
        self.config.use_history = enabled;
        self
    }

    /// Replaces the whole configuration.
    pub fn config(mut self, config: StorageConfig) -> Self {
        self.config = config;
        self
    }
}

#[async_trait]
impl StorageProviderBuilder for MemoryStorageBuilder {
    type Provider = MemoryStorage;

    /// Builds and returns a new [`MemoryStorage`] instance.
    ///
    /// This always succeeds and returns a freshly initialized store.
    async fn build(self) -> FolioResult<Self::Provider> {
        Ok(MemoryStorage::with_config(self.config))
    }
}
