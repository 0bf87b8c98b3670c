//! Convenient re-exports of commonly used types from folio.
//!
//! Import this prelude module to quickly access the most frequently used
//! types and traits without needing to import from multiple sub-modules:
//!
//! ```ignore
//! use folio::prelude::*;
//! ```

pub use folio_core::{
    document::DocumentExt,
    error::{FolioError, FolioResult},
    provider::{StorageConfig, StorageProvider, StorageProviderBuilder},
    query::{OrderTerm, Predicate, QueryParser, QueryPlan, QueryPlanBuilder, SortDirection},
    revision::RevisionKey,
};

pub use folio_memory::{MemoryStorage, MemoryStorageBuilder};

pub use crate::plugin::{EventHooks, PluginConfig, StorageOp, StoragePlugin};
