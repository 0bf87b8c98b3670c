//! Core vocabulary for the folio document store.
//!
//! This crate is the foundation of the folio workspace and provides:
//!
//! - **Document conventions** ([`document`]) - Field names and typed access over schemaless documents
//! - **Revision keys** ([`revision`]) - Unique, time-ordered snapshot identifiers
//! - **Query plans** ([`query`]) - Parsed query descriptions and the parser seam
//! - **Provider abstraction** ([`provider`]) - The storage capability set and its configuration
//! - **Error handling** ([`error`]) - Error types and result types
//!
//! # Example
//!
//! ```ignore
//! use folio_core::{document::DocumentExt, provider::StorageProvider};
//! use bson::doc;
//!
//! let document = doc! { "slug": "welcome", "title": "Welcome" };
//! assert_eq!(document.slug(), Some("welcome"));
//! ```

#[allow(unused_extern_crates)]
extern crate self as folio_core;

pub mod document;
pub mod error;
pub mod provider;
pub mod query;
pub mod revision;
