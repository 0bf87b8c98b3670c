//! Document representation, field conventions, and serialization helpers.
//!
//! Documents are schemaless: any [`bson::Document`] qualifies as long as it
//! carries a non-empty string [`SLUG`] field. The store itself only ever
//! interprets the conventional fields named by the constants in this module;
//! everything else passes through untouched.

use bson::{Bson, Document};
use serde_json::{Value, from_value, to_value};

use crate::error::FolioResult;

/// The unique, caller-assigned key identifying a document.
pub const SLUG: &str = "slug";
/// Creation timestamp, epoch milliseconds.
pub const CREATE_DATE: &str = "createDate";
/// Last-update timestamp, epoch milliseconds.
pub const UPDATE_DATE: &str = "updateDate";
/// Ordered sequence of string tags.
pub const TAGS: &str = "tags";
/// Nested mapping of host-defined metadata.
pub const CUSTOM_DATA: &str = "customData";

/// Extension trait providing typed access to the conventional document fields.
///
/// This trait is implemented for [`bson::Document`], the type-erased
/// representation all stored documents share.
pub trait DocumentExt {
    /// Returns the document's slug, or `None` when the field is missing,
    /// empty, or not a string.
    fn slug(&self) -> Option<&str>;

    /// Returns the creation timestamp in epoch milliseconds, if set.
    fn create_date(&self) -> Option<i64>;

    /// Returns the last-update timestamp in epoch milliseconds, if set.
    fn update_date(&self) -> Option<i64>;

    /// Returns the document's tags. Missing or malformed `tags` fields
    /// yield an empty sequence.
    fn tags(&self) -> Vec<&str>;

    /// Materializes the conventional optional fields: a missing or
    /// non-array `tags` becomes `[]`, a missing or non-document
    /// `customData` becomes `{}`.
    fn normalize(&mut self);

    /// Converts this document to a JSON value.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    fn to_json(&self) -> FolioResult<Value>;

    /// Creates a document from a JSON value.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is not a JSON object.
    fn from_json(value: Value) -> FolioResult<Self>
    where
        Self: Sized;
}

impl DocumentExt for Document {
    fn slug(&self) -> Option<&str> {
        self.get(SLUG)
            .and_then(Bson::as_str)
            .filter(|slug| !slug.is_empty())
    }

    fn create_date(&self) -> Option<i64> {
        self.get(CREATE_DATE).and_then(as_millis)
    }

    fn update_date(&self) -> Option<i64> {
        self.get(UPDATE_DATE).and_then(as_millis)
    }

    fn tags(&self) -> Vec<&str> {
        match self.get(TAGS).and_then(Bson::as_array) {
            Some(tags) => tags
                .iter()
                .filter_map(Bson::as_str)
                .collect(),
            None => Vec::new(),
        }
    }

    fn normalize(&mut self) {
        if self.get(TAGS).and_then(Bson::as_array).is_none() {
            self.insert(TAGS, Bson::Array(Vec::new()));
        }
        if self.get(CUSTOM_DATA).and_then(Bson::as_document).is_none() {
            self.insert(CUSTOM_DATA, Document::new());
        }
    }

    fn to_json(&self) -> FolioResult<Value> {
        Ok(to_value(self)?)
    }

    fn from_json(value: Value) -> FolioResult<Self> {
        Ok(from_value(value)?)
    }
}

/// Reads a numeric BSON value as epoch milliseconds.
///
/// Timestamps are conventionally stored as `i64`, but hosts deserializing
/// from JSON may hand us `i32` or `f64` values for the same field.
fn as_millis(value: &Bson) -> Option<i64> {
    match value {
        Bson::Int64(millis) => Some(*millis),
        Bson::Int32(millis) => Some(*millis as i64),
        Bson::Double(millis) => Some(*millis as i64),
        Bson::DateTime(date) => Some(date.timestamp_millis()),
        _ => None,
    }
}
