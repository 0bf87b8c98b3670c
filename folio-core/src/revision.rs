//! Revision keys: unique, time-ordered identifiers for document snapshots.
//!
//! A [`RevisionKey`] is the handle callers use to retrieve one historical
//! snapshot of a document. It renders as `"{timestamp}-{nonce}"`, where the
//! timestamp is epoch milliseconds at snapshot time and the nonce is a
//! UUIDv4 in simple form. Uniqueness is structural: two keys minted in the
//! same millisecond still differ in their nonce. Chronological ordering is
//! recoverable from [`RevisionKey::timestamp`] alone; the nonce never
//! participates in ordering.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::FolioError;

/// A unique identifier for one immutable snapshot of a document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RevisionKey {
    timestamp: i64,
    nonce: String,
}

impl RevisionKey {
    /// Mints a fresh key stamped with the current time.
    pub fn generate() -> Self {
        Self {
            timestamp: Utc::now().timestamp_millis(),
            nonce: Uuid::new_v4().simple().to_string(),
        }
    }

    /// The moment this snapshot was taken, in epoch milliseconds.
    pub fn timestamp(&self) -> i64 {
        self.timestamp
    }

    /// The disambiguating suffix. Only meaningful for uniqueness, never
    /// for ordering.
    pub fn nonce(&self) -> &str {
        &self.nonce
    }

    /// The snapshot time as a UTC datetime, when the timestamp is in the
    /// representable range.
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.timestamp)
    }
}

impl fmt::Display for RevisionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.timestamp, self.nonce)
    }
}

impl FromStr for RevisionKey {
    type Err = FolioError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let (timestamp, nonce) = value
            .split_once('-')
            .ok_or_else(|| FolioError::InvalidRevision(value.to_string()))?;

        let timestamp = timestamp
            .parse::<i64>()
            .map_err(|_| FolioError::InvalidRevision(value.to_string()))?;

        if nonce.is_empty() {
            return Err(FolioError::InvalidRevision(value.to_string()));
        }

        Ok(Self {
            timestamp,
            nonce: nonce.to_string(),
        })
    }
}

impl TryFrom<String> for RevisionKey {
    type Error = FolioError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<RevisionKey> for String {
    fn from(key: RevisionKey) -> Self {
        key.to_string()
    }
}
