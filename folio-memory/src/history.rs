//! Per-slug revision history with rename splicing.
//!
//! The index keeps two related mappings: the ordered revision keys recorded
//! for each slug, and the snapshot taken at each revision. Snapshot entries
//! are keyed `"{slug}-{revision}"`. Once written, a snapshot is never
//! touched again; mutating the live document cannot retroactively change
//! stored history.

use std::collections::HashMap;

use bson::Document;
use tracing::debug;

use folio_core::revision::RevisionKey;

/// The revision index: slug → ordered revision keys, plus the snapshot
/// taken at each revision.
#[derive(Debug, Default, Clone)]
pub(crate) struct HistoryIndex {
    revisions: HashMap<String, Vec<RevisionKey>>,
    snapshots: HashMap<String, Document>,
}

impl HistoryIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a snapshot of `content` under `slug` and returns the minted
    /// revision key.
    ///
    /// When `original_slug` is given, differs from `slug`, and history
    /// exists under it, the entire recorded sequence is spliced over to
    /// `slug` first, so renamed history stays contiguous with the new
    /// revision.
    pub fn record(
        &mut self,
        slug: &str,
        content: &Document,
        original_slug: Option<&str>,
    ) -> RevisionKey {
        if let Some(original) = original_slug {
            if original != slug && self.revisions.contains_key(original) {
                self.splice(original, slug);
            }
        }

        let key = RevisionKey::generate();
        self.snapshots
            .insert(snapshot_key(slug, &key), content.clone());
        self.revisions
            .entry(slug.to_string())
            .or_default()
            .push(key.clone());

        key
    }

    /// Whether any history has been recorded under `slug`.
    pub fn contains(&self, slug: &str) -> bool {
        self.revisions.contains_key(slug)
    }

    /// The ordered revision keys recorded for `slug`, oldest first.
    pub fn revisions(&self, slug: &str) -> Option<&[RevisionKey]> {
        self.revisions.get(slug).map(Vec::as_slice)
    }

    /// The snapshot taken at `revision`, gated on `slug` having recorded
    /// history.
    pub fn snapshot(&self, slug: &str, revision: &RevisionKey) -> Option<&Document> {
        if !self.revisions.contains_key(slug) {
            return None;
        }

        self.snapshots.get(&snapshot_key(slug, revision))
    }

    /// Discards all recorded history.
    pub fn clear(&mut self) {
        self.revisions.clear();
        self.snapshots.clear();
    }

    /// Moves the revision sequence and every snapshot from `original` to
    /// `slug`, preserving each key's revision part verbatim.
    fn splice(&mut self, original: &str, slug: &str) {
        debug!(from = original, to = slug, "splicing history");

        if let Some(keys) = self.revisions.remove(original) {
            self.revisions.insert(slug.to_string(), keys);
        }

        let prefix = format!("{original}-");
        let renamed = self
            .snapshots
            .keys()
            .filter(|key| key.starts_with(&prefix))
            .cloned()
            .collect::<Vec<_>>();

        for old_key in renamed {
            if let Some(snapshot) = self.snapshots.remove(&old_key) {
                let new_key = format!("{slug}-{}", &old_key[prefix.len()..]);
                self.snapshots.insert(new_key, snapshot);
            }
        }
    }
}

fn snapshot_key(slug: &str, revision: &RevisionKey) -> String {
    format!("{slug}-{revision}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;

    #[test]
    fn record_appends_in_order() {
        let mut index = HistoryIndex::new();
        let first = index.record("page", &doc! { "slug": "page", "rev": 1 }, None);
        let second = index.record("page", &doc! { "slug": "page", "rev": 2 }, None);

        let keys = index.revisions("page").unwrap();
        assert_eq!(keys, [first.clone(), second.clone()]);
        assert_eq!(
            index.snapshot("page", &first).unwrap().get_i32("rev").ok(),
            Some(1)
        );
        assert_eq!(
            index.snapshot("page", &second).unwrap().get_i32("rev").ok(),
            Some(2)
        );
    }

    #[test]
    fn snapshots_are_copies_of_the_content() {
        let mut index = HistoryIndex::new();
        let mut content = doc! { "slug": "page", "title": "before" };
        let key = index.record("page", &content, None);

        content.insert("title", "after");

        assert_eq!(
            index.snapshot("page", &key).unwrap().get_str("title").ok(),
            Some("before")
        );
    }

    #[test]
    fn splice_moves_keys_and_snapshots() {
        let mut index = HistoryIndex::new();
        let first = index.record("old-name", &doc! { "slug": "old-name" }, None);
        let second = index.record("new-name", &doc! { "slug": "new-name" }, Some("old-name"));

        assert!(!index.contains("old-name"));
        assert_eq!(index.revisions("new-name").unwrap(), [first.clone(), second]);

        // The spliced snapshot resolves under the new slug, with the
        // revision part of its key untouched.
        assert!(index.snapshot("new-name", &first).is_some());
        assert!(index.snapshot("old-name", &first).is_none());
    }

    #[test]
    fn rename_without_prior_history_starts_fresh() {
        let mut index = HistoryIndex::new();
        let key = index.record("brand-new", &doc! { "slug": "brand-new" }, Some("never-seen"));

        assert_eq!(index.revisions("brand-new").unwrap(), [key]);
        assert!(!index.contains("never-seen"));
    }

    #[test]
    fn clear_discards_everything() {
        let mut index = HistoryIndex::new();
        let key = index.record("page", &doc! { "slug": "page" }, None);
        index.clear();

        assert!(!index.contains("page"));
        assert!(index.snapshot("page", &key).is_none());
    }
}
