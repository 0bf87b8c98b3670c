//! Query execution over an in-memory document snapshot.
//!
//! Runs a parsed [`QueryPlan`] through the fixed pipeline: filter, order,
//! limit, project. The filter predicate is opaque (owned by the parser
//! collaborator); this module only applies it. No validation happens here;
//! malformed plans are guarded against at the parser boundary.

use std::cmp::Ordering;

use bson::{Bson, Document, datetime::DateTime};
use rand::seq::SliceRandom;
use rand::thread_rng;

use folio_core::query::{OrderTerm, QueryPlan, SortDirection};

/// Runs `plan` against a snapshot of documents and returns the filtered,
/// ordered, limited, projected results.
///
/// When the first order term's prop is the `RANDOM` literal, every other
/// order term is ignored and the filtered set is uniformly shuffled
/// (Fisher–Yates via [`SliceRandom::shuffle`], not a random comparator).
/// Otherwise the order terms form a composite comparator applied in
/// priority sequence over a stable sort.
pub fn execute(plan: &QueryPlan, documents: Vec<Document>) -> Vec<Document> {
    // Filter
    let mut results = documents
        .into_iter()
        .filter(|document| plan.filter.matches(document))
        .collect::<Vec<_>>();

    // Sort / Order
    match plan.order.first() {
        Some(first) if first.is_random() => results.shuffle(&mut thread_rng()),
        Some(_) => results.sort_by(|a, b| compare_documents(a, b, &plan.order)),
        None => {}
    }

    // Limit
    if plan.limit > 0 {
        results.truncate(plan.limit as usize);
    }

    // Select
    if plan.is_wildcard() {
        results
    } else {
        results
            .into_iter()
            .map(|document| project(&document, &plan.fields))
            .collect()
    }
}

/// Composite ordering: the first term is the primary key, later terms
/// break ties. Incomparable or missing values leave the pair tied, and the
/// stable sort preserves their filtered-sequence order.
fn compare_documents(a: &Document, b: &Document, order: &[OrderTerm]) -> Ordering {
    for term in order {
        let left = a
            .get(&term.prop)
            .map(Comparable::from)
            .unwrap_or(Comparable::Null);
        let right = b
            .get(&term.prop)
            .map(Comparable::from)
            .unwrap_or(Comparable::Null);

        let ordering = match term.direction {
            SortDirection::Asc => left.partial_cmp(&right).unwrap_or(Ordering::Equal),
            SortDirection::Desc => right.partial_cmp(&left).unwrap_or(Ordering::Equal),
            SortDirection::Random => Ordering::Equal,
        };

        if ordering != Ordering::Equal {
            return ordering;
        }
    }

    Ordering::Equal
}

/// Builds a record containing only the listed fields, in the listed order.
/// Absent fields are omitted, not an error.
fn project(document: &Document, fields: &[String]) -> Document {
    let mut record = Document::new();

    for field in fields {
        if let Some(value) = document.get(field) {
            record.insert(field.clone(), value.clone());
        }
    }

    record
}

/// Type-normalized view of BSON values for ordering.
///
/// All integer and float widths collapse to f64 so numeric fields compare
/// across representations. Only same-variant scalar pairs are ordered;
/// anything else is incomparable and ties.
#[derive(Debug)]
enum Comparable<'a> {
    Null,
    Bool(bool),
    Number(f64),
    DateTime(DateTime),
    String(&'a str),
}

impl<'a> From<&'a Bson> for Comparable<'a> {
    fn from(bson: &'a Bson) -> Self {
        match bson {
            Bson::Boolean(value) => Comparable::Bool(*value),
            Bson::Int32(value) => Comparable::Number(*value as f64),
            Bson::Int64(value) => Comparable::Number(*value as f64),
            Bson::Double(value) => Comparable::Number(*value),
            Bson::DateTime(value) => Comparable::DateTime(*value),
            Bson::String(value) => Comparable::String(value),
            _ => Comparable::Null,
        }
    }
}

impl<'a> PartialEq for Comparable<'a> {
    fn eq(&self, other: &Self) -> bool {
        self.partial_cmp(other) == Some(Ordering::Equal)
    }
}

impl<'a> PartialOrd for Comparable<'a> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Comparable::Bool(a), Comparable::Bool(b)) => a.partial_cmp(b),
            (Comparable::Number(a), Comparable::Number(b)) => a.partial_cmp(b),
            (Comparable::DateTime(a), Comparable::DateTime(b)) => a.partial_cmp(b),
            (Comparable::String(a), Comparable::String(b)) => a.partial_cmp(b),
            _ => None,
        }
    }
}
