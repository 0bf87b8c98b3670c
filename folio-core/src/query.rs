//! Parsed query plans and the query-parser seam.
//!
//! The store never parses query syntax itself. An external parser turns a
//! query string into a [`QueryPlan`] (selected fields, an opaque filter
//! [`Predicate`], order terms, and a limit), which the executor then runs
//! against the current document snapshot. The [`QueryParser`] trait is the
//! seam that collaborator plugs into.
//!
//! # Example
//!
//! ```ignore
//! use folio_core::query::{QueryPlan, Predicate, SortDirection};
//! use folio_core::document::DocumentExt;
//!
//! let plan = QueryPlan::builder()
//!     .fields(["slug", "tags"])
//!     .filter(Predicate::new(|doc| doc.tags().contains(&"published")))
//!     .order("updateDate", SortDirection::Desc)
//!     .limit(10)
//!     .build();
//! ```

use std::fmt;
use std::sync::Arc;

use bson::Document;

use crate::error::FolioResult;

/// Order-term property sentinel requesting a uniform shuffle of the result
/// set. When the first order term's `prop` equals this literal, every other
/// order term is ignored.
pub const RANDOM_ORDER: &str = "RANDOM";

/// Wildcard field list: the projection stage passes documents through
/// unmodified when the plan's fields are exactly `["*"]`.
pub const WILDCARD: &str = "*";

/// Sort direction for a single order term.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    /// Ascending order (A to Z, 0 to 9, earliest to latest).
    Asc,
    /// Descending order (Z to A, 9 to 0, latest to earliest).
    Desc,
    /// Shuffle request. Parsers emit this alongside the [`RANDOM_ORDER`]
    /// property; on an ordinary property it is a no-op term.
    Random,
}

/// One term of a composite ordering: a property name and a direction.
///
/// The first term is the primary sort key; subsequent terms break ties in
/// the given priority sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderTerm {
    /// The property to sort by, or [`RANDOM_ORDER`].
    pub prop: String,
    /// The sort direction.
    pub direction: SortDirection,
}

impl OrderTerm {
    /// Creates a new order term.
    pub fn new(prop: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            prop: prop.into(),
            direction,
        }
    }

    /// Whether this term requests a shuffle rather than an ordering.
    pub fn is_random(&self) -> bool {
        self.prop == RANDOM_ORDER
    }
}

/// An opaque, pure boolean test over a single document.
///
/// Predicates are supplied ready-to-evaluate by the parser collaborator;
/// the executor's only contract is to apply them as side-effect-free
/// filters. Cloning is cheap (shared reference).
#[derive(Clone)]
pub struct Predicate(Arc<dyn Fn(&Document) -> bool + Send + Sync>);

impl Predicate {
    /// Wraps a filter function.
    pub fn new(filter: impl Fn(&Document) -> bool + Send + Sync + 'static) -> Self {
        Self(Arc::new(filter))
    }

    /// A predicate that matches every document.
    pub fn always() -> Self {
        Self::new(|_| true)
    }

    /// Evaluates this predicate against a document.
    pub fn matches(&self, document: &Document) -> bool {
        (self.0)(document)
    }
}

impl Default for Predicate {
    fn default() -> Self {
        Self::always()
    }
}

impl fmt::Debug for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Predicate(..)")
    }
}

/// A fully-parsed query description, ready for execution.
///
/// Produced by a [`QueryParser`] from a query string, or assembled directly
/// through [`QueryPlan::builder`]. The executor runs the stages in fixed
/// order: filter, order, limit, project.
#[derive(Debug, Clone)]
pub struct QueryPlan {
    /// Field names to project, or exactly `["*"]` for whole documents.
    pub fields: Vec<String>,
    /// The filter predicate applied to every document.
    pub filter: Predicate,
    /// Composite ordering, highest priority first.
    pub order: Vec<OrderTerm>,
    /// Maximum number of results when positive; zero or negative means
    /// unlimited.
    pub limit: i64,
}

impl QueryPlan {
    /// Creates a plan that returns every document unfiltered and unordered.
    pub fn new() -> Self {
        Self {
            fields: vec![WILDCARD.to_string()],
            filter: Predicate::always(),
            order: Vec::new(),
            limit: 0,
        }
    }

    /// Creates a new plan builder for fluent construction.
    pub fn builder() -> QueryPlanBuilder {
        QueryPlanBuilder::new()
    }

    /// Whether the field list is exactly the wildcard `["*"]`.
    pub fn is_wildcard(&self) -> bool {
        matches!(self.fields.as_slice(), [field] if field == WILDCARD)
    }
}

impl Default for QueryPlan {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for [`QueryPlan`] instances.
#[derive(Debug, Clone)]
pub struct QueryPlanBuilder {
    plan: QueryPlan,
}

impl QueryPlanBuilder {
    /// Creates a new builder with wildcard fields, a match-all filter, no
    /// ordering, and no limit.
    pub fn new() -> Self {
        Self {
            plan: QueryPlan::new(),
        }
    }

    /// Sets the projected field list.
    pub fn fields(mut self, fields: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.plan.fields = fields.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the filter predicate.
    pub fn filter(mut self, filter: Predicate) -> Self {
        self.plan.filter = filter;
        self
    }

    /// Appends an order term. Terms apply in the order they are added.
    pub fn order(mut self, prop: impl Into<String>, direction: SortDirection) -> Self {
        self.plan.order.push(OrderTerm::new(prop, direction));
        self
    }

    /// Sets the result limit. Zero or negative means unlimited.
    pub fn limit(mut self, limit: i64) -> Self {
        self.plan.limit = limit;
        self
    }

    /// Builds and returns the final plan.
    pub fn build(self) -> QueryPlan {
        self.plan
    }
}

impl Default for QueryPlanBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// The external parser collaborator contract.
///
/// Implementations turn a query string (e.g. a SQL-like `SELECT … WHERE …
/// ORDER BY … LIMIT …`) into an evaluable [`QueryPlan`]. Validation of the
/// query description belongs here, not in the executor.
pub trait QueryParser: Send + Sync {
    /// Parses a query string into a plan.
    ///
    /// # Errors
    ///
    /// Returns [`FolioError::Query`](crate::error::FolioError::Query) when
    /// the string is not a valid query.
    fn parse(&self, query: &str) -> FolioResult<QueryPlan>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;

    #[test]
    fn builder_assembles_all_stages() {
        let plan = QueryPlan::builder()
            .fields(["slug", "title"])
            .filter(Predicate::new(|doc| doc.get("title").is_some()))
            .order("updateDate", SortDirection::Desc)
            .order("slug", SortDirection::Asc)
            .limit(5)
            .build();

        assert_eq!(plan.fields, vec!["slug", "title"]);
        assert_eq!(plan.order.len(), 2);
        assert_eq!(plan.order[0].prop, "updateDate");
        assert_eq!(plan.limit, 5);
        assert!(!plan.is_wildcard());
        assert!(plan.filter.matches(&doc! { "title": "x" }));
        assert!(!plan.filter.matches(&doc! { "slug": "no-title" }));
    }

    #[test]
    fn default_plan_is_wildcard_and_unlimited() {
        let plan = QueryPlan::default();
        assert!(plan.is_wildcard());
        assert_eq!(plan.limit, 0);
        assert!(plan.order.is_empty());
        assert!(plan.filter.matches(&doc! {}));
    }

    #[test]
    fn wildcard_must_be_exact() {
        let plan = QueryPlan::builder()
            .fields(["*", "slug"])
            .build();
        assert!(!plan.is_wildcard());
    }

    #[test]
    fn random_is_detected_on_the_prop() {
        let term = OrderTerm::new(RANDOM_ORDER, SortDirection::Random);
        assert!(term.is_random());
        assert!(!OrderTerm::new("title", SortDirection::Random).is_random());
    }
}
