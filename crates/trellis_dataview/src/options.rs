//! Load options bag

use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use trellis_core::{empty_params, Params};

/// Item predicate for in-memory filtering, given the item and the view params
pub type Predicate<T> = Arc<dyn Fn(&T, &Params) -> bool + Send + Sync>;

/// Builds a remote filter expression from the view params
pub type QueryBuilder = Arc<dyn Fn(&Params) -> String + Send + Sync>;

/// Computes the group key of an item
pub type GroupBy<T> = Arc<dyn Fn(&T) -> String + Send + Sync>;

/// Transforms each item that survives filtering and paging
pub type Mapper<T> = Arc<dyn Fn(T) -> T + Send + Sync>;

/// A `where` clause
///
/// Providers accept the variants they can evaluate: in-memory providers take
/// predicates, remote providers take expressions.
pub enum Filter<T> {
    /// Evaluated per item
    Predicate(Predicate<T>),
    /// Sent verbatim as the remote filter expression
    Expression(String),
    /// Produces the remote filter expression from the params
    Query(QueryBuilder),
}

impl<T> Filter<T> {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Predicate(_) => "predicate",
            Self::Expression(_) => "expression",
            Self::Query(_) => "query",
        }
    }
}

impl<T> Clone for Filter<T> {
    fn clone(&self) -> Self {
        match self {
            Self::Predicate(predicate) => Self::Predicate(Arc::clone(predicate)),
            Self::Expression(expression) => Self::Expression(expression.clone()),
            Self::Query(query) => Self::Query(Arc::clone(query)),
        }
    }
}

impl<T> fmt::Debug for Filter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Expression(expression) => f.debug_tuple("Expression").field(expression).finish(),
            other => f.write_str(other.kind()),
        }
    }
}

/// Accumulated query options handed to a provider
pub struct LoadOptions<T> {
    pub skip: Option<usize>,
    pub take: Option<usize>,
    /// 1-based page number
    pub page: Option<usize>,
    pub page_size: Option<usize>,
    pub filter: Option<Filter<T>>,
    /// Sort definition (`"name, age desc"`)
    pub order_by: Option<String>,
    pub group_by: Option<GroupBy<T>>,
    pub map: Option<Mapper<T>>,
    pub params: Params,
    /// Remote operation name; overrides the provider default
    pub operation: Option<String>,
}

impl<T> LoadOptions<T> {
    pub fn new() -> Self {
        Self {
            skip: None,
            take: None,
            page: None,
            page_size: None,
            filter: None,
            order_by: None,
            group_by: None,
            map: None,
            params: empty_params(),
            operation: None,
        }
    }

    /// Check if any paging option is set
    pub fn is_paged(&self) -> bool {
        self.skip.is_some() || self.take.is_some() || self.page.is_some() || self.page_size.is_some()
    }

    /// Effective `(skip, take)` window
    ///
    /// A page (1-based) with a page size, or with `take` as the page size,
    /// overrides `skip`.
    pub fn window(&self) -> (usize, Option<usize>) {
        let size = self.page_size.or(self.take);
        match (self.page, size) {
            (Some(page), Some(size)) => (page.saturating_sub(1).saturating_mul(size), Some(size)),
            (None, Some(size)) if self.page_size.is_some() => (self.skip.unwrap_or(0), Some(size)),
            _ => (self.skip.unwrap_or(0), self.take),
        }
    }

    /// Page count for `total` items under these options
    ///
    /// Without a page size or `take` everything is one page.
    pub fn page_count(&self, total: usize) -> usize {
        match self.page_size.or(self.take) {
            Some(0) => 0,
            Some(size) => total.div_ceil(size),
            None => usize::from(total > 0),
        }
    }

    /// Slice `items` to the paging window
    pub fn apply_window<I>(&self, items: Vec<I>) -> Vec<I> {
        let (skip, take) = self.window();
        let window = items.into_iter().skip(skip);
        match take {
            Some(take) => window.take(take).collect(),
            None => window.collect(),
        }
    }
}

impl<T> Default for LoadOptions<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for LoadOptions<T> {
    fn clone(&self) -> Self {
        Self {
            skip: self.skip,
            take: self.take,
            page: self.page,
            page_size: self.page_size,
            filter: self.filter.clone(),
            order_by: self.order_by.clone(),
            group_by: self.group_by.clone(),
            map: self.map.clone(),
            params: self.params.clone(),
            operation: self.operation.clone(),
        }
    }
}

impl<T> fmt::Debug for LoadOptions<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadOptions")
            .field("skip", &self.skip)
            .field("take", &self.take)
            .field("page", &self.page)
            .field("page_size", &self.page_size)
            .field("filter", &self.filter)
            .field("order_by", &self.order_by)
            .field("grouped", &self.group_by.is_some())
            .field("mapped", &self.map.is_some())
            .field("params", &self.params)
            .field("operation", &self.operation)
            .finish()
    }
}

/// Read a count that may arrive as a number or a numeric string
pub(crate) fn count_value(value: &Value) -> Option<usize> {
    match value {
        Value::Number(number) => number.as_u64().and_then(|n| usize::try_from(n).ok()),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}
