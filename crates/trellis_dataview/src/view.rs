//! Chainable data view
//!
//! Configuration methods accumulate into a [`LoadOptions`] bag that persists
//! across loads until [`DataView::reset`]. `load` hands the bag to the bound
//! provider, stores the result and publishes `"loaded"` on the view's own
//! emitter.

use std::fmt;
use std::sync::Arc;

use serde_json::json;
use trellis_core::{Logger, Params};
use trellis_event::{Emitter, Evented};

use crate::error::DataViewResult;
use crate::memory::MemoryProvider;
use crate::options::{Filter, LoadOptions};
use crate::provider::DataProvider;
use crate::record::{group_key, Record};
use crate::result::{Group, Loaded};

/// Event published after every successful load
pub const LOADED: &str = "loaded";

/// Query builder bound to a provider
pub struct DataView<T>
where
    T: Send + Sync + 'static,
{
    provider: Arc<dyn DataProvider<T>>,
    options: LoadOptions<T>,
    data: Loaded<T>,
    total_count: usize,
    page_count: usize,
    events: Emitter,
    logger: Logger,
}

impl<T> DataView<T>
where
    T: Send + Sync + 'static,
{
    pub fn new(provider: Arc<dyn DataProvider<T>>) -> Self {
        let logger = Logger::new("trellis::dataview");
        Self {
            provider,
            options: LoadOptions::new(),
            data: Loaded::default(),
            total_count: 0,
            page_count: 0,
            events: Emitter::with_logger(logger.scoped("trellis::dataview::events")),
            logger,
        }
    }

    pub fn with_logger(mut self, logger: Logger) -> Self {
        self.logger = logger;
        self
    }

    pub fn skip(&mut self, count: usize) -> &mut Self {
        self.options.skip = Some(count);
        self
    }

    pub fn take(&mut self, count: usize) -> &mut Self {
        self.options.take = Some(count);
        self
    }

    /// 1-based page; with a page size it overrides `skip`
    pub fn page(&mut self, page: usize) -> &mut Self {
        self.options.page = Some(page);
        self
    }

    pub fn page_size(&mut self, size: usize) -> &mut Self {
        self.options.page_size = Some(size);
        self
    }

    /// Keep items for which `predicate(item, params)` holds
    pub fn filter<F>(&mut self, predicate: F) -> &mut Self
    where
        F: Fn(&T, &Params) -> bool + Send + Sync + 'static,
    {
        self.options.filter = Some(Filter::Predicate(Arc::new(predicate)));
        self
    }

    /// Remote filter expression, sent verbatim
    pub fn where_expr(&mut self, expression: impl Into<String>) -> &mut Self {
        self.options.filter = Some(Filter::Expression(expression.into()));
        self
    }

    /// Remote filter expression built from the params at load time
    pub fn where_query<F>(&mut self, query: F) -> &mut Self
    where
        F: Fn(&Params) -> String + Send + Sync + 'static,
    {
        self.options.filter = Some(Filter::Query(Arc::new(query)));
        self
    }

    /// Sort definition, e.g. `"name, age desc"`
    pub fn order_by(&mut self, definition: impl Into<String>) -> &mut Self {
        self.options.order_by = Some(definition.into());
        self
    }

    pub fn group_by<F>(&mut self, key: F) -> &mut Self
    where
        F: Fn(&T) -> String + Send + Sync + 'static,
    {
        self.options.group_by = Some(Arc::new(key));
        self
    }

    /// Transform each item after filtering and paging
    pub fn map<F>(&mut self, map: F) -> &mut Self
    where
        F: Fn(T) -> T + Send + Sync + 'static,
    {
        self.options.map = Some(Arc::new(map));
        self
    }

    pub fn params(&mut self, params: Params) -> &mut Self {
        self.options.params = params;
        self
    }

    /// Remote operation name
    pub fn operation(&mut self, operation: impl Into<String>) -> &mut Self {
        self.options.operation = Some(operation.into());
        self
    }

    /// Clear every accumulated option
    pub fn reset(&mut self) -> &mut Self {
        self.options = LoadOptions::new();
        self
    }

    pub fn options(&self) -> &LoadOptions<T> {
        &self.options
    }

    /// Run the query and store its result
    pub async fn load(&mut self) -> DataViewResult<&Loaded<T>> {
        let result = match self.provider.load(&self.options).await {
            Ok(result) => result,
            Err(error) => {
                self.logger.error(format_args!(
                    "{} load failed: {}",
                    self.provider.name(),
                    error
                ));
                return Err(error);
            }
        };

        self.total_count = result.total_count;
        self.page_count = self.options.page_count(result.total_count);
        self.data = result.data;

        self.logger.debug(format_args!(
            "{} load: {} of {} ({} pages)",
            self.provider.name(),
            self.data.len(),
            self.total_count,
            self.page_count
        ));
        self.events.publish(
            LOADED,
            json!({
                "count": self.data.len(),
                "totalCount": self.total_count,
                "pageCount": self.page_count,
            }),
        );

        Ok(&self.data)
    }

    /// Data from the last load
    pub fn data(&self) -> &Loaded<T> {
        &self.data
    }

    /// Items from the last load; empty when grouped
    pub fn items(&self) -> &[T] {
        self.data.items()
    }

    /// Groups from the last load; empty when not grouped
    pub fn groups(&self) -> &[Group<T>] {
        self.data.groups()
    }

    pub fn total_count(&self) -> usize {
        self.total_count
    }

    pub fn page_count(&self) -> usize {
        self.page_count
    }
}

impl<T> DataView<T>
where
    T: Record + Clone + Send + Sync + 'static,
{
    /// View over a local collection
    pub fn memory(items: Vec<T>) -> Self {
        Self::new(Arc::new(MemoryProvider::new(items)))
    }

    /// Group by the value of a field
    pub fn group_by_field(&mut self, name: impl Into<String>) -> &mut Self {
        let name = name.into();
        self.group_by(move |item: &T| group_key(item, &name))
    }
}

impl<T> Evented for DataView<T>
where
    T: Send + Sync + 'static,
{
    fn emitter(&self) -> &Emitter {
        &self.events
    }
}

impl<T> fmt::Debug for DataView<T>
where
    T: Send + Sync + 'static,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataView")
            .field("provider", &self.provider.name())
            .field("options", &self.options)
            .field("total_count", &self.total_count)
            .field("page_count", &self.page_count)
            .finish()
    }
}
