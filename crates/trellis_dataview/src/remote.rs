//! Remote (OData-style) provider
//!
//! Translates load options into query parameters and trusts the server to
//! filter, sort and page. Responses may arrive as a bare array,
//! `{ totalCount, items }`, a v1 envelope `{ d: [...] }` or a v2 envelope
//! `{ d: { results: [...], __count } }`.

use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use trellis_core::Logger;
use url::form_urlencoded::byte_serialize;

use crate::error::{DataViewError, DataViewResult};
use crate::options::{count_value, Filter, LoadOptions};
use crate::provider::DataProvider;
use crate::result::{LoadResult, Loaded};
use crate::sorter::Sorter;
use crate::transport::Transport;

/// Loads through a [`Transport`] against `root_url + operation`
pub struct RemoteProvider<T> {
    root_url: String,
    default_operation: Option<String>,
    transport: Arc<dyn Transport>,
    logger: Logger,
    _items: PhantomData<fn() -> T>,
}

impl<T> RemoteProvider<T>
where
    T: DeserializeOwned + Send + Sync + 'static,
{
    pub fn new(root_url: impl Into<String>, transport: Arc<dyn Transport>) -> Self {
        Self {
            root_url: root_url.into(),
            default_operation: None,
            transport,
            logger: Logger::new("trellis::dataview"),
            _items: PhantomData,
        }
    }

    /// Operation used when the load options name none
    pub fn with_operation(mut self, operation: impl Into<String>) -> Self {
        self.default_operation = Some(operation.into());
        self
    }

    pub fn with_logger(mut self, logger: Logger) -> Self {
        self.logger = logger;
        self
    }

    pub fn root_url(&self) -> &str {
        &self.root_url
    }

    fn operation_url(&self, operation: &str) -> String {
        if self.root_url.is_empty() || self.root_url.ends_with('/') {
            format!("{}{}", self.root_url, operation)
        } else {
            format!("{}/{}", self.root_url, operation)
        }
    }

    /// Full request URL for `options`
    pub fn build_url(&self, options: &LoadOptions<T>) -> DataViewResult<String> {
        let operation = options
            .operation
            .as_deref()
            .or(self.default_operation.as_deref())
            .ok_or(DataViewError::MissingOperation)?;
        let query = self.build_query(options)?;

        let url = self.operation_url(operation);
        Ok(if query.is_empty() {
            url
        } else {
            format!("{}?{}", url, query)
        })
    }

    /// Query string for `options`, without the leading `?`
    ///
    /// Parameters appear in the order `$filter`, `$orderby`, `$skip`, `$take`,
    /// `$inlinecount`. `$skip` is omitted when the effective skip is 0, even
    /// if `skip(0)` was set explicitly; `$inlinecount=allpages` is added
    /// whenever any paging option is set.
    pub fn build_query(&self, options: &LoadOptions<T>) -> DataViewResult<String> {
        if options.group_by.is_some() {
            return Err(DataViewError::UnsupportedGrouping {
                provider: self.name(),
            });
        }

        let mut pairs: Vec<(&str, String)> = Vec::new();

        match &options.filter {
            None => {}
            Some(Filter::Expression(expression)) => pairs.push(("$filter", expression.clone())),
            Some(Filter::Query(query)) => pairs.push(("$filter", query(&options.params))),
            Some(other) => {
                return Err(DataViewError::UnsupportedFilter {
                    provider: self.name(),
                    kind: other.kind(),
                })
            }
        }

        if let Some(order_by) = &options.order_by {
            let sorter = Sorter::parse(order_by);
            if sorter.is_set() {
                pairs.push(("$orderby", sorter.to_odata()));
            }
        }

        if options.is_paged() {
            let (skip, take) = options.window();
            if skip > 0 {
                pairs.push(("$skip", skip.to_string()));
            }
            if let Some(take) = take {
                pairs.push(("$take", take.to_string()));
            }
            pairs.push(("$inlinecount", "allpages".to_string()));
        }

        Ok(pairs
            .into_iter()
            .map(|(key, value)| format!("{}={}", key, byte_serialize(value.as_bytes()).collect::<String>()))
            .collect::<Vec<_>>()
            .join("&"))
    }

    /// Unwrap a server response into items and a total count
    pub fn process_result(&self, response: Value) -> DataViewResult<LoadResult<T>> {
        let (items, total_count) = unwrap_envelope(response)?;
        let items = items
            .into_iter()
            .map(serde_json::from_value)
            .collect::<Result<Vec<T>, _>>()?;
        let total_count = total_count.unwrap_or(items.len());

        Ok(LoadResult {
            data: Loaded::Items(items),
            total_count,
        })
    }

    /// POST `body` to a named operation
    pub async fn post_operation(&self, operation: &str, body: &Value) -> DataViewResult<Value> {
        let url = self.operation_url(operation);
        self.logger.debug(format_args!("POST {}", url));
        Ok(self.transport.post(&url, body).await?)
    }
}

fn unwrap_envelope(response: Value) -> DataViewResult<(Vec<Value>, Option<usize>)> {
    match response {
        Value::Array(items) => Ok((items, None)),
        Value::Object(mut object) => {
            if let Some(d) = object.remove("d") {
                return match d {
                    Value::Array(items) => Ok((items, object.get("__count").and_then(count_value))),
                    Value::Object(mut inner) => {
                        let count = inner.get("__count").and_then(count_value);
                        match inner.remove("results") {
                            Some(Value::Array(items)) => Ok((items, count)),
                            _ => Err(DataViewError::InvalidResponse(
                                "'d' envelope without a 'results' array".to_string(),
                            )),
                        }
                    }
                    _ => Err(DataViewError::InvalidResponse(
                        "'d' is neither an array nor an object".to_string(),
                    )),
                };
            }

            let count = object.get("totalCount").and_then(count_value);
            match object.remove("items") {
                Some(Value::Array(items)) => Ok((items, count)),
                _ => Err(DataViewError::InvalidResponse(
                    "expected an array, 'items' or a 'd' envelope".to_string(),
                )),
            }
        }
        other => Err(DataViewError::InvalidResponse(format!(
            "unexpected response: {}",
            other
        ))),
    }
}

#[async_trait]
impl<T> DataProvider<T> for RemoteProvider<T>
where
    T: DeserializeOwned + Send + Sync + 'static,
{
    fn name(&self) -> &'static str {
        "remote"
    }

    async fn load(&self, options: &LoadOptions<T>) -> DataViewResult<LoadResult<T>> {
        let url = self.build_url(options)?;
        self.logger.debug(format_args!("GET {}", url));

        let response = self.transport.get(&url).await?;
        let result = self.process_result(response)?;

        Ok(LoadResult {
            data: result.data.map_items(options.map.as_ref()),
            total_count: result.total_count,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::TransportResult;
    use serde_json::json;

    struct Unreachable;

    #[async_trait]
    impl Transport for Unreachable {
        async fn get(&self, url: &str) -> TransportResult<Value> {
            Err(crate::transport::TransportError::Request {
                url: url.to_string(),
                message: "offline".to_string(),
            })
        }

        async fn post(&self, url: &str, _body: &Value) -> TransportResult<Value> {
            self.get(url).await
        }
    }

    fn provider() -> RemoteProvider<Value> {
        RemoteProvider::new("/api/", Arc::new(Unreachable))
            .with_operation("MyServiceOperation")
            .with_logger(Logger::disabled("test"))
    }

    #[test]
    fn test_take_adds_inline_count() {
        let mut options = LoadOptions::new();
        options.take = Some(5);
        assert_eq!(
            provider().build_url(&options).unwrap(),
            "/api/MyServiceOperation?$take=5&$inlinecount=allpages"
        );
    }

    #[test]
    fn test_zero_skip_is_omitted() {
        let mut options = LoadOptions::new();
        options.skip = Some(0);
        assert_eq!(provider().build_query(&options).unwrap(), "$inlinecount=allpages");

        options.take = Some(5);
        assert_eq!(
            provider().build_query(&options).unwrap(),
            "$take=5&$inlinecount=allpages"
        );
    }

    #[test]
    fn test_unpaged_query_is_bare() {
        assert_eq!(
            provider().build_url(&LoadOptions::new()).unwrap(),
            "/api/MyServiceOperation"
        );
    }

    #[test]
    fn test_full_query_order_and_encoding() {
        let mut options = LoadOptions::new();
        options.filter = Some(Filter::Expression("Name eq 'a b'".to_string()));
        options.order_by = Some("Name, Age desc".to_string());
        options.page = Some(3);
        options.page_size = Some(10);
        options.operation = Some("People".to_string());

        assert_eq!(
            provider().build_url(&options).unwrap(),
            "/api/People?$filter=Name+eq+%27a+b%27&$orderby=Name%2CAge+desc&$skip=20&$take=10&$inlinecount=allpages"
        );
    }

    #[test]
    fn test_query_filter_receives_params() {
        let mut options = LoadOptions::new();
        options.params = json!({ "city": "Oslo" });
        options.filter = Some(Filter::Query(Arc::new(|params: &Value| {
            format!("City eq '{}'", params["city"].as_str().unwrap_or_default())
        })));

        assert_eq!(
            provider().build_query(&options).unwrap(),
            "$filter=City+eq+%27Oslo%27"
        );
    }

    #[test]
    fn test_predicates_and_grouping_are_rejected() {
        let mut options: LoadOptions<Value> = LoadOptions::new();
        options.filter = Some(Filter::Predicate(Arc::new(|_: &Value, _: &Value| true)));
        assert!(matches!(
            provider().build_query(&options),
            Err(DataViewError::UnsupportedFilter { provider: "remote", kind: "predicate" })
        ));

        let mut options: LoadOptions<Value> = LoadOptions::new();
        options.group_by = Some(Arc::new(|_: &Value| String::new()));
        assert!(matches!(
            provider().build_query(&options),
            Err(DataViewError::UnsupportedGrouping { provider: "remote" })
        ));
    }

    #[test]
    fn test_missing_operation() {
        let provider: RemoteProvider<Value> = RemoteProvider::new("/api", Arc::new(Unreachable));
        assert!(matches!(
            provider.build_url(&LoadOptions::new()),
            Err(DataViewError::MissingOperation)
        ));

        let mut options = LoadOptions::new();
        options.operation = Some("Items".to_string());
        assert_eq!(provider.build_url(&options).unwrap(), "/api/Items");
    }

    #[test]
    fn test_process_result_shapes() {
        let provider = provider();

        let plain = provider.process_result(json!([1, 2, 3])).unwrap();
        assert_eq!(plain.total_count, 3);

        let counted = provider
            .process_result(json!({ "totalCount": 40, "items": [1, 2] }))
            .unwrap();
        assert_eq!(counted.data, Loaded::Items(vec![json!(1), json!(2)]));
        assert_eq!(counted.total_count, 40);

        let v1 = provider.process_result(json!({ "d": [1] })).unwrap();
        assert_eq!(v1.total_count, 1);

        let v2 = provider
            .process_result(json!({ "d": { "results": [1, 2], "__count": "25" } }))
            .unwrap();
        assert_eq!(v2.data.len(), 2);
        assert_eq!(v2.total_count, 25);

        assert!(matches!(
            provider.process_result(json!({ "d": { "value": [] } })),
            Err(DataViewError::InvalidResponse(_))
        ));
        assert!(matches!(
            provider.process_result(json!("nope")),
            Err(DataViewError::InvalidResponse(_))
        ));
    }

    #[tokio::test]
    async fn test_transport_failure_propagates() {
        let err = provider().load(&LoadOptions::new()).await.unwrap_err();
        assert!(matches!(err, DataViewError::Transport(_)));
    }
}
