//! Provider contract

use async_trait::async_trait;

use crate::error::DataViewResult;
use crate::options::LoadOptions;
use crate::result::LoadResult;

/// A backend a [`DataView`](crate::DataView) loads through
#[async_trait]
pub trait DataProvider<T>: Send + Sync
where
    T: Send + Sync + 'static,
{
    /// Provider name used in errors and logs
    fn name(&self) -> &'static str;

    /// Run a query described by `options`
    async fn load(&self, options: &LoadOptions<T>) -> DataViewResult<LoadResult<T>>;
}
