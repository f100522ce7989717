//! In-memory provider
//!
//! Applies the pipeline locally in a fixed order: filter, sort, then either
//! window and map, or group, window over the group keys and map each group.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::error::{DataViewError, DataViewResult};
use crate::options::{Filter, LoadOptions};
use crate::provider::DataProvider;
use crate::record::Record;
use crate::result::{Group, LoadResult, Loaded};
use crate::sorter::Sorter;

/// Serves queries from a local collection
pub struct MemoryProvider<T> {
    items: RwLock<Vec<T>>,
}

impl<T> MemoryProvider<T>
where
    T: Record + Clone + Send + Sync + 'static,
{
    pub fn new(items: Vec<T>) -> Self {
        Self {
            items: RwLock::new(items),
        }
    }

    /// Replace the backing collection
    pub fn replace(&self, items: Vec<T>) {
        *self.items.write() = items;
    }

    pub fn push(&self, item: T) {
        self.items.write().push(item);
    }

    pub fn len(&self) -> usize {
        self.items.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.read().is_empty()
    }

    /// Run the pipeline synchronously
    pub fn query(&self, options: &LoadOptions<T>) -> DataViewResult<LoadResult<T>> {
        let mut items = self.items.read().clone();

        match &options.filter {
            None => {}
            Some(Filter::Predicate(predicate)) => {
                items.retain(|item| predicate(item, &options.params));
            }
            Some(other) => {
                return Err(DataViewError::UnsupportedFilter {
                    provider: self.name(),
                    kind: other.kind(),
                })
            }
        }

        if let Some(order_by) = &options.order_by {
            items = Sorter::parse(order_by).sort(items);
        }

        let Some(group_by) = &options.group_by else {
            let total_count = items.len();
            let data = Loaded::Items(options.apply_window(items));
            return Ok(LoadResult {
                data: data.map_items(options.map.as_ref()),
                total_count,
            });
        };

        let mut groups: Vec<Group<T>> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();
        for item in items {
            let key = group_by(&item);
            match index.get(&key) {
                Some(&slot) => groups[slot].items.push(item),
                None => {
                    index.insert(key.clone(), groups.len());
                    groups.push(Group {
                        key,
                        items: vec![item],
                    });
                }
            }
        }

        let total_count = groups.len();
        let data = Loaded::Groups(options.apply_window(groups));
        Ok(LoadResult {
            data: data.map_items(options.map.as_ref()),
            total_count,
        })
    }
}

#[async_trait]
impl<T> DataProvider<T> for MemoryProvider<T>
where
    T: Record + Clone + Send + Sync + 'static,
{
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn load(&self, options: &LoadOptions<T>) -> DataViewResult<LoadResult<T>> {
        self.query(options)
    }
}
