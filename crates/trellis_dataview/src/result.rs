//! Load results

use serde::Serialize;

use crate::options::Mapper;

/// Items sharing one group key
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Group<T> {
    pub key: String,
    pub items: Vec<T>,
}

/// Loaded data: a flat list or groups in first-seen key order
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Loaded<T> {
    Items(Vec<T>),
    Groups(Vec<Group<T>>),
}

impl<T> Loaded<T> {
    /// Number of items, or of groups when grouped
    pub fn len(&self) -> usize {
        match self {
            Self::Items(items) => items.len(),
            Self::Groups(groups) => groups.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Flat items; empty when grouped
    pub fn items(&self) -> &[T] {
        match self {
            Self::Items(items) => items,
            Self::Groups(_) => &[],
        }
    }

    /// Groups; empty when not grouped
    pub fn groups(&self) -> &[Group<T>] {
        match self {
            Self::Items(_) => &[],
            Self::Groups(groups) => groups,
        }
    }

    /// Apply `map` to every item (per group when grouped)
    pub fn map_items(self, map: Option<&Mapper<T>>) -> Self {
        let Some(map) = map else {
            return self;
        };
        match self {
            Self::Items(items) => Self::Items(items.into_iter().map(|item| map(item)).collect()),
            Self::Groups(groups) => Self::Groups(
                groups
                    .into_iter()
                    .map(|group| Group {
                        key: group.key,
                        items: group.items.into_iter().map(|item| map(item)).collect(),
                    })
                    .collect(),
            ),
        }
    }
}

impl<T> Default for Loaded<T> {
    fn default() -> Self {
        Self::Items(Vec::new())
    }
}

/// What a provider returns from `load`
#[derive(Debug, Clone, PartialEq)]
pub struct LoadResult<T> {
    pub data: Loaded<T>,
    /// Count after filtering, before paging
    pub total_count: usize,
}

impl<T> LoadResult<T> {
    /// Unpaged result: the total is the item count
    pub fn items(items: Vec<T>) -> Self {
        Self {
            total_count: items.len(),
            data: Loaded::Items(items),
        }
    }
}
