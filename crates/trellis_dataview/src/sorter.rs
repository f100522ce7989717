//! Multi-key sorter
//!
//! A definition is a comma-separated list of `name [direction]` clauses.
//! `desc` and `descending` sort descending; any other direction token, or
//! none, sorts ascending.

use std::cmp::Ordering;
use std::fmt;

use crate::record::{compare_values, Record};

/// Sort direction of one key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    fn from_token(token: Option<&str>) -> Self {
        match token.map(str::to_ascii_lowercase).as_deref() {
            Some("desc") | Some("descending") => Self::Descending,
            _ => Self::Ascending,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ascending => "ascending",
            Self::Descending => "descending",
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct SortKey {
    property: String,
    direction: SortDirection,
}

/// Stable multi-key sorter over [`Record`]s
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sorter {
    keys: Vec<SortKey>,
}

impl Sorter {
    /// Sorter with no definition; sorting is the identity
    pub fn new() -> Self {
        Self::default()
    }

    pub fn parse(definition: &str) -> Self {
        let mut sorter = Self::new();
        sorter.set_sort_order(definition);
        sorter
    }

    /// Replace the sort definition
    pub fn set_sort_order(&mut self, definition: &str) {
        self.keys = definition
            .split(',')
            .filter_map(|clause| {
                let mut tokens = clause.split_whitespace();
                let property = tokens.next()?;
                Some(SortKey {
                    property: property.to_string(),
                    direction: SortDirection::from_token(tokens.next()),
                })
            })
            .collect();
    }

    /// Check if any sort key is defined
    pub fn is_set(&self) -> bool {
        !self.keys.is_empty()
    }

    /// Direction `name` is sorted in, if it is a sort key
    pub fn property_sort_order(&self, name: &str) -> Option<SortDirection> {
        self.keys
            .iter()
            .find(|key| key.property == name)
            .map(|key| key.direction)
    }

    /// Sort `items`; equal items keep their relative order
    pub fn sort<T: Record>(&self, mut items: Vec<T>) -> Vec<T> {
        if self.keys.is_empty() {
            return items;
        }
        items.sort_by(|a, b| self.compare(a, b));
        items
    }

    fn compare<T: Record>(&self, a: &T, b: &T) -> Ordering {
        for key in &self.keys {
            let ordering = compare_values(
                a.field(&key.property).as_ref(),
                b.field(&key.property).as_ref(),
            );
            let ordering = match key.direction {
                SortDirection::Ascending => ordering,
                SortDirection::Descending => ordering.reverse(),
            };
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    }

    /// Short form for an OData `$orderby` (`a,b desc`)
    pub fn to_odata(&self) -> String {
        self.keys
            .iter()
            .map(|key| match key.direction {
                SortDirection::Ascending => key.property.clone(),
                SortDirection::Descending => format!("{} desc", key.property),
            })
            .collect::<Vec<_>>()
            .join(",")
    }
}

/// Canonical long form: `a ascending, b descending`
impl fmt::Display for Sorter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, key) in self.keys.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{} {}", key.property, key.direction)?;
        }
        Ok(())
    }
}
