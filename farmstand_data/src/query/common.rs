//! Shared query infrastructure: the [`Query`] trait, [`QueryCommon`] fields,
//! text search, and [`SortDirection`].

use std::str::FromStr;

use crate::types::{Event, Market, Vendor};
use crate::Directory;

/// Trait implemented by all query builders. A query selects records from one
/// collection of a [`Directory`]; every active filter must hold (AND).
pub trait Query {
    /// The record type this query selects.
    type Item;

    /// Returns a mutable reference to the common query fields.
    fn get_common(&mut self) -> &mut QueryCommon;

    /// Returns the common query fields.
    fn common(&self) -> &QueryCommon;

    /// The collection this query runs over.
    fn collection<'d>(&self, directory: &'d Directory) -> &'d [Self::Item];

    /// Whether `item` passes every filter of this query.
    fn matches(&self, directory: &Directory, item: &Self::Item) -> bool;

    /// Reorders the matched records. Defaults to keeping collection order.
    fn order<'d>(&self, _items: &mut [&'d Self::Item]) {}

    /// Filters, orders and truncates the collection.
    fn run<'d>(&self, directory: &'d Directory) -> Vec<&'d Self::Item> {
        let mut items: Vec<&'d Self::Item> = self
            .collection(directory)
            .iter()
            .filter(|item| self.matches(directory, item))
            .collect();
        self.order(&mut items);
        if let Some(limit) = self.common().limit {
            items.truncate(limit);
        }
        items
    }

    /// Case-insensitive substring search. An empty or whitespace-only
    /// search clears the filter.
    fn with_search(mut self, search: &str) -> Self
    where
        Self: Sized,
    {
        self.get_common().set_search(search);
        self
    }

    /// Caps the number of results.
    fn with_limit(mut self, limit: usize) -> Self
    where
        Self: Sized,
    {
        self.get_common().limit = Some(limit);
        self
    }
}

/// Fields shared by all query types.
#[derive(Clone, Debug, Default)]
pub struct QueryCommon {
    /// Lower-cased search needle. `None` matches everything.
    search: Option<String>,
    /// Maximum number of results. `None` returns all matches.
    pub limit: Option<usize>,
}

impl QueryCommon {
    pub fn search(&self) -> Option<&str> {
        self.search.as_deref()
    }

    pub fn set_search(&mut self, search: &str) {
        let trimmed = search.trim();
        self.search = if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_lowercase())
        };
    }

    /// Whether `item` contains the search needle in any of its searchable fields.
    pub fn matches_text<T: Searchable + ?Sized>(&self, item: &T) -> bool {
        match &self.search {
            None => true,
            Some(needle) => item
                .search_fields()
                .iter()
                .any(|field| field.to_lowercase().contains(needle.as_str())),
        }
    }
}

/// Records that can be matched by a free-text search.
pub trait Searchable {
    /// The text fields a search looks in.
    fn search_fields(&self) -> Vec<&str>;
}

impl Searchable for Market {
    fn search_fields(&self) -> Vec<&str> {
        vec![self.name.as_str(), self.city.as_str(), self.state.as_str()]
    }
}

impl Searchable for Vendor {
    fn search_fields(&self) -> Vec<&str> {
        vec![self.name.as_str(), self.bio.as_str()]
    }
}

impl Searchable for Event {
    fn search_fields(&self) -> Vec<&str> {
        vec![self.title.as_str(), self.description.as_str()]
    }
}

/// Returns the records whose searchable fields contain `query`, ignoring
/// case. An empty query returns every record, in order.
pub fn filter_by_search<'a, T: Searchable>(query: &str, items: &'a [T]) -> Vec<&'a T> {
    let mut common = QueryCommon::default();
    common.set_search(query);
    items.iter().filter(|item| common.matches_text(*item)).collect()
}

/// Sort order for ordered results.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SortDirection {
    /// Ascending order (A to Z, nearest first). This is the default.
    #[default]
    Asc,
    /// Descending order.
    Desc,
}

impl FromStr for SortDirection {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asc" => Ok(SortDirection::Asc),
            "desc" => Ok(SortDirection::Desc),
            _ => Err(()),
        }
    }
}
