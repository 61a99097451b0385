//! Query Evaluator - filter, sort and paginate a snapshot of records.
//!
//! Evaluation is a pure function of a snapshot and a [`QuerySpec`]: the same
//! inputs always give the same [`PagedResult`]. Steps run in a fixed order:
//! filter, count, sort, paginate.
//!
//! ## Example
//!
//! ```ignore
//! use record_catalog::query::{evaluate, QuerySpec};
//!
//! let spec = QuerySpec::default().search("war").page_size(5);
//! let page = evaluate(&store.list_snapshot()?, &spec)?;
//! println!("{} of {} matches", page.items.len(), page.total_count);
//! ```

mod evaluator;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use evaluator::{distinct, evaluate};

pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Caller-supplied filter, sort and pagination parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct QuerySpec {
    /// 1-based page number.
    pub page: usize,
    pub page_size: usize,
    /// Substring matched against title, author, description and external code.
    pub search_term: Option<String>,
    pub author: Option<String>,
    #[serde(alias = "genre")]
    pub category: Option<String>,
    /// Raw sort key; unrecognized or absent keys fall back to title ascending.
    pub sort_by: Option<String>,
    pub sort_ascending: bool,
}

impl Default for QuerySpec {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
            search_term: None,
            author: None,
            category: None,
            sort_by: Some("title".to_string()),
            sort_ascending: true,
        }
    }
}

impl QuerySpec {
    pub fn page(mut self, page: usize) -> Self {
        self.page = page;
        self
    }

    pub fn page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.search_term = Some(term.into());
        self
    }

    pub fn author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn sort_by(mut self, key: impl Into<String>, ascending: bool) -> Self {
        self.sort_by = Some(key.into());
        self.sort_ascending = ascending;
        self
    }

    /// The effective sort key and direction.
    ///
    /// Direction is only honored for a recognized key.
    pub fn sort_order(&self) -> (SortKey, bool) {
        match self.sort_by.as_deref().and_then(SortKey::parse) {
            Some(key) => (key, self.sort_ascending),
            None => (SortKey::Title, true),
        }
    }
}

/// Enumerated sort keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortKey {
    Title,
    Author,
    Category,
    PublicationYear,
    CreatedAt,
}

impl SortKey {
    /// Parse a sort key case-insensitively. Accepts `genre` and `year` as
    /// aliases.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "title" => Some(SortKey::Title),
            "author" => Some(SortKey::Author),
            "category" | "genre" => Some(SortKey::Category),
            "publicationyear" | "year" => Some(SortKey::PublicationYear),
            "createdat" => Some(SortKey::CreatedAt),
            _ => None,
        }
    }
}

/// Fields that `distinct` can enumerate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistinctField {
    Category,
    Author,
}

/// One page of matching items plus total-match metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PagedResult<T> {
    pub items: Vec<T>,
    /// Matches before pagination.
    pub total_count: usize,
    pub page: usize,
    pub page_size: usize,
    pub page_count: usize,
}

impl<T> PagedResult<T> {
    pub fn new(items: Vec<T>, total_count: usize, page: usize, page_size: usize) -> Self {
        let page_count = if page_size == 0 {
            0
        } else {
            total_count.div_ceil(page_size)
        };
        Self {
            items,
            total_count,
            page,
            page_size,
            page_count,
        }
    }
}

/// Rejected query parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    InvalidPage(usize),
    InvalidPageSize(usize),
}

impl fmt::Display for QueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryError::InvalidPage(page) => write!(f, "page must be at least 1 (got {})", page),
            QueryError::InvalidPageSize(size) => {
                write!(f, "page size must be at least 1 (got {})", size)
            }
        }
    }
}

impl std::error::Error for QueryError {}
