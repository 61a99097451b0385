use std::cmp::Ordering;
use std::collections::BTreeSet;

use super::{DistinctField, PagedResult, QueryError, QuerySpec, SortKey};
use crate::record::Record;

/// Filter, count, sort and paginate `snapshot` according to `spec`.
///
/// Filters are case-insensitive substring matches and are AND-ed; empty or
/// whitespace-only filters impose no constraint. Equal sort keys are ordered
/// by ascending id in either direction.
pub fn evaluate(snapshot: &[Record], spec: &QuerySpec) -> Result<PagedResult<Record>, QueryError> {
    if spec.page == 0 {
        return Err(QueryError::InvalidPage(spec.page));
    }
    if spec.page_size == 0 {
        return Err(QueryError::InvalidPageSize(spec.page_size));
    }

    let filter = Filter::from_spec(spec);
    let mut matched: Vec<&Record> = snapshot.iter().filter(|r| filter.matches(r)).collect();
    let total_count = matched.len();

    let (key, ascending) = spec.sort_order();
    matched.sort_by(|a, b| {
        let primary = compare_by(key, a, b);
        let primary = if ascending { primary } else { primary.reverse() };
        primary.then_with(|| a.id.cmp(&b.id))
    });

    let skip = (spec.page - 1).saturating_mul(spec.page_size);
    let items = matched
        .into_iter()
        .skip(skip)
        .take(spec.page_size)
        .cloned()
        .collect();

    Ok(PagedResult::new(items, total_count, spec.page, spec.page_size))
}

/// Sorted, de-duplicated values of `field` across the snapshot.
pub fn distinct(snapshot: &[Record], field: DistinctField) -> Vec<String> {
    let values: BTreeSet<&str> = snapshot
        .iter()
        .map(|record| match field {
            DistinctField::Category => record.category.as_str(),
            DistinctField::Author => record.author.as_str(),
        })
        .collect();
    values.into_iter().map(str::to_string).collect()
}

/// Lowercased, non-blank filters from a spec.
struct Filter {
    search_term: Option<String>,
    author: Option<String>,
    category: Option<String>,
}

impl Filter {
    fn from_spec(spec: &QuerySpec) -> Self {
        Self {
            search_term: normalize(spec.search_term.as_deref()),
            author: normalize(spec.author.as_deref()),
            category: normalize(spec.category.as_deref()),
        }
    }

    fn matches(&self, record: &Record) -> bool {
        if let Some(term) = &self.search_term {
            let hit = contains(&record.title, term)
                || contains(&record.author, term)
                || contains(&record.description, term)
                || contains(&record.external_code, term);
            if !hit {
                return false;
            }
        }
        if let Some(author) = &self.author {
            if !contains(&record.author, author) {
                return false;
            }
        }
        if let Some(category) = &self.category {
            if !contains(&record.category, category) {
                return false;
            }
        }
        true
    }
}

fn normalize(raw: Option<&str>) -> Option<String> {
    raw.filter(|value| !value.trim().is_empty())
        .map(str::to_lowercase)
}

fn contains(haystack: &str, needle_lower: &str) -> bool {
    haystack.to_lowercase().contains(needle_lower)
}

fn compare_by(key: SortKey, a: &Record, b: &Record) -> Ordering {
    match key {
        SortKey::Title => compare_text(&a.title, &b.title),
        SortKey::Author => compare_text(&a.author, &b.author),
        SortKey::Category => compare_text(&a.category, &b.category),
        // None sorts before any year.
        SortKey::PublicationYear => a.publication_year.cmp(&b.publication_year),
        SortKey::CreatedAt => a.created_at.cmp(&b.created_at),
    }
}

fn compare_text(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}
