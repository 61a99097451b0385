//! Query behavior through the catalog's gated read path.

use std::collections::HashSet;

use record_catalog::{Catalog, CatalogConfig, CatalogError, DistinctField, QueryError, QuerySpec};

use crate::support::{draft, populated};

#[test]
fn search_finds_single_match() {
    let catalog = Catalog::new(CatalogConfig::default());
    catalog
        .create(draft("1984", "George Orwell", "Dystopia").with_publication_year(1949))
        .unwrap();
    catalog
        .create(draft("War and Peace", "Leo Tolstoy", "Epic").with_publication_year(1869))
        .unwrap();

    let page = catalog
        .query(&QuerySpec::default().search("war").page(1).page_size(10))
        .unwrap();

    assert_eq!(page.total_count, 1);
    let titles: Vec<&str> = page.items.iter().map(|r| r.title.as_str()).collect();
    assert_eq!(titles, vec!["War and Peace"]);
}

#[test]
fn page_beyond_end_is_empty() {
    let catalog = populated(3);
    let page = catalog
        .query(&QuerySpec::default().page(5).page_size(10))
        .unwrap();

    assert!(page.items.is_empty());
    assert_eq!(page.total_count, 3);
    assert_eq!(page.page, 5);
}

#[test]
fn pages_cover_filtered_set_exactly_once() {
    let catalog = populated(47);
    let base = QuerySpec::default()
        .category("science")
        .sort_by("year", false)
        .page_size(7);

    let first = catalog.query(&base).unwrap();
    assert_eq!(first.total_count, 24);
    assert_eq!(first.page_count, 4);

    let mut seen = Vec::new();
    for page in 1..=first.page_count {
        let result = catalog.query(&base.clone().page(page)).unwrap();
        assert!(result.items.len() <= 7);
        assert_eq!(result.total_count, first.total_count);
        seen.extend(result.items);
    }

    let unique: HashSet<u64> = seen.iter().map(|r| r.id).collect();
    assert_eq!(seen.len(), 24);
    assert_eq!(unique.len(), 24);

    let everything = catalog.query(&base.clone().page_size(100)).unwrap();
    assert_eq!(seen, everything.items);
}

#[test]
fn every_result_matches_every_filter() {
    let catalog = populated(60);
    let spec = QuerySpec::default()
        .search("volume 0")
        .author("chiang")
        .category("FANTASY")
        .page_size(100);

    let page = catalog.query(&spec).unwrap();
    assert!(page.total_count > 0);
    for record in &page.items {
        assert!(record.title.to_lowercase().contains("volume 0"));
        assert!(record.author.to_lowercase().contains("chiang"));
        assert!(record.category.to_lowercase().contains("fantasy"));
    }
}

#[test]
fn repeated_queries_agree() {
    let catalog = populated(30);
    let spec = QuerySpec::default().search("volume").sort_by("author", true).page(2).page_size(4);
    assert_eq!(catalog.query(&spec).unwrap(), catalog.query(&spec).unwrap());
}

#[test]
fn invalid_paging_is_rejected() {
    let catalog = populated(3);
    let err = catalog.query(&QuerySpec::default().page_size(0)).unwrap_err();
    assert_eq!(err, CatalogError::InvalidQuery(QueryError::InvalidPageSize(0)));
    assert_eq!(err.status_code(), 400);
}

#[test]
fn distinct_lists_are_sorted() {
    let catalog = populated(10);
    assert_eq!(
        catalog.list_distinct(DistinctField::Author).unwrap(),
        vec!["Ann Leckie", "N. K. Jemisin", "Ted Chiang"]
    );
    assert_eq!(
        catalog.list_distinct(DistinctField::Category).unwrap(),
        vec!["Fantasy", "Science Fiction"]
    );
}
