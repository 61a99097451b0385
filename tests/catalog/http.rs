//! HTTP front door integration tests.
//!
//! Starts an axum server on an ephemeral port and exercises it with reqwest.

use std::sync::Arc;
use std::time::Duration;

use record_catalog::{http, Catalog, CatalogConfig, RecordStore};
use serde_json::{json, Value};

/// Bind to port 0 and return the actual address.
async fn start_server(catalog: Arc<Catalog>) -> String {
    let app = http::router(catalog);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

fn seeded() -> Arc<Catalog> {
    let catalog = Catalog::new(CatalogConfig::default());
    catalog.seed_samples().unwrap();
    Arc::new(catalog)
}

#[tokio::test]
async fn health_check() {
    let base = start_server(seeded()).await;
    let client = reqwest::Client::new();

    let resp = client.get(format!("{base}/health")).send().await.unwrap();
    assert_eq!(resp.status(), 200);

    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["ok"], true);
    assert_eq!(body["records"], 5);
    assert_eq!(body["gate"]["capacity"], 10);
}

#[tokio::test]
async fn record_lifecycle() {
    let base = start_server(Arc::new(Catalog::default())).await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{base}/records"))
        .json(&json!({
            "title": "Dune",
            "author": "Frank Herbert",
            "genre": "Science Fiction",
            "publicationYear": 1965
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 201);
    let created: Value = resp.json().await.unwrap();
    assert_eq!(created["id"], 1);
    assert_eq!(created["category"], "Science Fiction");

    let resp = client
        .put(format!("{base}/records/1"))
        .json(&json!({
            "title": "Dune Messiah",
            "author": "Frank Herbert",
            "category": "Science Fiction",
            "publicationYear": 1969
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 204);

    let resp = client.get(format!("{base}/records/1")).send().await.unwrap();
    assert_eq!(resp.status(), 200);
    let fetched: Value = resp.json().await.unwrap();
    assert_eq!(fetched["title"], "Dune Messiah");
    assert_eq!(fetched["publicationYear"], 1969);
    assert!(!fetched["updatedAt"].is_null());

    let resp = client.delete(format!("{base}/records/1")).send().await.unwrap();
    assert_eq!(resp.status(), 204);

    let resp = client.get(format!("{base}/records/1")).send().await.unwrap();
    assert_eq!(resp.status(), 404);
    let resp = client.delete(format!("{base}/records/1")).send().await.unwrap();
    assert_eq!(resp.status(), 404);
}

#[tokio::test]
async fn invalid_draft_is_bad_request() {
    let base = start_server(Arc::new(Catalog::default())).await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{base}/records"))
        .json(&json!({ "title": "", "author": "Someone", "category": "Thing" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("title"));
}

#[tokio::test]
async fn query_string_maps_onto_query() {
    let base = start_server(seeded()).await;
    let client = reqwest::Client::new();

    let resp = client
        .get(format!(
            "{base}/records?genre=fantasy&sortBy=year&sortAscending=false&page=1&pageSize=1"
        ))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["totalCount"], 2);
    assert_eq!(body["pageCount"], 2);
    let items = body["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["title"], "Harry Potter and the Philosopher's Stone");
}

#[tokio::test]
async fn zero_page_size_is_bad_request() {
    let base = start_server(seeded()).await;
    let client = reqwest::Client::new();

    let resp = client
        .get(format!("{base}/records?pageSize=0"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
}

#[tokio::test]
async fn denied_query_is_too_many_requests() {
    let config = CatalogConfig::default()
        .with_gate_capacity(0)
        .with_query_timeout(Duration::from_millis(10));
    let base = start_server(Arc::new(Catalog::new(config))).await;
    let client = reqwest::Client::new();

    let resp = client.get(format!("{base}/records")).send().await.unwrap();
    assert_eq!(resp.status(), 429);
    let body: Value = resp.json().await.unwrap();
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn import_reports_counts() {
    let catalog = Arc::new(Catalog::default());
    let base = start_server(Arc::clone(&catalog)).await;
    let client = reqwest::Client::new();

    let csv = "Title,Author,Genre,Description,PublicationYear,ISBN\n\
               Dune,Frank Herbert,Science Fiction,,1965,\n\
               Emma,Jane Austen,Novel,,not-a-year,\n\
               Ulysses,James Joyce,Novel,,1922,\n";
    let resp = client
        .post(format!("{base}/import"))
        .body(csv)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["succeeded"], 2);
    assert_eq!(body["failed"], 1);
    assert!(body["message"].as_str().unwrap().contains("2 records imported"));
    assert_eq!(catalog.store().len().unwrap(), 2);
}

#[tokio::test]
async fn empty_import_is_bad_request() {
    let base = start_server(Arc::new(Catalog::default())).await;
    let client = reqwest::Client::new();

    let resp = client.post(format!("{base}/import")).send().await.unwrap();
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "no file uploaded");

    let resp = client
        .post(format!("{base}/import"))
        .body("Name,Writer\nDune,Frank Herbert\n")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["succeeded"], 0);
}

#[tokio::test]
async fn distinct_lists() {
    let base = start_server(seeded()).await;
    let client = reqwest::Client::new();

    let categories: Vec<String> = client
        .get(format!("{base}/categories"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(categories, vec!["Dystopia", "Epic novel", "Fantasy", "Novel"]);

    let authors: Vec<String> = client
        .get(format!("{base}/authors"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(authors.len(), 5);
    assert_eq!(authors[0], "Fyodor Dostoevsky");
}
