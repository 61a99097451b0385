//! HTTP front door for a [`Catalog`].
//!
//! Requires the `http` feature. Uses axum for routing.
//!
//! ## Routes
//!
//! - `GET /records` - query; query-string fields map onto `QuerySpec`. 429 when the gate denies.
//! - `GET /records/:id` - fetch one record.
//! - `POST /records` - create from a JSON draft (201).
//! - `PUT /records/:id` - replace a record's fields (204).
//! - `DELETE /records/:id` - delete (204).
//! - `POST /import` - raw CSV body.
//! - `GET /categories`, `GET /authors` - sorted distinct values.
//! - `GET /health` - record count and gate counters.
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use record_catalog::{http, Catalog, CatalogConfig};
//!
//! let catalog = Arc::new(Catalog::new(CatalogConfig::from_env()));
//! catalog.seed_samples()?;
//! http::serve(catalog, "0.0.0.0:3000").await?;
//! ```

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;

use crate::catalog::Catalog;
use crate::error::CatalogError;
use crate::query::{DistinctField, QuerySpec};
use crate::record::RecordDraft;
use crate::store::RecordStore;

type Shared<S> = Arc<Catalog<S>>;

/// Build an axum `Router` serving the given catalog.
pub fn router<S: RecordStore + 'static>(catalog: Shared<S>) -> Router {
    Router::new()
        .route("/health", get(health_handler::<S>))
        .route("/records", get(query_handler::<S>).post(create_handler::<S>))
        .route(
            "/records/:id",
            get(get_handler::<S>)
                .put(update_handler::<S>)
                .delete(delete_handler::<S>),
        )
        .route("/import", post(import_handler::<S>))
        .route("/categories", get(categories_handler::<S>))
        .route("/authors", get(authors_handler::<S>))
        .with_state(catalog)
}

/// Serve the catalog over HTTP at the given address (e.g. `"0.0.0.0:3000"`).
pub async fn serve<S: RecordStore + 'static>(
    catalog: Shared<S>,
    addr: &str,
) -> Result<(), std::io::Error> {
    let app = router(catalog);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(addr = %listener.local_addr()?, "catalog listening");
    axum::serve(listener, app).await
}

async fn health_handler<S: RecordStore + 'static>(
    State(catalog): State<Shared<S>>,
) -> Response {
    match catalog.store().len() {
        Ok(records) => Json(json!({
            "ok": true,
            "records": records,
            "gate": catalog.gate_stats(),
        }))
        .into_response(),
        Err(e) => error_response(e),
    }
}

/// The gate blocks, so evaluation runs off the async workers.
async fn query_handler<S: RecordStore + 'static>(
    State(catalog): State<Shared<S>>,
    Query(spec): Query<QuerySpec>,
) -> Response {
    let result = tokio::task::spawn_blocking(move || catalog.query(&spec)).await;
    match result {
        Ok(Ok(page)) => Json(page).into_response(),
        Ok(Err(e)) => error_response(e),
        Err(join) => internal_error(join),
    }
}

async fn get_handler<S: RecordStore + 'static>(
    State(catalog): State<Shared<S>>,
    Path(id): Path<u64>,
) -> Response {
    match catalog.get(id) {
        Ok(Some(record)) => Json(record).into_response(),
        Ok(None) => error_response(CatalogError::NotFound(id)),
        Err(e) => error_response(e),
    }
}

async fn create_handler<S: RecordStore + 'static>(
    State(catalog): State<Shared<S>>,
    Json(draft): Json<RecordDraft>,
) -> Response {
    match catalog.create(draft) {
        Ok(record) => (StatusCode::CREATED, Json(record)).into_response(),
        Err(e) => error_response(e),
    }
}

async fn update_handler<S: RecordStore + 'static>(
    State(catalog): State<Shared<S>>,
    Path(id): Path<u64>,
    Json(draft): Json<RecordDraft>,
) -> Response {
    match catalog.update(id, draft) {
        Ok(true) => StatusCode::NO_CONTENT.into_response(),
        Ok(false) => error_response(CatalogError::NotFound(id)),
        Err(e) => error_response(e),
    }
}

async fn delete_handler<S: RecordStore + 'static>(
    State(catalog): State<Shared<S>>,
    Path(id): Path<u64>,
) -> Response {
    match catalog.delete(id) {
        Ok(true) => StatusCode::NO_CONTENT.into_response(),
        Ok(false) => error_response(CatalogError::NotFound(id)),
        Err(e) => error_response(e),
    }
}

async fn import_handler<S: RecordStore + 'static>(
    State(catalog): State<Shared<S>>,
    body: Bytes,
) -> Response {
    if body.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "no file uploaded" })),
        )
            .into_response();
    }

    let result = tokio::task::spawn_blocking(move || catalog.import_bulk(&body[..])).await;
    match result {
        Ok(Ok(summary)) => Json(json!({
            "succeeded": summary.succeeded,
            "failed": summary.failed,
            "message": format!(
                "Import completed. {} records imported successfully, {} failed.",
                summary.succeeded, summary.failed
            ),
        }))
        .into_response(),
        Ok(Err(e)) => {
            let committed = e.committed();
            let err = CatalogError::from(e);
            let status =
                StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::BAD_REQUEST);
            let body = json!({
                "error": err.to_string(),
                "succeeded": committed.succeeded,
                "failed": committed.failed,
            });
            (status, Json(body)).into_response()
        }
        Err(join) => internal_error(join),
    }
}

async fn categories_handler<S: RecordStore + 'static>(
    State(catalog): State<Shared<S>>,
) -> Response {
    distinct_response(&catalog, DistinctField::Category)
}

async fn authors_handler<S: RecordStore + 'static>(
    State(catalog): State<Shared<S>>,
) -> Response {
    distinct_response(&catalog, DistinctField::Author)
}

fn distinct_response<S: RecordStore>(catalog: &Catalog<S>, field: DistinctField) -> Response {
    match catalog.list_distinct(field) {
        Ok(values) => Json(values).into_response(),
        Err(e) => error_response(e),
    }
}

fn error_response(err: CatalogError) -> Response {
    let status =
        StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    if status.is_server_error() {
        tracing::error!(error = %err, "request failed");
    }
    (status, Json(json!({ "error": err.to_string() }))).into_response()
}

fn internal_error(err: tokio::task::JoinError) -> Response {
    tracing::error!(error = %err, "blocking task failed");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": "internal server error" })),
    )
        .into_response()
}
