//! REST API module.
//!
//! Contains all API routes and handlers exposed to the storefront UI.

mod admin;
mod cart;
mod catalog;
mod filters;
mod products;
mod revision;

pub use admin::*;
pub use cart::*;
pub use catalog::*;
pub use filters::*;
pub use products::*;
pub use revision::*;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::store::Persisted;
use crate::AppState;

/// Success response envelope.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub data: T,
    pub revision_id: i64,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn new(data: T, revision_id: i64) -> Self {
        Self {
            success: true,
            data,
            revision_id,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

/// Response type that can be either success or error.
pub type ApiResult<T> = Result<ApiResponse<T>, crate::errors::AppErrorWithRevision>;

/// Create a successful API response.
pub fn success<T: Serialize>(data: T, revision_id: i64) -> ApiResult<T> {
    Ok(ApiResponse::new(data, revision_id))
}

/// Create an error API response.
pub fn error<T: Serialize>(err: crate::errors::AppError, revision_id: i64) -> ApiResult<T> {
    Err(crate::errors::AppErrorWithRevision {
        error: err,
        revision_id,
    })
}

/// Make sure the category tree is loaded before projecting from it.
///
/// Failures are logged only. Filtering works by id, so an unreachable
/// backend costs localized names and sections, never the request.
async fn refresh_categories(state: &AppState) {
    if let Err(e) = state.catalog.load_categories(&state.storefront).await {
        tracing::warn!("Categories unavailable, sections left as they are: {}", e);
    }
}

/// Write a store's snapshot and the revision after a mutation.
///
/// Failures are logged only; the in-memory state stays authoritative.
async fn persist<S: Persisted>(state: &AppState, store: &S, revision_id: i64) {
    if let Err(e) = state.repo.save_snapshot(store).await {
        tracing::warn!("Failed to persist {}: {}", S::STORAGE_KEY, e);
    }
    if let Err(e) = state.repo.set_revision(revision_id).await {
        tracing::warn!("Failed to record revision {}: {}", revision_id, e);
    }
}
