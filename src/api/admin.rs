//! Admin endpoints.

use axum::extract::State;

use super::{success, ApiResult};
use crate::AppState;

/// POST /api/admin/catalog/invalidate - Force a refetch on the next read.
///
/// Called after products, categories or news were edited in the backend.
pub async fn invalidate_catalog(State(state): State<AppState>) -> ApiResult<()> {
    state.catalog.invalidate().await;

    let revision_id = state.storefront.read().await.revision();
    success((), revision_id)
}
