//! Filter selection endpoints.

use axum::{
    extract::{Path, State},
    Json,
};

use super::{persist, success, ApiResult};
use crate::models::{FilterView, ToggleCreatorRequest};
use crate::AppState;

/// GET /api/filters - Current selection.
pub async fn get_filters(State(state): State<AppState>) -> ApiResult<FilterView> {
    let store = state.storefront.read().await;
    success(store.filters.view(), store.revision())
}

/// POST /api/filters/sections/:id/toggle - Single-select section toggle.
pub async fn toggle_section(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<FilterView> {
    let mut store = state.storefront.write().await;

    store.filters.toggle_section(id);
    let revision_id = store.bump_revision();
    persist(&state, &store.filters, revision_id).await;

    success(store.filters.view(), revision_id)
}

/// POST /api/filters/sections/:id/select - Toggle the section and highlight it.
pub async fn select_section(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<FilterView> {
    let mut store = state.storefront.write().await;

    store.select_section(id);
    let revision_id = store.bump_revision();
    persist(&state, &store.filters, revision_id).await;
    persist(&state, &store.categories, revision_id).await;

    success(store.filters.view(), revision_id)
}

/// POST /api/filters/subsections/:id/toggle - Multi-select subsection toggle.
pub async fn toggle_subsection(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<FilterView> {
    let mut store = state.storefront.write().await;

    store.filters.toggle_subsection(id);
    let revision_id = store.bump_revision();
    persist(&state, &store.filters, revision_id).await;

    success(store.filters.view(), revision_id)
}

/// POST /api/filters/creators/toggle - Multi-select manufacturer toggle.
pub async fn toggle_creator(
    State(state): State<AppState>,
    Json(request): Json<ToggleCreatorRequest>,
) -> ApiResult<FilterView> {
    let mut store = state.storefront.write().await;

    store.filters.toggle_creator(&request.name);
    let revision_id = store.bump_revision();
    persist(&state, &store.filters, revision_id).await;

    success(store.filters.view(), revision_id)
}

/// DELETE /api/filters - Clear every filter at once.
pub async fn clear_filters(State(state): State<AppState>) -> ApiResult<FilterView> {
    let mut store = state.storefront.write().await;

    store.filters.clear_filters();
    let revision_id = store.bump_revision();
    persist(&state, &store.filters, revision_id).await;

    success(store.filters.view(), revision_id)
}
