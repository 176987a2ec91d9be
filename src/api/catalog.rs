//! Category panel endpoints: sections, language and highlighted category.

use axum::{
    extract::{Path, State},
    Json,
};

use super::{error, persist, refresh_categories, success, ApiResult};
use crate::errors::AppError;
use crate::models::{CatalogView, Language, Section, SetActiveCategoryRequest, SetLanguageRequest};
use crate::AppState;

/// GET /api/catalog - Language, highlighted category and sections.
pub async fn get_catalog(State(state): State<AppState>) -> ApiResult<CatalogView> {
    if let Err(e) = state.catalog.load_categories(&state.storefront).await {
        let revision_id = state.storefront.read().await.revision();
        return error(e, revision_id);
    }

    let store = state.storefront.read().await;
    success(store.categories.view(), store.revision())
}

/// GET /api/sections - Localized sections for the filter panel.
pub async fn get_sections(State(state): State<AppState>) -> ApiResult<Vec<Section>> {
    if let Err(e) = state.catalog.load_categories(&state.storefront).await {
        let revision_id = state.storefront.read().await.revision();
        return error(e, revision_id);
    }

    let store = state.storefront.read().await;
    success(store.categories.sections().to_vec(), store.revision())
}

/// PUT /api/language - Switch the display language.
pub async fn set_language(
    State(state): State<AppState>,
    Json(request): Json<SetLanguageRequest>,
) -> ApiResult<CatalogView> {
    refresh_categories(&state).await;

    let mut store = state.storefront.write().await;

    let Some(language) = Language::from_code(&request.language) else {
        return error(
            AppError::Validation(format!("Unsupported language: {}", request.language)),
            store.revision(),
        );
    };

    store.categories.set_language(language);
    let revision_id = store.bump_revision();
    persist(&state, &store.categories, revision_id).await;

    tracing::info!("Language switched to {}", language.as_str());
    success(store.categories.view(), revision_id)
}

/// POST /api/categories/:id/toggle - Toggle the highlighted category.
pub async fn toggle_category(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<CatalogView> {
    refresh_categories(&state).await;

    let mut store = state.storefront.write().await;

    store.categories.toggle_category(id);
    let revision_id = store.bump_revision();
    persist(&state, &store.categories, revision_id).await;

    success(store.categories.view(), revision_id)
}

/// PUT /api/categories/active - Set or clear the highlighted category.
pub async fn set_active_category(
    State(state): State<AppState>,
    Json(request): Json<SetActiveCategoryRequest>,
) -> ApiResult<CatalogView> {
    refresh_categories(&state).await;

    let mut store = state.storefront.write().await;

    store.categories.set_active_category(request.category_id);
    let revision_id = store.bump_revision();
    persist(&state, &store.categories, revision_id).await;

    success(store.categories.view(), revision_id)
}
