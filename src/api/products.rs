//! Product grid, product details, manufacturer list and news endpoints.

use axum::extract::{Path, State};

use super::{error, refresh_categories, success, ApiResult};
use crate::errors::AppError;
use crate::models::{NewsArticle, TransformedProduct};
use crate::projection::{manufacturers, transform_product};
use crate::AppState;

/// GET /api/products - Products visible under the current filters.
pub async fn list_products(State(state): State<AppState>) -> ApiResult<Vec<TransformedProduct>> {
    let products = match state.catalog.load_products().await {
        Ok(products) => products,
        Err(e) => return error(e, state.storefront.read().await.revision()),
    };
    refresh_categories(&state).await;

    let store = state.storefront.read().await;
    success(store.filtered_products(&products), store.revision())
}

/// GET /api/products/:id - One localized product.
pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<TransformedProduct> {
    let products = match state.catalog.load_products().await {
        Ok(products) => products,
        Err(e) => return error(e, state.storefront.read().await.revision()),
    };
    refresh_categories(&state).await;

    let store = state.storefront.read().await;
    match products.iter().find(|product| product.id == id) {
        Some(product) => success(
            transform_product(
                product,
                store.categories.backend_categories(),
                store.categories.language(),
            ),
            store.revision(),
        ),
        None => error(
            AppError::NotFound(format!("Product {} not found", id)),
            store.revision(),
        ),
    }
}

/// GET /api/manufacturers - Distinct manufacturers for the creator filter.
pub async fn list_manufacturers(State(state): State<AppState>) -> ApiResult<Vec<String>> {
    let revision_id = state.storefront.read().await.revision();

    match state.catalog.load_products().await {
        Ok(products) => success(manufacturers(&products), revision_id),
        Err(e) => error(e, revision_id),
    }
}

/// GET /api/news - Published news articles.
pub async fn list_news(State(state): State<AppState>) -> ApiResult<Vec<NewsArticle>> {
    let revision_id = state.storefront.read().await.revision();

    match state.catalog.load_news().await {
        Ok(news) => success(news.as_ref().clone(), revision_id),
        Err(e) => error(e, revision_id),
    }
}
