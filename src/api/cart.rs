//! Cart endpoints.

use axum::{
    extract::{Path, State},
    Json,
};

use super::{error, persist, success, ApiResult};
use crate::errors::AppError;
use crate::models::{AddCartItemRequest, CartView, UpdateQuantityRequest};
use crate::AppState;

/// GET /api/cart - Cart lines and totals.
pub async fn get_cart(State(state): State<AppState>) -> ApiResult<CartView> {
    let store = state.storefront.read().await;
    success(store.cart.view(), store.revision())
}

/// POST /api/cart/items - Add a product to the cart.
pub async fn add_cart_item(
    State(state): State<AppState>,
    Json(request): Json<AddCartItemRequest>,
) -> ApiResult<CartView> {
    let mut store = state.storefront.write().await;

    if request.quantity == 0 {
        return error(
            AppError::Validation("Quantity must be at least 1".to_string()),
            store.revision(),
        );
    }
    if !request.product.price.is_finite() || request.product.price < 0.0 {
        return error(
            AppError::Validation("Price must be a non-negative number".to_string()),
            store.revision(),
        );
    }

    store.cart.add_item(request.product, request.quantity);
    let revision_id = store.bump_revision();
    persist(&state, &store.cart, revision_id).await;

    success(store.cart.view(), revision_id)
}

/// PUT /api/cart/items/:id - Set a line quantity (below one removes it).
pub async fn update_cart_item(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<UpdateQuantityRequest>,
) -> ApiResult<CartView> {
    let mut store = state.storefront.write().await;

    store.cart.update_quantity(id, request.quantity);
    let revision_id = store.bump_revision();
    persist(&state, &store.cart, revision_id).await;

    success(store.cart.view(), revision_id)
}

/// POST /api/cart/items/:id/increase - Add one.
pub async fn increase_cart_item(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<CartView> {
    let mut store = state.storefront.write().await;

    store.cart.increase_quantity(id);
    let revision_id = store.bump_revision();
    persist(&state, &store.cart, revision_id).await;

    success(store.cart.view(), revision_id)
}

/// POST /api/cart/items/:id/decrease - Remove one.
pub async fn decrease_cart_item(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<CartView> {
    let mut store = state.storefront.write().await;

    store.cart.decrease_quantity(id);
    let revision_id = store.bump_revision();
    persist(&state, &store.cart, revision_id).await;

    success(store.cart.view(), revision_id)
}

/// DELETE /api/cart/items/:id - Remove a line.
pub async fn remove_cart_item(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<CartView> {
    let mut store = state.storefront.write().await;

    store.cart.remove_item(id);
    let revision_id = store.bump_revision();
    persist(&state, &store.cart, revision_id).await;

    success(store.cart.view(), revision_id)
}

/// DELETE /api/cart - Empty the cart.
pub async fn clear_cart(State(state): State<AppState>) -> ApiResult<CartView> {
    let mut store = state.storefront.write().await;

    store.cart.clear_cart();
    let revision_id = store.bump_revision();
    persist(&state, &store.cart, revision_id).await;

    success(store.cart.view(), revision_id)
}
