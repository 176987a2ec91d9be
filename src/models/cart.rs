//! Shopping cart models.

use serde::{Deserialize, Serialize};

/// Product summary carried inside a cart line.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CartProduct {
    pub id: i64,
    pub name: String,
    pub price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

/// One cart line, keyed by product id.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CartItem {
    pub id: i64,
    pub product: CartProduct,
    pub quantity: u32,
}

/// Cart state returned by the cart endpoints.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartView {
    pub items: Vec<CartItem>,
    pub item_count: u32,
    pub subtotal: f64,
    pub discount: f64,
    pub delivery_fee: f64,
    pub total: f64,
}

/// Request body for adding a product to the cart.
#[derive(Debug, Clone, Deserialize)]
pub struct AddCartItemRequest {
    pub product: CartProduct,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
}

fn default_quantity() -> u32 {
    1
}

/// Request body for setting a line quantity.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateQuantityRequest {
    pub quantity: i64,
}
