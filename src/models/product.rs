//! Product models matching the catalog backend `GET /products` payload.

use serde::{Deserialize, Serialize};

use super::LocalizedText;

/// A titled feature paragraph attached to a product.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProductFeature {
    pub id: i64,
    #[serde(default)]
    pub product_id: Option<i64>,
    #[serde(default)]
    pub title: LocalizedText,
    #[serde(default)]
    pub description: LocalizedText,
}

/// A product as delivered by the catalog backend. Read-only on this side.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Product {
    pub id: i64,
    #[serde(default)]
    pub name: LocalizedText,
    #[serde(default)]
    pub description: LocalizedText,
    pub price: f64,
    #[serde(default)]
    pub stock: i64,
    #[serde(default)]
    pub manufacturer: String,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub is_new: bool,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub types_id: Option<i64>,
    pub category_id: i64,
    #[serde(default)]
    pub subcategory_id: Option<i64>,
    #[serde(default)]
    pub features: Vec<ProductFeature>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dosage: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub composition: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_instructions: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub packaging: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shelf_life: Option<String>,
}

/// Feature text in the current language.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct LocalizedFeature {
    pub id: i64,
    pub title: String,
    pub description: String,
}

/// Flattened, localized product joined against its category names.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TransformedProduct {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub section: String,
    pub subsection: String,
    pub price: f64,
    pub stock: i64,
    pub image: String,
    pub manufacturer: String,
    pub category_id: i64,
    pub subcategory_id: Option<i64>,
    pub features: Vec<LocalizedFeature>,
    pub raw_product: Product,
}
