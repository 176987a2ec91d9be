//! Pure derivations from canonical store state to display-ready data.
//!
//! Nothing here mutates or fails: missing translations become empty strings
//! and dangling category references resolve to empty names.

use crate::models::{
    BackendCategory, FilterSelection, Language, LocalizedFeature, Product, Section, Subsection,
    TransformedProduct,
};

/// Image shown for products without one.
pub const PLACEHOLDER_IMAGE: &str = "/placeholder-product.jpg";

/// Project backend categories into the localized filter panel sections.
pub fn convert_to_sections(
    categories: &[BackendCategory],
    language: Language,
    active_id: Option<i64>,
) -> Vec<Section> {
    categories
        .iter()
        .map(|category| Section {
            id: category.id,
            section: category.name.get(language).to_string(),
            active: Some(category.id) == active_id,
            subsections: category
                .subcategories
                .iter()
                .map(|sub| Subsection {
                    id: sub.id,
                    name: sub.name.get(language).to_string(),
                })
                .collect(),
        })
        .collect()
}

/// Localize a single product and join it against the category tree by id.
pub fn transform_product(
    product: &Product,
    categories: &[BackendCategory],
    language: Language,
) -> TransformedProduct {
    let category = categories.iter().find(|c| c.id == product.category_id);
    let subcategory = category.and_then(|c| product.subcategory_id.and_then(|id| c.subcategory(id)));

    let image = if product.image_url.is_empty() {
        PLACEHOLDER_IMAGE.to_string()
    } else {
        product.image_url.clone()
    };

    TransformedProduct {
        id: product.id,
        name: product.name.get_or_default_language(language).to_string(),
        description: product
            .description
            .get_or_default_language(language)
            .to_string(),
        section: category
            .map(|c| c.name.get_or_default_language(language).to_string())
            .unwrap_or_default(),
        subsection: subcategory
            .map(|s| s.name.get_or_default_language(language).to_string())
            .unwrap_or_default(),
        price: product.price,
        stock: product.stock,
        image,
        manufacturer: product.manufacturer.clone(),
        category_id: product.category_id,
        subcategory_id: product.subcategory_id,
        features: product
            .features
            .iter()
            .map(|feature| LocalizedFeature {
                id: feature.id,
                title: feature.title.get_or_default_language(language).to_string(),
                description: feature
                    .description
                    .get_or_default_language(language)
                    .to_string(),
            })
            .collect(),
        raw_product: product.clone(),
    }
}

/// Localize every product, preserving backend order.
pub fn transform_products(
    products: &[Product],
    categories: &[BackendCategory],
    language: Language,
) -> Vec<TransformedProduct> {
    products
        .iter()
        .map(|product| transform_product(product, categories, language))
        .collect()
}

/// Whether a product passes every active filter dimension.
pub fn matches_selection(product: &Product, selection: &FilterSelection) -> bool {
    let section_match = selection
        .selected_section_id
        .map_or(true, |id| id == product.category_id);

    let subsection_match = selection.selected_subsection_ids.is_empty()
        || product
            .subcategory_id
            .is_some_and(|id| selection.selected_subsection_ids.contains(&id));

    let creator_match =
        selection.creators.is_empty() || selection.creators.contains(&product.manufacturer);

    section_match && subsection_match && creator_match
}

/// The visible product list: filtered by id and manufacturer, then localized.
pub fn filter_products(
    products: &[Product],
    categories: &[BackendCategory],
    language: Language,
    selection: &FilterSelection,
) -> Vec<TransformedProduct> {
    products
        .iter()
        .filter(|product| matches_selection(product, selection))
        .map(|product| transform_product(product, categories, language))
        .collect()
}

/// Distinct manufacturer names in first-seen order.
pub fn manufacturers(products: &[Product]) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for product in products {
        if !product.manufacturer.is_empty() && !names.contains(&product.manufacturer) {
            names.push(product.manufacturer.clone());
        }
    }
    names
}
