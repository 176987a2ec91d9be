//! Client state containers.
//!
//! Each store is a plain synchronous struct with total mutators. The
//! [`Storefront`] groups them so handlers receive one explicit context
//! instead of reaching for globals.

mod cart;
mod category;
mod filter;

pub use cart::*;
pub use category::*;
pub use filter::*;

use serde::{de::DeserializeOwned, Serialize};

use crate::models::{Product, TransformedProduct};
use crate::projection::{filter_products, transform_products};

/// A store whose state (or part of it) survives restarts.
pub trait Persisted: Sized {
    /// Storage key; each store is persisted independently.
    const STORAGE_KEY: &'static str;
    type Snapshot: Serialize + DeserializeOwned;

    fn snapshot(&self) -> Self::Snapshot;
    fn rehydrate(snapshot: Self::Snapshot) -> Self;
}

/// All stores of one storefront session.
#[derive(Debug, Clone, Default)]
pub struct Storefront {
    pub categories: CategoryStore,
    pub filters: FilterStore,
    pub cart: CartStore,
    revision: i64,
}

impl Storefront {
    pub fn new(categories: CategoryStore, filters: FilterStore, cart: CartStore, revision: i64) -> Self {
        Self {
            categories,
            filters,
            cart,
            revision,
        }
    }

    pub fn revision(&self) -> i64 {
        self.revision
    }

    /// Record that a mutation happened and return the new revision.
    pub fn bump_revision(&mut self) -> i64 {
        self.revision += 1;
        self.revision
    }

    /// Toggle the section filter and mirror the outcome into the highlighted
    /// category so both stay in step.
    pub fn select_section(&mut self, section_id: i64) {
        self.filters.toggle_section(section_id);
        let selected = self.filters.selection().selected_section_id;
        self.categories.set_active_category(selected);
    }

    /// Products visible under the current language and filter selection.
    pub fn filtered_products(&self, products: &[Product]) -> Vec<TransformedProduct> {
        let categories = self.categories.backend_categories();
        let language = self.categories.language();
        let selection = self.filters.selection();

        if selection.is_empty() {
            return transform_products(products, categories, language);
        }
        filter_products(products, categories, language, selection)
    }
}
