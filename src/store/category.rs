//! Canonical category tree, display language and highlighted category.

use serde::{Deserialize, Serialize};

use super::Persisted;
use crate::models::{BackendCategory, CatalogView, Language, Section};
use crate::projection::convert_to_sections;

/// Owns the backend category tree and its localized `sections` projection.
///
/// `sections` is recomputed in full by every mutator; it is never patched.
#[derive(Debug, Clone, Default)]
pub struct CategoryStore {
    backend_categories: Vec<BackendCategory>,
    current_language: Language,
    active_category: Option<i64>,
    sections: Vec<Section>,
}

/// Persisted part of the category store. The tree itself is refetched every session.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CategorySnapshot {
    #[serde(default)]
    pub current_language: Language,
    #[serde(default)]
    pub active_category: Option<i64>,
}

impl CategoryStore {
    pub fn backend_categories(&self) -> &[BackendCategory] {
        &self.backend_categories
    }

    pub fn language(&self) -> Language {
        self.current_language
    }

    pub fn active_category(&self) -> Option<i64> {
        self.active_category
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn view(&self) -> CatalogView {
        CatalogView {
            language: self.current_language,
            active_category: self.active_category(),
            sections: self.sections.clone(),
        }
    }

    /// Replace the whole tree with one fetch cycle's payload.
    pub fn set_backend_categories(&mut self, categories: Vec<BackendCategory>) {
        self.backend_categories = categories;
        self.recompute();
    }

    /// Switch display language; re-projects the existing tree.
    pub fn set_language(&mut self, language: Language) {
        self.current_language = language;
        self.recompute();
    }

    /// Highlight `category_id`, or clear the highlight if it is already set.
    pub fn toggle_category(&mut self, category_id: i64) {
        self.active_category = if self.active_category == Some(category_id) {
            None
        } else {
            Some(category_id)
        };
        self.recompute();
    }

    pub fn set_active_category(&mut self, category_id: Option<i64>) {
        self.active_category = category_id;
        self.recompute();
    }

    fn recompute(&mut self) {
        self.sections = convert_to_sections(
            &self.backend_categories,
            self.current_language,
            self.active_category,
        );
    }
}

impl Persisted for CategoryStore {
    const STORAGE_KEY: &'static str = "category-storage";
    type Snapshot = CategorySnapshot;

    fn snapshot(&self) -> CategorySnapshot {
        CategorySnapshot {
            current_language: self.current_language,
            active_category: self.active_category,
        }
    }

    fn rehydrate(snapshot: CategorySnapshot) -> Self {
        let mut store = Self {
            current_language: snapshot.current_language,
            active_category: snapshot.active_category,
            ..Self::default()
        };
        store.recompute();
        store
    }
}
