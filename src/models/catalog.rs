//! Category models matching the catalog backend payload and the filter panel view.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Display language of the storefront.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    En,
    #[default]
    Hy,
    Ru,
}

impl Language {
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Hy => "hy",
            Language::Ru => "ru",
        }
    }

    pub fn from_code(s: &str) -> Option<Self> {
        match s {
            "en" => Some(Language::En),
            "hy" => Some(Language::Hy),
            "ru" => Some(Language::Ru),
            _ => None,
        }
    }
}

/// Text keyed by language code.
///
/// Kept as an open map so payloads carrying extra or missing languages still
/// decode; lookups never fail.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct LocalizedText(BTreeMap<String, String>);

impl LocalizedText {
    /// Text for `language`, or `""` when the translation is missing.
    pub fn get(&self, language: Language) -> &str {
        self.0
            .get(language.as_str())
            .map(String::as_str)
            .unwrap_or_default()
    }

    /// Text for `language`, falling back to Armenian when missing or blank.
    pub fn get_or_default_language(&self, language: Language) -> &str {
        let text = self.get(language);
        if text.is_empty() {
            self.get(Language::default())
        } else {
            text
        }
    }
}

impl<S: Into<String>> FromIterator<(Language, S)> for LocalizedText {
    fn from_iter<I: IntoIterator<Item = (Language, S)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(lang, text)| (lang.as_str().to_string(), text.into()))
                .collect(),
        )
    }
}

/// A subcategory as delivered by `GET /categories`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BackendSubcategory {
    pub id: i64,
    #[serde(default)]
    pub name: LocalizedText,
}

/// A top-level category as delivered by `GET /categories`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BackendCategory {
    pub id: i64,
    #[serde(default)]
    pub name: LocalizedText,
    #[serde(default)]
    pub subcategories: Vec<BackendSubcategory>,
}

impl BackendCategory {
    pub fn subcategory(&self, id: i64) -> Option<&BackendSubcategory> {
        self.subcategories.iter().find(|sub| sub.id == id)
    }
}

/// Localized subsection entry of the filter panel.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Subsection {
    pub id: i64,
    pub name: String,
}

/// Localized, UI-ready view of one backend category.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Section {
    pub id: i64,
    pub section: String,
    pub active: bool,
    pub subsections: Vec<Subsection>,
}

/// Catalog panel state returned by `GET /api/catalog`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogView {
    pub language: Language,
    pub active_category: Option<i64>,
    pub sections: Vec<Section>,
}

/// Request body for switching the display language.
#[derive(Debug, Clone, Deserialize)]
pub struct SetLanguageRequest {
    pub language: String,
}

/// Request body for setting the highlighted category.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetActiveCategoryRequest {
    #[serde(default)]
    pub category_id: Option<i64>,
}
