//! Filter selection models.

use serde::{Deserialize, Serialize};

/// The user's current filter choice. Language independent.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FilterSelection {
    #[serde(default)]
    pub selected_section_id: Option<i64>,
    /// Insertion ordered, no duplicates.
    #[serde(default)]
    pub selected_subsection_ids: Vec<i64>,
    /// Insertion ordered, no duplicates, compared exactly.
    #[serde(default)]
    pub creators: Vec<String>,
}

impl FilterSelection {
    pub fn is_empty(&self) -> bool {
        self.selected_section_id.is_none()
            && self.selected_subsection_ids.is_empty()
            && self.creators.is_empty()
    }
}

/// Filter state returned by `GET /api/filters`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterView {
    #[serde(flatten)]
    pub selection: FilterSelection,
    pub active_count: usize,
}

/// Request body for toggling a manufacturer filter.
#[derive(Debug, Clone, Deserialize)]
pub struct ToggleCreatorRequest {
    pub name: String,
}
