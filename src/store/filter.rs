//! User filter selection, decoupled from the category data it filters against.

use super::Persisted;
use crate::models::{FilterSelection, FilterView};

/// Tracks selected section, subsections and manufacturers by identifier.
///
/// Ids are not validated against any category tree. An impossible
/// combination simply matches no products.
#[derive(Debug, Clone, Default)]
pub struct FilterStore {
    selection: FilterSelection,
}

impl FilterStore {
    pub fn selection(&self) -> &FilterSelection {
        &self.selection
    }

    pub fn view(&self) -> FilterView {
        FilterView {
            selection: self.selection.clone(),
            active_count: self.active_filter_count(),
        }
    }

    /// Single-select toggle. Any change of section drops the subsection choice.
    pub fn toggle_section(&mut self, section_id: i64) {
        let reselected = self.selection.selected_section_id == Some(section_id);
        self.selection.selected_section_id = if reselected { None } else { Some(section_id) };
        self.selection.selected_subsection_ids.clear();
    }

    pub fn toggle_subsection(&mut self, subsection_id: i64) {
        toggle_in(&mut self.selection.selected_subsection_ids, subsection_id);
    }

    pub fn toggle_creator(&mut self, name: &str) {
        let creators = &mut self.selection.creators;
        match creators.iter().position(|c| c == name) {
            Some(index) => {
                creators.remove(index);
            }
            None => creators.push(name.to_string()),
        }
    }

    pub fn clear_filters(&mut self) {
        self.selection = FilterSelection::default();
    }

    pub fn active_filter_count(&self) -> usize {
        self.selection.creators.len()
            + usize::from(self.selection.selected_section_id.is_some())
            + self.selection.selected_subsection_ids.len()
    }
}

fn toggle_in(ids: &mut Vec<i64>, id: i64) {
    match ids.iter().position(|&existing| existing == id) {
        Some(index) => {
            ids.remove(index);
        }
        None => ids.push(id),
    }
}

impl Persisted for FilterStore {
    const STORAGE_KEY: &'static str = "product-filters-storage";
    type Snapshot = FilterSelection;

    fn snapshot(&self) -> FilterSelection {
        self.selection.clone()
    }

    fn rehydrate(snapshot: FilterSelection) -> Self {
        Self {
            selection: snapshot,
        }
    }
}
