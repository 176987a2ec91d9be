//! Data models for the storefront service.
//!
//! Backend payload types keep the catalog API's snake_case field names; views
//! returned to the UI use camelCase.

mod cart;
mod catalog;
mod filter;
mod news;
mod product;

pub use cart::*;
pub use catalog::*;
pub use filter::*;
pub use news::*;
pub use product::*;

use serde::{Deserialize, Serialize};

/// Revision information for change detection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevisionInfo {
    pub revision_id: i64,
    pub updated_at: String,
}
