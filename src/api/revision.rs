//! Revision endpoint for change detection.

use axum::extract::State;

use super::{success, ApiResult};
use crate::models::RevisionInfo;
use crate::AppState;

/// GET /api/revision - Current state revision.
pub async fn get_revision(State(state): State<AppState>) -> ApiResult<RevisionInfo> {
    let revision_info = state
        .repo
        .get_revision_info()
        .await
        .map_err(|e| crate::errors::AppErrorWithRevision {
            error: e,
            revision_id: 0,
        })?;

    success(revision_info.clone(), revision_info.revision_id)
}
