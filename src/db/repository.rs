//! Snapshot storage for the persisted stores.

use chrono::Utc;
use sqlx::{Row, SqlitePool};

use crate::errors::AppError;
use crate::models::RevisionInfo;
use crate::store::{CartStore, CategoryStore, FilterStore, Persisted, Storefront};

/// Database repository for store snapshots and the state revision.
#[derive(Clone)]
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Get the current revision ID.
    pub async fn get_revision_id(&self) -> Result<i64, AppError> {
        let row = sqlx::query("SELECT revision_id FROM meta WHERE id = 1")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.get("revision_id"))
    }

    /// Get revision info.
    pub async fn get_revision_info(&self) -> Result<RevisionInfo, AppError> {
        let row = sqlx::query("SELECT revision_id, updated_at FROM meta WHERE id = 1")
            .fetch_one(&self.pool)
            .await?;
        Ok(RevisionInfo {
            revision_id: row.get("revision_id"),
            updated_at: row.get("updated_at"),
        })
    }

    /// Record the revision reached by the in-memory storefront.
    pub async fn set_revision(&self, revision_id: i64) -> Result<(), AppError> {
        let now = Utc::now().to_rfc3339();
        sqlx::query("UPDATE meta SET revision_id = ?, updated_at = ? WHERE id = 1")
            .bind(revision_id)
            .bind(&now)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Write the snapshot of one store under its storage key.
    pub async fn save_snapshot<S: Persisted>(&self, store: &S) -> Result<(), AppError> {
        let value = serde_json::to_string(&store.snapshot())
            .map_err(|e| AppError::Internal(format!("Failed to encode {}: {}", S::STORAGE_KEY, e)))?;
        let now = Utc::now().to_rfc3339();

        sqlx::query(
            "INSERT INTO storage (key, value, updated_at) VALUES (?, ?, ?)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
        )
        .bind(S::STORAGE_KEY)
        .bind(&value)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Load the snapshot stored for `S`, if any.
    ///
    /// A value that no longer decodes is logged and treated as absent.
    pub async fn load_snapshot<S: Persisted>(&self) -> Result<Option<S::Snapshot>, AppError> {
        let row = sqlx::query("SELECT value FROM storage WHERE key = ?")
            .bind(S::STORAGE_KEY)
            .fetch_optional(&self.pool)
            .await?;

        let Some(row) = row else {
            return Ok(None);
        };
        let value: String = row.get("value");

        match serde_json::from_str(&value) {
            Ok(snapshot) => Ok(Some(snapshot)),
            Err(e) => {
                tracing::warn!("Discarding unreadable {} snapshot: {}", S::STORAGE_KEY, e);
                Ok(None)
            }
        }
    }

    /// Rebuild a store from its snapshot, or its defaults.
    pub async fn load_store<S: Persisted + Default>(&self) -> Result<S, AppError> {
        Ok(self
            .load_snapshot::<S>()
            .await?
            .map(S::rehydrate)
            .unwrap_or_default())
    }

    /// Rehydrate the whole storefront.
    pub async fn load_storefront(&self) -> Result<Storefront, AppError> {
        let categories = self.load_store::<CategoryStore>().await?;
        let filters = self.load_store::<FilterStore>().await?;
        let cart = self.load_store::<CartStore>().await?;
        let revision = self.get_revision_id().await?;

        Ok(Storefront::new(categories, filters, cart, revision))
    }
}
