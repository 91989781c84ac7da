use chrono::Utc;
use serde_json::Value;

use geoinsight_core::domain::organization::OrganizationId;

use super::{OrganizationRepository, RepositoryError};
use crate::DbPool;

pub struct SqlOrganizationRepository {
    pool: DbPool,
}

impl SqlOrganizationRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl OrganizationRepository for SqlOrganizationRepository {
    async fn voice_settings(&self, id: &OrganizationId) -> Result<Option<Value>, RepositoryError> {
        let raw: Option<Option<String>> =
            sqlx::query_scalar("SELECT voice_settings FROM organizations WHERE id = ?")
                .bind(&id.0)
                .fetch_optional(&self.pool)
                .await?;

        raw.flatten()
            .map(|json| {
                serde_json::from_str(&json).map_err(|error| {
                    RepositoryError::Decode(format!(
                        "invalid voice_settings for organization `{}`: {error}",
                        id.0
                    ))
                })
            })
            .transpose()
    }

    async fn save_voice_settings(
        &self,
        id: &OrganizationId,
        settings: Value,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO organizations (id, voice_settings, updated_at)
             VALUES (?, ?, ?)
             ON CONFLICT(id) DO UPDATE SET
                voice_settings = excluded.voice_settings,
                updated_at = excluded.updated_at",
        )
        .bind(&id.0)
        .bind(settings.to_string())
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
