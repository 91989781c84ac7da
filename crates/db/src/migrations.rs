use sqlx::migrate::{MigrateError, Migrator};

use crate::DbPool;

pub static MIGRATOR: Migrator = sqlx::migrate!("../../migrations");

pub async fn run_pending(pool: &DbPool) -> Result<(), MigrateError> {
    MIGRATOR.run(pool).await
}

#[cfg(test)]
mod tests {
    use super::run_pending;
    use crate::connect_with_settings;

    const MANAGED_SCHEMA_OBJECTS: &[&str] =
        &["leads", "organizations", "idx_leads_updated_at", "idx_leads_status"];

    #[tokio::test]
    async fn migrations_create_managed_objects_and_are_idempotent() {
        let pool = connect_with_settings("sqlite::memory:", 1, 5).await.expect("connect");

        run_pending(&pool).await.expect("first run");
        run_pending(&pool).await.expect("second run is a no-op");

        for object in MANAGED_SCHEMA_OBJECTS {
            let (count,): (i64,) =
                sqlx::query_as("SELECT COUNT(*) FROM sqlite_master WHERE name = ?")
                    .bind(object)
                    .fetch_one(&pool)
                    .await
                    .expect("query sqlite_master");
            assert_eq!(count, 1, "expected schema object `{object}`");
        }

        pool.close().await;
    }
}
