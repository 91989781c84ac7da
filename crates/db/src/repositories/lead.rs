use chrono::{DateTime, Utc};
use sqlx::{sqlite::SqliteRow, Row};

use geoinsight_core::domain::lead::{LeadId, LeadRecord, LeadStatus};

use super::{LeadRepository, RepositoryError};
use crate::DbPool;

pub struct SqlLeadRepository {
    pool: DbPool,
}

impl SqlLeadRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl LeadRepository for SqlLeadRepository {
    async fn upsert(&self, lead: LeadRecord) -> Result<LeadRecord, RepositoryError> {
        let row = sqlx::query(
            "INSERT INTO leads (
                id,
                name,
                address,
                website,
                keyword,
                source,
                status,
                created_at,
                updated_at
             ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
             ON CONFLICT(name, address) DO UPDATE SET
                website = COALESCE(excluded.website, leads.website),
                keyword = COALESCE(excluded.keyword, leads.keyword),
                source = excluded.source,
                updated_at = excluded.updated_at
             RETURNING id, name, address, website, keyword, source, status, created_at, updated_at",
        )
        .bind(&lead.id.0)
        .bind(&lead.name)
        .bind(&lead.address)
        .bind(&lead.website)
        .bind(&lead.keyword)
        .bind(&lead.source)
        .bind(lead.status.as_str())
        .bind(lead.created_at.to_rfc3339())
        .bind(lead.updated_at.to_rfc3339())
        .fetch_one(&self.pool)
        .await?;

        lead_from_row(row)
    }

    async fn list_recent(&self, limit: u32) -> Result<Vec<LeadRecord>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT id, name, address, website, keyword, source, status, created_at, updated_at
             FROM leads
             ORDER BY updated_at DESC, name ASC
             LIMIT ?",
        )
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(lead_from_row).collect()
    }
}

fn lead_from_row(row: SqliteRow) -> Result<LeadRecord, RepositoryError> {
    let status_raw = row.try_get::<String, _>("status")?;
    let status = LeadStatus::parse(&status_raw)
        .ok_or_else(|| RepositoryError::Decode(format!("unknown lead status `{status_raw}`")))?;

    Ok(LeadRecord {
        id: LeadId(row.try_get("id")?),
        name: row.try_get("name")?,
        address: row.try_get("address")?,
        website: row.try_get("website")?,
        keyword: row.try_get("keyword")?,
        source: row.try_get("source")?,
        status,
        created_at: parse_timestamp("created_at", row.try_get("created_at")?)?,
        updated_at: parse_timestamp("updated_at", row.try_get("updated_at")?)?,
    })
}

pub(crate) fn parse_timestamp(column: &str, value: String) -> Result<DateTime<Utc>, RepositoryError> {
    DateTime::parse_from_rfc3339(&value).map(|timestamp| timestamp.with_timezone(&Utc)).map_err(
        |error| {
            RepositoryError::Decode(format!("invalid timestamp in `{column}`: `{value}` ({error})"))
        },
    )
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Duration, Utc};

    use geoinsight_core::domain::lead::{LeadCandidate, LeadRecord, LeadStatus};

    use super::SqlLeadRepository;
    use crate::migrations;
    use crate::repositories::LeadRepository;
    use crate::{connect_with_settings, DbPool};

    #[tokio::test]
    async fn upsert_inserts_then_updates_on_same_name_and_address() {
        let pool = setup_pool().await;
        let repo = SqlLeadRepository::new(pool.clone());

        let first = record("Ferretería El Tornillo", "Calle 123", None, parse_ts("2026-03-01T10:00:00Z"));
        let stored = repo.upsert(first.clone()).await.expect("insert lead");
        assert_eq!(stored, first);

        let mut refreshed = record(
            "Ferretería El Tornillo",
            "Calle 123",
            Some("https://eltornillo.example.com"),
            parse_ts("2026-03-02T10:00:00Z"),
        );
        refreshed.source = "scheduler".to_string();
        let updated = repo.upsert(refreshed).await.expect("upsert lead");

        assert_eq!(updated.id, first.id, "existing row keeps its id");
        assert_eq!(updated.created_at, first.created_at);
        assert_eq!(updated.updated_at, parse_ts("2026-03-02T10:00:00Z"));
        assert_eq!(updated.website.as_deref(), Some("https://eltornillo.example.com"));
        assert_eq!(updated.source, "scheduler");
        assert_eq!(updated.status, LeadStatus::New);

        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM leads").fetch_one(&pool).await.expect("count");
        assert_eq!(count, 1);

        pool.close().await;
    }

    #[tokio::test]
    async fn list_recent_orders_by_update_time_and_respects_limit() {
        let pool = setup_pool().await;
        let repo = SqlLeadRepository::new(pool.clone());
        let base = parse_ts("2026-03-01T08:00:00Z");

        for (offset, name) in ["Acme", "Bolt", "Cobre"].iter().enumerate() {
            let updated_at = base + Duration::minutes(offset as i64);
            repo.upsert(record(name, "Cra 45", None, updated_at)).await.expect("upsert");
        }

        let recent = repo.list_recent(2).await.expect("list");
        let names: Vec<&str> = recent.iter().map(|lead| lead.name.as_str()).collect();
        assert_eq!(names, vec!["Cobre", "Bolt"]);

        pool.close().await;
    }

    fn record(
        name: &str,
        address: &str,
        website: Option<&str>,
        at: DateTime<Utc>,
    ) -> LeadRecord {
        let mut lead = LeadRecord::from_candidate(
            LeadCandidate {
                name: name.to_string(),
                address: address.to_string(),
                website: website.map(str::to_string),
            },
            Some("Ferreterías".to_string()),
            "campaign",
        );
        lead.created_at = at;
        lead.updated_at = at;
        lead
    }

    async fn setup_pool() -> DbPool {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect test pool");
        migrations::run_pending(&pool).await.expect("run migrations");
        pool
    }

    fn parse_ts(value: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(value).expect("valid rfc3339").with_timezone(&Utc)
    }
}
