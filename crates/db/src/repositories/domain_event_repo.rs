//! Repository for the `domain_events` table.

use innopath_core::types::DbId;
use sqlx::PgPool;

use crate::models::domain_event::DomainEventRecord;

/// Column list for `domain_events` queries.
const COLUMNS: &str = "id, event_type, innovation_id, actor_user_id, payload, created_at";

/// Provides append and read operations for durable domain events.
pub struct DomainEventRepo;

impl DomainEventRepo {
    /// Append a domain event, returning the generated ID.
    pub async fn insert(
        pool: &PgPool,
        event_type: &str,
        innovation_id: Option<DbId>,
        actor_user_id: Option<DbId>,
        payload: &serde_json::Value,
    ) -> Result<DbId, sqlx::Error> {
        sqlx::query_scalar(
            "INSERT INTO domain_events (event_type, innovation_id, actor_user_id, payload) \
             VALUES ($1, $2, $3, $4) \
             RETURNING id",
        )
        .bind(event_type)
        .bind(innovation_id)
        .bind(actor_user_id)
        .bind(payload)
        .fetch_one(pool)
        .await
    }

    /// List events recorded against an innovation, newest first.
    pub async fn list_for_innovation(
        pool: &PgPool,
        innovation_id: DbId,
        limit: i64,
    ) -> Result<Vec<DomainEventRecord>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM domain_events \
             WHERE innovation_id = $1 \
             ORDER BY created_at DESC \
             LIMIT $2"
        );
        sqlx::query_as::<_, DomainEventRecord>(&query)
            .bind(innovation_id)
            .bind(limit)
            .fetch_all(pool)
            .await
    }
}
