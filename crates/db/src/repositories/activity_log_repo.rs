//! Repository for the `activity_log` table.

use innopath_core::types::DbId;
use sqlx::{PgPool, Postgres, Transaction};

use crate::models::activity_log::ActivityLogEntry;

/// Column list for `activity_log` queries.
const COLUMNS: &str = "id, innovation_id, user_id, activity_type, params, created_at";

/// Provides append and read operations for the activity trail.
pub struct ActivityLogRepo;

impl ActivityLogRepo {
    /// Append an activity entry inside a caller-owned transaction.
    ///
    /// Engine mutations log inside their transaction so a failed write rolls
    /// the whole mutation back.
    pub async fn insert(
        tx: &mut Transaction<'_, Postgres>,
        innovation_id: DbId,
        user_id: DbId,
        activity_type: &str,
        params: &serde_json::Value,
    ) -> Result<DbId, sqlx::Error> {
        sqlx::query_scalar(
            "INSERT INTO activity_log (innovation_id, user_id, activity_type, params) \
             VALUES ($1, $2, $3, $4) \
             RETURNING id",
        )
        .bind(innovation_id)
        .bind(user_id)
        .bind(activity_type)
        .bind(params)
        .fetch_one(&mut **tx)
        .await
    }

    /// List activity for an innovation, newest first.
    pub async fn list_for_innovation(
        pool: &PgPool,
        innovation_id: DbId,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<ActivityLogEntry>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM activity_log \
             WHERE innovation_id = $1 \
             ORDER BY created_at DESC \
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, ActivityLogEntry>(&query)
            .bind(innovation_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }
}
