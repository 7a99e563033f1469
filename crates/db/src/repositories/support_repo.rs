//! Repository for the `innovation_supports` table and its assigned-role
//! junction rows.

use innopath_core::support::{SUPPORT_ENGAGING, SUPPORT_SUGGESTED};
use innopath_core::types::DbId;
use sqlx::{PgPool, Postgres, Transaction};

use crate::models::support::InnovationSupport;

/// Column list for `innovation_supports` queries.
const COLUMNS: &str = "id, innovation_id, organisation_unit_id, status, created_at, updated_at";

/// Provides CRUD operations for innovation supports.
pub struct SupportRepo;

impl SupportRepo {
    /// Insert a support record.
    pub async fn create(
        pool: &PgPool,
        innovation_id: DbId,
        organisation_unit_id: DbId,
        status: &str,
    ) -> Result<InnovationSupport, sqlx::Error> {
        let query = format!(
            "INSERT INTO innovation_supports (innovation_id, organisation_unit_id, status) \
             VALUES ($1, $2, $3) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, InnovationSupport>(&query)
            .bind(innovation_id)
            .bind(organisation_unit_id)
            .bind(status)
            .fetch_one(pool)
            .await
    }

    /// Find a support by its internal ID.
    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<InnovationSupport>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM innovation_supports WHERE id = $1");
        sqlx::query_as::<_, InnovationSupport>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// All supports for an innovation.
    pub async fn list_for_innovation(
        pool: &PgPool,
        innovation_id: DbId,
    ) -> Result<Vec<InnovationSupport>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM innovation_supports WHERE innovation_id = $1 ORDER BY id"
        );
        sqlx::query_as::<_, InnovationSupport>(&query)
            .bind(innovation_id)
            .fetch_all(pool)
            .await
    }

    /// Number of currently engaging supports for an innovation.
    pub async fn count_engaging(pool: &PgPool, innovation_id: DbId) -> Result<i64, sqlx::Error> {
        let count: Option<i64> = sqlx::query_scalar(
            "SELECT COUNT(*) FROM innovation_supports WHERE innovation_id = $1 AND status = $2",
        )
        .bind(innovation_id)
        .bind(SUPPORT_ENGAGING)
        .fetch_one(pool)
        .await?;
        Ok(count.unwrap_or(0))
    }

    /// Assign a user role to a support.
    pub async fn assign_role(
        pool: &PgPool,
        support_id: DbId,
        user_role_id: DbId,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO innovation_support_user_roles (support_id, user_role_id) \
             VALUES ($1, $2) \
             ON CONFLICT DO NOTHING",
        )
        .bind(support_id)
        .bind(user_role_id)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// User-role ids assigned to a support.
    pub async fn assigned_role_ids(
        pool: &PgPool,
        support_id: DbId,
    ) -> Result<Vec<DbId>, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT user_role_id FROM innovation_support_user_roles \
             WHERE support_id = $1 \
             ORDER BY user_role_id",
        )
        .bind(support_id)
        .fetch_all(pool)
        .await
    }

    /// Reset all ENGAGING supports of an innovation to SUGGESTED and clear
    /// their assigned roles. Supports in any other status are untouched.
    ///
    /// Returns the number of supports that were reset.
    pub async fn reset_engaging_to_suggested(
        tx: &mut Transaction<'_, Postgres>,
        innovation_id: DbId,
    ) -> Result<u64, sqlx::Error> {
        let reset_ids: Vec<DbId> = sqlx::query_scalar(
            "UPDATE innovation_supports \
             SET status = $3, updated_at = NOW() \
             WHERE innovation_id = $1 AND status = $2 \
             RETURNING id",
        )
        .bind(innovation_id)
        .bind(SUPPORT_ENGAGING)
        .bind(SUPPORT_SUGGESTED)
        .fetch_all(&mut **tx)
        .await?;

        if !reset_ids.is_empty() {
            sqlx::query("DELETE FROM innovation_support_user_roles WHERE support_id = ANY($1)")
                .bind(&reset_ids)
                .execute(&mut **tx)
                .await?;
        }

        Ok(reset_ids.len() as u64)
    }
}
