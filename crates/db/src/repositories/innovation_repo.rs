//! Repository for the `innovations` table and its ownership satellites
//! (collaborators, shares, record sections).

use innopath_core::types::{DbId, Timestamp};
use sqlx::{PgPool, Postgres, Transaction};

use crate::models::innovation::{CreateInnovation, Innovation};

/// Column list for `innovations` queries.
const COLUMNS: &str = "id, name, owner_id, status, has_been_assessed, current_assessment_id, \
     created_at, updated_at";

/// Provides CRUD operations for innovations.
pub struct InnovationRepo;

impl InnovationRepo {
    /// Insert a new innovation.
    pub async fn create(
        pool: &PgPool,
        input: &CreateInnovation,
    ) -> Result<Innovation, sqlx::Error> {
        let query = format!(
            "INSERT INTO innovations (name, owner_id) VALUES ($1, $2) RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Innovation>(&query)
            .bind(&input.name)
            .bind(input.owner_id)
            .fetch_one(pool)
            .await
    }

    /// Find an innovation by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Innovation>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM innovations WHERE id = $1");
        sqlx::query_as::<_, Innovation>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Load innovations by id, ordered by name.
    pub async fn list_by_ids(pool: &PgPool, ids: &[DbId]) -> Result<Vec<Innovation>, sqlx::Error> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let query = format!("SELECT {COLUMNS} FROM innovations WHERE id = ANY($1) ORDER BY name");
        sqlx::query_as::<_, Innovation>(&query)
            .bind(ids)
            .fetch_all(pool)
            .await
    }

    /// Of the given innovation ids, the ones shared with an organisation.
    pub async fn filter_shared_with(
        pool: &PgPool,
        ids: &[DbId],
        organisation_id: DbId,
    ) -> Result<Vec<DbId>, sqlx::Error> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        sqlx::query_scalar(
            "SELECT innovation_id FROM innovation_shares \
             WHERE innovation_id = ANY($1) AND organisation_id = $2",
        )
        .bind(ids)
        .bind(organisation_id)
        .fetch_all(pool)
        .await
    }

    /// Update an innovation's status inside a caller-owned transaction.
    pub async fn set_status(
        tx: &mut Transaction<'_, Postgres>,
        id: DbId,
        status: &str,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE innovations SET status = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(status)
            .execute(&mut **tx)
            .await?;
        Ok(())
    }

    /// Point an innovation at its current assessment.
    pub async fn set_current_assessment(
        tx: &mut Transaction<'_, Postgres>,
        id: DbId,
        assessment_id: DbId,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE innovations SET current_assessment_id = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(assessment_id)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }

    /// Mark an innovation as assessed and move it to the given status.
    pub async fn mark_assessed(
        tx: &mut Transaction<'_, Postgres>,
        id: DbId,
        status: &str,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE innovations \
             SET status = $2, has_been_assessed = true, updated_at = NOW() \
             WHERE id = $1",
        )
        .bind(id)
        .bind(status)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }

    /// Whether `user_id` is an active collaborator on the innovation.
    pub async fn is_collaborator(
        pool: &PgPool,
        innovation_id: DbId,
        user_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let count: Option<i64> = sqlx::query_scalar(
            "SELECT COUNT(*) FROM innovation_collaborators \
             WHERE innovation_id = $1 AND user_id = $2",
        )
        .bind(innovation_id)
        .bind(user_id)
        .fetch_one(pool)
        .await?;
        Ok(count.unwrap_or(0) > 0)
    }

    /// Add a collaborator to an innovation.
    pub async fn add_collaborator(
        pool: &PgPool,
        innovation_id: DbId,
        user_id: DbId,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO innovation_collaborators (innovation_id, user_id) VALUES ($1, $2) \
             ON CONFLICT DO NOTHING",
        )
        .bind(innovation_id)
        .bind(user_id)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Share an innovation with an organisation.
    pub async fn add_share(
        pool: &PgPool,
        innovation_id: DbId,
        organisation_id: DbId,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO innovation_shares (innovation_id, organisation_id) VALUES ($1, $2) \
             ON CONFLICT DO NOTHING",
        )
        .bind(innovation_id)
        .bind(organisation_id)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Whether the innovation is shared with the given organisation.
    pub async fn is_shared_with(
        pool: &PgPool,
        innovation_id: DbId,
        organisation_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let count: Option<i64> = sqlx::query_scalar(
            "SELECT COUNT(*) FROM innovation_shares \
             WHERE innovation_id = $1 AND organisation_id = $2",
        )
        .bind(innovation_id)
        .bind(organisation_id)
        .fetch_one(pool)
        .await?;
        Ok(count.unwrap_or(0) > 0)
    }

    /// Record that an innovation record section changed.
    pub async fn touch_section(
        pool: &PgPool,
        innovation_id: DbId,
        section: &str,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO innovation_sections (innovation_id, section) VALUES ($1, $2) \
             ON CONFLICT ON CONSTRAINT uq_innovation_sections \
             DO UPDATE SET updated_at = NOW()",
        )
        .bind(innovation_id)
        .bind(section)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Section keys updated strictly after `since`, ordered by section name.
    pub async fn sections_updated_since(
        pool: &PgPool,
        innovation_id: DbId,
        since: Timestamp,
    ) -> Result<Vec<String>, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT section FROM innovation_sections \
             WHERE innovation_id = $1 AND updated_at > $2 \
             ORDER BY section",
        )
        .bind(innovation_id)
        .bind(since)
        .fetch_all(pool)
        .await
    }
}
