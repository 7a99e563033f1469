//! Repository for the `innovation_reassessment_requests` table.

use innopath_core::types::DbId;
use sqlx::{PgPool, Postgres, Transaction};

use crate::models::reassessment::{CreateReassessment, ReassessmentRequest};

/// Column list for `innovation_reassessment_requests` queries.
const COLUMNS: &str = "id, innovation_id, assessment_id, previous_assessment_id, reasons, \
     other_reason_description, description, what_support_do_you_need, created_at";

/// Provides CRUD operations for reassessment requests.
pub struct ReassessmentRepo;

impl ReassessmentRepo {
    /// Insert a reassessment request inside a caller-owned transaction.
    pub async fn create(
        tx: &mut Transaction<'_, Postgres>,
        innovation_id: DbId,
        assessment_id: DbId,
        previous_assessment_id: DbId,
        input: &CreateReassessment,
    ) -> Result<ReassessmentRequest, sqlx::Error> {
        let query = format!(
            "INSERT INTO innovation_reassessment_requests \
                (innovation_id, assessment_id, previous_assessment_id, reasons, \
                 other_reason_description, description, what_support_do_you_need) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ReassessmentRequest>(&query)
            .bind(innovation_id)
            .bind(assessment_id)
            .bind(previous_assessment_id)
            .bind(serde_json::json!(input.reasons))
            .bind(&input.other_reason_description)
            .bind(&input.description)
            .bind(&input.what_support_do_you_need)
            .fetch_one(&mut **tx)
            .await
    }

    /// Find the reassessment request that created the given assessment.
    pub async fn find_by_assessment(
        pool: &PgPool,
        assessment_id: DbId,
    ) -> Result<Option<ReassessmentRequest>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM innovation_reassessment_requests WHERE assessment_id = $1"
        );
        sqlx::query_as::<_, ReassessmentRequest>(&query)
            .bind(assessment_id)
            .fetch_optional(pool)
            .await
    }

    /// All reassessment requests for an innovation, newest first.
    pub async fn list_for_innovation(
        pool: &PgPool,
        innovation_id: DbId,
    ) -> Result<Vec<ReassessmentRequest>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM innovation_reassessment_requests \
             WHERE innovation_id = $1 \
             ORDER BY created_at DESC"
        );
        sqlx::query_as::<_, ReassessmentRequest>(&query)
            .bind(innovation_id)
            .fetch_all(pool)
            .await
    }
}
