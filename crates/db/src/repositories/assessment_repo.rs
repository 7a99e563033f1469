//! Repository for the `innovation_assessments` table and its suggested-unit
//! junction rows.

use innopath_core::types::DbId;
use sqlx::{PgPool, Postgres, Transaction};

use crate::models::assessment::{Assessment, CreateAssessment, UpdateAssessment};

/// Column list for `innovation_assessments` queries.
const COLUMNS: &str = "id, innovation_id, major_version, minor_version, description, summary, \
     maturity_level, maturity_level_comment, \
     has_regulatory_approvals, has_regulatory_approvals_comment, \
     has_evidence, has_evidence_comment, \
     has_validation, has_validation_comment, \
     has_proposition, has_proposition_comment, \
     has_competition_knowledge, has_competition_knowledge_comment, \
     has_implementation_plan, has_implementation_plan_comment, \
     has_scale_resource, has_scale_resource_comment, \
     started_at, finished_at, assigned_to_id, \
     exempted_reason, exempted_message, exempted_at, \
     previous_assessment_id, created_at, updated_at";

/// Provides CRUD operations for assessments.
pub struct AssessmentRepo;

impl AssessmentRepo {
    /// Insert a new assessment row inside a caller-owned transaction.
    ///
    /// Content fields start empty; use [`AssessmentRepo::update_fields`] to
    /// populate them (reassessments carry the previous content this way).
    pub async fn create(
        tx: &mut Transaction<'_, Postgres>,
        input: &CreateAssessment,
    ) -> Result<Assessment, sqlx::Error> {
        let query = format!(
            "INSERT INTO innovation_assessments \
                (innovation_id, major_version, minor_version, assigned_to_id, \
                 previous_assessment_id) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Assessment>(&query)
            .bind(input.innovation_id)
            .bind(input.major_version)
            .bind(input.minor_version)
            .bind(input.assigned_to_id)
            .bind(input.previous_assessment_id)
            .fetch_one(&mut **tx)
            .await
    }

    /// Find an assessment by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Assessment>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM innovation_assessments WHERE id = $1");
        sqlx::query_as::<_, Assessment>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Whether any assessment exists for the innovation.
    pub async fn exists_for_innovation(
        pool: &PgPool,
        innovation_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let count: Option<i64> = sqlx::query_scalar(
            "SELECT COUNT(*) FROM innovation_assessments WHERE innovation_id = $1",
        )
        .bind(innovation_id)
        .fetch_one(pool)
        .await?;
        Ok(count.unwrap_or(0) > 0)
    }

    /// The highest-versioned assessment for an innovation, if any.
    pub async fn latest_for_innovation(
        pool: &PgPool,
        innovation_id: DbId,
    ) -> Result<Option<Assessment>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM innovation_assessments \
             WHERE innovation_id = $1 \
             ORDER BY major_version DESC, minor_version DESC \
             LIMIT 1"
        );
        sqlx::query_as::<_, Assessment>(&query)
            .bind(innovation_id)
            .fetch_optional(pool)
            .await
    }

    /// All finished assessments for an innovation, ordered by start time.
    pub async fn list_finished(
        pool: &PgPool,
        innovation_id: DbId,
    ) -> Result<Vec<Assessment>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM innovation_assessments \
             WHERE innovation_id = $1 AND finished_at IS NOT NULL \
             ORDER BY started_at"
        );
        sqlx::query_as::<_, Assessment>(&query)
            .bind(innovation_id)
            .fetch_all(pool)
            .await
    }

    /// Apply a partial content update. Only non-`None` fields are applied.
    pub async fn update_fields(
        tx: &mut Transaction<'_, Postgres>,
        id: DbId,
        data: &UpdateAssessment,
    ) -> Result<Assessment, sqlx::Error> {
        let query = format!(
            "UPDATE innovation_assessments SET \
                description = COALESCE($2, description), \
                summary = COALESCE($3, summary), \
                maturity_level = COALESCE($4, maturity_level), \
                maturity_level_comment = COALESCE($5, maturity_level_comment), \
                has_regulatory_approvals = COALESCE($6, has_regulatory_approvals), \
                has_regulatory_approvals_comment = COALESCE($7, has_regulatory_approvals_comment), \
                has_evidence = COALESCE($8, has_evidence), \
                has_evidence_comment = COALESCE($9, has_evidence_comment), \
                has_validation = COALESCE($10, has_validation), \
                has_validation_comment = COALESCE($11, has_validation_comment), \
                has_proposition = COALESCE($12, has_proposition), \
                has_proposition_comment = COALESCE($13, has_proposition_comment), \
                has_competition_knowledge = COALESCE($14, has_competition_knowledge), \
                has_competition_knowledge_comment = COALESCE($15, has_competition_knowledge_comment), \
                has_implementation_plan = COALESCE($16, has_implementation_plan), \
                has_implementation_plan_comment = COALESCE($17, has_implementation_plan_comment), \
                has_scale_resource = COALESCE($18, has_scale_resource), \
                has_scale_resource_comment = COALESCE($19, has_scale_resource_comment), \
                updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Assessment>(&query)
            .bind(id)
            .bind(&data.description)
            .bind(&data.summary)
            .bind(&data.maturity_level)
            .bind(&data.maturity_level_comment)
            .bind(&data.has_regulatory_approvals)
            .bind(&data.has_regulatory_approvals_comment)
            .bind(&data.has_evidence)
            .bind(&data.has_evidence_comment)
            .bind(&data.has_validation)
            .bind(&data.has_validation_comment)
            .bind(&data.has_proposition)
            .bind(&data.has_proposition_comment)
            .bind(&data.has_competition_knowledge)
            .bind(&data.has_competition_knowledge_comment)
            .bind(&data.has_implementation_plan)
            .bind(&data.has_implementation_plan_comment)
            .bind(&data.has_scale_resource)
            .bind(&data.has_scale_resource_comment)
            .fetch_one(&mut **tx)
            .await
    }

    /// Stamp the submission time.
    pub async fn set_finished(
        tx: &mut Transaction<'_, Postgres>,
        id: DbId,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE innovation_assessments SET finished_at = NOW(), updated_at = NOW() \
             WHERE id = $1",
        )
        .bind(id)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }

    /// Reassign the assessment to another assessor.
    pub async fn set_assigned(
        tx: &mut Transaction<'_, Postgres>,
        id: DbId,
        user_id: DbId,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE innovation_assessments SET assigned_to_id = $2, updated_at = NOW() \
             WHERE id = $1",
        )
        .bind(id)
        .bind(user_id)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }

    /// Create or update the KPI exemption.
    ///
    /// `exempted_at` is stamped on first write only; later calls update the
    /// reason and message but keep the original timestamp.
    pub async fn upsert_exemption(
        pool: &PgPool,
        id: DbId,
        reason: &str,
        message: Option<&str>,
    ) -> Result<Assessment, sqlx::Error> {
        let query = format!(
            "UPDATE innovation_assessments SET \
                exempted_reason = $2, \
                exempted_message = $3, \
                exempted_at = COALESCE(exempted_at, NOW()), \
                updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Assessment>(&query)
            .bind(id)
            .bind(reason)
            .bind(message)
            .fetch_one(pool)
            .await
    }

    /// Suggested organisation unit ids for an assessment.
    pub async fn suggested_unit_ids(
        pool: &PgPool,
        assessment_id: DbId,
    ) -> Result<Vec<DbId>, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT organisation_unit_id FROM assessment_organisation_units \
             WHERE assessment_id = $1 \
             ORDER BY organisation_unit_id",
        )
        .bind(assessment_id)
        .fetch_all(pool)
        .await
    }

    /// Replace the suggested-unit set inside a caller-owned transaction.
    pub async fn replace_suggested_units(
        tx: &mut Transaction<'_, Postgres>,
        assessment_id: DbId,
        unit_ids: &[DbId],
    ) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM assessment_organisation_units WHERE assessment_id = $1")
            .bind(assessment_id)
            .execute(&mut **tx)
            .await?;

        for unit_id in unit_ids {
            sqlx::query(
                "INSERT INTO assessment_organisation_units (assessment_id, organisation_unit_id) \
                 VALUES ($1, $2)",
            )
            .bind(assessment_id)
            .bind(unit_id)
            .execute(&mut **tx)
            .await?;
        }

        Ok(())
    }
}
