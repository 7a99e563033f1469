//! Read-only counter queries backing the statistics endpoints.

use innopath_core::innovation::{STATUS_NEEDS_ASSESSMENT, STATUS_WAITING_NEEDS_ASSESSMENT};
use innopath_core::types::DbId;
use sqlx::PgPool;

/// Provides aggregate counters derived from the assessment entities.
pub struct StatisticsRepo;

impl StatisticsRepo {
    /// Innovations currently waiting for, or undergoing, needs assessment.
    pub async fn count_awaiting_assessment(pool: &PgPool) -> Result<i64, sqlx::Error> {
        let count: Option<i64> = sqlx::query_scalar(
            "SELECT COUNT(*) FROM innovations WHERE status = $1 OR status = $2",
        )
        .bind(STATUS_WAITING_NEEDS_ASSESSMENT)
        .bind(STATUS_NEEDS_ASSESSMENT)
        .fetch_one(pool)
        .await?;
        Ok(count.unwrap_or(0))
    }

    /// Assessments carrying a KPI exemption.
    pub async fn count_exempted_assessments(pool: &PgPool) -> Result<i64, sqlx::Error> {
        let count: Option<i64> = sqlx::query_scalar(
            "SELECT COUNT(*) FROM innovation_assessments WHERE exempted_reason IS NOT NULL",
        )
        .fetch_one(pool)
        .await?;
        Ok(count.unwrap_or(0))
    }

    /// Reassessment requests recorded for an innovation.
    pub async fn count_reassessment_requests(
        pool: &PgPool,
        innovation_id: DbId,
    ) -> Result<i64, sqlx::Error> {
        let count: Option<i64> = sqlx::query_scalar(
            "SELECT COUNT(*) FROM innovation_reassessment_requests WHERE innovation_id = $1",
        )
        .bind(innovation_id)
        .fetch_one(pool)
        .await?;
        Ok(count.unwrap_or(0))
    }
}
