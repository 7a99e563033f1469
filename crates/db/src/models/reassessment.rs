//! Reassessment request entity models and DTOs.

use innopath_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `innovation_reassessment_requests` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ReassessmentRequest {
    pub id: DbId,
    pub innovation_id: DbId,
    pub assessment_id: DbId,
    pub previous_assessment_id: DbId,
    pub reasons: serde_json::Value,
    pub other_reason_description: Option<String>,
    pub description: String,
    pub what_support_do_you_need: Option<String>,
    pub created_at: Timestamp,
}

/// Caller-supplied fields for a reassessment request.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateReassessment {
    pub reasons: Vec<String>,
    pub other_reason_description: Option<String>,
    pub description: String,
    pub what_support_do_you_need: Option<String>,
}
