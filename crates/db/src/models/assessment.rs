//! Needs-assessment entity models and DTOs.

use innopath_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `innovation_assessments` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Assessment {
    pub id: DbId,
    pub innovation_id: DbId,
    pub major_version: i32,
    pub minor_version: i32,
    pub description: Option<String>,
    pub summary: Option<String>,
    pub maturity_level: Option<String>,
    pub maturity_level_comment: Option<String>,
    pub has_regulatory_approvals: Option<String>,
    pub has_regulatory_approvals_comment: Option<String>,
    pub has_evidence: Option<String>,
    pub has_evidence_comment: Option<String>,
    pub has_validation: Option<String>,
    pub has_validation_comment: Option<String>,
    pub has_proposition: Option<String>,
    pub has_proposition_comment: Option<String>,
    pub has_competition_knowledge: Option<String>,
    pub has_competition_knowledge_comment: Option<String>,
    pub has_implementation_plan: Option<String>,
    pub has_implementation_plan_comment: Option<String>,
    pub has_scale_resource: Option<String>,
    pub has_scale_resource_comment: Option<String>,
    pub started_at: Timestamp,
    pub finished_at: Option<Timestamp>,
    pub assigned_to_id: Option<DbId>,
    pub exempted_reason: Option<String>,
    pub exempted_message: Option<String>,
    pub exempted_at: Option<Timestamp>,
    pub previous_assessment_id: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Insert parameters for a new assessment row.
///
/// Content fields default to empty; reassessments pre-populate them from the
/// previous assessment via [`UpdateAssessment::from_assessment`].
#[derive(Debug, Clone, Default)]
pub struct CreateAssessment {
    pub innovation_id: DbId,
    pub major_version: i32,
    pub minor_version: i32,
    pub assigned_to_id: Option<DbId>,
    pub previous_assessment_id: Option<DbId>,
}

/// Partial-update DTO for an assessment.
///
/// Every content field is optional; `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct UpdateAssessment {
    pub description: Option<String>,
    pub summary: Option<String>,
    pub maturity_level: Option<String>,
    pub maturity_level_comment: Option<String>,
    pub has_regulatory_approvals: Option<String>,
    pub has_regulatory_approvals_comment: Option<String>,
    pub has_evidence: Option<String>,
    pub has_evidence_comment: Option<String>,
    pub has_validation: Option<String>,
    pub has_validation_comment: Option<String>,
    pub has_proposition: Option<String>,
    pub has_proposition_comment: Option<String>,
    pub has_competition_knowledge: Option<String>,
    pub has_competition_knowledge_comment: Option<String>,
    pub has_implementation_plan: Option<String>,
    pub has_implementation_plan_comment: Option<String>,
    pub has_scale_resource: Option<String>,
    pub has_scale_resource_comment: Option<String>,
    pub suggested_organisation_unit_ids: Option<Vec<DbId>>,
    pub is_submission: bool,
}

/// Request body for starting a needs assessment.
#[derive(Debug, Deserialize)]
pub struct StartAssessmentRequest {
    pub comment: String,
}

/// Request body for reassigning an assessment to another assessor.
#[derive(Debug, Deserialize)]
pub struct UpdateAssessorRequest {
    pub assessor_id: DbId,
}

/// Request body for creating or updating a KPI exemption.
#[derive(Debug, Deserialize)]
pub struct UpsertExemptionRequest {
    pub reason: String,
    pub message: Option<String>,
}

impl UpdateAssessment {
    /// Carry the evaluation content of an existing assessment, e.g. to seed
    /// the new row created by a reassessment.
    pub fn from_assessment(assessment: &Assessment) -> Self {
        Self {
            description: assessment.description.clone(),
            summary: assessment.summary.clone(),
            maturity_level: assessment.maturity_level.clone(),
            maturity_level_comment: assessment.maturity_level_comment.clone(),
            has_regulatory_approvals: assessment.has_regulatory_approvals.clone(),
            has_regulatory_approvals_comment: assessment.has_regulatory_approvals_comment.clone(),
            has_evidence: assessment.has_evidence.clone(),
            has_evidence_comment: assessment.has_evidence_comment.clone(),
            has_validation: assessment.has_validation.clone(),
            has_validation_comment: assessment.has_validation_comment.clone(),
            has_proposition: assessment.has_proposition.clone(),
            has_proposition_comment: assessment.has_proposition_comment.clone(),
            has_competition_knowledge: assessment.has_competition_knowledge.clone(),
            has_competition_knowledge_comment: assessment
                .has_competition_knowledge_comment
                .clone(),
            has_implementation_plan: assessment.has_implementation_plan.clone(),
            has_implementation_plan_comment: assessment.has_implementation_plan_comment.clone(),
            has_scale_resource: assessment.has_scale_resource.clone(),
            has_scale_resource_comment: assessment.has_scale_resource_comment.clone(),
            suggested_organisation_unit_ids: None,
            is_submission: false,
        }
    }
}
