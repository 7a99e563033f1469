//! Handlers for the needs-assessment lifecycle.
//!
//! Provides endpoints for starting, editing, and submitting assessments,
//! requesting reassessments, reassigning the assessor, and managing KPI
//! exemptions.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

use innopath_core::types::DbId;
use innopath_db::models::assessment::{
    StartAssessmentRequest, UpdateAssessment, UpdateAssessorRequest, UpsertExemptionRequest,
};
use innopath_db::models::reassessment::CreateReassessment;

use crate::engine::assessments;
use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::{RequireAssessor, RequireInnovatorOrAssessor};
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/innovations/{innovation_id}/assessments
///
/// List all finished assessments of an innovation, ordered by start time.
pub async fn list_assessments(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(innovation_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let assessments = assessments::list_assessments(&state.pool, innovation_id).await?;
    Ok(Json(DataResponse { data: assessments }))
}

/// GET /api/v1/innovations/{innovation_id}/assessments/{assessment_id}
///
/// Full assessment read model: assignee, grouped suggested units, whether it
/// is the current assessment, and reassessment context.
pub async fn get_assessment(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path((_innovation_id, assessment_id)): Path<(DbId, DbId)>,
) -> AppResult<impl IntoResponse> {
    let info = assessments::get_assessment_info(&state.pool, assessment_id).await?;
    Ok(Json(DataResponse { data: info }))
}

/// POST /api/v1/innovations/{innovation_id}/assessments
///
/// Start the needs assessment. Requires the assessor role.
pub async fn create_assessment(
    RequireAssessor(user): RequireAssessor,
    State(state): State<AppState>,
    Path(innovation_id): Path<DbId>,
    Json(input): Json<StartAssessmentRequest>,
) -> AppResult<impl IntoResponse> {
    let id =
        assessments::create_assessment(&state.pool, &user, innovation_id, &input.comment).await?;

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: assessments::IdRef { id },
        }),
    ))
}

/// PUT /api/v1/innovations/{innovation_id}/assessments/{assessment_id}
///
/// Partial update; `is_submission: true` submits the assessment. Requires
/// the assessor role.
pub async fn update_assessment(
    RequireAssessor(user): RequireAssessor,
    State(state): State<AppState>,
    Path((innovation_id, assessment_id)): Path<(DbId, DbId)>,
    Json(input): Json<UpdateAssessment>,
) -> AppResult<impl IntoResponse> {
    let updated = assessments::update_assessment(
        &state.pool,
        &state.event_bus,
        &user,
        innovation_id,
        assessment_id,
        &input,
    )
    .await?;

    Ok(Json(DataResponse { data: updated }))
}

/// POST /api/v1/innovations/{innovation_id}/reassessments
///
/// Request a reassessment. Open to innovators (owner/collaborator) and
/// assessors; the engine enforces the per-role preconditions.
pub async fn create_reassessment(
    RequireInnovatorOrAssessor(user): RequireInnovatorOrAssessor,
    State(state): State<AppState>,
    Path(innovation_id): Path<DbId>,
    Json(input): Json<CreateReassessment>,
) -> AppResult<impl IntoResponse> {
    let created =
        assessments::create_reassessment(&state.pool, &user, innovation_id, &input).await?;

    Ok((StatusCode::CREATED, Json(DataResponse { data: created })))
}

/// PATCH /api/v1/innovations/{innovation_id}/assessments/{assessment_id}/assessor
///
/// Reassign the assessment to another assessor. Requires the assessor role.
pub async fn update_assessor(
    RequireAssessor(user): RequireAssessor,
    State(state): State<AppState>,
    Path((innovation_id, assessment_id)): Path<(DbId, DbId)>,
    Json(input): Json<UpdateAssessorRequest>,
) -> AppResult<impl IntoResponse> {
    let assessor = assessments::update_assessor(
        &state.pool,
        &user,
        innovation_id,
        assessment_id,
        input.assessor_id,
    )
    .await?;

    Ok(Json(DataResponse { data: assessor }))
}

/// GET /api/v1/assessments/{assessment_id}/exemption
///
/// Read the KPI exemption state of an assessment.
pub async fn get_exemption(
    RequireAssessor(_user): RequireAssessor,
    State(state): State<AppState>,
    Path(assessment_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let info = assessments::get_exemption(&state.pool, assessment_id).await?;
    Ok(Json(DataResponse { data: info }))
}

/// PUT /api/v1/assessments/{assessment_id}/exemption
///
/// Create or update the KPI exemption. Requires the assessor role.
pub async fn upsert_exemption(
    RequireAssessor(user): RequireAssessor,
    State(state): State<AppState>,
    Path(assessment_id): Path<DbId>,
    Json(input): Json<UpsertExemptionRequest>,
) -> AppResult<impl IntoResponse> {
    let info =
        assessments::upsert_exemption(&state.pool, &user, assessment_id, &input).await?;
    Ok(Json(DataResponse { data: info }))
}
