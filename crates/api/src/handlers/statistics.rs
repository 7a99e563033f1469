//! Read-only statistics handlers.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;

use innopath_core::types::DbId;
use innopath_db::repositories::StatisticsRepo;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Platform-wide assessment counters.
#[derive(Debug, Serialize)]
pub struct AssessmentStatistics {
    pub awaiting_assessment: i64,
    pub exempted_assessments: i64,
}

/// Per-innovation counters.
#[derive(Debug, Serialize)]
pub struct InnovationStatistics {
    pub reassessment_requests: i64,
}

/// GET /api/v1/statistics/assessments
pub async fn assessment_statistics(
    _auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let awaiting_assessment = StatisticsRepo::count_awaiting_assessment(&state.pool).await?;
    let exempted_assessments = StatisticsRepo::count_exempted_assessments(&state.pool).await?;

    Ok(Json(DataResponse {
        data: AssessmentStatistics {
            awaiting_assessment,
            exempted_assessments,
        },
    }))
}

/// GET /api/v1/innovations/{innovation_id}/statistics
pub async fn innovation_statistics(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(innovation_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let reassessment_requests =
        StatisticsRepo::count_reassessment_requests(&state.pool, innovation_id).await?;

    Ok(Json(DataResponse {
        data: InnovationStatistics {
            reassessment_requests,
        },
    }))
}
