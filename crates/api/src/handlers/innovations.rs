//! Read handlers for innovations and their activity trail.

use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;

use innopath_core::error::CoreError;
use innopath_core::types::DbId;
use innopath_db::repositories::{ActivityLogRepo, InnovationRepo};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Pagination query parameters for the activity list.
#[derive(Debug, Deserialize)]
pub struct ActivityQuery {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

fn default_limit() -> i64 {
    50
}

/// GET /api/v1/innovations/{innovation_id}
pub async fn get_innovation(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(innovation_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let innovation = InnovationRepo::find_by_id(&state.pool, innovation_id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFound {
                entity: "Innovation",
                id: innovation_id,
            })
        })?;

    Ok(Json(DataResponse { data: innovation }))
}

/// GET /api/v1/innovations/{innovation_id}/activity
///
/// The innovation's activity trail, newest first.
pub async fn list_activity(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(innovation_id): Path<DbId>,
    Query(query): Query<ActivityQuery>,
) -> AppResult<impl IntoResponse> {
    InnovationRepo::find_by_id(&state.pool, innovation_id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFound {
                entity: "Innovation",
                id: innovation_id,
            })
        })?;

    let entries =
        ActivityLogRepo::list_for_innovation(&state.pool, innovation_id, query.limit, query.offset)
            .await?;

    Ok(Json(DataResponse { data: entries }))
}
