//! Route definitions for assessment-keyed endpoints.

use axum::routing::get;
use axum::Router;

use crate::handlers::assessments;
use crate::state::AppState;

/// Routes mounted at `/assessments`.
///
/// ```text
/// GET /{assessment_id}/exemption -> get_exemption
/// PUT /{assessment_id}/exemption -> upsert_exemption
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route(
        "/{assessment_id}/exemption",
        get(assessments::get_exemption).put(assessments::upsert_exemption),
    )
}
