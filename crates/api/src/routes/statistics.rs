//! Route definitions for the `/statistics` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::statistics;
use crate::state::AppState;

/// Routes mounted at `/statistics`.
///
/// ```text
/// GET /assessments -> assessment_statistics
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/assessments", get(statistics::assessment_statistics))
}
