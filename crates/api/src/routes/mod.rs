pub mod assessments;
pub mod health;
pub mod innovations;
pub mod notify_me;
pub mod statistics;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /innovations/{id}                                     get
/// /innovations/{id}/activity                            activity trail (GET)
/// /innovations/{id}/statistics                          counters (GET)
///
/// /innovations/{id}/assessments                         list, create
/// /innovations/{id}/assessments/{assessment_id}         get, update (submit)
/// /innovations/{id}/assessments/{assessment_id}/assessor  reassign (PATCH)
/// /innovations/{id}/reassessments                       request reassessment (POST)
///
/// /assessments/{assessment_id}/exemption                get, upsert (GET, PUT)
///
/// /innovations/{id}/notify-me                           list, create
/// /notify-me                                            list all, bulk delete
/// /notify-me/{subscription_id}                          get, update, delete
///
/// /statistics/assessments                               platform counters (GET)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Innovation reads, nested assessment lifecycle, reassessments.
        .nest("/innovations", innovations::router())
        // Assessment-keyed exemption endpoints.
        .nest("/assessments", assessments::router())
        // Notify-me subscriptions across innovations.
        .nest("/notify-me", notify_me::router())
        // Platform-wide statistics.
        .nest("/statistics", statistics::router())
}
