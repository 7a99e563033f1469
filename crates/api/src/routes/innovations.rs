//! Route definitions for the `/innovations` resource.
//!
//! All endpoints require authentication; mutation endpoints additionally
//! enforce role requirements via RBAC extractors in the handlers.

use axum::routing::{get, patch, post};
use axum::Router;

use crate::handlers::{assessments, innovations, notify_me, statistics};
use crate::state::AppState;

/// Routes mounted at `/innovations`.
///
/// ```text
/// GET    /{id}                                    -> get_innovation
/// GET    /{id}/activity                           -> list_activity
/// GET    /{id}/statistics                         -> innovation_statistics
///
/// GET    /{id}/assessments                        -> list_assessments
/// POST   /{id}/assessments                        -> create_assessment
/// GET    /{id}/assessments/{assessment_id}        -> get_assessment
/// PUT    /{id}/assessments/{assessment_id}        -> update_assessment
/// PATCH  /{id}/assessments/{assessment_id}/assessor -> update_assessor
/// POST   /{id}/reassessments                      -> create_reassessment
///
/// GET    /{id}/notify-me                          -> list_innovation_subscriptions
/// POST   /{id}/notify-me                          -> create_subscription
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{id}", get(innovations::get_innovation))
        .route("/{id}/activity", get(innovations::list_activity))
        .route("/{id}/statistics", get(statistics::innovation_statistics))
        // Assessment lifecycle
        .route(
            "/{id}/assessments",
            get(assessments::list_assessments).post(assessments::create_assessment),
        )
        .route(
            "/{id}/assessments/{assessment_id}",
            get(assessments::get_assessment).put(assessments::update_assessment),
        )
        .route(
            "/{id}/assessments/{assessment_id}/assessor",
            patch(assessments::update_assessor),
        )
        .route("/{id}/reassessments", post(assessments::create_reassessment))
        // Notify-me subscriptions scoped to one innovation
        .route(
            "/{id}/notify-me",
            get(notify_me::list_innovation_subscriptions).post(notify_me::create_subscription),
        )
}
