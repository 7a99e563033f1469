//! Handlers for notify-me subscriptions.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;

use innopath_core::types::DbId;
use innopath_db::models::notify_me::SubscriptionConfig;

use crate::engine::notify_me;
use crate::error::AppResult;
use crate::middleware::rbac::RequireSubscriber;
use crate::response::DataResponse;
use crate::state::AppState;

/// Query parameters for the cross-innovation subscription list.
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub with_details: bool,
}

/// Request body for bulk subscription deletion.
///
/// Omitting `ids` deletes every subscription of the calling role.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct DeleteRequest {
    pub ids: Option<Vec<DbId>>,
}

/// POST /api/v1/innovations/{innovation_id}/notify-me
///
/// Create a subscription for the calling user role.
pub async fn create_subscription(
    RequireSubscriber(user): RequireSubscriber,
    State(state): State<AppState>,
    Path(innovation_id): Path<DbId>,
    Json(config): Json<SubscriptionConfig>,
) -> AppResult<impl IntoResponse> {
    let subscription =
        notify_me::create_subscription(&state.pool, &user, innovation_id, &config).await?;

    Ok((StatusCode::CREATED, Json(DataResponse { data: subscription })))
}

/// GET /api/v1/innovations/{innovation_id}/notify-me
///
/// The calling role's subscriptions on one innovation, rendered per event
/// type.
pub async fn list_innovation_subscriptions(
    RequireSubscriber(user): RequireSubscriber,
    State(state): State<AppState>,
    Path(innovation_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let subscriptions =
        notify_me::list_innovation_subscriptions(&state.pool, &user, innovation_id).await?;
    Ok(Json(DataResponse {
        data: subscriptions,
    }))
}

/// GET /api/v1/notify-me
///
/// The calling role's subscriptions grouped per innovation, sorted by
/// innovation name. `?with_details=true` includes the rendered
/// subscriptions.
pub async fn list_subscriptions(
    RequireSubscriber(user): RequireSubscriber,
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> AppResult<impl IntoResponse> {
    let subscriptions =
        notify_me::list_subscriptions(&state.pool, &user, query.with_details).await?;
    Ok(Json(DataResponse {
        data: subscriptions,
    }))
}

/// GET /api/v1/notify-me/{subscription_id}
///
/// One subscription of the calling role, rendered for its event type.
pub async fn get_subscription(
    RequireSubscriber(user): RequireSubscriber,
    State(state): State<AppState>,
    Path(subscription_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let subscription = notify_me::get_subscription(&state.pool, &user, subscription_id).await?;
    Ok(Json(DataResponse { data: subscription }))
}

/// PUT /api/v1/notify-me/{subscription_id}
///
/// Update a subscription's config. The event type is immutable.
pub async fn update_subscription(
    RequireSubscriber(user): RequireSubscriber,
    State(state): State<AppState>,
    Path(subscription_id): Path<DbId>,
    Json(config): Json<SubscriptionConfig>,
) -> AppResult<impl IntoResponse> {
    let subscription =
        notify_me::update_subscription(&state.pool, &user, subscription_id, &config).await?;
    Ok(Json(DataResponse { data: subscription }))
}

/// DELETE /api/v1/notify-me/{subscription_id}
///
/// Delete one subscription. A no-op when the id is unknown or foreign.
pub async fn delete_subscription(
    RequireSubscriber(user): RequireSubscriber,
    State(state): State<AppState>,
    Path(subscription_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    notify_me::delete_subscriptions(&state.pool, &user, Some(&[subscription_id])).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/v1/notify-me
///
/// Bulk delete: by id list, or everything the calling role holds when no
/// ids are given.
pub async fn delete_subscriptions(
    RequireSubscriber(user): RequireSubscriber,
    State(state): State<AppState>,
    Json(input): Json<DeleteRequest>,
) -> AppResult<impl IntoResponse> {
    notify_me::delete_subscriptions(&state.pool, &user, input.ids.as_deref()).await?;
    Ok(StatusCode::NO_CONTENT)
}
