//! Route definitions for the `/notify-me` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::notify_me;
use crate::state::AppState;

/// Routes mounted at `/notify-me`.
///
/// ```text
/// GET    /                    -> list_subscriptions (?with_details)
/// DELETE /                    -> delete_subscriptions (bulk / all)
/// GET    /{subscription_id}   -> get_subscription
/// PUT    /{subscription_id}   -> update_subscription
/// DELETE /{subscription_id}   -> delete_subscription
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(notify_me::list_subscriptions).delete(notify_me::delete_subscriptions),
        )
        .route(
            "/{subscription_id}",
            get(notify_me::get_subscription)
                .put(notify_me::update_subscription)
                .delete(notify_me::delete_subscription),
        )
}
