//! Event-to-subscription matching engine.
//!
//! [`NotifyMeRouter`] subscribes to the domain event bus and, for each
//! innovation-scoped event, finds the live notify-me subscriptions whose
//! event type and preconditions accept it. Every match is durably recorded;
//! ONCE subscriptions retire after their first match.

use innopath_core::events::EVENT_REMINDER;
use innopath_core::notify_me::{SUBSCRIPTION_ONCE, SUBSCRIBABLE_EVENT_TYPES};
use innopath_db::repositories::{DomainEventRepo, NotifyMeRepo};
use innopath_db::DbPool;
use innopath_events::DomainEvent;
use tokio::sync::broadcast;

/// Durable record type written for every subscription match.
const MATCH_RECORD_EVENT_TYPE: &str = "NOTIFY_ME_MATCHED";

/// Routes domain events to matching notify-me subscriptions.
pub struct NotifyMeRouter {
    pool: DbPool,
}

impl NotifyMeRouter {
    /// Create a new router with the given database pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Run the main routing loop.
    ///
    /// Subscribes to the event bus via `receiver` and processes each event.
    /// The loop exits when the channel is closed (i.e. the
    /// [`EventBus`](innopath_events::EventBus) is dropped).
    pub async fn run(self, mut receiver: broadcast::Receiver<DomainEvent>) {
        loop {
            match receiver.recv().await {
                Ok(event) => {
                    if let Err(e) = self.route_event(&event).await {
                        tracing::error!(
                            error = %e,
                            event_type = %event.event_type,
                            "Failed to route event"
                        );
                    }
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(skipped = n, "Notify-me router lagged");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Event bus closed, notify-me router shutting down");
                    break;
                }
            }
        }
    }

    /// Match a single event against the subscriptions of its innovation.
    pub async fn route_event(
        &self,
        event: &DomainEvent,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        // Reminder events are produced by the schedule dispatcher; the fired
        // subscription is already retired, so there is nothing to match.
        if event.event_type == EVENT_REMINDER {
            return Ok(());
        }

        if !SUBSCRIBABLE_EVENT_TYPES.contains(&event.event_type.as_str()) {
            return Ok(());
        }

        let Some(innovation_id) = event.innovation_id else {
            return Ok(());
        };

        let subscriptions =
            NotifyMeRepo::list_active_for_event(&self.pool, innovation_id, &event.event_type)
                .await?;

        for subscription in subscriptions {
            let config = match subscription.parsed_config() {
                Ok(config) => config,
                Err(e) => {
                    tracing::error!(
                        error = %e,
                        subscription_id = subscription.id,
                        "Skipping subscription with unreadable config"
                    );
                    continue;
                }
            };

            if !config.matches_event(&event.payload) {
                continue;
            }

            DomainEventRepo::insert(
                &self.pool,
                MATCH_RECORD_EVENT_TYPE,
                Some(innovation_id),
                event.actor_user_id,
                &serde_json::json!({
                    "subscription_id": subscription.id,
                    "user_role_id": subscription.user_role_id,
                    "source_event_type": event.event_type,
                    "source_payload": event.payload,
                }),
            )
            .await?;

            tracing::info!(
                subscription_id = subscription.id,
                user_role_id = subscription.user_role_id,
                event_type = %event.event_type,
                innovation_id,
                "Subscription matched"
            );

            if config.subscription_type() == SUBSCRIPTION_ONCE {
                NotifyMeRepo::retire(&self.pool, subscription.id).await?;
            }
        }

        Ok(())
    }
}
