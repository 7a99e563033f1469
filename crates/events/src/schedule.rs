//! Scheduled-reminder dispatcher.
//!
//! SCHEDULED subscriptions own a `notification_schedules` row with a send
//! date. [`ScheduleDispatcher`] polls for due rows, publishes a REMINDER
//! event for each, and retires the fired subscription. Claiming uses
//! `FOR UPDATE SKIP LOCKED` so multiple instances never double-fire.

use std::sync::Arc;
use std::time::Duration;

use innopath_core::events::EVENT_REMINDER;
use innopath_db::models::notify_me::SubscriptionConfig;
use innopath_db::repositories::NotifyMeRepo;
use innopath_db::DbPool;
use tokio_util::sync::CancellationToken;

use crate::bus::{DomainEvent, EventBus};

/// Default polling interval for the dispatcher loop.
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(60);

/// Maximum schedules claimed per cycle.
const CLAIM_BATCH_SIZE: i64 = 100;

/// Background dispatcher for due notification schedules.
pub struct ScheduleDispatcher {
    pool: DbPool,
    bus: Arc<EventBus>,
    poll_interval: Duration,
}

impl ScheduleDispatcher {
    /// Create a new dispatcher with the default 60-second poll interval.
    pub fn new(pool: DbPool, bus: Arc<EventBus>) -> Self {
        Self {
            pool,
            bus,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    /// Run the dispatcher loop until the cancellation token is triggered.
    pub async fn run(&self, cancel: CancellationToken) {
        let mut ticker = tokio::time::interval(self.poll_interval);
        tracing::info!(
            poll_interval_secs = self.poll_interval.as_secs(),
            "Schedule dispatcher started",
        );

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("Schedule dispatcher shutting down");
                    break;
                }
                _ = ticker.tick() => {
                    if let Err(e) = self.fire_due().await {
                        tracing::error!(error = %e, "Schedule dispatch cycle failed");
                    }
                }
            }
        }
    }

    /// Claim and fire every due schedule.
    async fn fire_due(&self) -> Result<(), sqlx::Error> {
        let due = NotifyMeRepo::claim_due(&self.pool, CLAIM_BATCH_SIZE).await?;

        for subscription in due {
            let custom_message = match subscription.parsed_config() {
                Ok(SubscriptionConfig::Reminder { custom_message, .. }) => custom_message,
                Ok(_) => None,
                Err(e) => {
                    tracing::error!(
                        error = %e,
                        subscription_id = subscription.id,
                        "Skipping reminder with unreadable config"
                    );
                    None
                }
            };

            self.bus.publish(
                DomainEvent::new(EVENT_REMINDER)
                    .with_innovation(subscription.innovation_id)
                    .with_payload(serde_json::json!({
                        "subscription_id": subscription.id,
                        "user_role_id": subscription.user_role_id,
                        "custom_message": custom_message,
                    })),
            );

            // A reminder fires once; the subscription is done after it.
            NotifyMeRepo::retire(&self.pool, subscription.id).await?;

            tracing::info!(
                subscription_id = subscription.id,
                innovation_id = subscription.innovation_id,
                "Reminder fired"
            );
        }

        Ok(())
    }
}
