//! Repository for the `notify_me_subscriptions` and `notification_schedules`
//! tables.
//!
//! Subscriptions are soft-deleted; every read here filters on
//! `deleted_at IS NULL`. Schedule rows are hard-deleted in lockstep with
//! their subscription.

use innopath_core::types::{DbId, Timestamp};
use sqlx::{PgPool, Postgres, Transaction};

use crate::models::notify_me::{NotificationSchedule, NotifyMeSubscription};

/// Column list for `notify_me_subscriptions` queries.
const COLUMNS: &str =
    "id, user_role_id, innovation_id, event_type, config, created_at, updated_at, deleted_at";

/// Column list for `notification_schedules` queries.
const SCHEDULE_COLUMNS: &str = "subscription_id, send_at, created_at, updated_at";

/// Provides CRUD operations for notify-me subscriptions and their schedules.
pub struct NotifyMeRepo;

impl NotifyMeRepo {
    /// Insert a subscription inside a caller-owned transaction.
    pub async fn create(
        tx: &mut Transaction<'_, Postgres>,
        user_role_id: DbId,
        innovation_id: DbId,
        event_type: &str,
        config: &serde_json::Value,
    ) -> Result<NotifyMeSubscription, sqlx::Error> {
        let query = format!(
            "INSERT INTO notify_me_subscriptions (user_role_id, innovation_id, event_type, config) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, NotifyMeSubscription>(&query)
            .bind(user_role_id)
            .bind(innovation_id)
            .bind(event_type)
            .bind(config)
            .fetch_one(&mut **tx)
            .await
    }

    /// Find a live subscription owned by the given user role.
    pub async fn find_scoped(
        pool: &PgPool,
        id: DbId,
        user_role_id: DbId,
    ) -> Result<Option<NotifyMeSubscription>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM notify_me_subscriptions \
             WHERE id = $1 AND user_role_id = $2 AND deleted_at IS NULL"
        );
        sqlx::query_as::<_, NotifyMeSubscription>(&query)
            .bind(id)
            .bind(user_role_id)
            .fetch_optional(pool)
            .await
    }

    /// Replace a subscription's config payload.
    pub async fn update_config(
        tx: &mut Transaction<'_, Postgres>,
        id: DbId,
        config: &serde_json::Value,
    ) -> Result<NotifyMeSubscription, sqlx::Error> {
        let query = format!(
            "UPDATE notify_me_subscriptions SET config = $2, updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, NotifyMeSubscription>(&query)
            .bind(id)
            .bind(config)
            .fetch_one(&mut **tx)
            .await
    }

    /// Soft-delete subscriptions owned by a user role and hard-delete their
    /// schedule rows.
    ///
    /// With `ids = None` every live subscription of the role is deleted.
    /// Ids that do not exist or belong to another role are skipped, so the
    /// operation is idempotent and never errors on stale input. Returns the
    /// ids that were actually deleted.
    pub async fn soft_delete_scoped(
        tx: &mut Transaction<'_, Postgres>,
        user_role_id: DbId,
        ids: Option<&[DbId]>,
    ) -> Result<Vec<DbId>, sqlx::Error> {
        let deleted: Vec<DbId> = match ids {
            Some(ids) => {
                sqlx::query_scalar(
                    "UPDATE notify_me_subscriptions \
                     SET deleted_at = NOW(), updated_at = NOW() \
                     WHERE user_role_id = $1 AND id = ANY($2) AND deleted_at IS NULL \
                     RETURNING id",
                )
                .bind(user_role_id)
                .bind(ids)
                .fetch_all(&mut **tx)
                .await?
            }
            None => {
                sqlx::query_scalar(
                    "UPDATE notify_me_subscriptions \
                     SET deleted_at = NOW(), updated_at = NOW() \
                     WHERE user_role_id = $1 AND deleted_at IS NULL \
                     RETURNING id",
                )
                .bind(user_role_id)
                .fetch_all(&mut **tx)
                .await?
            }
        };

        if !deleted.is_empty() {
            sqlx::query("DELETE FROM notification_schedules WHERE subscription_id = ANY($1)")
                .bind(&deleted)
                .execute(&mut **tx)
                .await?;
        }

        Ok(deleted)
    }

    /// Live subscriptions of a role for one innovation.
    pub async fn list_for_innovation(
        pool: &PgPool,
        user_role_id: DbId,
        innovation_id: DbId,
    ) -> Result<Vec<NotifyMeSubscription>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM notify_me_subscriptions \
             WHERE user_role_id = $1 AND innovation_id = $2 AND deleted_at IS NULL \
             ORDER BY created_at"
        );
        sqlx::query_as::<_, NotifyMeSubscription>(&query)
            .bind(user_role_id)
            .bind(innovation_id)
            .fetch_all(pool)
            .await
    }

    /// All live subscriptions of a role across innovations.
    pub async fn list_for_role(
        pool: &PgPool,
        user_role_id: DbId,
    ) -> Result<Vec<NotifyMeSubscription>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM notify_me_subscriptions \
             WHERE user_role_id = $1 AND deleted_at IS NULL \
             ORDER BY created_at"
        );
        sqlx::query_as::<_, NotifyMeSubscription>(&query)
            .bind(user_role_id)
            .fetch_all(pool)
            .await
    }

    /// Live subscriptions for an innovation and event type, any owner.
    ///
    /// Used by the event matching router.
    pub async fn list_active_for_event(
        pool: &PgPool,
        innovation_id: DbId,
        event_type: &str,
    ) -> Result<Vec<NotifyMeSubscription>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM notify_me_subscriptions \
             WHERE innovation_id = $1 AND event_type = $2 AND deleted_at IS NULL \
             ORDER BY id"
        );
        sqlx::query_as::<_, NotifyMeSubscription>(&query)
            .bind(innovation_id)
            .bind(event_type)
            .fetch_all(pool)
            .await
    }

    /// Soft-delete a single subscription regardless of owner.
    ///
    /// Used when a ONCE subscription fires or a scheduled reminder is sent.
    pub async fn retire(pool: &PgPool, id: DbId) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE notify_me_subscriptions \
             SET deleted_at = NOW(), updated_at = NOW() \
             WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Notification schedules
    // -----------------------------------------------------------------------

    /// Create or update the schedule row of a subscription.
    pub async fn upsert_schedule(
        tx: &mut Transaction<'_, Postgres>,
        subscription_id: DbId,
        send_at: Timestamp,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO notification_schedules (subscription_id, send_at) VALUES ($1, $2) \
             ON CONFLICT (subscription_id) \
             DO UPDATE SET send_at = EXCLUDED.send_at, updated_at = NOW()",
        )
        .bind(subscription_id)
        .bind(send_at)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }

    /// Remove the schedule row of a subscription, if present.
    pub async fn delete_schedule(
        tx: &mut Transaction<'_, Postgres>,
        subscription_id: DbId,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM notification_schedules WHERE subscription_id = $1")
            .bind(subscription_id)
            .execute(&mut **tx)
            .await?;
        Ok(())
    }

    /// Find the schedule row of a subscription.
    pub async fn find_schedule(
        pool: &PgPool,
        subscription_id: DbId,
    ) -> Result<Option<NotificationSchedule>, sqlx::Error> {
        let query = format!(
            "SELECT {SCHEDULE_COLUMNS} FROM notification_schedules WHERE subscription_id = $1"
        );
        sqlx::query_as::<_, NotificationSchedule>(&query)
            .bind(subscription_id)
            .fetch_optional(pool)
            .await
    }

    /// Claim due schedules, deleting them and returning their subscriptions.
    ///
    /// Uses `FOR UPDATE SKIP LOCKED` so concurrent dispatchers never fire the
    /// same reminder twice.
    pub async fn claim_due(
        pool: &PgPool,
        limit: i64,
    ) -> Result<Vec<NotifyMeSubscription>, sqlx::Error> {
        let claimed: Vec<DbId> = sqlx::query_scalar(
            "WITH due AS ( \
                 SELECT subscription_id FROM notification_schedules \
                 WHERE send_at <= NOW() \
                 ORDER BY send_at \
                 LIMIT $1 \
                 FOR UPDATE SKIP LOCKED \
             ) \
             DELETE FROM notification_schedules s \
             USING due WHERE s.subscription_id = due.subscription_id \
             RETURNING s.subscription_id",
        )
        .bind(limit)
        .fetch_all(pool)
        .await?;

        if claimed.is_empty() {
            return Ok(Vec::new());
        }

        let query = format!(
            "SELECT {COLUMNS} FROM notify_me_subscriptions \
             WHERE id = ANY($1) AND deleted_at IS NULL \
             ORDER BY id"
        );
        sqlx::query_as::<_, NotifyMeSubscription>(&query)
            .bind(&claimed)
            .fetch_all(pool)
            .await
    }
}
