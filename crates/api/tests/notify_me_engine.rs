//! Integration tests for the notify-me subscription engine.
//!
//! Exercises subscription writes (schedule lockstep, event-type
//! immutability, idempotent deletes) and the per-event-type response
//! builders against a real database.

mod common;

use assert_matches::assert_matches;
use chrono::{Duration, Utc};
use innopath_api::engine::notify_me;
use innopath_api::error::AppError;
use innopath_core::error::CoreError;
use innopath_core::notify_me::{SUBSCRIPTION_INSTANTLY, SUBSCRIPTION_SCHEDULED};
use innopath_core::support::SUPPORT_ENGAGING;
use innopath_db::models::notify_me::{
    ProgressUpdatePreConditions, SubscriptionConfig, SupportUpdatedPreConditions,
};
use innopath_db::repositories::{InnovationRepo, NotifyMeRepo};
use sqlx::PgPool;

fn support_updated_config(units: Vec<i64>, status: Vec<String>) -> SubscriptionConfig {
    SubscriptionConfig::SupportUpdated {
        subscription_type: SUBSCRIPTION_INSTANTLY.to_string(),
        pre_conditions: SupportUpdatedPreConditions { units, status },
    }
}

fn reminder_config(days_from_now: i64) -> SubscriptionConfig {
    SubscriptionConfig::Reminder {
        subscription_type: SUBSCRIPTION_SCHEDULED.to_string(),
        date: Utc::now() + Duration::days(days_from_now),
        custom_message: Some("check on progress".to_string()),
    }
}

// ---------------------------------------------------------------------------
// Creation
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_and_render_support_updated(pool: PgPool) {
    let innovator = common::create_innovator(&pool, "Innovator A").await;
    let innovation = common::create_innovation(&pool, &innovator, "Sub Target").await;
    let (org, units) =
        common::create_organisation_with_units(&pool, "Health Org", "HO", &["North", "South"])
            .await;
    let subscriber = common::create_accessor(&pool, "Accessor A", org.id, units[0].id).await;
    InnovationRepo::add_share(&pool, innovation.id, org.id)
        .await
        .unwrap();

    let subscription = notify_me::create_subscription(
        &pool,
        &subscriber,
        innovation.id,
        &support_updated_config(
            vec![units[0].id, units[1].id],
            vec![SUPPORT_ENGAGING.to_string()],
        ),
    )
    .await
    .unwrap();
    assert_eq!(subscription.event_type, "SUPPORT_UPDATED");

    // Both units share one organisation, so the tree has one entry for it.
    let rendered = notify_me::get_subscription(&pool, &subscriber, subscription.id)
        .await
        .unwrap();
    assert_eq!(rendered["event_type"], "SUPPORT_UPDATED");
    assert_eq!(rendered["subscription_type"], "INSTANTLY");
    assert_eq!(rendered["organisations"].as_array().unwrap().len(), 1);
    assert_eq!(rendered["organisations"][0]["id"], org.id);
    assert_eq!(
        rendered["organisations"][0]["units"]
            .as_array()
            .unwrap()
            .len(),
        2
    );
    assert_eq!(rendered["status"][0], "ENGAGING");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_scheduled_create_requires_future_date(pool: PgPool) {
    let innovator = common::create_innovator(&pool, "Innovator B").await;
    let innovation = common::create_innovation(&pool, &innovator, "Past Date").await;
    let subscriber = common::create_assessor(&pool, "Assessor B").await;

    let result = notify_me::create_subscription(
        &pool,
        &subscriber,
        innovation.id,
        &reminder_config(-1),
    )
    .await;
    assert_matches!(
        result,
        Err(AppError::Core(CoreError::Validation(msg))) if msg.contains("in the past")
    );

    // A future date creates the schedule row in lockstep.
    let subscription = notify_me::create_subscription(
        &pool,
        &subscriber,
        innovation.id,
        &reminder_config(7),
    )
    .await
    .unwrap();

    assert!(NotifyMeRepo::find_schedule(&pool, subscription.id)
        .await
        .unwrap()
        .is_some());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_accessor_needs_share_to_subscribe(pool: PgPool) {
    let innovator = common::create_innovator(&pool, "Innovator C").await;
    let innovation = common::create_innovation(&pool, &innovator, "Unshared").await;
    let (org, units) =
        common::create_organisation_with_units(&pool, "Health Org", "HO", &["North"]).await;
    let subscriber = common::create_accessor(&pool, "Accessor C", org.id, units[0].id).await;

    let result = notify_me::create_subscription(
        &pool,
        &subscriber,
        innovation.id,
        &support_updated_config(vec![units[0].id], vec![]),
    )
    .await;
    assert_matches!(result, Err(AppError::Core(CoreError::Forbidden(_))));
}

// ---------------------------------------------------------------------------
// Update
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_event_type_is_immutable(pool: PgPool) {
    let innovator = common::create_innovator(&pool, "Innovator D").await;
    let innovation = common::create_innovation(&pool, &innovator, "Immutable").await;
    let subscriber = common::create_assessor(&pool, "Assessor D").await;

    let subscription = notify_me::create_subscription(
        &pool,
        &subscriber,
        innovation.id,
        &SubscriptionConfig::DocumentUploaded {
            subscription_type: SUBSCRIPTION_INSTANTLY.to_string(),
        },
    )
    .await
    .unwrap();

    // Any config tagged with a different event type is rejected, regardless
    // of how valid it is otherwise.
    let result = notify_me::update_subscription(
        &pool,
        &subscriber,
        subscription.id,
        &reminder_config(7),
    )
    .await;
    assert_matches!(
        result,
        Err(AppError::BadRequest(msg)) if msg.contains("event type cannot be changed")
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_update_scoped_to_owner(pool: PgPool) {
    let innovator = common::create_innovator(&pool, "Innovator E").await;
    let innovation = common::create_innovation(&pool, &innovator, "Owned").await;
    let owner = common::create_assessor(&pool, "Assessor E").await;
    let stranger = common::create_assessor(&pool, "Assessor F").await;

    let subscription = notify_me::create_subscription(
        &pool,
        &owner,
        innovation.id,
        &SubscriptionConfig::DocumentUploaded {
            subscription_type: SUBSCRIPTION_INSTANTLY.to_string(),
        },
    )
    .await
    .unwrap();

    let result = notify_me::update_subscription(
        &pool,
        &stranger,
        subscription.id,
        &SubscriptionConfig::DocumentUploaded {
            subscription_type: SUBSCRIPTION_INSTANTLY.to_string(),
        },
    )
    .await;
    assert_matches!(result, Err(AppError::Core(CoreError::Forbidden(_))));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_update_moves_schedule_date(pool: PgPool) {
    let innovator = common::create_innovator(&pool, "Innovator G").await;
    let innovation = common::create_innovation(&pool, &innovator, "Rescheduled").await;
    let subscriber = common::create_assessor(&pool, "Assessor G").await;

    let subscription =
        notify_me::create_subscription(&pool, &subscriber, innovation.id, &reminder_config(3))
            .await
            .unwrap();

    // Updating with a past date is rejected, same rule as creation.
    let result = notify_me::update_subscription(
        &pool,
        &subscriber,
        subscription.id,
        &reminder_config(-3),
    )
    .await;
    assert_matches!(result, Err(AppError::Core(CoreError::Validation(_))));

    let updated_config = reminder_config(14);
    notify_me::update_subscription(&pool, &subscriber, subscription.id, &updated_config)
        .await
        .unwrap();

    let schedule = NotifyMeRepo::find_schedule(&pool, subscription.id)
        .await
        .unwrap()
        .expect("schedule should exist");
    assert!((schedule.send_at - (Utc::now() + Duration::days(14)))
        .num_seconds()
        .abs()
        < 5);
}

// ---------------------------------------------------------------------------
// Deletion
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_delete_is_idempotent_and_scoped(pool: PgPool) {
    let innovator = common::create_innovator(&pool, "Innovator H").await;
    let innovation = common::create_innovation(&pool, &innovator, "Deletable").await;
    let subscriber = common::create_assessor(&pool, "Assessor H").await;

    let subscription = notify_me::create_subscription(
        &pool,
        &subscriber,
        innovation.id,
        &SubscriptionConfig::DocumentUploaded {
            subscription_type: SUBSCRIPTION_INSTANTLY.to_string(),
        },
    )
    .await
    .unwrap();

    // Unknown ids delete nothing and do not error.
    let deleted = notify_me::delete_subscriptions(&pool, &subscriber, Some(&[9999]))
        .await
        .unwrap();
    assert_eq!(deleted, 0);

    let deleted = notify_me::delete_subscriptions(&pool, &subscriber, Some(&[subscription.id]))
        .await
        .unwrap();
    assert_eq!(deleted, 1);

    // Repeat delete is a no-op; the subscription is gone from reads.
    let deleted = notify_me::delete_subscriptions(&pool, &subscriber, Some(&[subscription.id]))
        .await
        .unwrap();
    assert_eq!(deleted, 0);

    let result = notify_me::get_subscription(&pool, &subscriber, subscription.id).await;
    assert_matches!(
        result,
        Err(AppError::Core(CoreError::NotFound { entity: "Subscription", .. }))
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_delete_all_for_role(pool: PgPool) {
    let innovator = common::create_innovator(&pool, "Innovator I").await;
    let innovation = common::create_innovation(&pool, &innovator, "Delete All").await;
    let subscriber = common::create_assessor(&pool, "Assessor I").await;

    for _ in 0..3 {
        notify_me::create_subscription(
            &pool,
            &subscriber,
            innovation.id,
            &SubscriptionConfig::DocumentUploaded {
                subscription_type: SUBSCRIPTION_INSTANTLY.to_string(),
            },
        )
        .await
        .unwrap();
    }

    let deleted = notify_me::delete_subscriptions(&pool, &subscriber, None)
        .await
        .unwrap();
    assert_eq!(deleted, 3);

    let remaining = notify_me::list_innovation_subscriptions(&pool, &subscriber, innovation.id)
        .await
        .unwrap();
    assert!(remaining.is_empty());
}

// ---------------------------------------------------------------------------
// Read paths
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_list_subscriptions_groups_per_innovation_sorted_by_name(pool: PgPool) {
    let innovator = common::create_innovator(&pool, "Innovator J").await;
    let zebra = common::create_innovation(&pool, &innovator, "Zebra Project").await;
    let apple = common::create_innovation(&pool, &innovator, "Apple Project").await;
    let subscriber = common::create_assessor(&pool, "Assessor J").await;

    for innovation_id in [zebra.id, apple.id] {
        notify_me::create_subscription(
            &pool,
            &subscriber,
            innovation_id,
            &SubscriptionConfig::DocumentUploaded {
                subscription_type: SUBSCRIPTION_INSTANTLY.to_string(),
            },
        )
        .await
        .unwrap();
    }

    let listed = notify_me::list_subscriptions(&pool, &subscriber, false)
        .await
        .unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0]["innovation"]["name"], "Apple Project");
    assert_eq!(listed[1]["innovation"]["name"], "Zebra Project");
    assert_eq!(listed[0]["count"], 1);
    assert!(listed[0].get("subscriptions").is_none());

    let detailed = notify_me::list_subscriptions(&pool, &subscriber, true)
        .await
        .unwrap();
    assert_eq!(
        detailed[0]["subscriptions"].as_array().unwrap().len(),
        1
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_accessor_list_scoped_to_shared_innovations(pool: PgPool) {
    let innovator = common::create_innovator(&pool, "Innovator K").await;
    let shared = common::create_innovation(&pool, &innovator, "Shared One").await;
    let unshared = common::create_innovation(&pool, &innovator, "Unshared One").await;
    let (org, units) =
        common::create_organisation_with_units(&pool, "Health Org", "HO", &["North"]).await;
    let subscriber = common::create_accessor(&pool, "Accessor K", org.id, units[0].id).await;

    InnovationRepo::add_share(&pool, shared.id, org.id).await.unwrap();
    InnovationRepo::add_share(&pool, unshared.id, org.id).await.unwrap();

    for innovation_id in [shared.id, unshared.id] {
        notify_me::create_subscription(
            &pool,
            &subscriber,
            innovation_id,
            &SubscriptionConfig::ProgressUpdateCreated {
                subscription_type: SUBSCRIPTION_INSTANTLY.to_string(),
                pre_conditions: ProgressUpdatePreConditions {
                    units: vec![units[0].id],
                },
            },
        )
        .await
        .unwrap();
    }

    // Unshare one innovation; it disappears from the accessor's list.
    sqlx::query("DELETE FROM innovation_shares WHERE innovation_id = $1")
        .bind(unshared.id)
        .execute(&pool)
        .await
        .unwrap();

    let listed = notify_me::list_subscriptions(&pool, &subscriber, false)
        .await
        .unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0]["innovation"]["id"], shared.id);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_reminder_rendering_projects_config_keys(pool: PgPool) {
    let innovator = common::create_innovator(&pool, "Innovator L").await;
    let innovation = common::create_innovation(&pool, &innovator, "Reminder Render").await;
    let subscriber = common::create_assessor(&pool, "Assessor L").await;

    let subscription =
        notify_me::create_subscription(&pool, &subscriber, innovation.id, &reminder_config(7))
            .await
            .unwrap();

    let rendered = notify_me::get_subscription(&pool, &subscriber, subscription.id)
        .await
        .unwrap();
    assert_eq!(rendered["event_type"], "REMINDER");
    assert_eq!(rendered["subscription_type"], "SCHEDULED");
    assert_eq!(rendered["custom_message"], "check on progress");
    assert!(rendered.get("date").is_some());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_unknown_stored_event_type_is_not_implemented(pool: PgPool) {
    let innovator = common::create_innovator(&pool, "Innovator M").await;
    let innovation = common::create_innovation(&pool, &innovator, "Legacy Row").await;
    let subscriber = common::create_assessor(&pool, "Assessor M").await;

    // A legacy row whose stored event type has no registered builder.
    let id: i64 = sqlx::query_scalar(
        "INSERT INTO notify_me_subscriptions (user_role_id, innovation_id, event_type, config) \
         VALUES ($1, $2, 'SUPPORT_ARCHIVED', $3) \
         RETURNING id",
    )
    .bind(subscriber.role_id)
    .bind(innovation.id)
    .bind(serde_json::json!({
        "event_type": "DOCUMENT_UPLOADED",
        "subscription_type": "INSTANTLY",
    }))
    .fetch_one(&pool)
    .await
    .unwrap();

    let result = notify_me::get_subscription(&pool, &subscriber, id).await;
    assert_matches!(result, Err(AppError::Core(CoreError::NotImplemented(_))));
}
