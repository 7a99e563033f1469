//! Notify-me subscription engine.
//!
//! Subscription writes keep the notification schedule row in lockstep with
//! the config, and reads render each subscription through a per-event-type
//! response builder. Unit ids referenced in preconditions are resolved in
//! bulk and grouped into the shared organisation→units tree.

use std::collections::HashMap;

use innopath_core::error::CoreError;
use innopath_core::events::{
    EVENT_DOCUMENT_UPLOADED, EVENT_INNOVATION_RECORD_UPDATED, EVENT_PROGRESS_UPDATE_CREATED,
    EVENT_REMINDER, EVENT_SUPPORT_UPDATED,
};
use innopath_core::notify_me::SUBSCRIPTION_SCHEDULED;
use innopath_core::organisations::{
    group_units_by_organisation, OrganisationGroup, OrganisationUnitRow,
};
use innopath_core::roles::is_accessor_role;
use innopath_core::types::DbId;
use innopath_db::models::notify_me::{NotifyMeSubscription, SubscriptionConfig};
use innopath_db::repositories::{InnovationRepo, NotifyMeRepo, OrganisationRepo};
use innopath_db::DbPool;
use serde_json::{json, Value};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;

// ---------------------------------------------------------------------------
// Writes
// ---------------------------------------------------------------------------

/// Create a subscription for the calling user role.
///
/// A SCHEDULED config also creates the linked notification schedule row in
/// the same transaction.
pub async fn create_subscription(
    pool: &DbPool,
    user: &AuthUser,
    innovation_id: DbId,
    config: &SubscriptionConfig,
) -> AppResult<NotifyMeSubscription> {
    ensure_innovation_visible(pool, user, innovation_id).await?;
    config.validate()?;

    let payload = serde_json::to_value(config)
        .map_err(|e| AppError::InternalError(format!("Failed to serialize config: {e}")))?;

    let mut tx = pool.begin().await?;

    let subscription = NotifyMeRepo::create(
        &mut tx,
        user.role_id,
        innovation_id,
        config.event_type(),
        &payload,
    )
    .await?;

    if config.subscription_type() == SUBSCRIPTION_SCHEDULED {
        if let Some(date) = config.scheduled_date() {
            NotifyMeRepo::upsert_schedule(&mut tx, subscription.id, date).await?;
        }
    }

    tx.commit().await?;

    tracing::info!(
        subscription_id = subscription.id,
        innovation_id,
        event_type = config.event_type(),
        user_role_id = user.role_id,
        "Subscription created"
    );

    Ok(subscription)
}

/// Update a subscription's config.
///
/// The subscription must belong to the calling user role, and the event type
/// is immutable: a config tagged with a different event type is rejected.
pub async fn update_subscription(
    pool: &DbPool,
    user: &AuthUser,
    subscription_id: DbId,
    config: &SubscriptionConfig,
) -> AppResult<NotifyMeSubscription> {
    let existing = NotifyMeRepo::find_scoped(pool, subscription_id, user.role_id)
        .await?
        .ok_or_else(|| {
            CoreError::Forbidden("Subscription does not belong to the caller".to_string())
        })?;

    if existing.event_type != config.event_type() {
        return Err(AppError::BadRequest(
            "Subscription event type cannot be changed".to_string(),
        ));
    }

    config.validate()?;

    let payload = serde_json::to_value(config)
        .map_err(|e| AppError::InternalError(format!("Failed to serialize config: {e}")))?;

    let mut tx = pool.begin().await?;

    let updated = NotifyMeRepo::update_config(&mut tx, subscription_id, &payload).await?;

    match config.scheduled_date() {
        Some(date) if config.subscription_type() == SUBSCRIPTION_SCHEDULED => {
            NotifyMeRepo::upsert_schedule(&mut tx, subscription_id, date).await?;
        }
        _ => {
            NotifyMeRepo::delete_schedule(&mut tx, subscription_id).await?;
        }
    }

    tx.commit().await?;

    tracing::info!(
        subscription_id,
        user_role_id = user.role_id,
        "Subscription updated"
    );

    Ok(updated)
}

/// Soft-delete subscriptions of the calling user role.
///
/// With `ids = None` every subscription of the role is deleted. Unknown or
/// foreign ids are silently skipped, so repeated deletes are no-ops.
/// Returns the number of subscriptions deleted.
pub async fn delete_subscriptions(
    pool: &DbPool,
    user: &AuthUser,
    ids: Option<&[DbId]>,
) -> AppResult<u64> {
    let mut tx = pool.begin().await?;
    let deleted = NotifyMeRepo::soft_delete_scoped(&mut tx, user.role_id, ids).await?;
    tx.commit().await?;

    tracing::info!(
        user_role_id = user.role_id,
        deleted = deleted.len(),
        "Subscriptions deleted"
    );

    Ok(deleted.len() as u64)
}

// ---------------------------------------------------------------------------
// Reads
// ---------------------------------------------------------------------------

/// Load one subscription of the calling user role, rendered for its event
/// type.
pub async fn get_subscription(
    pool: &DbPool,
    user: &AuthUser,
    subscription_id: DbId,
) -> AppResult<Value> {
    let subscription = NotifyMeRepo::find_scoped(pool, subscription_id, user.role_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Subscription",
            id: subscription_id,
        })?;

    let rendered = render_subscriptions(pool, &[subscription]).await?;
    rendered
        .into_iter()
        .next()
        .ok_or_else(|| AppError::InternalError("Rendered subscription missing".to_string()))
}

/// All subscriptions the calling role holds on one innovation, grouped by
/// event type and rendered per type.
pub async fn list_innovation_subscriptions(
    pool: &DbPool,
    user: &AuthUser,
    innovation_id: DbId,
) -> AppResult<Vec<Value>> {
    ensure_innovation_visible(pool, user, innovation_id).await?;
    let subscriptions = NotifyMeRepo::list_for_innovation(pool, user.role_id, innovation_id).await?;
    render_subscriptions(pool, &subscriptions).await
}

/// The calling role's subscriptions across innovations, one entry per
/// innovation sorted by innovation name.
///
/// Accessor roles only see innovations shared with their organisation.
/// With `with_details` each entry also carries the rendered subscriptions.
pub async fn list_subscriptions(
    pool: &DbPool,
    user: &AuthUser,
    with_details: bool,
) -> AppResult<Vec<Value>> {
    let subscriptions = NotifyMeRepo::list_for_role(pool, user.role_id).await?;

    let mut by_innovation: HashMap<DbId, Vec<NotifyMeSubscription>> = HashMap::new();
    for subscription in subscriptions {
        by_innovation
            .entry(subscription.innovation_id)
            .or_default()
            .push(subscription);
    }

    let mut innovation_ids: Vec<DbId> = by_innovation.keys().copied().collect();

    if let Some(organisation_id) = user.organisation_id {
        if is_accessor_role(&user.role) {
            innovation_ids =
                InnovationRepo::filter_shared_with(pool, &innovation_ids, organisation_id).await?;
        }
    }

    // Sorted by name via the repository's ORDER BY.
    let innovations = InnovationRepo::list_by_ids(pool, &innovation_ids).await?;

    let mut results = Vec::with_capacity(innovations.len());
    for innovation in innovations {
        let group = by_innovation.remove(&innovation.id).unwrap_or_default();

        let mut entry = json!({
            "innovation": { "id": innovation.id, "name": innovation.name },
            "count": group.len(),
        });

        if with_details {
            entry["subscriptions"] = Value::Array(render_subscriptions(pool, &group).await?);
        }

        results.push(entry);
    }

    Ok(results)
}

// ---------------------------------------------------------------------------
// Response builders
// ---------------------------------------------------------------------------

/// Render subscriptions grouped by event type.
///
/// Unit ids named in SUPPORT_UPDATED and PROGRESS_UPDATE_CREATED
/// preconditions are resolved with one bulk query across all subscriptions,
/// then grouped per subscription into the organisation→units tree.
async fn render_subscriptions(
    pool: &DbPool,
    subscriptions: &[NotifyMeSubscription],
) -> AppResult<Vec<Value>> {
    // Bulk-resolve every precondition unit referenced by any subscription.
    let mut unit_ids: Vec<DbId> = Vec::new();
    let mut configs: Vec<SubscriptionConfig> = Vec::with_capacity(subscriptions.len());

    for subscription in subscriptions {
        let config = subscription.parsed_config()?;
        match &config {
            SubscriptionConfig::SupportUpdated { pre_conditions, .. } => {
                unit_ids.extend(&pre_conditions.units);
            }
            SubscriptionConfig::ProgressUpdateCreated { pre_conditions, .. } => {
                unit_ids.extend(&pre_conditions.units);
            }
            _ => {}
        }
        configs.push(config);
    }

    unit_ids.sort_unstable();
    unit_ids.dedup();

    let unit_rows: HashMap<DbId, OrganisationUnitRow> =
        OrganisationRepo::unit_rows_by_ids(pool, &unit_ids)
            .await?
            .into_iter()
            .map(|row| {
                let row: OrganisationUnitRow = row.into();
                (row.unit_id, row)
            })
            .collect();

    // Group by event type, preserving first-seen group order.
    let mut grouped: Vec<(&str, Vec<usize>)> = Vec::new();
    for (index, subscription) in subscriptions.iter().enumerate() {
        match grouped
            .iter_mut()
            .find(|(event_type, _)| *event_type == subscription.event_type)
        {
            Some((_, members)) => members.push(index),
            None => grouped.push((&subscription.event_type, vec![index])),
        }
    }

    let mut rendered = Vec::with_capacity(subscriptions.len());
    for (event_type, members) in grouped {
        for index in members {
            rendered.push(build_response(
                event_type,
                &subscriptions[index],
                &configs[index],
                &unit_rows,
            )?);
        }
    }

    Ok(rendered)
}

/// Dispatch to the per-event-type response builder.
fn build_response(
    event_type: &str,
    subscription: &NotifyMeSubscription,
    config: &SubscriptionConfig,
    unit_rows: &HashMap<DbId, OrganisationUnitRow>,
) -> AppResult<Value> {
    match event_type {
        EVENT_SUPPORT_UPDATED => {
            let SubscriptionConfig::SupportUpdated { pre_conditions, .. } = config else {
                return Err(config_mismatch(subscription));
            };
            let mut response = build_generic(subscription, config, &[])?;
            response["organisations"] =
                serde_json::to_value(grouped_units(&pre_conditions.units, unit_rows))
                    .map_err(render_failure)?;
            response["status"] = json!(pre_conditions.status);
            Ok(response)
        }
        EVENT_PROGRESS_UPDATE_CREATED => {
            let SubscriptionConfig::ProgressUpdateCreated { pre_conditions, .. } = config else {
                return Err(config_mismatch(subscription));
            };
            let mut response = build_generic(subscription, config, &[])?;
            response["organisations"] =
                serde_json::to_value(grouped_units(&pre_conditions.units, unit_rows))
                    .map_err(render_failure)?;
            Ok(response)
        }
        EVENT_INNOVATION_RECORD_UPDATED => {
            build_generic(subscription, config, &["pre_conditions"])
        }
        EVENT_DOCUMENT_UPLOADED => build_generic(subscription, config, &[]),
        EVENT_REMINDER => build_generic(subscription, config, &["date", "custom_message"]),
        other => Err(CoreError::NotImplemented(format!(
            "No response builder for event type '{other}'"
        ))
        .into()),
    }
}

/// Generic builder: the common envelope plus a projection of config keys.
fn build_generic(
    subscription: &NotifyMeSubscription,
    config: &SubscriptionConfig,
    keys: &[&str],
) -> AppResult<Value> {
    let raw = serde_json::to_value(config).map_err(render_failure)?;

    let mut response = json!({
        "id": subscription.id,
        "event_type": config.event_type(),
        "subscription_type": config.subscription_type(),
        "updated_at": subscription.updated_at,
    });

    for key in keys {
        if let Some(value) = raw.get(key) {
            response[*key] = value.clone();
        }
    }

    Ok(response)
}

/// Group a subscription's precondition units via the shared helper.
fn grouped_units(
    unit_ids: &[DbId],
    unit_rows: &HashMap<DbId, OrganisationUnitRow>,
) -> Vec<OrganisationGroup> {
    let rows: Vec<OrganisationUnitRow> = unit_ids
        .iter()
        .filter_map(|id| unit_rows.get(id).cloned())
        .collect();
    group_units_by_organisation(&rows)
}

fn config_mismatch(subscription: &NotifyMeSubscription) -> AppError {
    AppError::Core(CoreError::Internal(format!(
        "Subscription {} config does not match its stored event type",
        subscription.id
    )))
}

fn render_failure(e: serde_json::Error) -> AppError {
    AppError::InternalError(format!("Failed to render subscription: {e}"))
}

// ---------------------------------------------------------------------------
// Scoping helpers
// ---------------------------------------------------------------------------

/// Ensure the innovation exists and, for accessor roles, that it is shared
/// with the caller's organisation.
async fn ensure_innovation_visible(
    pool: &DbPool,
    user: &AuthUser,
    innovation_id: DbId,
) -> AppResult<()> {
    InnovationRepo::find_by_id(pool, innovation_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Innovation",
            id: innovation_id,
        })?;

    if let Some(organisation_id) = user.organisation_id {
        if is_accessor_role(&user.role)
            && !InnovationRepo::is_shared_with(pool, innovation_id, organisation_id).await?
        {
            return Err(CoreError::Forbidden(
                "Innovation is not shared with the caller's organisation".to_string(),
            )
            .into());
        }
    }

    Ok(())
}
