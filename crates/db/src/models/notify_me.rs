//! Notify-me subscription entity models and the event-typed config payload.
//!
//! The `config` column stores a JSON object tagged by `event_type`; the
//! [`SubscriptionConfig`] enum is the typed view of that payload. The stored
//! `event_type` column always mirrors the tag so matching queries never need
//! to open the JSON.

use chrono::Utc;
use innopath_core::error::CoreError;
use innopath_core::notify_me::{
    validate_scheduled_date, validate_subscription_type, SUBSCRIPTION_SCHEDULED,
};
use innopath_core::support::validate_support_status;
use innopath_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `notify_me_subscriptions` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct NotifyMeSubscription {
    pub id: DbId,
    pub user_role_id: DbId,
    pub innovation_id: DbId,
    pub event_type: String,
    pub config: serde_json::Value,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub deleted_at: Option<Timestamp>,
}

impl NotifyMeSubscription {
    /// Parse the stored config payload into its typed form.
    ///
    /// A stored payload that no longer deserializes is a data defect, mapped
    /// to an internal error rather than a caller error.
    pub fn parsed_config(&self) -> Result<SubscriptionConfig, CoreError> {
        serde_json::from_value(self.config.clone()).map_err(|e| {
            CoreError::Internal(format!(
                "Stored subscription config for id {} is invalid: {e}",
                self.id
            ))
        })
    }
}

/// A row from the `notification_schedules` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct NotificationSchedule {
    pub subscription_id: DbId,
    pub send_at: Timestamp,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Preconditions for SUPPORT_UPDATED subscriptions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupportUpdatedPreConditions {
    pub units: Vec<DbId>,
    pub status: Vec<String>,
}

/// Preconditions for PROGRESS_UPDATE_CREATED subscriptions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressUpdatePreConditions {
    pub units: Vec<DbId>,
}

/// Preconditions for INNOVATION_RECORD_UPDATED subscriptions.
///
/// An empty section list means "any section".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct InnovationRecordPreConditions {
    pub sections: Vec<String>,
}

/// Event-typed subscription config payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event_type")]
pub enum SubscriptionConfig {
    #[serde(rename = "SUPPORT_UPDATED")]
    SupportUpdated {
        subscription_type: String,
        pre_conditions: SupportUpdatedPreConditions,
    },
    #[serde(rename = "PROGRESS_UPDATE_CREATED")]
    ProgressUpdateCreated {
        subscription_type: String,
        pre_conditions: ProgressUpdatePreConditions,
    },
    #[serde(rename = "INNOVATION_RECORD_UPDATED")]
    InnovationRecordUpdated {
        subscription_type: String,
        #[serde(default)]
        pre_conditions: InnovationRecordPreConditions,
    },
    #[serde(rename = "DOCUMENT_UPLOADED")]
    DocumentUploaded { subscription_type: String },
    #[serde(rename = "REMINDER")]
    Reminder {
        subscription_type: String,
        date: Timestamp,
        custom_message: Option<String>,
    },
}

impl SubscriptionConfig {
    /// The event type tag of this config.
    pub fn event_type(&self) -> &'static str {
        match self {
            SubscriptionConfig::SupportUpdated { .. } => {
                innopath_core::events::EVENT_SUPPORT_UPDATED
            }
            SubscriptionConfig::ProgressUpdateCreated { .. } => {
                innopath_core::events::EVENT_PROGRESS_UPDATE_CREATED
            }
            SubscriptionConfig::InnovationRecordUpdated { .. } => {
                innopath_core::events::EVENT_INNOVATION_RECORD_UPDATED
            }
            SubscriptionConfig::DocumentUploaded { .. } => {
                innopath_core::events::EVENT_DOCUMENT_UPLOADED
            }
            SubscriptionConfig::Reminder { .. } => innopath_core::events::EVENT_REMINDER,
        }
    }

    /// The subscription type carried by this config.
    pub fn subscription_type(&self) -> &str {
        match self {
            SubscriptionConfig::SupportUpdated {
                subscription_type, ..
            }
            | SubscriptionConfig::ProgressUpdateCreated {
                subscription_type, ..
            }
            | SubscriptionConfig::InnovationRecordUpdated {
                subscription_type, ..
            }
            | SubscriptionConfig::DocumentUploaded { subscription_type }
            | SubscriptionConfig::Reminder {
                subscription_type, ..
            } => subscription_type,
        }
    }

    /// The scheduled send date, when this config carries one.
    pub fn scheduled_date(&self) -> Option<Timestamp> {
        match self {
            SubscriptionConfig::Reminder { date, .. } => Some(*date),
            _ => None,
        }
    }

    /// Whether this subscription's preconditions accept an event payload.
    ///
    /// Reminder subscriptions never match bus events; they are fired by the
    /// schedule dispatcher instead.
    pub fn matches_event(&self, payload: &serde_json::Value) -> bool {
        match self {
            SubscriptionConfig::SupportUpdated { pre_conditions, .. } => {
                let unit_ok = payload
                    .get("organisation_unit_id")
                    .and_then(|v| v.as_i64())
                    .is_some_and(|unit| pre_conditions.units.contains(&unit));
                let status_ok = pre_conditions.status.is_empty()
                    || payload
                        .get("status")
                        .and_then(|v| v.as_str())
                        .is_some_and(|status| {
                            pre_conditions.status.iter().any(|s| s == status)
                        });
                unit_ok && status_ok
            }
            SubscriptionConfig::ProgressUpdateCreated { pre_conditions, .. } => payload
                .get("organisation_unit_id")
                .and_then(|v| v.as_i64())
                .is_some_and(|unit| pre_conditions.units.contains(&unit)),
            SubscriptionConfig::InnovationRecordUpdated { pre_conditions, .. } => {
                pre_conditions.sections.is_empty()
                    || payload
                        .get("section")
                        .and_then(|v| v.as_str())
                        .is_some_and(|section| {
                            pre_conditions.sections.iter().any(|s| s == section)
                        })
            }
            SubscriptionConfig::DocumentUploaded { .. } => true,
            SubscriptionConfig::Reminder { .. } => false,
        }
    }

    /// Validate the config payload against the domain rules.
    ///
    /// Checks the subscription type, precondition contents, and the
    /// scheduled-date rules (SCHEDULED requires a date, the date must not be
    /// in the past, only SCHEDULED configs may carry a date).
    pub fn validate(&self) -> Result<(), CoreError> {
        validate_subscription_type(self.subscription_type())?;

        match self {
            SubscriptionConfig::SupportUpdated { pre_conditions, .. } => {
                if pre_conditions.units.is_empty() {
                    return Err(CoreError::Validation(
                        "At least one organisation unit precondition is required".to_string(),
                    ));
                }
                for status in &pre_conditions.status {
                    validate_support_status(status)?;
                }
            }
            SubscriptionConfig::ProgressUpdateCreated { pre_conditions, .. } => {
                if pre_conditions.units.is_empty() {
                    return Err(CoreError::Validation(
                        "At least one organisation unit precondition is required".to_string(),
                    ));
                }
            }
            SubscriptionConfig::InnovationRecordUpdated { .. }
            | SubscriptionConfig::DocumentUploaded { .. } => {}
            SubscriptionConfig::Reminder {
                subscription_type,
                date,
                ..
            } => {
                if subscription_type != SUBSCRIPTION_SCHEDULED {
                    return Err(CoreError::Validation(
                        "Reminder subscriptions must be SCHEDULED".to_string(),
                    ));
                }
                validate_scheduled_date(*date, Utc::now())?;
            }
        }

        if self.subscription_type() == SUBSCRIPTION_SCHEDULED && self.scheduled_date().is_none() {
            return Err(CoreError::Validation(
                "Scheduled subscriptions require a date".to_string(),
            ));
        }

        Ok(())
    }
}
