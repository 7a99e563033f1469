//! Notify-me subscription vocabularies and rule functions.
//!
//! A subscription pairs an event type with a config payload; the config
//! shapes are defined next to the rows in the `db` crate, while the pure
//! vocabulary and date rules live here.

use crate::error::CoreError;
use crate::events;
use crate::types::Timestamp;

/// Event types a user role can subscribe to.
pub const SUBSCRIBABLE_EVENT_TYPES: &[&str] = &[
    events::EVENT_SUPPORT_UPDATED,
    events::EVENT_PROGRESS_UPDATE_CREATED,
    events::EVENT_INNOVATION_RECORD_UPDATED,
    events::EVENT_DOCUMENT_UPLOADED,
    events::EVENT_REMINDER,
];

/// Deliver as soon as the event fires.
pub const SUBSCRIPTION_INSTANTLY: &str = "INSTANTLY";

/// Deliver on a fixed future date (owns a notification schedule row).
pub const SUBSCRIPTION_SCHEDULED: &str = "SCHEDULED";

/// Deliver on the first matching event, then retire the subscription.
pub const SUBSCRIPTION_ONCE: &str = "ONCE";

/// All valid subscription type values.
pub const VALID_SUBSCRIPTION_TYPES: &[&str] = &[
    SUBSCRIPTION_INSTANTLY,
    SUBSCRIPTION_SCHEDULED,
    SUBSCRIPTION_ONCE,
];

/// Validate that an event type is subscribable.
pub fn validate_event_type(event_type: &str) -> Result<(), CoreError> {
    if SUBSCRIBABLE_EVENT_TYPES.contains(&event_type) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Invalid event type '{event_type}'. Must be one of: {}",
            SUBSCRIBABLE_EVENT_TYPES.join(", ")
        )))
    }
}

/// Validate a subscription type value.
pub fn validate_subscription_type(subscription_type: &str) -> Result<(), CoreError> {
    if VALID_SUBSCRIPTION_TYPES.contains(&subscription_type) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Invalid subscription type '{subscription_type}'. Must be one of: {}",
            VALID_SUBSCRIPTION_TYPES.join(", ")
        )))
    }
}

/// Reject scheduled send dates that are already in the past.
pub fn validate_scheduled_date(date: Timestamp, now: Timestamp) -> Result<(), CoreError> {
    if date < now {
        Err(CoreError::Validation(
            "Scheduled date must not be in the past".to_string(),
        ))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_subscribable_event_types_accepted() {
        for event_type in SUBSCRIBABLE_EVENT_TYPES {
            assert!(validate_event_type(event_type).is_ok());
        }
    }

    #[test]
    fn test_unknown_event_type_rejected() {
        assert!(validate_event_type("INNOVATION_ARCHIVED").is_err());
        assert!(validate_event_type("").is_err());
    }

    #[test]
    fn test_needs_assessment_completed_not_subscribable() {
        assert!(validate_event_type(events::EVENT_NEEDS_ASSESSMENT_COMPLETED).is_err());
    }

    #[test]
    fn test_valid_subscription_types_accepted() {
        for subscription_type in VALID_SUBSCRIPTION_TYPES {
            assert!(validate_subscription_type(subscription_type).is_ok());
        }
    }

    #[test]
    fn test_invalid_subscription_type_rejected() {
        assert!(validate_subscription_type("WEEKLY").is_err());
    }

    #[test]
    fn test_past_scheduled_date_rejected() {
        let now = chrono::Utc::now();
        let result = validate_scheduled_date(now - Duration::hours(1), now);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("in the past"));
    }

    #[test]
    fn test_future_scheduled_date_accepted() {
        let now = chrono::Utc::now();
        assert!(validate_scheduled_date(now + Duration::hours(1), now).is_ok());
    }

    #[test]
    fn test_exact_now_accepted() {
        let now = chrono::Utc::now();
        assert!(validate_scheduled_date(now, now).is_ok());
    }
}
