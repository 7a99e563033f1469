//! Innovation lifecycle status constants and transition predicates.
//!
//! The status vocabulary must match the `innovations.status` column values
//! seeded by the migrations. Transition rules here are pure functions so the
//! API layer and tests can evaluate them without a database.

use crate::error::CoreError;

/// Record created but not yet shared for assessment.
pub const STATUS_CREATED: &str = "CREATED";

/// Submitted and waiting for a needs assessor to pick it up.
pub const STATUS_WAITING_NEEDS_ASSESSMENT: &str = "WAITING_NEEDS_ASSESSMENT";

/// A needs assessment (or reassessment) is in progress.
pub const STATUS_NEEDS_ASSESSMENT: &str = "NEEDS_ASSESSMENT";

/// Assessment submitted; support organisations may engage.
pub const STATUS_IN_PROGRESS: &str = "IN_PROGRESS";

/// Archived by its owner; read-only for support organisations.
pub const STATUS_ARCHIVED: &str = "ARCHIVED";

/// All valid innovation status values.
pub const VALID_STATUSES: &[&str] = &[
    STATUS_CREATED,
    STATUS_WAITING_NEEDS_ASSESSMENT,
    STATUS_NEEDS_ASSESSMENT,
    STATUS_IN_PROGRESS,
    STATUS_ARCHIVED,
];

/// Validate that a status string is one of the accepted values.
pub fn validate_status(status: &str) -> Result<(), CoreError> {
    if VALID_STATUSES.contains(&status) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Invalid innovation status '{status}'. Must be one of: {}",
            VALID_STATUSES.join(", ")
        )))
    }
}

/// Whether a needs assessment can be started for an innovation in `status`.
///
/// Only innovations waiting for assessment (or freshly created ones picked up
/// directly by an assessor) are eligible.
pub fn can_start_assessment(status: &str) -> bool {
    status == STATUS_WAITING_NEEDS_ASSESSMENT || status == STATUS_CREATED
}

/// Whether an innovation in `status` is eligible for a reassessment request.
///
/// Applies to both innovator- and assessor-initiated requests; the caller
/// additionally checks engaging supports and ownership for the innovator path.
pub fn reassessment_status_eligible(status: &str) -> bool {
    status == STATUS_IN_PROGRESS || status == STATUS_ARCHIVED
}
