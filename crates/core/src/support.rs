//! Well-known innovation support status constants.
//!
//! These must match the `innovation_supports.status` column values.

use crate::error::CoreError;

/// Suggested to the unit by a needs assessor; not yet picked up.
pub const SUPPORT_SUGGESTED: &str = "SUGGESTED";

/// The unit is actively supporting the innovation.
pub const SUPPORT_ENGAGING: &str = "ENGAGING";

/// Waiting on an internal decision or on the innovator.
pub const SUPPORT_WAITING: &str = "WAITING";

/// No accessor assigned yet.
pub const SUPPORT_UNASSIGNED: &str = "UNASSIGNED";

/// The unit decided the innovation is not a fit.
pub const SUPPORT_UNSUITABLE: &str = "UNSUITABLE";

/// Support was provided and has ended.
pub const SUPPORT_CLOSED: &str = "CLOSED";

/// All valid support status values.
pub const VALID_SUPPORT_STATUSES: &[&str] = &[
    SUPPORT_SUGGESTED,
    SUPPORT_ENGAGING,
    SUPPORT_WAITING,
    SUPPORT_UNASSIGNED,
    SUPPORT_UNSUITABLE,
    SUPPORT_CLOSED,
];

/// Validate that a support status string is one of the accepted values.
pub fn validate_support_status(status: &str) -> Result<(), CoreError> {
    if VALID_SUPPORT_STATUSES.contains(&status) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Invalid support status '{status}'. Must be one of: {}",
            VALID_SUPPORT_STATUSES.join(", ")
        )))
    }
}

/// Whether a support in `status` blocks an innovator-requested reassessment
/// and is reset to SUGGESTED when a reassessment is created.
pub fn is_engaging(status: &str) -> bool {
    status == SUPPORT_ENGAGING
}
