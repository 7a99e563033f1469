//! Needs-assessment rule functions and field vocabularies.
//!
//! Versioning, submission guards, KPI-exemption reasons, and the
//! suggestion-set rules live here as pure functions shared by the API
//! engine and its tests.

use crate::error::CoreError;
use crate::types::DbId;

/* --------------------------------------------------------------------------
Field vocabularies
-------------------------------------------------------------------------- */

/// Innovation maturity as judged by the assessor.
pub const MATURITY_DISCOVERY: &str = "DISCOVERY";
pub const MATURITY_ADVANCED: &str = "ADVANCED";
pub const MATURITY_READY: &str = "READY";

/// All valid maturity level values.
pub const VALID_MATURITY_LEVELS: &[&str] =
    &[MATURITY_DISCOVERY, MATURITY_ADVANCED, MATURITY_READY];

/// Tri-state answer for the `has_*` evaluation fields.
pub const ANSWER_YES: &str = "YES";
pub const ANSWER_NO: &str = "NO";
pub const ANSWER_PARTIALLY: &str = "PARTIALLY";

/// All valid tri-state answers.
pub const VALID_ANSWERS: &[&str] = &[ANSWER_YES, ANSWER_NO, ANSWER_PARTIALLY];

/// KPI-exemption reason codes.
pub const EXEMPTION_NO_RESPONSE: &str = "NO_RESPONSE";
pub const EXEMPTION_TECHNICAL_ISSUES: &str = "TECHNICAL_ISSUES";
pub const EXEMPTION_INCORRECT_DETAILS: &str = "INCORRECT_DETAILS";
pub const EXEMPTION_SERVICE_UNAVAILABLE: &str = "SERVICE_UNAVAILABLE";
pub const EXEMPTION_OTHER: &str = "OTHER";

/// All valid exemption reason codes.
pub const VALID_EXEMPTION_REASONS: &[&str] = &[
    EXEMPTION_NO_RESPONSE,
    EXEMPTION_TECHNICAL_ISSUES,
    EXEMPTION_INCORRECT_DETAILS,
    EXEMPTION_SERVICE_UNAVAILABLE,
    EXEMPTION_OTHER,
];

/* --------------------------------------------------------------------------
Validation functions
-------------------------------------------------------------------------- */

/// Validate a maturity level value.
pub fn validate_maturity_level(level: &str) -> Result<(), CoreError> {
    if VALID_MATURITY_LEVELS.contains(&level) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Invalid maturity level '{level}'. Must be one of: {}",
            VALID_MATURITY_LEVELS.join(", ")
        )))
    }
}

/// Validate a tri-state evaluation answer.
pub fn validate_answer(answer: &str) -> Result<(), CoreError> {
    if VALID_ANSWERS.contains(&answer) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Invalid answer '{answer}'. Must be one of: {}",
            VALID_ANSWERS.join(", ")
        )))
    }
}

/// Validate an exemption reason code.
pub fn validate_exemption_reason(reason: &str) -> Result<(), CoreError> {
    if VALID_EXEMPTION_REASONS.contains(&reason) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Invalid exemption reason '{reason}'. Must be one of: {}",
            VALID_EXEMPTION_REASONS.join(", ")
        )))
    }
}

/* --------------------------------------------------------------------------
Versioning and submission rules
-------------------------------------------------------------------------- */

/// Version of the first assessment created for an innovation.
pub const FIRST_MAJOR_VERSION: i32 = 1;
pub const FIRST_MINOR_VERSION: i32 = 0;

/// Version pair for a reassessment of an assessment at `major`.
///
/// A reassessment bumps the major version and resets the minor version.
pub fn reassessment_version(major: i32) -> (i32, i32) {
    (major + 1, FIRST_MINOR_VERSION)
}

/// Version pair for an in-place edit of an assessment at `(major, minor)`.
pub fn edit_version(major: i32, minor: i32) -> (i32, i32) {
    (major, minor + 1)
}

/// Guard content updates against already-submitted assessments.
///
/// A finished assessment can only grow through an edit or a reassessment;
/// direct content updates are rejected.
pub fn ensure_not_submitted(finished_at: Option<crate::types::Timestamp>) -> Result<(), CoreError> {
    if finished_at.is_some() {
        Err(CoreError::Unprocessable(
            "Assessment already submitted".to_string(),
        ))
    } else {
        Ok(())
    }
}

/// Unit ids present in `previous` but missing from `next`.
///
/// At submission time the suggestion set may only grow; any id returned here
/// makes the submission a conflict.
pub fn removed_unit_suggestions(previous: &[DbId], next: &[DbId]) -> Vec<DbId> {
    previous
        .iter()
        .filter(|id| !next.contains(id))
        .copied()
        .collect()
}

/// Unit ids present in `next` but not in `previous` (newly suggested).
pub fn added_unit_suggestions(previous: &[DbId], next: &[DbId]) -> Vec<DbId> {
    next.iter()
        .filter(|id| !previous.contains(id))
        .copied()
        .collect()
}

/* --------------------------------------------------------------------------
Tests
-------------------------------------------------------------------------- */
