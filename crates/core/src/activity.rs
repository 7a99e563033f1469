//! Activity log type constants.
//!
//! Every innovation-scoped action the engines record uses one of these
//! names; the `activity_log.activity_type` column stores them verbatim.

pub mod activity_types {
    pub const NEEDS_ASSESSMENT_START: &str = "NEEDS_ASSESSMENT_START";
    pub const NEEDS_ASSESSMENT_COMPLETED: &str = "NEEDS_ASSESSMENT_COMPLETED";
    pub const NEEDS_ASSESSMENT_EDITED: &str = "NEEDS_ASSESSMENT_EDITED";
    pub const NEEDS_REASSESSMENT_REQUESTED: &str = "NEEDS_REASSESSMENT_REQUESTED";
    pub const ORGANISATION_SUGGESTION: &str = "ORGANISATION_SUGGESTION";
    pub const SUPPORT_STATUS_UPDATE: &str = "SUPPORT_STATUS_UPDATE";
}
