//! Well-known domain event name constants.
//!
//! Events published on the bus use these names; the notify-me matching
//! router and the durable event persistence both key on them.

/// A needs assessment (or reassessment) was submitted.
pub const EVENT_NEEDS_ASSESSMENT_COMPLETED: &str = "NEEDS_ASSESSMENT_COMPLETED";

/// An innovation support changed status.
pub const EVENT_SUPPORT_UPDATED: &str = "SUPPORT_UPDATED";

/// A support unit posted a progress update.
pub const EVENT_PROGRESS_UPDATE_CREATED: &str = "PROGRESS_UPDATE_CREATED";

/// An innovation record section was edited.
pub const EVENT_INNOVATION_RECORD_UPDATED: &str = "INNOVATION_RECORD_UPDATED";

/// A document was uploaded to an innovation.
pub const EVENT_DOCUMENT_UPLOADED: &str = "DOCUMENT_UPLOADED";

/// A scheduled reminder subscription fired.
pub const EVENT_REMINDER: &str = "REMINDER";
