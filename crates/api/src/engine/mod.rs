//! Business-rule engines.
//!
//! The HTTP handlers stay thin; the multi-step transactional flows for the
//! assessment lifecycle and notify-me subscriptions live here.

pub mod assessments;
pub mod notify_me;
