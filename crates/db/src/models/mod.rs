pub mod activity_log;
pub mod assessment;
pub mod domain_event;
pub mod innovation;
pub mod notify_me;
pub mod organisation;
pub mod reassessment;
pub mod support;
pub mod user;
