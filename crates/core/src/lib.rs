//! Domain rules and shared types for the innovation tracking platform.
//!
//! This crate has no database or HTTP dependencies so it can be used by the
//! repository layer, the API server, and the background event services alike.
//! It holds the status vocabularies, the pure business-rule functions for the
//! assessment lifecycle and notify-me subscriptions, and the shared
//! organisation/unit grouping helper.

pub mod activity;
pub mod assessment;
pub mod error;
pub mod events;
pub mod innovation;
pub mod notify_me;
pub mod organisations;
pub mod roles;
pub mod support;
pub mod types;
