//! Event bus and notification infrastructure for the innovation platform.
//!
//! - [`EventBus`]: in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`.
//! - [`DomainEvent`]: the canonical domain event envelope.
//! - [`EventPersistence`]: background service that durably writes every
//!   event to the `domain_events` table.
//! - [`ScheduleDispatcher`]: periodic processor that fires due reminder
//!   schedules.

pub mod bus;
pub mod persistence;
pub mod schedule;

pub use bus::{DomainEvent, EventBus};
pub use persistence::EventPersistence;
pub use schedule::ScheduleDispatcher;
