//! Durable domain event entity models.

use innopath_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `domain_events` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct DomainEventRecord {
    pub id: DbId,
    pub event_type: String,
    pub innovation_id: Option<DbId>,
    pub actor_user_id: Option<DbId>,
    pub payload: serde_json::Value,
    pub created_at: Timestamp,
}
