//! Activity log entity models.

use innopath_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `activity_log` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ActivityLogEntry {
    pub id: DbId,
    pub innovation_id: DbId,
    pub user_id: DbId,
    pub activity_type: String,
    pub params: serde_json::Value,
    pub created_at: Timestamp,
}
