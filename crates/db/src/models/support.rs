//! Innovation support entity models.

use innopath_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `innovation_supports` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct InnovationSupport {
    pub id: DbId,
    pub innovation_id: DbId,
    pub organisation_unit_id: DbId,
    pub status: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
