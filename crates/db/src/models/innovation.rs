//! Innovation entity models and DTOs.

use innopath_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `innovations` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Innovation {
    pub id: DbId,
    pub name: String,
    pub owner_id: DbId,
    pub status: String,
    pub has_been_assessed: bool,
    pub current_assessment_id: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating an innovation.
#[derive(Debug, Deserialize)]
pub struct CreateInnovation {
    pub name: String,
    pub owner_id: DbId,
}

/// A row from the `innovation_sections` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct InnovationSection {
    pub id: DbId,
    pub innovation_id: DbId,
    pub section: String,
    pub updated_at: Timestamp,
}
