//! Organisation and organisation-unit entity models.

use innopath_core::organisations::OrganisationUnitRow;
use innopath_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `organisations` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Organisation {
    pub id: DbId,
    pub name: String,
    pub acronym: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A row from the `organisation_units` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct OrganisationUnit {
    pub id: DbId,
    pub organisation_id: DbId,
    pub name: String,
    pub acronym: String,
    pub is_shadow: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A unit joined to its parent organisation, as read by grouping queries.
#[derive(Debug, Clone, FromRow)]
pub struct UnitWithOrganisation {
    pub organisation_id: DbId,
    pub organisation_name: String,
    pub organisation_acronym: String,
    pub unit_id: DbId,
    pub unit_name: String,
    pub unit_acronym: String,
    pub unit_is_shadow: bool,
}

impl From<UnitWithOrganisation> for OrganisationUnitRow {
    fn from(row: UnitWithOrganisation) -> Self {
        OrganisationUnitRow {
            organisation_id: row.organisation_id,
            organisation_name: row.organisation_name,
            organisation_acronym: row.organisation_acronym,
            unit_id: row.unit_id,
            unit_name: row.unit_name,
            unit_acronym: row.unit_acronym,
            unit_is_shadow: row.unit_is_shadow,
        }
    }
}
