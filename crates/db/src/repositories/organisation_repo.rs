//! Repository for the `organisations` and `organisation_units` tables.

use innopath_core::types::DbId;
use sqlx::PgPool;

use crate::models::organisation::{Organisation, OrganisationUnit, UnitWithOrganisation};

/// Column list for `organisations` queries.
const COLUMNS: &str = "id, name, acronym, created_at, updated_at";

/// Column list for `organisation_units` queries.
const UNIT_COLUMNS: &str =
    "id, organisation_id, name, acronym, is_shadow, created_at, updated_at";

/// Flat unit-with-organisation projection used by grouping reads.
const UNIT_ORG_COLUMNS: &str = "o.id AS organisation_id, o.name AS organisation_name, \
     o.acronym AS organisation_acronym, u.id AS unit_id, u.name AS unit_name, \
     u.acronym AS unit_acronym, u.is_shadow AS unit_is_shadow";

/// Provides CRUD and lookup operations for organisations and their units.
pub struct OrganisationRepo;

impl OrganisationRepo {
    /// Insert a new organisation.
    pub async fn create(
        pool: &PgPool,
        name: &str,
        acronym: &str,
    ) -> Result<Organisation, sqlx::Error> {
        let query = format!(
            "INSERT INTO organisations (name, acronym) VALUES ($1, $2) RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Organisation>(&query)
            .bind(name)
            .bind(acronym)
            .fetch_one(pool)
            .await
    }

    /// Insert a new organisation unit.
    pub async fn create_unit(
        pool: &PgPool,
        organisation_id: DbId,
        name: &str,
        acronym: &str,
        is_shadow: bool,
    ) -> Result<OrganisationUnit, sqlx::Error> {
        let query = format!(
            "INSERT INTO organisation_units (organisation_id, name, acronym, is_shadow) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {UNIT_COLUMNS}"
        );
        sqlx::query_as::<_, OrganisationUnit>(&query)
            .bind(organisation_id)
            .bind(name)
            .bind(acronym)
            .bind(is_shadow)
            .fetch_one(pool)
            .await
    }

    /// Find an organisation unit by its internal ID.
    pub async fn find_unit_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<OrganisationUnit>, sqlx::Error> {
        let query = format!("SELECT {UNIT_COLUMNS} FROM organisation_units WHERE id = $1");
        sqlx::query_as::<_, OrganisationUnit>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Count how many of the given unit ids exist.
    pub async fn count_existing_units(pool: &PgPool, ids: &[DbId]) -> Result<i64, sqlx::Error> {
        let count: Option<i64> =
            sqlx::query_scalar("SELECT COUNT(*) FROM organisation_units WHERE id = ANY($1)")
                .bind(ids)
                .fetch_one(pool)
                .await?;
        Ok(count.unwrap_or(0))
    }

    /// Load flat unit-with-organisation rows for a set of unit ids.
    ///
    /// Ordered by organisation name then unit name so grouped output is
    /// stable.
    pub async fn unit_rows_by_ids(
        pool: &PgPool,
        ids: &[DbId],
    ) -> Result<Vec<UnitWithOrganisation>, sqlx::Error> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let query = format!(
            "SELECT {UNIT_ORG_COLUMNS} \
             FROM organisation_units u \
             INNER JOIN organisations o ON o.id = u.organisation_id \
             WHERE u.id = ANY($1) \
             ORDER BY o.name, u.name"
        );
        sqlx::query_as::<_, UnitWithOrganisation>(&query)
            .bind(ids)
            .fetch_all(pool)
            .await
    }

    /// Load flat unit-with-organisation rows suggested by an assessment.
    pub async fn unit_rows_for_assessment(
        pool: &PgPool,
        assessment_id: DbId,
    ) -> Result<Vec<UnitWithOrganisation>, sqlx::Error> {
        let query = format!(
            "SELECT {UNIT_ORG_COLUMNS} \
             FROM assessment_organisation_units j \
             INNER JOIN organisation_units u ON u.id = j.organisation_unit_id \
             INNER JOIN organisations o ON o.id = u.organisation_id \
             WHERE j.assessment_id = $1 \
             ORDER BY o.name, u.name"
        );
        sqlx::query_as::<_, UnitWithOrganisation>(&query)
            .bind(assessment_id)
            .fetch_all(pool)
            .await
    }
}
