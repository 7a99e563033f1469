//! Shared fixtures for engine integration tests.
//!
//! Seeds users, roles, organisations, and innovations directly through the
//! repository layer and builds the [`AuthUser`] values the engines expect.

#![allow(dead_code)]

use innopath_api::middleware::auth::AuthUser;
use innopath_core::roles::{ROLE_ACCESSOR, ROLE_ASSESSOR, ROLE_INNOVATOR};
use innopath_db::models::innovation::{CreateInnovation, Innovation};
use innopath_db::models::organisation::{Organisation, OrganisationUnit};
use innopath_db::models::user::{CreateUser, CreateUserRole};
use innopath_db::repositories::{InnovationRepo, OrganisationRepo, UserRepo};
use sqlx::PgPool;

/// Create a user with the given role and return the engine-facing identity.
pub async fn create_auth_user(
    pool: &PgPool,
    name: &str,
    role: &str,
    organisation_id: Option<i64>,
    organisation_unit_id: Option<i64>,
) -> AuthUser {
    let user = UserRepo::create(
        pool,
        &CreateUser {
            name: name.to_string(),
            email: format!("{}@example.com", name.replace(' ', ".").to_lowercase()),
        },
    )
    .await
    .unwrap();

    let user_role = UserRepo::create_role(
        pool,
        &CreateUserRole {
            user_id: user.id,
            role: role.to_string(),
            organisation_id,
            organisation_unit_id,
        },
    )
    .await
    .unwrap();

    AuthUser {
        user_id: user.id,
        role_id: user_role.id,
        role: role.to_string(),
        organisation_id,
        organisation_unit_id,
    }
}

/// An assessor with no organisation scope.
pub async fn create_assessor(pool: &PgPool, name: &str) -> AuthUser {
    create_auth_user(pool, name, ROLE_ASSESSOR, None, None).await
}

/// An innovator with no organisation scope.
pub async fn create_innovator(pool: &PgPool, name: &str) -> AuthUser {
    create_auth_user(pool, name, ROLE_INNOVATOR, None, None).await
}

/// An accessor scoped to an organisation unit.
pub async fn create_accessor(
    pool: &PgPool,
    name: &str,
    organisation_id: i64,
    organisation_unit_id: i64,
) -> AuthUser {
    create_auth_user(
        pool,
        name,
        ROLE_ACCESSOR,
        Some(organisation_id),
        Some(organisation_unit_id),
    )
    .await
}

/// An innovation owned by the given innovator.
pub async fn create_innovation(pool: &PgPool, owner: &AuthUser, name: &str) -> Innovation {
    InnovationRepo::create(
        pool,
        &CreateInnovation {
            name: name.to_string(),
            owner_id: owner.user_id,
        },
    )
    .await
    .unwrap()
}

/// An organisation with the given units.
pub async fn create_organisation_with_units(
    pool: &PgPool,
    org_name: &str,
    acronym: &str,
    unit_names: &[&str],
) -> (Organisation, Vec<OrganisationUnit>) {
    let organisation = OrganisationRepo::create(pool, org_name, acronym).await.unwrap();

    let mut units = Vec::with_capacity(unit_names.len());
    for unit_name in unit_names {
        let unit = OrganisationRepo::create_unit(
            pool,
            organisation.id,
            unit_name,
            &unit_name[..1],
            false,
        )
        .await
        .unwrap();
        units.push(unit);
    }

    (organisation, units)
}
