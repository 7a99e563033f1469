//! Repository for the `users` and `user_roles` tables.
//!
//! Doubles as the user directory: display names for assignees and actors are
//! resolved here.

use std::collections::HashMap;

use innopath_core::roles::ROLE_ASSESSOR;
use innopath_core::types::DbId;
use sqlx::PgPool;

use crate::models::user::{CreateUser, CreateUserRole, User, UserRole};

/// Column list for `users` queries.
const COLUMNS: &str = "id, name, email, is_active, created_at, updated_at";

/// Column list for `users` queries joined under alias `u`.
const USER_COLUMNS: &str = "u.id, u.name, u.email, u.is_active, u.created_at, u.updated_at";

/// Column list for `user_roles` queries.
const ROLE_COLUMNS: &str =
    "id, user_id, role, organisation_id, organisation_unit_id, is_active, created_at, updated_at";

/// Provides CRUD and directory lookups for users and their roles.
pub struct UserRepo;

impl UserRepo {
    /// Insert a new user.
    pub async fn create(pool: &PgPool, input: &CreateUser) -> Result<User, sqlx::Error> {
        let query = format!(
            "INSERT INTO users (name, email) VALUES ($1, $2) RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(&input.name)
            .bind(&input.email)
            .fetch_one(pool)
            .await
    }

    /// Find a user by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Resolve display names for a set of user ids.
    ///
    /// Unknown ids are simply absent from the returned map.
    pub async fn names_by_ids(
        pool: &PgPool,
        ids: &[DbId],
    ) -> Result<HashMap<DbId, String>, sqlx::Error> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let rows: Vec<(DbId, String)> =
            sqlx::query_as("SELECT id, name FROM users WHERE id = ANY($1)")
                .bind(ids)
                .fetch_all(pool)
                .await?;
        Ok(rows.into_iter().collect())
    }

    /// Find an active user holding the assessor role.
    ///
    /// Used to validate assessor reassignment targets.
    pub async fn find_active_assessor(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!(
            "SELECT {USER_COLUMNS} FROM users u \
             INNER JOIN user_roles r ON r.user_id = u.id \
             WHERE u.id = $1 AND u.is_active = true \
               AND r.role = $2 AND r.is_active = true"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(user_id)
            .bind(ROLE_ASSESSOR)
            .fetch_optional(pool)
            .await
    }

    /// Insert a new user role.
    pub async fn create_role(
        pool: &PgPool,
        input: &CreateUserRole,
    ) -> Result<UserRole, sqlx::Error> {
        let query = format!(
            "INSERT INTO user_roles (user_id, role, organisation_id, organisation_unit_id) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {ROLE_COLUMNS}"
        );
        sqlx::query_as::<_, UserRole>(&query)
            .bind(input.user_id)
            .bind(&input.role)
            .bind(input.organisation_id)
            .bind(input.organisation_unit_id)
            .fetch_one(pool)
            .await
    }

    /// Find a user role by its internal ID.
    pub async fn find_role_by_id(
        pool: &PgPool,
        role_id: DbId,
    ) -> Result<Option<UserRole>, sqlx::Error> {
        let query = format!("SELECT {ROLE_COLUMNS} FROM user_roles WHERE id = $1");
        sqlx::query_as::<_, UserRole>(&query)
            .bind(role_id)
            .fetch_optional(pool)
            .await
    }
}
