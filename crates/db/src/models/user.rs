//! User and user-role entity models.

use innopath_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `users` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct User {
    pub id: DbId,
    pub name: String,
    pub email: String,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A row from the `user_roles` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct UserRole {
    pub id: DbId,
    pub user_id: DbId,
    pub role: String,
    pub organisation_id: Option<DbId>,
    pub organisation_unit_id: Option<DbId>,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a user.
#[derive(Debug, Deserialize)]
pub struct CreateUser {
    pub name: String,
    pub email: String,
}

/// DTO for creating a user role.
#[derive(Debug, Deserialize)]
pub struct CreateUserRole {
    pub user_id: DbId,
    pub role: String,
    pub organisation_id: Option<DbId>,
    pub organisation_unit_id: Option<DbId>,
}
