//! Well-known service role name constants.
//!
//! These must match the `role` values seeded into the `user_roles` table.

pub const ROLE_INNOVATOR: &str = "innovator";
pub const ROLE_ASSESSOR: &str = "assessor";
pub const ROLE_QUALIFYING_ACCESSOR: &str = "qualifying_accessor";
pub const ROLE_ACCESSOR: &str = "accessor";
pub const ROLE_ADMIN: &str = "admin";

/// Roles that belong to a support organisation unit.
pub const ACCESSOR_ROLES: &[&str] = &[ROLE_QUALIFYING_ACCESSOR, ROLE_ACCESSOR];

/// Returns `true` for the two accessor role flavours.
pub fn is_accessor_role(role: &str) -> bool {
    ACCESSOR_ROLES.contains(&role)
}
