//! JWT-based authentication extractor for Axum handlers.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use innopath_core::error::CoreError;
use innopath_core::types::DbId;

use crate::auth::jwt::validate_token;
use crate::error::AppError;
use crate::state::AppState;

/// Authenticated caller extracted from a JWT Bearer token in the
/// `Authorization` header.
///
/// A caller always acts through exactly one user-role; the role id scopes
/// notify-me subscriptions and the organisation fields scope accessor reads.
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// The user's internal database id (from `claims.sub`).
    pub user_id: DbId,
    /// The id of the user-role the caller is acting through.
    pub role_id: DbId,
    /// The role name (e.g. `"assessor"`, `"innovator"`).
    pub role: String,
    /// The organisation of the role, for accessor roles.
    pub organisation_id: Option<DbId>,
    /// The organisation unit of the role, for accessor roles.
    pub organisation_unit_id: Option<DbId>,
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| {
                AppError::Core(CoreError::Unauthorized(
                    "Missing Authorization header".into(),
                ))
            })?;

        let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized(
                "Invalid Authorization format. Expected: Bearer <token>".into(),
            ))
        })?;

        let claims = validate_token(token, &state.config.jwt).map_err(|_| {
            AppError::Core(CoreError::Unauthorized("Invalid or expired token".into()))
        })?;

        Ok(AuthUser {
            user_id: claims.sub,
            role_id: claims.role_id,
            role: claims.role,
            organisation_id: claims.organisation_id,
            organisation_unit_id: claims.organisation_unit_id,
        })
    }
}
