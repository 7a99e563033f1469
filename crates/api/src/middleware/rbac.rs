//! Role-based access control (RBAC) extractors.
//!
//! Each extractor wraps [`AuthUser`] and rejects requests whose role does not
//! meet the minimum requirement. Use these in route handlers to enforce
//! authorization at the type level.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use innopath_core::error::CoreError;
use innopath_core::roles::{is_accessor_role, ROLE_ASSESSOR, ROLE_INNOVATOR};

use super::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

/// Requires the `assessor` role. Rejects with 403 Forbidden otherwise.
pub struct RequireAssessor(pub AuthUser);

impl FromRequestParts<AppState> for RequireAssessor {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if user.role != ROLE_ASSESSOR {
            return Err(AppError::Core(CoreError::Forbidden(
                "Assessor role required".into(),
            )));
        }
        Ok(RequireAssessor(user))
    }
}

/// Requires the `innovator` or `assessor` role (the two roles that may
/// request a reassessment). Rejects with 403 Forbidden otherwise.
pub struct RequireInnovatorOrAssessor(pub AuthUser);

impl FromRequestParts<AppState> for RequireInnovatorOrAssessor {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if user.role != ROLE_INNOVATOR && user.role != ROLE_ASSESSOR {
            return Err(AppError::Core(CoreError::Forbidden(
                "Innovator or Assessor role required".into(),
            )));
        }
        Ok(RequireInnovatorOrAssessor(user))
    }
}

/// Requires a role that may hold notify-me subscriptions: either accessor
/// flavour or the assessor role. Rejects with 403 Forbidden otherwise.
pub struct RequireSubscriber(pub AuthUser);

impl FromRequestParts<AppState> for RequireSubscriber {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if !is_accessor_role(&user.role) && user.role != ROLE_ASSESSOR {
            return Err(AppError::Core(CoreError::Forbidden(
                "Accessor or Assessor role required".into(),
            )));
        }
        Ok(RequireSubscriber(user))
    }
}
