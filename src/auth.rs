/// Authentication extractors and utilities
use crate::{
    account::ValidatedSession,
    context::AppContext,
    error::{MiraError, MiraResult},
};
use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use axum_extra::headers::{authorization::Bearer, Authorization, HeaderMapExt};

/// Extract the bearer token from the Authorization header
pub fn extract_bearer_token(parts: &Parts) -> Option<String> {
    parts
        .headers
        .typed_get::<Authorization<Bearer>>()
        .map(|auth| auth.token().to_string())
}

/// Admin gate shared by every admin-only operation.
///
/// Non-admins get the same `Unauthorized` signal as anonymous callers.
pub fn require_admin(session: &ValidatedSession) -> MiraResult<()> {
    if session.is_admin() {
        Ok(())
    } else {
        tracing::warn!(user_id = %session.user_id, "admin operation refused");
        Err(MiraError::Unauthorized("Admin role required".to_string()))
    }
}

/// Authenticated context - extracts and validates session from request
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub session: ValidatedSession,
}

#[async_trait]
impl FromRequestParts<AppContext> for AuthContext {
    type Rejection = MiraError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppContext,
    ) -> Result<Self, Self::Rejection> {
        let token = extract_bearer_token(parts)
            .ok_or_else(|| MiraError::Unauthorized("Missing authorization header".to_string()))?;

        let session = state.accounts.validate_session(&token).await?;

        Ok(AuthContext { session })
    }
}

/// Optional authenticated context - does not fail if no auth provided
#[derive(Debug, Clone)]
pub struct OptionalAuthContext {
    pub session: Option<ValidatedSession>,
}

#[async_trait]
impl FromRequestParts<AppContext> for OptionalAuthContext {
    type Rejection = MiraError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppContext,
    ) -> Result<Self, Self::Rejection> {
        let session = match extract_bearer_token(parts) {
            Some(token) => state.accounts.validate_session(&token).await.ok(),
            None => None,
        };

        Ok(OptionalAuthContext { session })
    }
}

/// Admin authentication context - requires the ADMIN role
#[derive(Debug, Clone)]
pub struct AdminAuthContext {
    pub session: ValidatedSession,
}

#[async_trait]
impl FromRequestParts<AppContext> for AdminAuthContext {
    type Rejection = MiraError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppContext,
    ) -> Result<Self, Self::Rejection> {
        let AuthContext { session } = AuthContext::from_request_parts(parts, state).await?;
        require_admin(&session)?;

        Ok(AdminAuthContext { session })
    }
}
