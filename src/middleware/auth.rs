use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};

use crate::{api::AppState, error::AppError, models::User};

/// The account behind a valid `Authorization: Bearer <token>` header
///
/// Rejects with 401 when the header is missing or malformed, the token fails
/// validation, or the account no longer exists.
#[derive(Debug, Clone)]
pub struct AuthUser(pub User);

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or(AppError::Unauthorized)?;

        let user_id = state.tokens.verify(token)?;
        let user = state.users.find_user(user_id).await?.ok_or_else(|| {
            tracing::debug!(user_id = %user_id, "Token for a deleted account");
            AppError::Unauthorized
        })?;

        Ok(AuthUser(user))
    }
}
