//! Bearer token extractor

use super::state::AppState;
use crate::core::auth::{Claims, TokenError};
use crate::core::entity::Lookup;
use crate::core::error::ApiError;
use crate::entities::User;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use uuid::Uuid;

/// The authenticated actor of a request
///
/// Requires `Authorization: Bearer <token>` naming an existing user.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: Uuid,
    pub user: User,
    pub claims: Claims,
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .ok_or_else(|| ApiError::unauthorized("Unauthorized"))?;

        let token = header
            .to_str()
            .ok()
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or_else(|| ApiError::unauthorized("Invalid token format"))?;

        let claims = state.tokens.verify(token).map_err(token_rejection)?;
        let id = claims.user_id().map_err(token_rejection)?;

        let user = state
            .storage
            .users
            .find_one(&Lookup::ById(id))
            .await?
            .ok_or_else(|| ApiError::unauthorized("Unauthorized"))?;

        tracing::debug!(user_id = %id, "request authenticated");

        Ok(Self { id, user, claims })
    }
}

fn token_rejection(err: TokenError) -> ApiError {
    match err {
        TokenError::Expired => ApiError::unauthorized("Token has expired"),
        _ => ApiError::unauthorized("Invalid token"),
    }
}
