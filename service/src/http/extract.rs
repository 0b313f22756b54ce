//! Request extractors.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;

use super::AppState;
use crate::error::ApiError;
use crate::repo::docs::UserDoc;

/// The authenticated account, resolved from the `Authorization: Bearer`
/// header. Handlers that take this argument are auth-gated; any missing,
/// malformed, expired or unknown-account token rejects with the same 401
/// so callers learn nothing about which check failed.
pub struct CurrentUser(pub UserDoc);

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        const DENIED: ApiError = ApiError::Unauthorized("Not authorized.");

        let state = parts.extensions.get::<AppState>().ok_or(DENIED)?.clone();

        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .ok_or(DENIED)?;

        let claims = state.tokens.verify(token).map_err(|_| DENIED)?;

        let user = state
            .docs
            .user_by_id(&claims.sub)
            .await?
            .ok_or(DENIED)?;

        Ok(Self(user))
    }
}
