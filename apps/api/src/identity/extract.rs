use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use tracing::warn;

use super::{IdentityError, Session};
use crate::errors::AppError;
use crate::state::AppState;

/// A verified `Authorization: Bearer <idToken>` session.
///
/// Handlers that take this extractor never run without a session, so the
/// owner used for scoping is always defined.
pub struct AuthSession(pub Session);

fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

#[async_trait]
impl FromRequestParts<AppState> for AuthSession {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(token) = bearer_token(parts) else {
            warn!("Authentication failed: missing bearer token");
            return Err(AppError::Unauthorized);
        };

        match state.identity.verify(token).await {
            Ok(session) => Ok(AuthSession(session)),
            Err(IdentityError::InvalidToken) => {
                warn!("Authentication failed: invalid or expired token");
                Err(AppError::Unauthorized)
            }
            Err(e) => Err(e.into()),
        }
    }
}
