use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::{header, request::Parts};

use crate::api::errors::ApiError;
use crate::core::{security, state::AppState};

const INVALID_CREDENTIALS: ApiError = ApiError::Unauthorized("Invalid authentication credentials");

/// Caller identity taken from a verified bearer token. Accounts live with the
/// identity provider, so the `sub` claim is trusted as the user reference and
/// every progress row is keyed by it.
#[derive(Debug, Clone)]
pub(crate) struct AuthUser {
    pub(crate) id: String,
}

pub(crate) struct CurrentUser(pub(crate) AuthUser);

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts).ok_or(INVALID_CREDENTIALS)?;

        let claims = security::verify_token(token, state.settings()).map_err(|err| {
            tracing::debug!(error = %err, "Rejected bearer token");
            INVALID_CREDENTIALS
        })?;

        let user_id = claims.sub.trim();
        if user_id.is_empty() {
            return Err(INVALID_CREDENTIALS);
        }

        Ok(CurrentUser(AuthUser { id: user_id.to_string() }))
    }
}

fn bearer_token(parts: &Parts) -> Option<&str> {
    let value = parts.headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    value.strip_prefix("Bearer ").map(str::trim).filter(|token| !token.is_empty())
}
