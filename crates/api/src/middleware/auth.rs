//! Bearer-token extractor identifying the balance owner of a request.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use casebox_core::error::CoreError;
use casebox_core::types::DbId;

use crate::auth::jwt::validate_token;
use crate::error::AppError;
use crate::state::AppState;

/// The user whose balance a case opening or ledger query acts on.
///
/// Tokens are issued elsewhere; this service only checks the HS256
/// signature and expiry and reads the user id from `sub`. Handlers never
/// take a user id from the path or body.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: DbId,
}

fn unauthorized(message: &str) -> AppError {
    AppError::Core(CoreError::Unauthorized(message.into()))
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| unauthorized("Missing Authorization header"))?;

        let token = header
            .strip_prefix("Bearer ")
            .ok_or_else(|| unauthorized("Invalid Authorization format. Expected: Bearer <token>"))?;

        let claims = validate_token(token, &state.config.jwt).map_err(|e| {
            tracing::debug!(error = %e, "Rejected bearer token");
            unauthorized("Invalid or expired token")
        })?;

        // Ids are BIGSERIAL, so a subject below 1 can never own a balance.
        if claims.sub < 1 {
            tracing::warn!(sub = claims.sub, "Token subject is not a user id");
            return Err(unauthorized("Token subject is not a valid user id"));
        }

        Ok(AuthUser {
            user_id: claims.sub,
        })
    }
}
