//! Bearer-token authentication for account endpoints.
//!
//! Flow Overview: read `Authorization: Bearer <access>`, verify the JWT, then
//! resolve the `user_id` claim to a live, active account.

use axum::http::{HeaderMap, header::AUTHORIZATION};
use tracing::debug;

use crate::{
    api::error::ApiError,
    store::{User, UserStore},
    tokens::{TokenIssuer, TokenType},
};

const BEARER: &str = "Bearer";

/// Extract the raw token. `Ok(None)` means no bearer credentials were sent at all.
fn bearer_token(headers: &HeaderMap) -> Result<Option<&str>, ApiError> {
    let Some(value) = headers.get(AUTHORIZATION) else {
        return Ok(None);
    };
    let Ok(value) = value.to_str() else {
        return Ok(None);
    };

    let mut parts = value.split_whitespace();
    match (parts.next(), parts.next(), parts.next()) {
        (Some(scheme), token, rest) if scheme.eq_ignore_ascii_case(BEARER) => match (token, rest) {
            (Some(token), None) => Ok(Some(token)),
            _ => Err(ApiError::BadAuthorizationHeader),
        },
        _ => Ok(None),
    }
}

/// Resolve the request's access token into the account it belongs to.
///
/// # Errors
/// Returns a 401-class [`ApiError`] for missing, malformed, or invalid
/// credentials, and [`ApiError::Internal`] if the store fails.
pub async fn require_user(
    headers: &HeaderMap,
    issuer: &TokenIssuer,
    store: &dyn UserStore,
) -> Result<User, ApiError> {
    let token = bearer_token(headers)?.ok_or(ApiError::NotAuthenticated)?;

    let claims = issuer.verify(token, TokenType::Access).map_err(|err| {
        debug!("Rejected access token: {err}");
        ApiError::AccessTokenNotValid
    })?;

    let user = store
        .find_by_id(claims.user_id)
        .await?
        .ok_or(ApiError::UserNotFound)?;

    if !user.is_active {
        return Err(ApiError::UserInactive);
    }

    Ok(user)
}
