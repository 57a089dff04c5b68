//! JWT pair issuance and refresh.

use axum::{
    Json,
    extract::{Extension, rejection::JsonRejection},
};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, instrument};
use utoipa::ToSchema;

use super::check_credentials;
use crate::{
    api::error::{ApiError, FieldErrors, REQUIRED},
    store::SharedStore,
    tokens::{TokenIssuer, TokenPair, TokenType},
};

#[derive(Deserialize, ToSchema)]
pub struct TokenObtainRequest {
    username: Option<String>,
    #[schema(value_type = String)]
    password: Option<SecretString>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TokenPairResponse {
    pub refresh: String,
    pub access: String,
}

impl From<TokenPair> for TokenPairResponse {
    fn from(pair: TokenPair) -> Self {
        Self {
            refresh: pair.refresh,
            access: pair.access,
        }
    }
}

#[derive(Deserialize, ToSchema)]
pub struct TokenRefreshRequest {
    #[schema(value_type = String)]
    refresh: Option<SecretString>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TokenRefreshResponse {
    pub access: String,
}

#[utoipa::path(
    post,
    path = "/token/",
    request_body = TokenObtainRequest,
    responses(
        (status = 200, description = "Credentials accepted", body = TokenPairResponse),
        (status = 400, description = "Missing username or password"),
        (status = 401, description = "No active account found with the given credentials"),
    ),
    tag = "tokens"
)]
#[instrument(skip_all)]
pub async fn obtain_token_pair(
    Extension(store): Extension<SharedStore>,
    Extension(issuer): Extension<Arc<TokenIssuer>>,
    payload: Result<Json<TokenObtainRequest>, JsonRejection>,
) -> Result<Json<TokenPairResponse>, ApiError> {
    let Json(request) = payload?;

    let mut errors = FieldErrors::new();
    let username = request.username.unwrap_or_default();
    if username.is_empty() {
        errors.add("username", REQUIRED);
    }
    let password = request.password.unwrap_or_else(|| SecretString::from(String::new()));
    if password.expose_secret().is_empty() {
        errors.add("password", REQUIRED);
    }
    errors.into_result()?;

    let account = store.find_by_username(&username).await?;
    let Some(user) = check_credentials(account, password.expose_secret().to_string()).await? else {
        debug!("Token request rejected: unknown username or wrong password");
        return Err(ApiError::InvalidCredentials);
    };

    if !user.is_active {
        debug!(user_id = user.id, "Token request rejected: inactive account");
        return Err(ApiError::InvalidCredentials);
    }

    let pair = issuer.issue_pair(user.id).map_err(|err| {
        tracing::error!("Error issuing token pair: {err}");
        ApiError::Internal
    })?;

    info!(user_id = user.id, "Token pair issued");

    Ok(Json(TokenPairResponse::from(pair)))
}

#[utoipa::path(
    post,
    path = "/token/refresh/",
    request_body = TokenRefreshRequest,
    responses(
        (status = 200, description = "New access token", body = TokenRefreshResponse),
        (status = 400, description = "Missing refresh token"),
        (status = 401, description = "Refresh token is invalid, expired, or its account is gone"),
    ),
    tag = "tokens"
)]
#[instrument(skip_all)]
pub async fn refresh_token(
    Extension(store): Extension<SharedStore>,
    Extension(issuer): Extension<Arc<TokenIssuer>>,
    payload: Result<Json<TokenRefreshRequest>, JsonRejection>,
) -> Result<Json<TokenRefreshResponse>, ApiError> {
    let Json(request) = payload?;

    let Some(refresh) = request.refresh.filter(|r| !r.expose_secret().is_empty()) else {
        let mut errors = FieldErrors::new();
        errors.add("refresh", REQUIRED);
        return Err(ApiError::Validation(errors));
    };

    let claims = issuer
        .verify(refresh.expose_secret(), TokenType::Refresh)
        .map_err(|err| {
            debug!("Rejected refresh token: {err}");
            ApiError::RefreshTokenNotValid
        })?;

    match store.find_by_id(claims.user_id).await? {
        Some(user) if user.is_active => (),
        _ => return Err(ApiError::NoActiveAccountForToken),
    }

    let access = issuer
        .issue(claims.user_id, TokenType::Access)
        .map_err(|err| {
            tracing::error!("Error issuing access token: {err}");
            ApiError::Internal
        })?;

    debug!(user_id = claims.user_id, "Access token refreshed");

    Ok(Json(TokenRefreshResponse { access }))
}
