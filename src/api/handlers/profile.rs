//! Authenticated self-service profile endpoints.
//!
//! Flow Overview:
//! 1) Authenticate via bearer access token.
//! 2) Resolve the current user from the store.
//! 3) Apply allow-listed updates (`email`, `first_name`, `last_name`).

use axum::{
    Json,
    extract::{Extension, rejection::JsonRejection},
    http::HeaderMap,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;

use super::{ProfileResponse, check_profile_fields, normalize_email, principal::require_user};
use crate::{
    api::error::{ApiError, FieldErrors},
    store::{ProfileUpdate, SharedStore},
    tokens::TokenIssuer,
};

#[derive(Debug, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct ProfileUpdateRequest {
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

#[utoipa::path(
    get,
    path = "/profile/",
    responses(
        (status = 200, description = "Return the authenticated user profile", body = ProfileResponse),
        (status = 401, description = "Missing or invalid access token"),
    ),
    security(("bearer" = [])),
    tag = "accounts"
)]
#[instrument(skip_all)]
pub async fn get_profile(
    headers: HeaderMap,
    Extension(store): Extension<SharedStore>,
    Extension(issuer): Extension<Arc<TokenIssuer>>,
) -> Result<Json<ProfileResponse>, ApiError> {
    let user = require_user(&headers, &issuer, store.as_ref()).await?;

    Ok(Json(ProfileResponse::from(user)))
}

#[utoipa::path(
    patch,
    path = "/profile/",
    request_body = ProfileUpdateRequest,
    responses(
        (status = 200, description = "Profile updated", body = ProfileResponse),
        (status = 400, description = "Invalid update payload"),
        (status = 401, description = "Missing or invalid access token"),
    ),
    security(("bearer" = [])),
    tag = "accounts"
)]
#[instrument(skip_all)]
pub async fn update_profile(
    headers: HeaderMap,
    Extension(store): Extension<SharedStore>,
    Extension(issuer): Extension<Arc<TokenIssuer>>,
    payload: Result<Json<ProfileUpdateRequest>, JsonRejection>,
) -> Result<Json<ProfileResponse>, ApiError> {
    let user = require_user(&headers, &issuer, store.as_ref()).await?;
    let Json(request) = payload?;

    apply(&store, user.id, partial_update(request)).await
}

#[utoipa::path(
    put,
    path = "/profile/",
    request_body = ProfileUpdateRequest,
    responses(
        (status = 200, description = "Profile replaced; omitted fields are cleared", body = ProfileResponse),
        (status = 400, description = "Invalid update payload"),
        (status = 401, description = "Missing or invalid access token"),
    ),
    security(("bearer" = [])),
    tag = "accounts"
)]
#[instrument(skip_all)]
pub async fn replace_profile(
    headers: HeaderMap,
    Extension(store): Extension<SharedStore>,
    Extension(issuer): Extension<Arc<TokenIssuer>>,
    payload: Result<Json<ProfileUpdateRequest>, JsonRejection>,
) -> Result<Json<ProfileResponse>, ApiError> {
    let user = require_user(&headers, &issuer, store.as_ref()).await?;
    let Json(request) = payload?;

    apply(&store, user.id, full_update(request)).await
}

fn partial_update(request: ProfileUpdateRequest) -> ProfileUpdate {
    ProfileUpdate {
        email: request.email.as_deref().map(normalize_email),
        first_name: request.first_name,
        last_name: request.last_name,
    }
}

fn full_update(request: ProfileUpdateRequest) -> ProfileUpdate {
    ProfileUpdate {
        email: Some(request.email.as_deref().map(normalize_email).unwrap_or_default()),
        first_name: Some(request.first_name.unwrap_or_default()),
        last_name: Some(request.last_name.unwrap_or_default()),
    }
}

async fn apply(
    store: &SharedStore,
    user_id: i64,
    update: ProfileUpdate,
) -> Result<Json<ProfileResponse>, ApiError> {
    let mut errors = FieldErrors::new();
    check_profile_fields(
        update.email.as_deref(),
        update.first_name.as_deref(),
        update.last_name.as_deref(),
        &mut errors,
    );
    errors.into_result()?;

    // The account can vanish between authentication and update (e.g. a purge).
    let updated = store
        .update_profile(user_id, update)
        .await?
        .ok_or(ApiError::UserNotFound)?;

    info!(user_id, "Profile updated");

    Ok(Json(ProfileResponse::from(updated)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(email: Option<&str>, first_name: Option<&str>) -> ProfileUpdateRequest {
        ProfileUpdateRequest {
            email: email.map(str::to_string),
            first_name: first_name.map(str::to_string),
            last_name: None,
        }
    }

    #[test]
    fn partial_update_keeps_absent_fields_untouched() {
        let update = partial_update(request(Some(" Alice@Example.COM "), None));
        assert_eq!(update.email.as_deref(), Some("Alice@example.com"));
        assert!(update.first_name.is_none());
        assert!(update.last_name.is_none());
    }

    #[test]
    fn full_update_clears_absent_fields() {
        let update = full_update(request(None, Some("Alice")));
        assert_eq!(update.email.as_deref(), Some(""));
        assert_eq!(update.first_name.as_deref(), Some("Alice"));
        assert_eq!(update.last_name.as_deref(), Some(""));
    }

    #[test]
    fn read_only_fields_are_rejected() {
        let parsed = serde_json::from_str::<ProfileUpdateRequest>(r#"{"username": "mallory"}"#);
        assert!(parsed.is_err());
    }
}
