use axum::{
    Json,
    extract::{Extension, rejection::JsonRejection},
    http::StatusCode,
};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::{debug, info, instrument};
use utoipa::ToSchema;

use super::{
    ProfileResponse, check_password, check_profile_fields, hash_password, normalize_email,
    valid_username,
};
use crate::{
    api::error::{ApiError, FieldErrors, REQUIRED},
    store::{NewUser, SharedStore, StoreError},
};

const USERNAME_TAKEN: &str = "A user with that username already exists.";

#[derive(Deserialize, ToSchema)]
pub struct RegisterRequest {
    username: Option<String>,
    #[schema(value_type = String)]
    password: Option<SecretString>,
    email: Option<String>,
    first_name: Option<String>,
    last_name: Option<String>,
}

#[utoipa::path(
    post,
    path = "/register/",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = ProfileResponse, content_type = "application/json"),
        (status = 400, description = "Invalid payload or username already taken"),
    ),
    tag = "accounts"
)]
#[instrument(skip(store, payload))]
pub async fn register(
    Extension(store): Extension<SharedStore>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ProfileResponse>), ApiError> {
    let Json(request) = payload?;

    let mut errors = FieldErrors::new();

    let username = request.username.map(|u| u.trim().to_string()).unwrap_or_default();
    if username.is_empty() {
        errors.add("username", REQUIRED);
    } else if !valid_username(&username) {
        errors.add(
            "username",
            "Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters.",
        );
    } else if store.find_by_username(&username).await?.is_some() {
        errors.add("username", USERNAME_TAKEN);
    }

    let password = request.password.unwrap_or_else(|| SecretString::from(String::new()));
    if password.expose_secret().is_empty() {
        errors.add("password", REQUIRED);
    } else {
        check_password(password.expose_secret(), &mut errors);
    }

    let email = request.email.as_deref().map(normalize_email).unwrap_or_default();
    check_profile_fields(
        Some(&email),
        request.first_name.as_deref(),
        request.last_name.as_deref(),
        &mut errors,
    );

    errors.into_result()?;

    let password_hash = hash_password(password.expose_secret().to_string()).await?;

    let created = store
        .create_user(NewUser {
            username,
            email,
            first_name: request.first_name.unwrap_or_default(),
            last_name: request.last_name.unwrap_or_default(),
            password_hash,
        })
        .await
        .map_err(|err| match err {
            StoreError::Conflict(name) => {
                debug!("Username taken during insert: {name}");
                let mut errors = FieldErrors::new();
                errors.add("username", USERNAME_TAKEN);
                ApiError::Validation(errors)
            }
            other => ApiError::from(other),
        })?;

    info!(user_id = created.id, "User registered");

    Ok((StatusCode::CREATED, Json(ProfileResponse::from(created))))
}
