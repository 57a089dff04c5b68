//! Error responses for the account API.
//!
//! Bodies follow the shapes clients of this API already expect:
//! `{"detail": "..."}` (optionally with a `code`) for request-level failures,
//! and `{"field": ["message", ...]}` for validation failures.

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::{HeaderValue, StatusCode, header::WWW_AUTHENTICATE},
    response::{IntoResponse, Response},
};
use serde_json::{Value, json};
use std::collections::BTreeMap;
use tracing::error;

use crate::store::StoreError;

const WWW_AUTHENTICATE_VALUE: &str = "Bearer realm=\"api\"";

pub const REQUIRED: &str = "This field is required.";

/// Per-field validation messages, rendered as a JSON object of string arrays.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    /// `Ok(())` when no field failed, otherwise a validation error.
    ///
    /// # Errors
    /// Returns [`ApiError::Validation`] carrying the collected messages.
    pub fn into_result(self) -> Result<(), ApiError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(ApiError::Validation(self))
        }
    }
}

#[derive(Debug)]
pub enum ApiError {
    Validation(FieldErrors),
    MalformedBody(String),
    UnsupportedMediaType(String),
    NotAuthenticated,
    BadAuthorizationHeader,
    InvalidCredentials,
    AccessTokenNotValid,
    RefreshTokenNotValid,
    UserNotFound,
    UserInactive,
    NoActiveAccountForToken,
    Internal,
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::MalformedBody(_) => StatusCode::BAD_REQUEST,
            Self::UnsupportedMediaType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            Self::NotAuthenticated
            | Self::BadAuthorizationHeader
            | Self::InvalidCredentials
            | Self::AccessTokenNotValid
            | Self::RefreshTokenNotValid
            | Self::UserNotFound
            | Self::UserInactive
            | Self::NoActiveAccountForToken => StatusCode::UNAUTHORIZED,
            Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn body(&self) -> Value {
        match self {
            Self::Validation(fields) => json!(fields.0),
            Self::MalformedBody(reason) => json!({ "detail": format!("JSON parse error - {reason}") }),
            Self::UnsupportedMediaType(reason) => json!({ "detail": reason }),
            Self::NotAuthenticated => {
                json!({ "detail": "Authentication credentials were not provided." })
            }
            Self::BadAuthorizationHeader => json!({
                "detail": "Authorization header must contain two space-delimited values",
                "code": "bad_authorization_header",
            }),
            Self::InvalidCredentials => {
                json!({ "detail": "No active account found with the given credentials" })
            }
            Self::AccessTokenNotValid => json!({
                "detail": "Given token not valid for any token type",
                "code": "token_not_valid",
            }),
            Self::RefreshTokenNotValid => json!({
                "detail": "Token is invalid or expired",
                "code": "token_not_valid",
            }),
            Self::UserNotFound => json!({ "detail": "User not found", "code": "user_not_found" }),
            Self::UserInactive => json!({ "detail": "User is inactive", "code": "user_inactive" }),
            Self::NoActiveAccountForToken => json!({
                "detail": "No active account found for the given token.",
                "code": "no_active_account",
            }),
            Self::Internal => json!({ "detail": "A server error occurred." }),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let mut response = (status, Json(self.body())).into_response();

        if status == StatusCode::UNAUTHORIZED {
            response.headers_mut().insert(
                WWW_AUTHENTICATE,
                HeaderValue::from_static(WWW_AUTHENTICATE_VALUE),
            );
        }

        response
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        if rejection.status() == StatusCode::UNSUPPORTED_MEDIA_TYPE {
            Self::UnsupportedMediaType(rejection.body_text())
        } else {
            Self::MalformedBody(rejection.body_text())
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        error!("Store error: {err:?}");
        Self::Internal
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn render(err: ApiError) -> (StatusCode, Option<HeaderValue>, Value) {
        let response = err.into_response();
        let status = response.status();
        let www = response.headers().get(WWW_AUTHENTICATE).cloned();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap_or_default();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, www, body)
    }

    #[tokio::test]
    async fn field_errors_render_as_arrays() {
        let mut fields = FieldErrors::new();
        fields.add("username", REQUIRED);
        fields.add("password", "too short");
        fields.add("password", "entirely numeric");

        let (status, www, body) = render(ApiError::Validation(fields)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(www.is_none());
        assert_eq!(
            body,
            json!({
                "username": ["This field is required."],
                "password": ["too short", "entirely numeric"],
            })
        );
    }

    #[tokio::test]
    async fn unauthorized_sets_www_authenticate() {
        let (status, www, body) = render(ApiError::RefreshTokenNotValid).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(
            www.as_ref().and_then(|v| v.to_str().ok()),
            Some("Bearer realm=\"api\"")
        );
        assert_eq!(body["code"], "token_not_valid");
    }

    #[tokio::test]
    async fn store_errors_are_opaque() {
        let err = ApiError::from(StoreError::Database(sqlx::Error::PoolTimedOut));
        let (status, _, body) = render(err).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({ "detail": "A server error occurred." }));
    }

    #[test]
    fn empty_field_errors_are_ok() {
        assert!(FieldErrors::new().into_result().is_ok());
    }
}
