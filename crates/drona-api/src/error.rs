use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use drona_auth::AuthError;
use drona_kv::KvError;
use drona_store::StoreError;
use serde_json::json;
use thiserror::Error;

/// API-visible failures, mapped onto status codes and stable error codes.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("unauthorized")]
    Unauthorized,

    /// The session was superseded; clients treat this as "log in again".
    #[error("session expired")]
    SessionExpired,

    #[error("forbidden")]
    Forbidden,

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("internal error")]
    Internal,
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized | ApiError::SessionExpired => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "BAD_REQUEST",
            ApiError::Unauthorized => "UNAUTHORIZED",
            ApiError::SessionExpired => "SESSION_EXPIRED",
            ApiError::Forbidden => "FORBIDDEN",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::Internal => "INTERNAL_ERROR",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = json!({
            "error": {
                "code": self.code(),
                "message": self.to_string(),
            }
        });
        (self.status(), Json(body)).into_response()
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> ApiError {
        match err {
            AuthError::Unauthorized(reason) => {
                tracing::debug!(reason, "request rejected as unauthorized");
                ApiError::Unauthorized
            }
            AuthError::SessionExpired => ApiError::SessionExpired,
            other => {
                tracing::error!(error = %other, "auth flow failed");
                ApiError::Internal
            }
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> ApiError {
        tracing::error!(error = %err, "store operation failed");
        ApiError::Internal
    }
}

impl From<KvError> for ApiError {
    fn from(err: KvError) -> ApiError {
        tracing::error!(error = %err, "kv operation failed");
        ApiError::Internal
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_errors_map_to_401_codes() {
        let unauthorized: ApiError = AuthError::Unauthorized("nope").into();
        assert_eq!(unauthorized.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(unauthorized.code(), "UNAUTHORIZED");

        let expired: ApiError = AuthError::SessionExpired.into();
        assert_eq!(expired.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(expired.code(), "SESSION_EXPIRED");
    }

    #[test]
    fn not_found_keeps_the_subject_in_the_message() {
        let err = ApiError::NotFound("contest");
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        assert_eq!(err.to_string(), "contest not found");
    }
}
