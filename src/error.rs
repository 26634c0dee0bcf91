use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Request-terminal failure kinds. The transport maps each kind to a status
/// code without looking at the message text.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing, invalid or expired token, or a subject with no matching
    /// user. The message never reveals which.
    #[error("Could not validate credentials")]
    Unauthenticated,

    /// Login-time bad credentials. Identical for unknown email and wrong
    /// password.
    #[error("Invalid email or password")]
    BadCredentials,

    #[error("{0} not found")]
    NotFound(&'static str),

    /// Authenticated but not the owner. Only returned after existence of
    /// the resource has been confirmed.
    #[error("Not authorized to modify this insight")]
    Forbidden,

    #[error("{0}")]
    Validation(String),

    /// Collaborator outage (store connectivity and the like). Distinct from
    /// every security or input condition; never retried here.
    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthenticated | ApiError::BadCredentials => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let detail = match &self {
            ApiError::Internal(e) => {
                error!(error = %e, "internal error");
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };
        let body = Json(json!({ "detail": detail }));

        match self {
            ApiError::Unauthenticated | ApiError::BadCredentials => {
                (status, [(header::WWW_AUTHENTICATE, "Bearer")], body).into_response()
            }
            _ => (status, body).into_response(),
        }
    }
}
