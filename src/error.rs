use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Errors raised by the user and product stores.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("email already registered")]
    DuplicateEmail,

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// Everything a handler can fail with. Rendered as `{"detail": ...}`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error("Could not validate credentials")]
    Unauthorized,

    #[error("Incorrect email or password")]
    BadCredentials,

    #[error("{entity} not found")]
    NotFound { entity: &'static str, id: i64 },

    #[error("Email already registered")]
    EmailTaken,

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn product_not_found(id: i64) -> Self {
        AppError::NotFound {
            entity: "Product",
            id,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Unauthorized | AppError::BadCredentials => StatusCode::UNAUTHORIZED,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::EmailTaken => StatusCode::BAD_REQUEST,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::DuplicateEmail => AppError::EmailTaken,
            StoreError::Database(e) => AppError::Internal(e.into()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let detail = self.to_string();
        match self {
            AppError::Internal(e) => {
                error!(error = ?e, "internal error");
                (status, Json(json!({ "detail": "Internal server error" }))).into_response()
            }
            AppError::Unauthorized | AppError::BadCredentials => (
                status,
                [(header::WWW_AUTHENTICATE, "Bearer")],
                Json(json!({ "detail": detail })),
            )
                .into_response(),
            AppError::NotFound { id, .. } => {
                (status, Json(json!({ "detail": detail, "id": id }))).into_response()
            }
            _ => (status, Json(json!({ "detail": detail }))).into_response(),
        }
    }
}
