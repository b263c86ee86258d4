use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tinylink_core::ShortenerError;
use tracing::error;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug)]
pub enum AppError {
    /// The request body could not be decoded.
    BadRequest(String),
    /// The stored URL cannot be placed in a `Location` header.
    InvalidLocation(String),
    Shortener(ShortenerError),
}

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorInfo,
}

#[derive(Serialize)]
struct ErrorInfo {
    code: &'static str,
    message: String,
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::InvalidLocation(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Shortener(err) => match err {
                ShortenerError::InvalidUrl(_) | ShortenerError::InvalidShortCode(_) => {
                    StatusCode::BAD_REQUEST
                }
                ShortenerError::NotFound(_) => StatusCode::NOT_FOUND,
                ShortenerError::CodeSpaceExhausted { .. } => StatusCode::SERVICE_UNAVAILABLE,
                ShortenerError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }

    /// Stable machine-readable error code.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::BadRequest(_) => "bad_request",
            AppError::InvalidLocation(_) => "invalid_location",
            AppError::Shortener(err) => match err {
                ShortenerError::InvalidUrl(_) => "invalid_url",
                ShortenerError::InvalidShortCode(_) => "invalid_short_code",
                ShortenerError::NotFound(_) => "not_found",
                ShortenerError::CodeSpaceExhausted { .. } => "code_space_exhausted",
                ShortenerError::Storage(_) => "storage_error",
            },
        }
    }

    fn message(&self) -> String {
        match self {
            AppError::BadRequest(message) => message.clone(),
            AppError::InvalidLocation(_) => "stored url cannot be redirected to".to_string(),
            AppError::Shortener(ShortenerError::Storage(_)) => {
                "storage backend failure".to_string()
            }
            AppError::Shortener(err) => err.to_string(),
        }
    }
}

impl From<ShortenerError> for AppError {
    fn from(err: ShortenerError) -> Self {
        AppError::Shortener(err)
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        if status.is_server_error() {
            match &self {
                AppError::InvalidLocation(url) => {
                    error!(url = %url, "stored url is not a valid Location header")
                }
                AppError::Shortener(err) => error!(error = %err, "request failed"),
                AppError::BadRequest(_) => {}
            }
        }

        let body = ErrorBody {
            error: ErrorInfo {
                code: self.code(),
                message: self.message(),
            },
        };

        (status, Json(body)).into_response()
    }
}
