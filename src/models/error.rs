use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::Json;
use serde_json::json;
use serde_json::Value;
use tracing::error;

use crate::store::StoreError;
use crate::utils::listing::ListingError;

#[derive(Debug)]
pub struct Error {
    pub code: StatusCode,
    pub body: Json<Value>,
}

impl Error {
    pub fn new(code: StatusCode, message: &str) -> Self {
        Self {
            code,
            body: Json(json!({"error": message})),
        }
    }

    pub fn with_details(code: StatusCode, message: &str, details: &str) -> Self {
        Self {
            code,
            body: Json(json!({"error": message, "details": details})),
        }
    }

    pub fn bad_request(message: &str) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn not_found(message: &str) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn unauthorized(message: &str) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    /// A store failure, reported with the underlying message attached.
    pub fn store(message: &str, err: StoreError) -> Self {
        error!("{}: {}", message, err);
        Self::with_details(
            StatusCode::INTERNAL_SERVER_ERROR,
            message,
            &err.to_string(),
        )
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        (self.code, self.body).into_response()
    }
}

impl From<(StatusCode, &str)> for Error {
    fn from((code, msg): (StatusCode, &str)) -> Self {
        Self::new(code, msg)
    }
}

impl From<jsonwebtoken::errors::Error> for Error {
    fn from(error: jsonwebtoken::errors::Error) -> Self {
        Self::with_details(
            StatusCode::UNAUTHORIZED,
            "Token validation failed",
            &error.to_string(),
        )
    }
}

impl From<ListingError> for Error {
    fn from(error: ListingError) -> Self {
        Self::bad_request(&error.to_string())
    }
}
