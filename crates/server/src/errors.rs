use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use service::auth::errors::AuthError;
use service::records::RecordError;
use thiserror::Error;
use tracing::error;

/// JSON error body: `{"error": <title>, "message": <detail>, "code": <stable code>}`.
#[derive(Debug)]
pub struct JsonApiError {
    pub status: StatusCode,
    pub error: &'static str,
    pub message: Option<String>,
    pub code: Option<u16>,
}

impl JsonApiError {
    pub fn new(status: StatusCode, error: &'static str, message: Option<String>) -> Self {
        Self { status, error, message, code: None }
    }

    pub fn with_code(mut self, code: u16) -> Self {
        self.code = Some(code);
        self
    }
}

impl IntoResponse for JsonApiError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({
            "error": self.error,
            "message": self.message,
            "code": self.code,
        });
        (self.status, Json(body)).into_response()
    }
}

impl From<RecordError> for JsonApiError {
    fn from(e: RecordError) -> Self {
        let code = e.code();
        let (status, title) = match &e {
            RecordError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized"),
            RecordError::NotFoundOrDenied | RecordError::PetNotFound | RecordError::RecordNotFound => {
                (StatusCode::NOT_FOUND, "Not Found")
            }
            RecordError::AccessDenied => (StatusCode::FORBIDDEN, "Forbidden"),
            RecordError::Validation(_) => (StatusCode::BAD_REQUEST, "Validation Error"),
            RecordError::Storage(err) => {
                error!(err = %err, "record storage failure");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
            }
        };
        JsonApiError::new(status, title, Some(e.to_string())).with_code(code)
    }
}

impl From<AuthError> for JsonApiError {
    fn from(e: AuthError) -> Self {
        let code = e.code();
        let (status, title) = match &e {
            AuthError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized"),
            AuthError::Validation(_) => (StatusCode::BAD_REQUEST, "Validation Error"),
            AuthError::TokenError(_) | AuthError::Repository(_) => {
                error!(err = %e, "token issuing failure");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
            }
        };
        JsonApiError::new(status, title, Some(e.to_string())).with_code(code)
    }
}

pub const INVALID_BODY_CODE: u16 = 3001;

/// Request bodies that are not valid JSON or do not fit the expected shape.
impl From<JsonRejection> for JsonApiError {
    fn from(rejection: JsonRejection) -> Self {
        JsonApiError::new(rejection.status(), "Invalid Request Body", Some(rejection.body_text()))
            .with_code(INVALID_BODY_CODE)
    }
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("storage initialization failed: {0}")]
    Storage(#[from] service::errors::ServiceError),
    #[error(transparent)]
    Any(#[from] anyhow::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_errors_map_to_statuses() {
        let cases = [
            (RecordError::Unauthorized, StatusCode::UNAUTHORIZED),
            (RecordError::NotFoundOrDenied, StatusCode::NOT_FOUND),
            (RecordError::PetNotFound, StatusCode::NOT_FOUND),
            (RecordError::RecordNotFound, StatusCode::NOT_FOUND),
            (RecordError::AccessDenied, StatusCode::FORBIDDEN),
            (RecordError::Validation("x".into()), StatusCode::BAD_REQUEST),
            (RecordError::Storage(service::errors::ServiceError::Db("disk".into())), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            let code = err.code();
            let api = JsonApiError::from(err);
            assert_eq!(api.status, status);
            assert_eq!(api.code, Some(code));
        }
    }

    #[test]
    fn auth_errors_map_to_statuses() {
        assert_eq!(JsonApiError::from(AuthError::Unauthorized).status, StatusCode::UNAUTHORIZED);
        assert_eq!(JsonApiError::from(AuthError::Validation("x".into())).status, StatusCode::BAD_REQUEST);
        assert_eq!(JsonApiError::from(AuthError::TokenError("x".into())).status, StatusCode::INTERNAL_SERVER_ERROR);
    }
}
