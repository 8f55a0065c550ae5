use axum::extract::multipart::MultipartError;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::Value;
use thiserror::Error;

pub const CLIENT_UNAVAILABLE_MESSAGE: &str =
    "Chat service is unavailable: the model client failed to initialize.";
pub const INVOCATION_FAILURE_MESSAGE: &str = "Failed to get a response from the AI model.";
pub const MISSING_FILE_MESSAGE: &str = "No file uploaded.";
pub const MALFORMED_FILE_MESSAGE: &str = "Uploaded file is not valid entity JSON.";
pub const DOWNSTREAM_FAILURE_MESSAGE: &str =
    "Failed to get an assessment from the analysis service.";

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{}", CLIENT_UNAVAILABLE_MESSAGE)]
    ClientUnavailable,
    // The cause is logged where it happens and never leaves the process.
    #[error("{}", INVOCATION_FAILURE_MESSAGE)]
    Invocation,
    #[error("invalid request: {0}")]
    BadRequest(String),
    #[error("{}", MISSING_FILE_MESSAGE)]
    MissingInput,
    #[error("{}", MALFORMED_FILE_MESSAGE)]
    MalformedInput(String),
    #[error("{}", DOWNSTREAM_FAILURE_MESSAGE)]
    Downstream(Value),
    #[error("invalid multipart upload: {0}")]
    Multipart(String),
    #[error("request body exceeds the size limit")]
    PayloadTooLarge,
}

impl ServiceError {
    pub fn status(&self) -> StatusCode {
        match self {
            ServiceError::ClientUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            ServiceError::Invocation | ServiceError::Downstream(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ServiceError::BadRequest(_)
            | ServiceError::MissingInput
            | ServiceError::MalformedInput(_)
            | ServiceError::Multipart(_) => StatusCode::BAD_REQUEST,
            ServiceError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status();

        let body = match &self {
            ServiceError::MalformedInput(details) => serde_json::json!({
                "error": self.to_string(),
                "details": details,
            }),
            ServiceError::Downstream(details) => serde_json::json!({
                "error": self.to_string(),
                "details": details,
            }),
            _ => serde_json::json!({
                "error": self.to_string(),
            }),
        };

        (status, axum::Json(body)).into_response()
    }
}

impl From<MultipartError> for ServiceError {
    fn from(err: MultipartError) -> Self {
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ServiceError::PayloadTooLarge
        } else {
            ServiceError::Multipart(err.body_text())
        }
    }
}

impl From<JsonRejection> for ServiceError {
    fn from(rejection: JsonRejection) -> Self {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ServiceError::PayloadTooLarge
        } else {
            ServiceError::BadRequest(rejection.body_text())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_errors_map_to_bad_request() {
        assert_eq!(ServiceError::MissingInput.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ServiceError::MalformedInput("eof".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ServiceError::BadRequest("empty".into()).status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn invocation_message_hides_cause() {
        assert_eq!(
            ServiceError::Invocation.to_string(),
            INVOCATION_FAILURE_MESSAGE
        );
    }

    #[test]
    fn unavailable_client_is_service_unavailable() {
        assert_eq!(
            ServiceError::ClientUnavailable.status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(MISSING_FILE_MESSAGE, ServiceError::MissingInput.to_string());
    }
}
