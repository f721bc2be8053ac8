//! Error-to-response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use warden_core::WardenError;

/// Wraps a [`WardenError`] so handlers can use `?` and still answer with
/// the right status code.
#[derive(Debug)]
pub struct ApiError(pub WardenError);

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self(WardenError::InvalidInput(message.into()))
    }

    pub fn status(&self) -> StatusCode {
        match self.0 {
            WardenError::NotFound(_) => StatusCode::NOT_FOUND,
            WardenError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<WardenError> for ApiError {
    fn from(e: WardenError) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        let (category, message) = if self.0.is_client_error() {
            let category = match self.0 {
                WardenError::NotFound(_) => "not_found",
                _ => "invalid_input",
            };
            (category, self.0.to_string())
        } else {
            // Details stay in the log; clients get a generic message.
            tracing::error!(error = %self.0, "request failed");
            ("internal", "internal server error".to_string())
        };

        let body = json!({
            "error": {
                "category": category,
                "message": message,
            }
        });

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping() {
        assert_eq!(
            ApiError(WardenError::NotFound("g".into())).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(ApiError::bad_request("x").status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ApiError(WardenError::Storage("down".into())).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ApiError(WardenError::Internal("bug".into())).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn client_errors_echo_their_message() {
        let resp = ApiError::bad_request("missing field 'name'").into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"]["category"], "invalid_input");
        assert!(body["error"]["message"]
            .as_str()
            .unwrap()
            .contains("missing field 'name'"));
    }

    #[tokio::test]
    async fn storage_details_are_not_leaked() {
        let resp = ApiError(WardenError::Storage("disk /dev/sda1 on fire".into())).into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"]["category"], "internal");
        assert!(!body.to_string().contains("sda1"));
    }
}
