use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Body of every JSON error response.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct ErrorBody {
    pub error: String,
}

#[derive(Error, Debug)]
pub enum RxError {
    /// Rejected upload: missing file, empty filename, disallowed extension.
    #[error("{0}")]
    Input(String),

    /// Upload body exceeded the configured size cap.
    #[error("File too large")]
    PayloadTooLarge,

    #[error("Image decode error: {0}")]
    ImageDecode(String),

    #[error("Processing error: {0}")]
    Processing(String),

    #[error("OCR error: {0}")]
    Ocr(String),

    #[error("OCR unavailable: {0}")]
    OcrUnavailable(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl RxError {
    pub fn status(&self) -> StatusCode {
        match self {
            RxError::Input(_) => StatusCode::BAD_REQUEST,
            RxError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            RxError::ImageDecode(_)
            | RxError::Processing(_)
            | RxError::Ocr(_)
            | RxError::OcrUnavailable(_)
            | RxError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message shown to the client.
    ///
    /// Decode failures collapse to a fixed message; OCR and other processing
    /// failures carry their detail through.
    pub fn client_message(&self) -> String {
        match self {
            RxError::Input(msg) => msg.clone(),
            RxError::ImageDecode(_) => "Image processing failed".to_string(),
            _ => self.to_string(),
        }
    }
}

impl IntoResponse for RxError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        }

        let body = Json(ErrorBody {
            error: self.client_message(),
        });

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, RxError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_errors_are_client_errors() {
        let err = RxError::Input("File type not allowed".into());
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.client_message(), "File type not allowed");
    }

    #[test]
    fn oversized_uploads_are_413() {
        let err = RxError::PayloadTooLarge;
        assert_eq!(err.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert!(err.status().is_client_error());
        assert_eq!(err.client_message(), "File too large");
    }

    #[test]
    fn decode_errors_hide_decoder_detail() {
        let err = RxError::ImageDecode("Invalid image file: bad PNG signature".into());
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.client_message(), "Image processing failed");
    }

    #[test]
    fn ocr_errors_carry_detail() {
        let err = RxError::Ocr("Failed to set image".into());
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.client_message(), "OCR error: Failed to set image");
    }

    #[tokio::test]
    async fn into_response_uses_error_key() {
        let response = RxError::Input("No file selected".into()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["error"], "No file selected");
    }
}
