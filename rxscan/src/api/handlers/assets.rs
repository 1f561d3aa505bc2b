use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::api::AppState;
use crate::error::RxError;

/// `GET /debug_image`: the most recent normalized image.
pub async fn debug_image(State(state): State<AppState>) -> Response {
    let path = state.config.upload.debug_image_path();

    match tokio::fs::read(&path).await {
        Ok(bytes) => ([(header::CONTENT_TYPE, "image/png")], bytes).into_response(),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            (StatusCode::NOT_FOUND, "No image found").into_response()
        }
        Err(e) => RxError::Io(e).into_response(),
    }
}

/// `GET /favicon.ico`
pub async fn favicon() -> StatusCode {
    StatusCode::NO_CONTENT
}
