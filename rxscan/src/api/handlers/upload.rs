use axum::extract::multipart::{Multipart, MultipartRejection};
use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::api::multipart::read_image_field;
use crate::api::AppState;
use crate::error::{ErrorBody, Result, RxError};
use crate::pipeline::ScanOutcome;
use crate::prescription::MedicineRecord;

/// Multipart body accepted by `POST /upload`.
#[derive(utoipa::ToSchema)]
#[allow(dead_code)]
pub struct UploadForm {
    /// Prescription image (png, jpg, jpeg or bmp).
    #[schema(value_type = String, format = Binary)]
    image: Vec<u8>,
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct UploadResponse {
    pub medicines: Vec<MedicineRecord>,
    /// Raw recognized text, only present when no medicine was detected.
    pub ocr_text: Option<String>,
}

impl From<ScanOutcome> for UploadResponse {
    fn from(outcome: ScanOutcome) -> Self {
        let ocr_text = outcome.nothing_detected().then_some(outcome.ocr_text);
        Self {
            medicines: outcome.medicines,
            ocr_text,
        }
    }
}

/// `POST /upload`
#[utoipa::path(
    post,
    path = "/upload",
    tag = "prescriptions",
    request_body(content = UploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Medicines read from the prescription", body = UploadResponse),
        (status = 400, description = "Missing file or disallowed file type", body = ErrorBody),
        (status = 413, description = "Upload exceeds the size limit", body = ErrorBody),
        (status = 500, description = "Image processing or OCR failed", body = ErrorBody),
    )
)]
pub async fn upload_prescription(
    State(state): State<AppState>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>> {
    let upload = read_image_field(multipart)
        .await?
        .ok_or_else(|| RxError::Input("No file uploaded".to_string()))?
        .validate()?;

    let outcome = super::scan_upload(&state, upload).await?;
    Ok(Json(outcome.into()))
}
