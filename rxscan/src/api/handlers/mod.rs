mod assets;
mod form;
pub(crate) mod health;
pub(crate) mod upload;

pub use assets::{debug_image, favicon};
pub use form::{index, submit_form};
pub use health::{health_check, HealthData, OcrStatus};
pub use upload::{upload_prescription, UploadResponse};

use crate::api::AppState;
use crate::error::Result;
use crate::pipeline::ScanOutcome;
use crate::upload::ImageUpload;

/// Store the original upload and run it through the pipeline.
///
/// Storage is best effort; a full disk must not block a scan.
async fn scan_upload(state: &AppState, upload: ImageUpload) -> Result<ScanOutcome> {
    match upload.persist(&state.config.upload.upload_dir).await {
        Ok(path) => tracing::debug!(path = %path.display(), "Upload stored"),
        Err(e) => tracing::warn!(file_name = %upload.file_name, error = %e, "Failed to store upload"),
    }

    state.pipeline.scan(upload.bytes).await
}
