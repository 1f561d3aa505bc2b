use axum::extract::multipart::{Multipart, MultipartError, MultipartRejection};
use axum::http::StatusCode;

use crate::error::{Result, RxError};
use crate::upload::ImageUpload;

/// Form field carrying the prescription image.
pub const IMAGE_FIELD: &str = "image";

/// Pull the image part out of a multipart request.
///
/// Returns `Ok(None)` when the request is not multipart or has no `image`
/// part; callers decide which message that deserves.
pub async fn read_image_field(
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<Option<ImageUpload>> {
    let Ok(mut multipart) = multipart else {
        return Ok(None);
    };

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(IMAGE_FIELD) {
            continue;
        }

        let file_name = field.file_name().unwrap_or_default().to_string();
        let bytes = field.bytes().await.map_err(multipart_error)?;
        return Ok(Some(ImageUpload::new(file_name, bytes.to_vec())));
    }

    Ok(None)
}

fn multipart_error(err: MultipartError) -> RxError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        RxError::PayloadTooLarge
    } else {
        RxError::Input(format!("Failed to read file: {}", err.body_text()))
    }
}
