use axum::extract::multipart::{Multipart, MultipartRejection};
use axum::extract::State;
use axum::response::Html;

use crate::api::multipart::read_image_field;
use crate::api::page::{render, PageContent};
use crate::api::AppState;
use crate::error::{Result, RxError};
use crate::prescription::MedicineRecord;

/// `GET /`
pub async fn index() -> Html<String> {
    Html(render(PageContent::Empty))
}

/// `POST /` from the browser form. Failures are rendered into the page.
pub async fn submit_form(
    State(state): State<AppState>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Html<String> {
    match scan_form(&state, multipart).await {
        Ok(medicines) => Html(render(PageContent::Medicines(&medicines))),
        Err(e) => {
            if e.status().is_server_error() {
                tracing::error!(error = %e, "Form scan failed");
            }
            Html(render(PageContent::Error(&form_error_message(&e))))
        }
    }
}

async fn scan_form(
    state: &AppState,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<Vec<MedicineRecord>> {
    let upload = read_image_field(multipart)
        .await?
        .ok_or_else(|| RxError::Input("No file selected".to_string()))?
        .validate()?;

    let outcome = super::scan_upload(state, upload).await?;
    Ok(outcome.medicines)
}

fn form_error_message(err: &RxError) -> String {
    match err {
        RxError::ImageDecode(_) | RxError::Processing(_) => "Error processing image".to_string(),
        _ => err.client_message(),
    }
}
