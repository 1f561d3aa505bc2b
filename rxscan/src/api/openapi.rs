use axum::Json;
use utoipa::OpenApi;
use utoipa_redoc::{Redoc, Servable};

use super::handlers;
use crate::error::ErrorBody;
use crate::prescription::MedicineRecord;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "rxscan API",
        description = "Reads medicine names, doses and schedules from photographed prescriptions.",
    ),
    paths(
        handlers::upload::upload_prescription,
        handlers::health::health_check,
    ),
    components(schemas(
        ErrorBody,
        MedicineRecord,
        handlers::upload::UploadForm,
        handlers::upload::UploadResponse,
        handlers::health::HealthData,
        handlers::health::OcrStatus,
    )),
    tags(
        (name = "prescriptions", description = "Prescription image scanning"),
        (name = "health", description = "Health check"),
    ),
)]
pub struct ApiDoc;

pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

pub fn redoc_router<S: Clone + Send + Sync + 'static>() -> axum::Router<S> {
    Redoc::with_url("/docs", ApiDoc::openapi()).into()
}
