mod handlers;
mod multipart;
mod openapi;
mod page;
mod routes;
mod state;

pub use handlers::{HealthData, OcrStatus, UploadResponse};
pub use openapi::ApiDoc;
pub use routes::create_router;
pub use state::AppState;
