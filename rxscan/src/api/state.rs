use std::sync::Arc;

use crate::config::Config;
use crate::ocr::TextRecognizer;
use crate::pipeline::PrescriptionPipeline;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub pipeline: PrescriptionPipeline,
}

impl AppState {
    pub fn new(config: Config, recognizer: Arc<dyn TextRecognizer>) -> Self {
        let pipeline = PrescriptionPipeline::new(recognizer, &config);

        Self {
            config: Arc::new(config),
            pipeline,
        }
    }
}
