use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use leptess::LepTess;
use tokio::sync::Mutex;
use tracing::{info, warn};

use super::preprocessing::NormalizedImage;
use crate::config::OcrConfig;
use crate::error::{Result, RxError};

/// Text recognition capability the prescription pipeline depends on.
///
/// The production implementation is [`OcrProvider`]; tests plug in stubs that
/// return canned text.
#[async_trait]
pub trait TextRecognizer: Send + Sync {
    async fn recognize(&self, image: &NormalizedImage) -> Result<String>;

    fn is_available(&self) -> bool {
        true
    }
}

enum OcrBackend {
    Local { tesseract: Arc<Mutex<LepTess>> },
    Unavailable { reason: String },
}

pub struct OcrProvider {
    backend: OcrBackend,
    config: OcrConfig,
}

fn create_tesseract(data_path: Option<&str>, languages: &str) -> std::result::Result<LepTess, String> {
    LepTess::new(data_path, languages).map_err(|e| e.to_string())
}

impl OcrProvider {
    /// Initialize tesseract. A missing engine or language pack does not fail
    /// construction; the provider reports itself unavailable instead.
    pub fn new(config: &OcrConfig) -> Self {
        let backend = match create_tesseract(config.data_path.as_deref(), &config.languages) {
            Ok(lt) => {
                info!(languages = %config.languages, "Tesseract OCR initialized");
                OcrBackend::Local {
                    tesseract: Arc::new(Mutex::new(lt)),
                }
            }
            Err(e) => {
                let reason = format!("Tesseract not available: {e}");
                warn!("{}", reason);
                OcrBackend::Unavailable { reason }
            }
        };

        Self {
            backend,
            config: config.clone(),
        }
    }

    pub fn languages(&self) -> &str {
        &self.config.languages
    }

    /// Recognize text in encoded image bytes (PNG, JPEG, ...).
    pub async fn ocr(&self, image_bytes: &[u8]) -> Result<String> {
        let timeout_duration = Duration::from_secs(self.config.timeout_secs);

        let result = tokio::time::timeout(timeout_duration, self.ocr_internal(image_bytes)).await;

        match result {
            Ok(inner_result) => inner_result,
            Err(_) => Err(RxError::Ocr(format!(
                "OCR operation timed out after {} seconds",
                self.config.timeout_secs
            ))),
        }
    }

    async fn ocr_internal(&self, image_bytes: &[u8]) -> Result<String> {
        match &self.backend {
            OcrBackend::Local { tesseract } => {
                let bytes = image_bytes.to_vec();
                let tesseract = Arc::clone(tesseract);

                tokio::task::spawn_blocking(move || {
                    let mut lt = tesseract.blocking_lock();
                    lt.set_image_from_mem(&bytes)
                        .map_err(|e| RxError::Ocr(format!("Failed to set image: {e}")))?;
                    lt.get_utf8_text()
                        .map_err(|e| RxError::Ocr(format!("Failed to extract text: {e}")))
                })
                .await
                .map_err(|e| RxError::Ocr(format!("OCR task panicked: {e}")))?
            }
            OcrBackend::Unavailable { reason } => Err(RxError::OcrUnavailable(reason.clone())),
        }
    }
}

#[async_trait]
impl TextRecognizer for OcrProvider {
    async fn recognize(&self, image: &NormalizedImage) -> Result<String> {
        let png = image.to_png()?;
        self.ocr(&png).await
    }

    fn is_available(&self) -> bool {
        !matches!(self.backend, OcrBackend::Unavailable { .. })
    }
}
