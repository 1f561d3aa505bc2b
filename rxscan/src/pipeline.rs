use std::path::PathBuf;
use std::sync::Arc;

use serde::Serialize;

use crate::config::{Config, PreprocessConfig};
use crate::error::{Result, RxError};
use crate::ocr::{normalize, NormalizedImage, TextRecognizer};
use crate::prescription::{extract_medicines, MedicineRecord};

/// Result of scanning one prescription image.
#[derive(Debug, Clone, Serialize)]
pub struct ScanOutcome {
    pub medicines: Vec<MedicineRecord>,
    pub ocr_text: String,
}

impl ScanOutcome {
    /// True when extraction fell back to the "No medicines detected" record.
    pub fn nothing_detected(&self) -> bool {
        matches!(self.medicines.as_slice(), [only] if only.is_sentinel())
    }
}

/// Normalize → recognize → extract, one request at a time.
#[derive(Clone)]
pub struct PrescriptionPipeline {
    recognizer: Arc<dyn TextRecognizer>,
    preprocess: PreprocessConfig,
    debug_image_path: Option<PathBuf>,
}

impl PrescriptionPipeline {
    pub fn new(recognizer: Arc<dyn TextRecognizer>, config: &Config) -> Self {
        let debug_image_path = config
            .preprocess
            .save_debug_image
            .then(|| config.upload.debug_image_path());

        Self {
            recognizer,
            preprocess: config.preprocess.clone(),
            debug_image_path,
        }
    }

    pub fn recognizer(&self) -> &Arc<dyn TextRecognizer> {
        &self.recognizer
    }

    /// Run the image normalizer on the blocking pool.
    pub async fn normalize(&self, bytes: Vec<u8>) -> Result<NormalizedImage> {
        let config = self.preprocess.clone();
        tokio::task::spawn_blocking(move || normalize(&bytes, &config))
            .await
            .map_err(|e| RxError::Processing(format!("Image normalization task failed: {e}")))?
    }

    pub async fn scan(&self, bytes: Vec<u8>) -> Result<ScanOutcome> {
        let normalized = self.normalize(bytes).await?;
        let (width, height) = normalized.dimensions();
        tracing::debug!(width, height, "Image normalized");

        self.save_debug_image(&normalized).await;

        let ocr_text = self.recognizer.recognize(&normalized).await?;
        tracing::debug!(ocr_text = %ocr_text, "Raw OCR output");

        let medicines = extract_medicines(&ocr_text);
        tracing::info!(count = medicines.len(), "Prescription scanned");

        Ok(ScanOutcome {
            medicines,
            ocr_text,
        })
    }

    /// Overwrite the debug copy of the last normalized image. Never fails the
    /// request; concurrent scans race on the file and the last one wins.
    async fn save_debug_image(&self, image: &NormalizedImage) {
        let Some(path) = &self.debug_image_path else {
            return;
        };

        let png = match image.to_png() {
            Ok(png) => png,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to encode debug image");
                return;
            }
        };

        if let Err(e) = tokio::fs::write(path, png).await {
            tracing::warn!(path = %path.display(), error = %e, "Failed to write debug image");
        }
    }
}
