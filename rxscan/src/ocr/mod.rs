//! OCR (Optical Character Recognition) Module
//!
//! Two halves:
//! - `preprocessing`: turns an uploaded photo or scan into a clean black and
//!   white image (grayscale, non-local means denoising, CLAHE, Otsu).
//! - `provider`: the [`TextRecognizer`] boundary and its tesseract-backed
//!   implementation via leptess.
//!
//! # Usage
//!
//! ```rust,ignore
//! let normalized = normalize(&bytes, &config.preprocess)?;
//! let text = OcrProvider::new(&config.ocr).recognize(&normalized).await?;
//! ```

mod clahe;
mod denoise;
mod preprocessing;
mod provider;

pub use clahe::clahe;
pub use denoise::non_local_means;
pub use preprocessing::{binarize, normalize, normalize_image, NormalizedImage};
pub use provider::{OcrProvider, TextRecognizer};
