#![allow(dead_code)]

use std::io::Cursor;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};

use rxscan::config::{Config, UploadConfig};
use rxscan::error::{Result, RxError};
use rxscan::ocr::{NormalizedImage, TextRecognizer};

pub const BOUNDARY: &str = "rxscan-test-boundary";

/// Route tracing output through the test harness so `--nocapture` shows it.
pub fn init_test_logger() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("rxscan=debug")
        .with_test_writer()
        .try_init();
}

/// Recognizer returning canned text and counting how often it was asked.
pub struct StubRecognizer {
    text: Option<String>,
    calls: AtomicUsize,
}

impl StubRecognizer {
    pub fn returning(text: &str) -> Arc<Self> {
        Arc::new(Self {
            text: Some(text.to_string()),
            calls: AtomicUsize::new(0),
        })
    }

    /// A recognizer whose engine always fails.
    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            text: None,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TextRecognizer for StubRecognizer {
    async fn recognize(&self, _image: &NormalizedImage) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.text
            .clone()
            .ok_or_else(|| RxError::Ocr("Failed to extract text: engine crashed".to_string()))
    }
}

pub fn test_config(upload_dir: &Path) -> Config {
    Config {
        upload: UploadConfig {
            upload_dir: upload_dir.to_path_buf(),
        },
        ..Config::default()
    }
}

/// Light page with a few dark strokes, roughly what a phone scan looks like
/// after cropping.
pub fn prescription_page(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        let in_line = (y % 16) >= 6 && (y % 16) < 10;
        let in_word = (x % 24) >= 4 && (x % 24) < 18;
        if in_line && in_word {
            Rgb([35, 30, 40])
        } else {
            Rgb([235, 232, 225])
        }
    })
}

pub fn encode(image: RgbImage, format: ImageFormat) -> Vec<u8> {
    let mut bytes = Vec::new();
    DynamicImage::ImageRgb8(image)
        .write_to(&mut Cursor::new(&mut bytes), format)
        .expect("encode fixture image");
    bytes
}

pub fn prescription_png() -> Vec<u8> {
    encode(prescription_page(64, 48), ImageFormat::Png)
}

/// Single-part multipart body. Returns the content type and the body bytes.
pub fn multipart_body(field: &str, file_name: &str, bytes: &[u8]) -> (String, Vec<u8>) {
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"{file_name}\"\r\n\
             Content-Type: application/octet-stream\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

    (format!("multipart/form-data; boundary={BOUNDARY}"), body)
}
