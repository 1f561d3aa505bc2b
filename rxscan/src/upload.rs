//! Upload validation and storage for prescription images.

use std::path::{Path, PathBuf};

use crate::error::{Result, RxError};

pub const ALLOWED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp"];

const WINDOWS_DEVICE_NAMES: &[&str] = &[
    "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "LPT1", "LPT2", "LPT3",
];

/// True when the text after the last `.` is an allowed image extension.
pub fn allowed_file(filename: &str) -> bool {
    filename
        .rsplit_once('.')
        .map(|(_, ext)| ALLOWED_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// Reduce a client-supplied filename to something safe to store on disk.
///
/// Path separators become underscores, anything outside `[A-Za-z0-9_.-]`
/// is dropped and leading/trailing dots and underscores are stripped, so
/// `../../etc/passwd` becomes `etc_passwd`. May return an empty string.
pub fn secure_filename(filename: &str) -> String {
    let spaced: String = filename
        .chars()
        .map(|c| if c == '/' || c == '\\' { ' ' } else { c })
        .collect();
    let joined = spaced.split_whitespace().collect::<Vec<_>>().join("_");
    let kept: String = joined
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
        .collect();
    let trimmed = kept.trim_matches(|c| c == '.' || c == '_');

    let stem = trimmed.split('.').next().unwrap_or_default();
    if WINDOWS_DEVICE_NAMES.contains(&stem.to_ascii_uppercase().as_str()) {
        format!("_{trimmed}")
    } else {
        trimmed.to_string()
    }
}

/// An image file received from a client.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes,
        }
    }

    /// Reject uploads that must never reach the scanner.
    pub fn validate(self) -> Result<Self> {
        if self.file_name.is_empty() {
            return Err(RxError::Input("No file selected".to_string()));
        }
        if !allowed_file(&self.file_name) {
            return Err(RxError::Input("File type not allowed".to_string()));
        }
        Ok(self)
    }

    /// Sanitized name used when the upload is written to disk.
    pub fn stored_name(&self) -> String {
        let name = secure_filename(&self.file_name);
        if name.is_empty() {
            "upload".to_string()
        } else {
            name
        }
    }

    /// Write the original bytes into `dir`, returning the stored path.
    pub async fn persist(&self, dir: &Path) -> Result<PathBuf> {
        let path = dir.join(self.stored_name());
        tokio::fs::write(&path, &self.bytes).await?;
        Ok(path)
    }
}
