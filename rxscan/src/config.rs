use serde::Deserialize;
use std::env;
use std::path::PathBuf;

pub(crate) fn parse_env_or<T: std::str::FromStr>(var: &str, default: T) -> T
where
    T::Err: std::fmt::Display,
{
    match env::var(var) {
        Ok(val) => match val.parse() {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!("Invalid value '{}' for {}: {}. Using default.", val, var, e);
                default
            }
        },
        Err(_) => default,
    }
}

/// Window sizes for the denoiser must be odd so the window has a center pixel.
fn odd_window(size: u32) -> u32 {
    if size == 0 {
        1
    } else if size % 2 == 0 {
        size + 1
    } else {
        size
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub upload: UploadConfig,
    pub ocr: OcrConfig,
    pub preprocess: PreprocessConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub max_upload_bytes: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UploadConfig {
    pub upload_dir: PathBuf,
}

impl UploadConfig {
    /// Well-known location of the most recent normalized image.
    pub fn debug_image_path(&self) -> PathBuf {
        self.upload_dir.join("processed.png")
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct OcrConfig {
    /// Directory holding tesseract's `tessdata`. `None` uses the system default.
    pub data_path: Option<String>,
    pub languages: String,
    pub timeout_secs: u64,
}

/// Tuning for the image normalizer.
#[derive(Debug, Clone, Deserialize)]
pub struct PreprocessConfig {
    /// Non-local means filter strength (`h`).
    pub denoise_strength: f32,
    pub template_window: u32,
    pub search_window: u32,
    pub clahe_clip_limit: f32,
    pub clahe_tile_grid: u32,
    pub save_debug_image: bool,
    /// Largest accepted width or height. Bigger uploads are rejected, not
    /// resized, since the normalized image keeps the source dimensions.
    pub max_image_dimension: u32,
    pub min_image_dimension: u32,
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        Self {
            denoise_strength: 10.0,
            template_window: 7,
            search_window: 21,
            clahe_clip_limit: 3.0,
            clahe_tile_grid: 8,
            save_debug_image: true,
            max_image_dimension: 4096,
            min_image_dimension: 16,
        }
    }
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            data_path: None,
            languages: "eng".to_string(),
            timeout_secs: 60,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        let preprocess_defaults = PreprocessConfig::default();

        Self {
            server: ServerConfig {
                host: env::var("RXSCAN_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: parse_env_or("RXSCAN_PORT", 5000),
                max_upload_bytes: parse_env_or("RXSCAN_MAX_UPLOAD_BYTES", 16 * 1024 * 1024),
            },
            upload: UploadConfig {
                upload_dir: env::var("UPLOAD_DIR")
                    .map(PathBuf::from)
                    .unwrap_or_else(|_| PathBuf::from("uploads")),
            },
            ocr: OcrConfig {
                data_path: env::var("TESSERACT_DATA_PATH").ok(),
                languages: env::var("OCR_LANGUAGES").unwrap_or_else(|_| "eng".to_string()),
                timeout_secs: parse_env_or("OCR_TIMEOUT", 60),
            },
            preprocess: PreprocessConfig {
                denoise_strength: parse_env_or(
                    "DENOISE_STRENGTH",
                    preprocess_defaults.denoise_strength,
                ),
                template_window: odd_window(parse_env_or(
                    "DENOISE_TEMPLATE_WINDOW",
                    preprocess_defaults.template_window,
                )),
                search_window: odd_window(parse_env_or(
                    "DENOISE_SEARCH_WINDOW",
                    preprocess_defaults.search_window,
                )),
                clahe_clip_limit: parse_env_or(
                    "CLAHE_CLIP_LIMIT",
                    preprocess_defaults.clahe_clip_limit,
                ),
                clahe_tile_grid: parse_env_or("CLAHE_TILE_GRID", preprocess_defaults.clahe_tile_grid)
                    .max(1),
                save_debug_image: parse_env_or(
                    "SAVE_DEBUG_IMAGE",
                    preprocess_defaults.save_debug_image,
                ),
                max_image_dimension: parse_env_or(
                    "MAX_IMAGE_DIMENSION",
                    preprocess_defaults.max_image_dimension,
                ),
                min_image_dimension: parse_env_or(
                    "MIN_IMAGE_DIMENSION",
                    preprocess_defaults.min_image_dimension,
                ),
            },
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const VARS: &[&str] = &[
        "RXSCAN_PORT",
        "UPLOAD_DIR",
        "OCR_LANGUAGES",
        "DENOISE_TEMPLATE_WINDOW",
        "DENOISE_SEARCH_WINDOW",
        "CLAHE_TILE_GRID",
        "CLAHE_CLIP_LIMIT",
        "MAX_IMAGE_DIMENSION",
        "MIN_IMAGE_DIMENSION",
    ];

    fn clear_env() {
        for var in VARS {
            std::env::remove_var(var);
        }
    }

    #[test]
    #[serial]
    fn test_config_defaults() {
        clear_env();

        let config = Config::default();
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.upload.upload_dir, PathBuf::from("uploads"));
        assert_eq!(config.ocr.languages, "eng");
        assert_eq!(config.preprocess.template_window, 7);
        assert_eq!(config.preprocess.search_window, 21);
        assert_eq!(config.preprocess.clahe_tile_grid, 8);
        assert!((config.preprocess.clahe_clip_limit - 3.0).abs() < f32::EPSILON);
        assert_eq!(config.preprocess.max_image_dimension, 4096);
        assert_eq!(config.preprocess.min_image_dimension, 16);
    }

    #[test]
    #[serial]
    fn test_config_from_env() {
        clear_env();
        std::env::set_var("RXSCAN_PORT", "8080");
        std::env::set_var("UPLOAD_DIR", "/tmp/rx");
        std::env::set_var("CLAHE_CLIP_LIMIT", "2.5");
        std::env::set_var("MAX_IMAGE_DIMENSION", "2048");

        let config = Config::from_env();
        assert_eq!(config.server.port, 8080);
        assert_eq!(
            config.upload.debug_image_path(),
            PathBuf::from("/tmp/rx/processed.png")
        );
        assert!((config.preprocess.clahe_clip_limit - 2.5).abs() < f32::EPSILON);
        assert_eq!(config.preprocess.max_image_dimension, 2048);

        clear_env();
    }

    #[test]
    #[serial]
    fn test_invalid_value_falls_back_to_default() {
        clear_env();
        std::env::set_var("RXSCAN_PORT", "not-a-port");

        let config = Config::from_env();
        assert_eq!(config.server.port, 5000);

        clear_env();
    }

    #[test]
    #[serial]
    fn test_windows_are_forced_odd() {
        clear_env();
        std::env::set_var("DENOISE_TEMPLATE_WINDOW", "6");
        std::env::set_var("DENOISE_SEARCH_WINDOW", "0");
        std::env::set_var("CLAHE_TILE_GRID", "0");

        let config = Config::from_env();
        assert_eq!(config.preprocess.template_window, 7);
        assert_eq!(config.preprocess.search_window, 1);
        assert_eq!(config.preprocess.clahe_tile_grid, 1);

        clear_env();
    }
}
