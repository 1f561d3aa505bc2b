use image::{DynamicImage, GrayImage, ImageFormat, ImageReader};
use imageproc::contrast::{otsu_level, threshold, ThresholdType};

use super::clahe::clahe;
use super::denoise::non_local_means;
use crate::config::PreprocessConfig;
use crate::error::{Result, RxError};

/// A binarized grayscale image ready for text recognition.
///
/// Every pixel is exactly 0 or 255 and the dimensions match the source image.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedImage(GrayImage);

impl NormalizedImage {
    pub fn as_gray(&self) -> &GrayImage {
        &self.0
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.0.dimensions()
    }

    /// Encode as PNG, the format handed to the OCR engine and the debug file.
    pub fn to_png(&self) -> Result<Vec<u8>> {
        let mut output = Vec::new();
        self.0
            .write_to(&mut std::io::Cursor::new(&mut output), ImageFormat::Png)
            .map_err(|e| RxError::Processing(format!("Failed to encode image: {e}")))?;
        Ok(output)
    }
}

/// Decode upload bytes and normalize them for OCR.
///
/// Steps, in this order:
/// 1. Decode (any format `image` can guess)
/// 2. Grayscale
/// 3. Non-local means denoising
/// 4. CLAHE contrast enhancement
/// 5. Otsu binarization
///
/// Images outside the configured dimension bounds are rejected from their
/// header, before any pixels are decoded.
pub fn normalize(bytes: &[u8], config: &PreprocessConfig) -> Result<NormalizedImage> {
    let img = decode_image(bytes, config)?;
    Ok(normalize_image(&img, config))
}

/// Run steps 2-5 on an already decoded image.
pub fn normalize_image(img: &DynamicImage, config: &PreprocessConfig) -> NormalizedImage {
    let gray = img.to_luma8();

    let denoised = non_local_means(
        &gray,
        config.denoise_strength,
        config.template_window,
        config.search_window,
    );

    let enhanced = clahe(&denoised, config.clahe_clip_limit, config.clahe_tile_grid);

    NormalizedImage(binarize(&enhanced))
}

fn image_reader(bytes: &[u8]) -> Result<ImageReader<std::io::Cursor<&[u8]>>> {
    ImageReader::new(std::io::Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| RxError::ImageDecode(format!("Invalid image file: {e}")))
}

fn decode_image(bytes: &[u8], config: &PreprocessConfig) -> Result<DynamicImage> {
    let (width, height) = image_reader(bytes)?
        .into_dimensions()
        .map_err(|e| RxError::ImageDecode(format!("Invalid image file: {e}")))?;
    check_dimensions(width, height, config)?;

    image_reader(bytes)?
        .decode()
        .map_err(|e| RxError::ImageDecode(format!("Invalid image file: {e}")))
}

fn check_dimensions(width: u32, height: u32, config: &PreprocessConfig) -> Result<()> {
    let max = config.max_image_dimension;
    if width > max || height > max {
        return Err(RxError::Processing(format!(
            "Image too large: {width}x{height}, maximum {max}x{max}"
        )));
    }

    let min = config.min_image_dimension;
    if width < min || height < min {
        return Err(RxError::Processing(format!(
            "Image too small: {width}x{height}, minimum {min}x{min}"
        )));
    }

    Ok(())
}

/// Global binary threshold at the Otsu level of the image histogram.
pub fn binarize(gray: &GrayImage) -> GrayImage {
    let level = otsu_level(gray);
    threshold(gray, level, ThresholdType::Binary)
}
