//! Non-local means denoising for grayscale scans.
//!
//! Every output pixel is a weighted average of the pixels inside a square
//! search window around it. A candidate's weight depends on how similar the
//! template patch around it is to the template patch around the pixel being
//! filtered, so flat paper noise is averaged away while stroke edges (whose
//! patches only resemble other edges) survive.
//!
//! The patch distance is the mean squared difference over the template
//! window and the weight is `exp(-distance / h²)`. Instead of comparing
//! patches pixel by pixel, the filter walks the search offsets once and
//! builds an integral image of squared differences per offset, which makes
//! each patch distance an O(1) lookup. Squared differences of 8-bit pixels
//! are integers, so the integral is exact and the weight is read from a table
//! indexed by the patch's sum of squared differences.

use image::{GrayImage, Luma};

/// Reflect-101 border index (`dcb|abcd|cba`).
fn reflect_101(index: i64, len: i64) -> usize {
    if len == 1 {
        return 0;
    }
    let period = 2 * (len - 1);
    let m = index.rem_euclid(period);
    (if m >= len { period - m } else { m }) as usize
}

/// Weights below this never move a rounded 8-bit average.
const MIN_WEIGHT_EXPONENT: f64 = 30.0;

/// Grayscale pixels widened with a reflected border of `pad` pixels per side.
struct PaddedPlane {
    data: Vec<u8>,
    stride: usize,
}

impl PaddedPlane {
    fn new(image: &GrayImage, pad: u32) -> Self {
        let (width, height) = image.dimensions();
        let pad = pad as i64;
        let stride = width as usize + 2 * pad as usize;
        let rows = height as usize + 2 * pad as usize;
        let mut data = Vec::with_capacity(stride * rows);

        for py in 0..rows as i64 {
            let sy = reflect_101(py - pad, height as i64) as u32;
            for px in 0..stride as i64 {
                let sx = reflect_101(px - pad, width as i64) as u32;
                data.push(image.get_pixel(sx, sy)[0]);
            }
        }

        Self { data, stride }
    }

    #[inline]
    fn at(&self, x: usize, y: usize) -> i32 {
        self.data[y * self.stride + x] as i32
    }
}

/// `exp(-(ssd / patch_area) / h²)` for every patch SSD that still carries
/// weight; larger SSDs weigh zero.
struct WeightTable(Vec<f64>);

impl WeightTable {
    fn new(h: f32, patch_area: u64) -> Self {
        let inv_h2 = 1.0 / (h as f64 * h as f64);
        let cutoff = MIN_WEIGHT_EXPONENT / inv_h2 * patch_area as f64;
        let max_ssd = patch_area * 255 * 255;
        let len = (cutoff.ceil() as u64).min(max_ssd + 1) as usize;

        Self(
            (0..len)
                .map(|ssd| (-(ssd as f64 / patch_area as f64) * inv_h2).exp())
                .collect(),
        )
    }

    #[inline]
    fn weight(&self, ssd: u64) -> f64 {
        self.0.get(ssd as usize).copied().unwrap_or(0.0)
    }
}

/// Apply non-local means with filter strength `h`.
///
/// `template_window` and `search_window` are side lengths and should be odd;
/// even values behave like the next smaller odd size. A non-positive strength
/// returns the input unchanged.
pub fn non_local_means(
    image: &GrayImage,
    h: f32,
    template_window: u32,
    search_window: u32,
) -> GrayImage {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 || h <= 0.0 {
        return image.clone();
    }

    let tr = template_window / 2;
    let sr = search_window / 2;
    let pad = tr + sr;
    let plane = PaddedPlane::new(image, pad);

    let (w, hgt) = (width as usize, height as usize);
    let (tr, sr, pad) = (tr as usize, sr as usize, pad as usize);

    // Squared differences are needed for every pixel a template patch can
    // touch: the image plus `tr` on each side.
    let region_w = w + 2 * tr;
    let region_h = hgt + 2 * tr;
    let integral_stride = region_w + 1;
    let mut integral = vec![0u64; integral_stride * (region_h + 1)];

    let patch_area = ((2 * tr + 1) * (2 * tr + 1)) as u64;
    let weights = WeightTable::new(h, patch_area);

    let mut weight_sum = vec![0f64; w * hgt];
    let mut value_sum = vec![0f64; w * hgt];

    let search = -(sr as i64)..=(sr as i64);
    for dy in search.clone() {
        for dx in search.clone() {
            // Region coordinate (rx, ry) maps to padded (rx + sr, ry + sr).
            for ry in 0..region_h {
                let py = ry + sr;
                let qy = (py as i64 + dy) as usize;
                let mut row_acc = 0u64;
                for rx in 0..region_w {
                    let px = rx + sr;
                    let qx = (px as i64 + dx) as usize;
                    let diff = plane.at(px, py) - plane.at(qx, qy);
                    row_acc += (diff * diff) as u64;
                    integral[(ry + 1) * integral_stride + rx + 1] =
                        integral[ry * integral_stride + rx + 1] + row_acc;
                }
            }

            for y in 0..hgt {
                let top = y * integral_stride;
                let bottom = (y + 2 * tr + 1) * integral_stride;
                for x in 0..w {
                    let left = x;
                    let right = x + 2 * tr + 1;
                    // Reordered so the unsigned sum never dips below zero.
                    let ssd = integral[bottom + right] + integral[top + left]
                        - integral[top + right]
                        - integral[bottom + left];
                    let weight = weights.weight(ssd);
                    if weight == 0.0 {
                        continue;
                    }

                    let qx = (x + pad) as i64 + dx;
                    let qy = (y + pad) as i64 + dy;
                    let candidate = plane.at(qx as usize, qy as usize) as f64;

                    let idx = y * w + x;
                    weight_sum[idx] += weight;
                    value_sum[idx] += weight * candidate;
                }
            }
        }
    }

    GrayImage::from_fn(width, height, |x, y| {
        let idx = y as usize * w + x as usize;
        // The zero offset always contributes weight 1, so the sum is positive.
        let value = value_sum[idx] / weight_sum[idx];
        Luma([value.round().clamp(0.0, 255.0) as u8])
    })
}
