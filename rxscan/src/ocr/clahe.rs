//! Contrast-limited adaptive histogram equalization.

use image::{GrayImage, Luma};

const BINS: usize = 256;

/// Tile layout over an image. The grid is shrunk for images narrower or
/// shorter than the requested tile count so that no tile is empty.
struct TileGrid {
    tiles_x: u32,
    tiles_y: u32,
    tile_w: u32,
    tile_h: u32,
}

impl TileGrid {
    fn new(width: u32, height: u32, grid: u32) -> Self {
        let grid = grid.max(1);
        let tile_w = width.div_ceil(grid.min(width));
        let tile_h = height.div_ceil(grid.min(height));
        Self {
            tiles_x: width.div_ceil(tile_w),
            tiles_y: height.div_ceil(tile_h),
            tile_w,
            tile_h,
        }
    }
}

/// Clip a tile histogram at `limit` and spread the excess over all bins.
fn clip_histogram(hist: &mut [u32; BINS], limit: u32) {
    let mut excess = 0u32;
    for bin in hist.iter_mut() {
        if *bin > limit {
            excess += *bin - limit;
            *bin = limit;
        }
    }

    let batch = excess / BINS as u32;
    let mut residual = excess - batch * BINS as u32;
    for bin in hist.iter_mut() {
        *bin += batch;
    }

    if residual > 0 {
        let step = (BINS as u32 / residual).max(1) as usize;
        for bin in hist.iter_mut().step_by(step) {
            if residual == 0 {
                break;
            }
            *bin += 1;
            residual -= 1;
        }
    }
}

/// Equalization lookup table for one tile.
fn tile_lut(image: &GrayImage, x0: u32, y0: u32, x1: u32, y1: u32, clip_limit: f32) -> [u8; BINS] {
    let mut hist = [0u32; BINS];
    for y in y0..y1 {
        for x in x0..x1 {
            hist[image.get_pixel(x, y)[0] as usize] += 1;
        }
    }

    let area = (x1 - x0) * (y1 - y0);
    if clip_limit > 0.0 {
        let limit = ((clip_limit * area as f32 / BINS as f32) as u32).max(1);
        clip_histogram(&mut hist, limit);
    }

    let scale = 255.0 / area as f32;
    let mut lut = [0u8; BINS];
    let mut cdf = 0u32;
    for (value, count) in hist.iter().enumerate() {
        cdf += count;
        lut[value] = (cdf as f32 * scale).round().min(255.0) as u8;
    }
    lut
}

/// Equalize `image` over a `grid`×`grid` tile layout with contrast limit
/// `clip_limit` (a multiple of the mean bin height; `0` disables clipping).
///
/// Each pixel is mapped through the lookup tables of the four nearest tiles
/// and bilinearly blended by its distance to the tile centers, so tile
/// borders don't show.
pub fn clahe(image: &GrayImage, clip_limit: f32, grid: u32) -> GrayImage {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return image.clone();
    }

    let layout = TileGrid::new(width, height, grid);
    let mut luts = Vec::with_capacity((layout.tiles_x * layout.tiles_y) as usize);
    for ty in 0..layout.tiles_y {
        for tx in 0..layout.tiles_x {
            let x0 = tx * layout.tile_w;
            let y0 = ty * layout.tile_h;
            let x1 = (x0 + layout.tile_w).min(width);
            let y1 = (y0 + layout.tile_h).min(height);
            luts.push(tile_lut(image, x0, y0, x1, y1, clip_limit));
        }
    }

    let lut_at = |tx: i64, ty: i64| &luts[(ty as u32 * layout.tiles_x + tx as u32) as usize];
    let inv_tw = 1.0 / layout.tile_w as f32;
    let inv_th = 1.0 / layout.tile_h as f32;
    let max_tx = layout.tiles_x as i64 - 1;
    let max_ty = layout.tiles_y as i64 - 1;

    GrayImage::from_fn(width, height, |x, y| {
        let value = image.get_pixel(x, y)[0] as usize;

        let tyf = y as f32 * inv_th - 0.5;
        let ty1 = tyf.floor() as i64;
        let ya = tyf - ty1 as f32;
        let (ty1, ty2) = (ty1.max(0), (ty1 + 1).min(max_ty));

        let txf = x as f32 * inv_tw - 0.5;
        let tx1 = txf.floor() as i64;
        let xa = txf - tx1 as f32;
        let (tx1, tx2) = (tx1.max(0), (tx1 + 1).min(max_tx));

        let top = lut_at(tx1, ty1)[value] as f32 * (1.0 - xa) + lut_at(tx2, ty1)[value] as f32 * xa;
        let bottom =
            lut_at(tx1, ty2)[value] as f32 * (1.0 - xa) + lut_at(tx2, ty2)[value] as f32 * xa;
        let blended = top * (1.0 - ya) + bottom * ya;

        Luma([blended.round().clamp(0.0, 255.0) as u8])
    })
}
