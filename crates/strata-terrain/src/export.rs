//! Image sinks for the generated grids.
//!
//! Grids are converted to images only here; quantization and clamping to
//! `[0, 1]` happen at encoding time and never touch the grids themselves.

use std::path::Path;

use image::{ImageBuffer, Luma, Rgb, RgbImage, Rgba, RgbaImage};

use crate::error::ExportError;
use crate::heightfield::HeightGrid;
use crate::splat::SplatWeightGrid;

/// 16-bit grayscale image type used for height output.
pub type HeightImage = ImageBuffer<Luma<u16>, Vec<u16>>;

/// Height grid row shown at pixel row `y` of an `edge`-tall image.
///
/// Row 0 is the bottom of the picture, matching how guidance images are read.
fn grid_row(y: u32, edge: u32) -> usize {
    (edge - 1 - y) as usize
}

/// Height grid as 16-bit grayscale; pixel `(x, y)` is `heights[edge - 1 - y, x]`.
pub fn height_grid_to_image(grid: &HeightGrid) -> HeightImage {
    let edge = grid.edge_size() as u32;
    HeightImage::from_fn(edge, edge, |x, y| {
        let h = grid.get(grid_row(y, edge), x as usize).clamp(0.0, 1.0);
        Luma([(h * f32::from(u16::MAX)).round() as u16])
    })
}

/// Splat grid as RGBA8 with layers 0-3 in the R, G, B and A channels.
///
/// Pixel `(x, y)` holds the weights of cell `[col = x, row = y]`. Alpha is
/// opaque when the grid has only three layers.
pub fn splat_grid_to_image(grid: &SplatWeightGrid) -> RgbaImage {
    let to_byte = |w: f32| (w.clamp(0.0, 1.0) * 255.0).round() as u8;
    RgbaImage::from_fn(grid.width() as u32, grid.height() as u32, |x, y| {
        let w = grid.weights(x as usize, y as usize);
        let alpha = w.get(3).map_or(255, |&a| to_byte(a));
        Rgba([to_byte(w[0]), to_byte(w[1]), to_byte(w[2]), alpha])
    })
}

/// Color-banded preview of the height grid.
pub fn height_preview_image(grid: &HeightGrid) -> RgbImage {
    let edge = grid.edge_size() as u32;
    RgbImage::from_fn(edge, edge, |x, y| {
        let (r, g, b) = height_to_color(f64::from(grid.get(grid_row(y, edge), x as usize)));
        Rgb([r, g, b])
    })
}

/// Map a normalized height to a preview color.
///
/// Bands: water, beach, lowland green, brown highland, snow.
pub fn height_to_color(normalized: f64) -> (u8, u8, u8) {
    let h = normalized.clamp(0.0, 1.0);
    if h < 0.2 {
        (30, 80, 200)
    } else if h < 0.24 {
        (220, 200, 130)
    } else if h < 0.55 {
        let t = (h - 0.24) / (0.55 - 0.24);
        (
            (30.0 + t * 80.0) as u8,
            (160.0 - t * 40.0) as u8,
            (30.0 + t * 20.0) as u8,
        )
    } else if h < 0.8 {
        let t = (h - 0.55) / 0.25;
        (
            (110.0 + t * 40.0) as u8,
            (120.0 - t * 50.0) as u8,
            (50.0 + t * 20.0) as u8,
        )
    } else {
        let t = ((h - 0.8) / 0.2).min(1.0);
        let base = (150.0 + t * 105.0) as u8;
        (base, base, base)
    }
}

fn ensure_parent(path: &Path) -> Result<(), ExportError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }
    Ok(())
}

/// Write the height grid as a 16-bit PNG (format chosen by extension).
pub fn save_height_grid(grid: &HeightGrid, path: &Path) -> Result<(), ExportError> {
    ensure_parent(path)?;
    height_grid_to_image(grid).save(path)?;
    Ok(())
}

/// Write the splat grid as an RGBA image.
pub fn save_splat_grid(grid: &SplatWeightGrid, path: &Path) -> Result<(), ExportError> {
    ensure_parent(path)?;
    splat_grid_to_image(grid).save(path)?;
    Ok(())
}

/// Write the color-banded height preview.
pub fn save_height_preview(grid: &HeightGrid, path: &Path) -> Result<(), ExportError> {
    ensure_parent(path)?;
    height_preview_image(grid).save(path)?;
    Ok(())
}
