//! Height field generation: guidance image blended with octave noise.

use tracing::debug;

use crate::error::{ConfigurationError, TerrainError, grid_cells};
use crate::guidance::ImageSampler;
use crate::octave::{NoiseParams, OctaveNoise};

/// Square grid of unscaled heights, addressed `[row, col]`.
///
/// Values are approximately in `[0, 1]` but are never clamped; the host
/// applies its own vertical scale.
#[derive(Clone, Debug, PartialEq)]
pub struct HeightGrid {
    edge_size: usize,
    heights: Vec<f32>,
}

impl HeightGrid {
    /// A grid of `edge_size x edge_size` cells all set to `value`.
    pub fn filled(edge_size: usize, value: f32) -> Self {
        Self {
            edge_size,
            heights: vec![value; edge_size * edge_size],
        }
    }

    /// Build a grid by evaluating `f(row, col)` for every cell.
    pub fn from_fn(edge_size: usize, mut f: impl FnMut(usize, usize) -> f32) -> Self {
        let mut heights = Vec::with_capacity(edge_size * edge_size);
        for row in 0..edge_size {
            for col in 0..edge_size {
                heights.push(f(row, col));
            }
        }
        Self { edge_size, heights }
    }

    /// Cells per edge.
    pub fn edge_size(&self) -> usize {
        self.edge_size
    }

    /// Height at `[row, col]`.
    ///
    /// # Panics
    ///
    /// Panics if either index is `>= edge_size`.
    pub fn get(&self, row: usize, col: usize) -> f32 {
        assert!(row < self.edge_size && col < self.edge_size);
        self.heights[row * self.edge_size + col]
    }

    /// Row-major height values.
    pub fn as_slice(&self) -> &[f32] {
        &self.heights
    }

    /// Iterate over rows.
    pub fn rows(&self) -> impl Iterator<Item = &[f32]> {
        self.heights.chunks_exact(self.edge_size.max(1))
    }

    /// Smallest and largest height, or `None` for an empty grid.
    pub fn min_max(&self) -> Option<(f32, f32)> {
        self.heights.iter().fold(None, |acc, &h| match acc {
            None => Some((h, h)),
            Some((lo, hi)) => Some((lo.min(h), hi.max(h))),
        })
    }
}

/// Parameters of one height field pass.
#[derive(Clone, Debug, PartialEq)]
pub struct HeightFieldParams {
    /// Cells per grid edge.
    pub edge_size: usize,
    /// 0.0 = pure noise, 1.0 = pure guidance image.
    pub mix_fraction: f64,
    /// Octave noise settings.
    pub noise: NoiseParams,
}

impl Default for HeightFieldParams {
    fn default() -> Self {
        Self {
            edge_size: 128,
            mix_fraction: 0.7,
            noise: NoiseParams::default(),
        }
    }
}

impl HeightFieldParams {
    /// Check every field; called before any allocation.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.edge_size == 0 {
            return Err(ConfigurationError::EdgeSizeZero);
        }
        if grid_cells(&[self.edge_size, self.edge_size]).is_none() {
            return Err(ConfigurationError::GridTooLarge {
                grid: "height",
                dimensions: format!("{0}x{0}", self.edge_size),
            });
        }
        if !(0.0..=1.0).contains(&self.mix_fraction) {
            return Err(ConfigurationError::MixFractionOutOfRange(self.mix_fraction));
        }
        self.noise.validate()
    }
}

/// Blend the guidance image with octave noise into a new height grid.
///
/// Cell `[row, col]` samples the image at `(col / edge, row / edge)` and
/// stores `grey * mix + noise * (1 - mix)`. The first sampler error aborts
/// the pass and is returned unchanged.
pub fn generate_height(
    image: &impl ImageSampler,
    params: &HeightFieldParams,
) -> Result<HeightGrid, TerrainError> {
    params.validate()?;
    let noise = OctaveNoise::new(params.noise.clone(), params.edge_size)?;

    let edge = params.edge_size;
    let mix = params.mix_fraction;
    debug!(
        edge_size = edge,
        mix_fraction = mix,
        octaves = params.noise.octaves,
        "generating height field"
    );

    let mut heights = Vec::with_capacity(edge * edge);
    for row in 0..edge {
        for col in 0..edge {
            let u = col as f64 / edge as f64;
            let v = row as f64 / edge as f64;
            let grey = f64::from(image.sample_bilinear(u, v)?);
            let noise_value = noise.sample(row, col);
            heights.push((grey * mix + noise_value * (1.0 - mix)) as f32);
        }
    }

    Ok(HeightGrid {
        edge_size: edge,
        heights,
    })
}
