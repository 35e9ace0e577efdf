//! Splat weight generation: ground/cliff split by steepness plus a road band.
//!
//! Every cell ends up with exactly one of the ground, cliff or road layers at
//! full weight. Layers past [`ROAD_LAYER`] are kept in the output shape but
//! always carry zero weight.

use tracing::debug;

use crate::error::{ConfigurationError, TerrainError, grid_cells};
use crate::surface::SteepnessProvider;

/// Layer index of flat ground.
pub const GROUND_LAYER: usize = 0;
/// Layer index of steep cliff faces.
pub const CLIFF_LAYER: usize = 1;
/// Layer index of the road band.
pub const ROAD_LAYER: usize = 2;
/// Minimum number of layers a splat grid must carry.
pub const MIN_LAYERS: usize = 3;

/// Steepness fraction (of 90 degrees) at and above which a cell is cliff.
pub const CLIFF_THRESHOLD: f64 = 0.75;

/// A horizontal band of rows painted with the road layer.
///
/// The band is centered on `grid_height / 2` (integer division) shifted by
/// `offset` rows, and spans `width` rows. Both bounds are inclusive and
/// compared against the row index as a float, so fractional widths and
/// offsets are honored without rounding. A zero-width band is empty.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RoadBand {
    lower: f64,
    upper: f64,
    empty: bool,
}

impl RoadBand {
    /// Band for a grid with `grid_height` rows.
    pub fn new(grid_height: usize, width: f64, offset: f64) -> Self {
        let mid = (grid_height / 2) as f64;
        Self {
            lower: mid - width / 2.0 + offset,
            upper: mid + width / 2.0 + offset,
            empty: width <= 0.0,
        }
    }

    /// First row position inside the band.
    pub fn lower(&self) -> f64 {
        self.lower
    }

    /// Last row position inside the band.
    pub fn upper(&self) -> f64 {
        self.upper
    }

    /// Whether `row` lies inside the band.
    pub fn contains(&self, row: usize) -> bool {
        let row = row as f64;
        !self.empty && row >= self.lower && row <= self.upper
    }
}

/// Parameters of one splat pass.
#[derive(Clone, Debug, PartialEq)]
pub struct SplatParams {
    /// Grid columns.
    pub width: usize,
    /// Grid rows.
    pub height: usize,
    /// Layers per cell, at least [`MIN_LAYERS`].
    pub layer_count: usize,
    /// Road band thickness in rows.
    pub road_width: f64,
    /// Road band shift from the midline in rows.
    pub road_offset: f64,
}

impl Default for SplatParams {
    fn default() -> Self {
        Self {
            width: 128,
            height: 128,
            layer_count: MIN_LAYERS,
            road_width: 24.0,
            road_offset: 0.0,
        }
    }
}

impl SplatParams {
    /// Check every field; called before any allocation.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigurationError::SplatDimensionZero {
                width: self.width,
                height: self.height,
            });
        }
        if self.layer_count < MIN_LAYERS {
            return Err(ConfigurationError::TooFewLayers(self.layer_count));
        }
        if grid_cells(&[self.width, self.height, self.layer_count]).is_none() {
            return Err(ConfigurationError::GridTooLarge {
                grid: "splat",
                dimensions: format!("{}x{}x{}", self.width, self.height, self.layer_count),
            });
        }
        if self.road_width.is_nan() || self.road_width < 0.0 {
            return Err(ConfigurationError::RoadWidthNegative(self.road_width));
        }
        if self.road_width > self.height as f64 {
            return Err(ConfigurationError::RoadWidthExceedsGrid {
                road_width: self.road_width,
                grid_height: self.height,
            });
        }
        if !self.road_offset.is_finite() {
            return Err(ConfigurationError::NonFiniteRoadOffset(self.road_offset));
        }
        Ok(())
    }

    /// The road band these parameters describe.
    pub fn road_band(&self) -> RoadBand {
        RoadBand::new(self.height, self.road_width, self.road_offset)
    }
}

/// Per-cell layer weights, addressed `[col, row, layer]`.
///
/// The column-first order matches the alphamap layout terrain hosts expect
/// (`map[x, y, layer]` with the splat row as the host's second axis) and is
/// kept as-is so existing guidance imagery keeps its orientation.
#[derive(Clone, Debug, PartialEq)]
pub struct SplatWeightGrid {
    width: usize,
    height: usize,
    layers: usize,
    weights: Vec<f32>,
}

impl SplatWeightGrid {
    fn index(&self, col: usize, row: usize) -> usize {
        assert!(col < self.width && row < self.height);
        (col * self.height + row) * self.layers
    }

    /// Grid columns.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Grid rows.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Layers per cell.
    pub fn layer_count(&self) -> usize {
        self.layers
    }

    /// Weight of `layer` at `[col, row]`.
    ///
    /// # Panics
    ///
    /// Panics if any index is out of range.
    pub fn get(&self, col: usize, row: usize, layer: usize) -> f32 {
        assert!(layer < self.layers);
        self.weights[self.index(col, row) + layer]
    }

    /// All layer weights of `[col, row]`.
    pub fn weights(&self, col: usize, row: usize) -> &[f32] {
        let start = self.index(col, row);
        &self.weights[start..start + self.layers]
    }

    /// Flat weights in `[col, row, layer]` order.
    pub fn as_slice(&self) -> &[f32] {
        &self.weights
    }

    /// Fraction of cells where `layer` carries full weight.
    pub fn layer_coverage(&self, layer: usize) -> f64 {
        let cells = self.width * self.height;
        if cells == 0 || layer >= self.layers {
            return 0.0;
        }
        let covered = self
            .weights
            .chunks_exact(self.layers)
            .filter(|cell| cell[layer] >= 1.0)
            .count();
        covered as f64 / cells as f64
    }
}

/// Layer weights for one cell before normalization.
fn assign_layers(weights: &mut [f32], steepness_frac: f64, on_road: bool) {
    weights.fill(0.0);
    if on_road {
        weights[ROAD_LAYER] = 1.0;
    } else if steepness_frac < CLIFF_THRESHOLD {
        weights[GROUND_LAYER] = 1.0;
    } else {
        weights[CLIFF_LAYER] = 1.0;
    }
}

/// Normalized position of `index` along an axis of `len` cells; 0 when `len == 1`.
fn normalized(index: usize, len: usize) -> f64 {
    if len > 1 {
        index as f64 / (len - 1) as f64
    } else {
        0.0
    }
}

/// Build a splat grid from terrain steepness and the road band.
///
/// Cells with steepness below 67.5 degrees get ground, the rest cliff;
/// rows inside the road band are road regardless of steepness. Weights
/// are then divided by their sum, which must be positive.
pub fn generate_splat(
    provider: &impl SteepnessProvider,
    params: &SplatParams,
) -> Result<SplatWeightGrid, TerrainError> {
    params.validate()?;
    let band = params.road_band();
    debug!(
        width = params.width,
        height = params.height,
        layers = params.layer_count,
        road_lower = band.lower(),
        road_upper = band.upper(),
        "generating splat weights"
    );

    let mut grid = SplatWeightGrid {
        width: params.width,
        height: params.height,
        layers: params.layer_count,
        weights: vec![0.0; params.width * params.height * params.layer_count],
    };
    let mut cell = vec![0.0f32; params.layer_count];

    for row in 0..params.height {
        let on_road = band.contains(row);
        for col in 0..params.width {
            let norm_row = normalized(row, params.height);
            let norm_col = normalized(col, params.width);
            let steepness_frac = provider.steepness(norm_row, norm_col)? / 90.0;

            assign_layers(&mut cell, steepness_frac, on_road);

            let sum: f32 = cell.iter().sum();
            if sum <= 0.0 {
                return Err(ConfigurationError::UndefinedBlend { col, row }.into());
            }

            let start = grid.index(col, row);
            for (dst, w) in grid.weights[start..start + params.layer_count]
                .iter_mut()
                .zip(&cell)
            {
                *dst = w / sum;
            }
        }
    }

    Ok(grid)
}
