//! End-to-end generation: height field, terrain surface, splat weights.

use std::time::Instant;

use tracing::{debug, info, info_span};

use crate::error::{ConfigurationError, TerrainError};
use crate::guidance::ImageSampler;
use crate::heightfield::{HeightFieldParams, HeightGrid, generate_height};
use crate::splat::{
    CLIFF_LAYER, GROUND_LAYER, ROAD_LAYER, SplatParams, SplatWeightGrid, generate_splat,
};
use crate::surface::TerrainSurface;

/// Everything one generation run needs besides the guidance image.
#[derive(Clone, Debug, PartialEq)]
pub struct TerrainSettings {
    /// Height field pass.
    pub height: HeightFieldParams,
    /// Vertical world scale the host applies to heights when deriving slope.
    pub height_scale: f64,
    /// Splat pass.
    pub splat: SplatParams,
}

impl Default for TerrainSettings {
    fn default() -> Self {
        Self {
            height: HeightFieldParams::default(),
            height_scale: 50.0,
            splat: SplatParams::default(),
        }
    }
}

impl TerrainSettings {
    /// Validate both passes and the surface dimensions up front.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        self.height.validate()?;
        if self.height.edge_size < 2 {
            return Err(ConfigurationError::HeightGridTooSmall(self.height.edge_size));
        }
        if !(self.height_scale.is_finite() && self.height_scale > 0.0) {
            return Err(ConfigurationError::NonPositiveTerrainSize {
                name: "height scale",
                value: self.height_scale,
            });
        }
        self.splat.validate()
    }
}

/// Output of [`generate_terrain`].
#[derive(Clone, Debug)]
pub struct GeneratedTerrain {
    /// Heights placed in world space; the grid itself stays unscaled.
    pub surface: TerrainSurface,
    /// Per-cell layer weights.
    pub splat: SplatWeightGrid,
}

impl GeneratedTerrain {
    /// The unscaled height grid.
    pub fn heights(&self) -> &HeightGrid {
        self.surface.grid()
    }
}

/// Run the height pass, wrap the result as a terrain surface, then run the
/// splat pass against that surface's steepness.
///
/// All parameters are validated before either grid is allocated.
pub fn generate_terrain(
    image: &impl ImageSampler,
    settings: &TerrainSettings,
) -> Result<GeneratedTerrain, TerrainError> {
    settings.validate()?;
    let _span = info_span!("generate_terrain", edge_size = settings.height.edge_size).entered();

    let started = Instant::now();
    let heights = generate_height(image, &settings.height)?;
    if let Some((lo, hi)) = heights.min_max() {
        debug!(min = lo, max = hi, elapsed = ?started.elapsed(), "height field done");
    }

    // Terrain hosts place an N-cell grid over N world units horizontally.
    let size = settings.height.edge_size as f64;
    let surface = TerrainSurface::new(heights, size, settings.height_scale)?;

    let started = Instant::now();
    let splat = generate_splat(&surface, &settings.splat)?;
    debug!(
        ground = splat.layer_coverage(GROUND_LAYER),
        cliff = splat.layer_coverage(CLIFF_LAYER),
        road = splat.layer_coverage(ROAD_LAYER),
        elapsed = ?started.elapsed(),
        "splat weights done"
    );

    info!(
        edge_size = settings.height.edge_size,
        splat_width = splat.width(),
        splat_height = splat.height(),
        "terrain generated"
    );

    Ok(GeneratedTerrain { surface, splat })
}
