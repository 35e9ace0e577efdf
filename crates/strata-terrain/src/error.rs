//! Error types for terrain generation.

/// A generation parameter is invalid. Raised before any grid is allocated.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigurationError {
    /// The height grid must have at least one cell per edge.
    #[error("height grid edge size must be positive")]
    EdgeSizeZero,

    /// `mix_fraction` must lie in `[0, 1]`.
    #[error("mix fraction {0} is outside [0, 1]")]
    MixFractionOutOfRange(f64),

    /// `persistence` must lie in `(0, 1]`.
    #[error("persistence {0} is outside (0, 1]")]
    PersistenceOutOfRange(f64),

    /// At least one octave is required.
    #[error("octave count must be at least 1")]
    NoOctaves,

    /// A noise span or origin is NaN or infinite.
    #[error("noise parameter `{name}` is not finite: {value}")]
    NonFiniteNoiseParameter {
        /// Parameter name.
        name: &'static str,
        /// Offending value.
        value: f64,
    },

    /// The splat grid needs at least one row and one column.
    #[error("splat grid dimensions {width}x{height} must be positive")]
    SplatDimensionZero {
        /// Requested width.
        width: usize,
        /// Requested height.
        height: usize,
    },

    /// The grid has more cells than can be addressed in memory.
    #[error("{grid} grid of {dimensions} cells is too large")]
    GridTooLarge {
        /// Which grid, `"height"` or `"splat"`.
        grid: &'static str,
        /// Requested dimensions, e.g. `"128x128x3"`.
        dimensions: String,
    },

    /// Ground, cliff and road each need a layer.
    #[error("splat map needs at least 3 layers, got {0}")]
    TooFewLayers(usize),

    /// The road band cannot have negative (or NaN) thickness.
    #[error("road width {0} must be a non-negative number")]
    RoadWidthNegative(f64),

    /// The road band is thicker than the splat grid.
    #[error("road width {road_width} exceeds splat grid height {grid_height}")]
    RoadWidthExceedsGrid {
        /// Requested road width in rows.
        road_width: f64,
        /// Splat grid height in rows.
        grid_height: usize,
    },

    /// The road offset is NaN or infinite.
    #[error("road offset {0} is not finite")]
    NonFiniteRoadOffset(f64),

    /// Terrain dimensions must be finite and positive.
    #[error("terrain {name} must be finite and positive, got {value}")]
    NonPositiveTerrainSize {
        /// Dimension name.
        name: &'static str,
        /// Offending value.
        value: f64,
    },

    /// Slopes need at least a 2x2 height grid.
    #[error("height grid edge size {0} is too small to derive slopes (need >= 2)")]
    HeightGridTooSmall(usize),

    /// A cell's layer weights summed to zero, so no blend is defined.
    #[error("layer weights at cell ({col}, {row}) sum to zero")]
    UndefinedBlend {
        /// Cell column.
        col: usize,
        /// Cell row.
        row: usize,
    },
}

/// Largest number of `f32` cells a single grid may hold.
pub const MAX_GRID_CELLS: usize = isize::MAX as usize / std::mem::size_of::<f32>();

/// Product of `dims`, or `None` past [`MAX_GRID_CELLS`].
pub(crate) fn grid_cells(dims: &[usize]) -> Option<usize> {
    dims.iter()
        .try_fold(1usize, |acc, &d| acc.checked_mul(d))
        .filter(|&cells| cells <= MAX_GRID_CELLS)
}

/// A sampler could not produce a value for the requested coordinate.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SampleError {
    /// The coordinate lies outside the closed unit square or is not finite.
    #[error("sample coordinate ({u}, {v}) is outside [0, 1] x [0, 1]")]
    OutOfRange {
        /// First coordinate.
        u: f64,
        /// Second coordinate.
        v: f64,
    },

    /// The host-side data behind the sampler is unavailable.
    #[error("sampler unavailable: {0}")]
    Unavailable(String),
}

/// Any failure of a generation pass.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TerrainError {
    /// Invalid parameters; nothing was generated.
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    /// A sampler failed; propagated as returned by the sampler.
    #[error(transparent)]
    Sampling(#[from] SampleError),
}

/// Failure writing a generated grid to disk.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// Encoding or writing the image failed.
    #[error("failed to write image: {0}")]
    Image(#[from] image::ImageError),

    /// Creating the output directory failed.
    #[error("failed to create output directory: {0}")]
    Io(#[from] std::io::Error),
}
