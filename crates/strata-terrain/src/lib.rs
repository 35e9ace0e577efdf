//! Procedural terrain synthesis: a height field blended from a guidance image
//! and octave noise, and a ground/cliff/road splat map derived from its slope.

mod error;
mod guidance;
mod heightfield;
mod octave;
mod pipeline;
mod splat;
mod surface;

pub mod export;

pub use error::{ConfigurationError, ExportError, MAX_GRID_CELLS, SampleError, TerrainError};
pub use guidance::{GuidanceImage, ImageSampler, WrapMode};
pub use heightfield::{HeightFieldParams, HeightGrid, generate_height};
pub use octave::{NoiseParams, OctaveNoise};
pub use pipeline::{GeneratedTerrain, TerrainSettings, generate_terrain};
pub use splat::{
    CLIFF_LAYER, CLIFF_THRESHOLD, GROUND_LAYER, MIN_LAYERS, ROAD_LAYER, RoadBand, SplatParams,
    SplatWeightGrid, generate_splat,
};
pub use surface::{SteepnessProvider, TerrainSurface};
